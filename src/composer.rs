use thiserror::Error;

use crate::preferences::{Preferences, Servings};

/// The draft was blank after trimming; nothing should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot submit an empty query")]
pub struct EmptySubmission;

/// Build the query that is both sent to the service and shown as the user's turn.
///
/// `"tofu dinner"` with vegan + quick at 4 servings becomes
/// `"tofu dinner (vegan, quick under 30 minutes), for 4 people"`.
pub fn compose(
    raw_text: &str,
    preferences: &Preferences,
    servings: Servings,
) -> Result<String, EmptySubmission> {
    let text = raw_text.trim();
    if text.is_empty() {
        return Err(EmptySubmission);
    }

    let labels: Vec<&str> = preferences
        .active()
        .iter()
        .map(|p| p.query_label())
        .collect();

    let mut query = String::from(text);
    if !labels.is_empty() {
        query.push_str(&format!(" ({})", labels.join(", ")));
    }
    if servings != Servings::DEFAULT {
        query.push_str(&format!(", for {} people", servings.get()));
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Preference;

    #[test]
    fn test_no_filters_no_clause() {
        let query = compose("pasta", &Preferences::default(), Servings::DEFAULT).unwrap();
        assert_eq!(query, "pasta");
    }

    #[test]
    fn test_text_is_trimmed() {
        let query = compose("  chicken curry \n", &Preferences::default(), Servings::DEFAULT).unwrap();
        assert_eq!(query, "chicken curry");
    }

    #[test]
    fn test_blank_drafts_are_refused() {
        let prefs = Preferences::default().with(Preference::Vegan, true);
        assert_eq!(compose("", &prefs, Servings::new(4)), Err(EmptySubmission));
        assert_eq!(compose("   ", &prefs, Servings::new(4)), Err(EmptySubmission));
        assert_eq!(compose("\n\t", &prefs, Servings::DEFAULT), Err(EmptySubmission));
    }

    #[test]
    fn test_every_subset_lists_active_labels_in_order() {
        let all = Preference::all();
        for mask in 0u8..32 {
            let prefs = all
                .iter()
                .enumerate()
                .fold(Preferences::default(), |acc, (i, p)| acc.with(*p, mask & (1 << i) != 0));

            let expected: Vec<&str> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| p.query_label())
                .collect();

            let query = compose("soup", &prefs, Servings::DEFAULT).unwrap();
            if expected.is_empty() {
                assert_eq!(query, "soup");
            } else {
                assert_eq!(query, format!("soup ({})", expected.join(", ")));
            }
        }
    }

    #[test]
    fn test_all_filters_on() {
        let prefs = Preference::all()
            .into_iter()
            .fold(Preferences::default(), |acc, p| acc.with(p, true));
        let query = compose("bowl", &prefs, Servings::DEFAULT).unwrap();
        assert_eq!(
            query,
            "bowl (vegan, vegetarian, gluten-free, quick under 30 minutes, high protein)"
        );
    }

    #[test]
    fn test_default_servings_never_mentioned() {
        let prefs = Preferences::default().with(Preference::Quick, true);
        let query = compose("eggs", &prefs, Servings::new(2)).unwrap();
        assert!(!query.contains("people"));
    }

    #[test]
    fn test_other_servings_appended() {
        for n in [1, 3, 7, 10] {
            let query = compose("eggs", &Preferences::default(), Servings::new(n)).unwrap();
            assert_eq!(query, format!("eggs, for {} people", n));
        }
    }

    #[test]
    fn test_filters_then_servings() {
        let prefs = Preferences::default()
            .with(Preference::Vegan, true)
            .with(Preference::Quick, true);
        let query = compose("tofu dinner", &prefs, Servings::new(4)).unwrap();
        assert_eq!(query, "tofu dinner (vegan, quick under 30 minutes), for 4 people");
    }
}
