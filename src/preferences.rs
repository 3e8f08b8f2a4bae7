//! Diet filters and serving count chosen in the preference panel.
//!
//! Everything here is a plain value type. Toggling a filter produces a new
//! `Preferences` with exactly one field changed; the composer only ever reads
//! these values.

use serde::{Deserialize, Serialize};

/// One of the five diet/time filters, in the order they appear in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Vegan,
    Vegetarian,
    GlutenFree,
    Quick,
    HighProtein,
}

impl Preference {
    pub fn all() -> [Preference; 5] {
        [
            Preference::Vegan,
            Preference::Vegetarian,
            Preference::GlutenFree,
            Preference::Quick,
            Preference::HighProtein,
        ]
    }

    /// Text appended to the outgoing query when the filter is on
    pub fn query_label(&self) -> &'static str {
        match self {
            Preference::Vegan => "vegan",
            Preference::Vegetarian => "vegetarian",
            Preference::GlutenFree => "gluten-free",
            Preference::Quick => "quick under 30 minutes",
            Preference::HighProtein => "high protein",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Preference::Vegan => "Vegan",
            Preference::Vegetarian => "Vegetarian",
            Preference::GlutenFree => "Gluten-free",
            Preference::Quick => "Quick (<30 min)",
            Preference::HighProtein => "High protein",
        }
    }

    /// Map a 1-based panel slot (keys 1..5 / F1..F5) to a filter
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1..=5 => Some(Self::all()[(slot - 1) as usize]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub vegan: bool,
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub quick: bool,
    pub high_protein: bool,
}

impl Preferences {
    pub fn is_set(&self, pref: Preference) -> bool {
        match pref {
            Preference::Vegan => self.vegan,
            Preference::Vegetarian => self.vegetarian,
            Preference::GlutenFree => self.gluten_free,
            Preference::Quick => self.quick,
            Preference::HighProtein => self.high_protein,
        }
    }

    /// Copy of `self` with a single filter replaced
    pub fn with(self, pref: Preference, on: bool) -> Self {
        match pref {
            Preference::Vegan => Self { vegan: on, ..self },
            Preference::Vegetarian => Self { vegetarian: on, ..self },
            Preference::GlutenFree => Self { gluten_free: on, ..self },
            Preference::Quick => Self { quick: on, ..self },
            Preference::HighProtein => Self { high_protein: on, ..self },
        }
    }

    pub fn toggled(self, pref: Preference) -> Self {
        self.with(pref, !self.is_set(pref))
    }

    /// Active filters in query order
    pub fn active(&self) -> Vec<Preference> {
        Preference::all()
            .into_iter()
            .filter(|p| self.is_set(*p))
            .collect()
    }
}

/// Number of people a recipe should serve, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Servings(u8);

impl Servings {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    /// Never mentioned in a query
    pub const DEFAULT: Servings = Servings(2);

    pub fn new(n: i64) -> Self {
        if n < Self::MIN as i64 {
            Servings(Self::MIN)
        } else {
            Servings(n.min(Self::MAX as i64) as u8)
        }
    }

    /// Normalize raw text from the servings field.
    ///
    /// Reads a leading integer the way a number input does: whitespace and
    /// trailing garbage are ignored, no digits at all falls back to 1.
    pub fn parse(input: &str) -> Self {
        parse_leading_int(input)
            .map(Self::new)
            .unwrap_or(Servings(Self::MIN))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self::new(self.0 as i64 + 1)
    }

    pub fn decrement(self) -> Self {
        Self::new(self.0 as i64 - 1)
    }
}

impl Default for Servings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Servings {
    fn from(n: i64) -> Self {
        Self::new(n)
    }
}

impl From<Servings> for i64 {
    fn from(s: Servings) -> Self {
        s.0 as i64
    }
}

fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    // Anything too long for i64 is far outside the servings range anyway
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_changes_only_one_field() {
        let prefs = Preferences::default().toggled(Preference::GlutenFree);
        assert_eq!(
            prefs,
            Preferences {
                gluten_free: true,
                ..Preferences::default()
            }
        );

        let prefs = prefs.toggled(Preference::Vegan).toggled(Preference::GlutenFree);
        assert!(prefs.vegan);
        assert!(!prefs.gluten_free);
        assert!(!prefs.vegetarian && !prefs.quick && !prefs.high_protein);
    }

    #[test]
    fn test_contradictory_filters_are_allowed() {
        let prefs = Preferences::default()
            .with(Preference::Vegan, true)
            .with(Preference::Vegetarian, true);
        assert_eq!(
            prefs.active(),
            vec![Preference::Vegan, Preference::Vegetarian]
        );
    }

    #[test]
    fn test_active_uses_fixed_order() {
        let prefs = Preferences::default()
            .with(Preference::HighProtein, true)
            .with(Preference::Quick, true)
            .with(Preference::Vegan, true);
        assert_eq!(
            prefs.active(),
            vec![Preference::Vegan, Preference::Quick, Preference::HighProtein]
        );
    }

    #[test]
    fn test_from_slot() {
        assert_eq!(Preference::from_slot(1), Some(Preference::Vegan));
        assert_eq!(Preference::from_slot(5), Some(Preference::HighProtein));
        assert_eq!(Preference::from_slot(0), None);
        assert_eq!(Preference::from_slot(6), None);
    }

    #[test]
    fn test_servings_parse_falls_back_to_one() {
        assert_eq!(Servings::parse("0").get(), 1);
        assert_eq!(Servings::parse("").get(), 1);
        assert_eq!(Servings::parse("-5").get(), 1);
        assert_eq!(Servings::parse("abc").get(), 1);
        assert_eq!(Servings::parse("-").get(), 1);
    }

    #[test]
    fn test_servings_parse_reads_leading_integer() {
        assert_eq!(Servings::parse("7").get(), 7);
        assert_eq!(Servings::parse(" 4 ").get(), 4);
        assert_eq!(Servings::parse("3 people").get(), 3);
        assert_eq!(Servings::parse("+6").get(), 6);
    }

    #[test]
    fn test_servings_upper_bound_is_clamped() {
        assert_eq!(Servings::parse("10").get(), 10);
        assert_eq!(Servings::parse("42").get(), 10);
        assert_eq!(Servings::parse("99999999999999999999999").get(), 10);
    }

    #[test]
    fn test_servings_step_stays_in_range() {
        assert_eq!(Servings::new(10).increment().get(), 10);
        assert_eq!(Servings::new(1).decrement().get(), 1);
        assert_eq!(Servings::default().increment().get(), 3);
    }

    #[test]
    fn test_servings_deserializes_normalized() {
        let s: Servings = serde_json::from_str("0").unwrap();
        assert_eq!(s.get(), 1);
        let s: Servings = serde_json::from_str("12").unwrap();
        assert_eq!(s.get(), 10);
    }
}
