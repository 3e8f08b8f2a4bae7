use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;
use crate::app::{App, InputMode};
use crate::preferences::Preference;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Settled(outcome) => app.on_settled(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.shutdown();
        return;
    }
    if let KeyCode::F(n) = key.code {
        if let Some(pref) = Preference::from_slot(n) {
            app.toggle_preference(pref);
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Servings => handle_servings_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.shutdown(),

        // Start typing
        KeyCode::Char('i') | KeyCode::Tab | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Preference panel
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(pref) = Preference::from_slot(c as u8 - b'0') {
                app.toggle_preference(pref);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => app.increment_servings(),
        KeyCode::Char('-') => app.decrement_servings(),
        KeyCode::Char('s') => app.begin_servings_entry(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let newline = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter if newline => app.draft.insert('\n'),
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.draft.insert('\n');
        }
        KeyCode::Enter => {
            if app.can_submit() {
                if let Err(err) = app.submit() {
                    debug!(error = %err, "submission refused");
                }
            }
        }
        KeyCode::Backspace => app.draft.backspace(),
        KeyCode::Delete => app.draft.delete(),
        KeyCode::Left => app.draft.move_left(),
        KeyCode::Right => app.draft.move_right(),
        KeyCode::Home => app.draft.move_home(),
        KeyCode::End => app.draft.move_end(),
        KeyCode::Char(c) => app.draft.insert(c),
        _ => {}
    }
}

fn handle_servings_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_servings_entry(),
        KeyCode::Enter => app.commit_servings_entry(),
        KeyCode::Backspace => {
            app.servings_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
            if app.servings_input.len() < 4 {
                app.servings_input.push(c);
            }
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}
