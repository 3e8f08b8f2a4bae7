use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::debug;

use crate::composer::compose;
use crate::config::Config;
use crate::conversation::{Conversation, Outcome, SubmitError};
use crate::dispatcher::Dispatcher;
use crate::preferences::{Preference, Preferences, Servings};
use crate::recommend::RecommendClient;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing in the compose box
    Editing,
    /// Typing a number into the servings field
    Servings,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Multiline compose field with a character cursor
#[derive(Debug, Default, Clone)]
pub struct Draft {
    text: String,
    cursor: usize,
}

impl Draft {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// (line, column) of the cursor, both in characters
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
        (line, col)
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation
    pub conversation: Conversation,
    pub draft: Draft,
    dispatcher: Dispatcher,

    // Preference panel
    pub preferences: Preferences,
    pub servings: Servings,
    pub servings_input: String,

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_lines: u16,  // Wrapped line count from the last draw
    pub chat_area: Option<Rect>,
    /// Pin the view to the newest line on the next draw
    pub follow_newest: bool,
    seen_messages: usize,
    seen_pending: bool,

    /// Terminal reports Shift+Enter apart from Enter
    pub shift_enter_newline: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            conversation: Conversation::new(),
            draft: Draft::default(),
            dispatcher: Dispatcher::new(RecommendClient::new(&config.endpoint), tx),

            preferences: Preferences::default(),
            servings: config.default_servings,
            servings_input: String::new(),

            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            chat_area: None,
            follow_newest: true,
            seen_messages: 0,
            seen_pending: false,

            shift_enter_newline: false,

            animation_frame: 0,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.dispatcher.endpoint()
    }

    /// Whether Enter in the compose box would send anything
    pub fn can_submit(&self) -> bool {
        !self.conversation.is_pending() && !self.draft.is_blank()
    }

    /// Compose the draft with the current preferences and send it.
    ///
    /// The draft is cleared as soon as the request is dispatched.
    pub fn submit(&mut self) -> Result<(), SubmitError> {
        if self.conversation.is_pending() {
            return Err(SubmitError::Busy);
        }
        let query = compose(self.draft.text(), &self.preferences, self.servings)?;
        self.dispatcher.submit(&mut self.conversation, query)?;
        self.draft.clear();
        self.animation_frame = 0;
        Ok(())
    }

    pub fn on_settled(&mut self, outcome: Outcome) {
        if !self.dispatcher.is_active() {
            debug!("settlement after shutdown ignored");
            return;
        }
        self.conversation.settle(outcome);
    }

    pub fn toggle_preference(&mut self, pref: Preference) {
        self.preferences = self.preferences.toggled(pref);
    }

    pub fn increment_servings(&mut self) {
        self.servings = self.servings.increment();
    }

    pub fn decrement_servings(&mut self) {
        self.servings = self.servings.decrement();
    }

    pub fn begin_servings_entry(&mut self) {
        self.servings_input = self.servings.get().to_string();
        self.input_mode = InputMode::Servings;
    }

    pub fn commit_servings_entry(&mut self) {
        self.servings = Servings::parse(&self.servings_input);
        self.servings_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_servings_entry(&mut self) {
        self.servings_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn shutdown(&mut self) {
        self.dispatcher.shutdown();
        self.should_quit = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Keys that insert a line break in the compose box
    pub fn newline_hint(&self) -> &'static str {
        if self.shift_enter_newline {
            "Shift+Enter"
        } else {
            "Alt+Enter"
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.chat_lines.saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_newest = false;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_newest = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.visible_height() / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.visible_height() / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_newest = false;
    }

    /// Bring the newest message into view whenever the log or the loading
    /// indicator changed since the last call.
    pub fn sync_scroll(&mut self) {
        let len = self.conversation.len();
        let pending = self.conversation.is_pending();
        if len != self.seen_messages || pending != self.seen_pending {
            self.seen_messages = len;
            self.seen_pending = pending;
            self.scroll_to_bottom();
        }
    }

    /// The offset itself is settled at draw time, once the wrapped height is known.
    pub fn scroll_to_bottom(&mut self) {
        self.follow_newest = true;
    }

    /// Record the wrapped chat height from a draw and apply any pending follow.
    pub fn update_chat_lines(&mut self, lines: u16) {
        self.chat_lines = lines;
        if self.follow_newest {
            self.chat_scroll = lines.saturating_sub(self.chat_height);
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }
}
