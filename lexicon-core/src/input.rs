//! Host-independent keys and the single-line text editor used by every
//! text-entry state.

/// Key vocabulary understood by the game states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Ends the session from any state (Ctrl+C).
    Interrupt,
    /// Global shortcut to provider setup (Ctrl+S).
    Settings,
}

pub const DEFAULT_CHAR_LIMIT: usize = 200;

/// A single-line editor. Cursor positions are character indices.
#[derive(Debug, Clone)]
pub struct TextInput {
    buffer: String,
    cursor_position: usize,
    char_limit: usize,
    masked: bool,
    placeholder: String,
}

impl TextInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            cursor_position: 0,
            char_limit: DEFAULT_CHAR_LIMIT,
            masked: false,
            placeholder: placeholder.into(),
        }
    }

    /// Show bullets instead of the typed text.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    /// Apply an editing key. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(c) => self.type_char(c),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.cursor_left(),
            Key::Right => self.cursor_right(),
            Key::Home => self.cursor_home(),
            Key::End => self.cursor_end(),
            _ => return false,
        }
        true
    }

    /// Take the trimmed contents, or `None` when there is nothing to submit.
    /// An empty submission leaves the buffer untouched.
    pub fn submit(&mut self) -> Option<String> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return None;
        }

        let value = trimmed.to_string();
        self.clear();
        Some(value)
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        if c.is_control() || self.buffer.chars().count() >= self.char_limit {
            return;
        }
        let byte_pos = self
            .buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len());
        self.buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete(&mut self) {
        self.remove_at_cursor();
    }

    fn remove_at_cursor(&mut self) {
        if let Some((byte_pos, ch)) = self.buffer.char_indices().nth(self.cursor_position) {
            self.buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.buffer.chars().count();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_position = 0;
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Text as it should be displayed, with a `|` at the cursor.
    pub fn display(&self) -> String {
        if self.buffer.is_empty() && !self.placeholder.is_empty() {
            return format!("|{}", self.placeholder);
        }
        let mut shown: String = if self.masked {
            "•".repeat(self.buffer.chars().count())
        } else {
            self.buffer.clone()
        };
        let byte_pos = shown
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(shown.len());
        shown.insert(byte_pos, '|');
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new("");
        for c in text.chars() {
            input.type_char(c);
        }
        input
    }

    #[test]
    fn test_unicode_editing() {
        let mut input = typed("héllo");
        input.cursor_left();
        input.cursor_left();
        input.cursor_left();
        input.backspace();
        assert_eq!(input.value(), "hllo");
        input.type_char('é');
        assert_eq!(input.value(), "héllo");
        input.delete();
        assert_eq!(input.value(), "hélo");
        assert_eq!(input.cursor_position(), 2);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = typed("ab");
        input.cursor_right();
        assert_eq!(input.cursor_position(), 2);
        input.cursor_home();
        input.cursor_left();
        assert_eq!(input.cursor_position(), 0);
        input.backspace();
        assert_eq!(input.value(), "ab");
        input.cursor_end();
        input.delete();
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn test_char_limit() {
        let mut input = TextInput::new("").with_char_limit(3);
        for c in "abcdef".chars() {
            input.type_char(c);
        }
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn test_submit_rejects_blank() {
        let mut input = typed("   ");
        assert_eq!(input.submit(), None);
        assert_eq!(input.value(), "   ");

        let mut input = typed("  I attack.  ");
        assert_eq!(input.submit().as_deref(), Some("I attack."));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor_position(), 0);
    }

    #[test]
    fn test_masked_display() {
        let mut input = typed("sk-1").masked();
        assert_eq!(input.display(), "••••|");
        input.cursor_home();
        assert_eq!(input.display(), "|••••");
    }

    #[test]
    fn test_handle_key_ignores_navigation() {
        let mut input = TextInput::new("");
        assert!(input.handle_key(Key::Char('x')));
        assert!(!input.handle_key(Key::Enter));
        assert!(!input.handle_key(Key::Up));
        assert_eq!(input.value(), "x");
    }
}
