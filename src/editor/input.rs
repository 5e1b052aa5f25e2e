use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Back,
    Forward,
    Head,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    InsertChar(char),
    DeleteChar,
    DeleteCharBefore,
    DeleteLine,
    Move(CursorMove),
    None,
}

pub fn process_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::DeleteLine,
        KeyCode::Char(c) => {
            if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                InputAction::None
            } else {
                InputAction::InsertChar(c)
            }
        }
        KeyCode::Backspace => InputAction::DeleteCharBefore,
        KeyCode::Delete => InputAction::DeleteChar,
        KeyCode::Left => InputAction::Move(CursorMove::Back),
        KeyCode::Right => InputAction::Move(CursorMove::Forward),
        KeyCode::Home => InputAction::Move(CursorMove::Head),
        KeyCode::End => InputAction::Move(CursorMove::End),
        _ => InputAction::None,
    }
}

/// One line of text with a cursor, counted in chars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineInput {
    value: String,
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Display width of the text left of the cursor.
    pub fn cursor_offset(&self) -> usize {
        self.value[..self.byte_index(self.cursor)].width()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply a key. Returns true if the text changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let len = self.value.chars().count();
        match process_key(key) {
            InputAction::InsertChar(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            InputAction::DeleteCharBefore if self.cursor > 0 => {
                let at = self.byte_index(self.cursor - 1);
                self.value.remove(at);
                self.cursor -= 1;
                true
            }
            InputAction::DeleteChar if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            InputAction::DeleteLine if !self.value.is_empty() => {
                self.clear();
                true
            }
            InputAction::Move(movement) => {
                self.cursor = match movement {
                    CursorMove::Back => self.cursor.saturating_sub(1),
                    CursorMove::Forward => (self.cursor + 1).min(len),
                    CursorMove::Head => 0,
                    CursorMove::End => len,
                };
                false
            }
            _ => false,
        }
    }
}
