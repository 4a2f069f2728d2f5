//! # TextField Component
//!
//! Single-line bordered input used for the avatar path and the three
//! profile fields. Emits `FieldEvent::Changed` with the whole value after
//! every edit, and `FieldEvent::Submit` on Enter.
//!
//! The cursor is a byte offset kept on a char boundary. Its screen column
//! is the display width of the text before it, so wide characters place
//! the terminal cursor correctly.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const MASK: char = '•';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    Changed(String),
    Submit,
}

pub struct TextField {
    pub label: String,
    pub focused: bool,
    /// Render every character as a bullet.
    pub masked: bool,
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: label.into(),
            focused: false,
            masked: false,
            cursor: value.len(),
            value,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, moving the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    fn display_text(&self) -> String {
        if self.masked {
            self.value.chars().map(|_| MASK).collect()
        } else {
            self.value.clone()
        }
    }

    /// Screen column of the cursor relative to the text start.
    fn cursor_column(&self) -> u16 {
        let before = &self.value[..self.cursor];
        let width = if self.masked {
            before.chars().count()
        } else {
            before.width()
        };
        u16::try_from(width).unwrap_or(u16::MAX)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn insert_str(&mut self, text: &str) {
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn changed(&self) -> Option<FieldEvent> {
        Some(FieldEvent::Changed(self.value.clone()))
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<FieldEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                self.changed()
            }
            TuiEvent::Paste(text) => {
                // Single line: drop any newlines from the pasted text.
                let line: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                if line.is_empty() {
                    return None;
                }
                self.insert_str(&line);
                self.changed()
            }
            TuiEvent::Backspace => {
                let start = self.prev_boundary()?;
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
                self.changed()
            }
            TuiEvent::Delete => {
                let end = self.next_boundary()?;
                self.value.replace_range(self.cursor..end, "");
                self.changed()
            }
            TuiEvent::CursorLeft => {
                if let Some(i) = self.prev_boundary() {
                    self.cursor = i;
                }
                None
            }
            TuiEvent::CursorRight => {
                if let Some(i) = self.next_boundary() {
                    self.cursor = i;
                }
                None
            }
            TuiEvent::Home => {
                self.cursor = 0;
                None
            }
            TuiEvent::End => {
                self.cursor = self.value.len();
                None
            }
            TuiEvent::Submit => Some(FieldEvent::Submit),
            _ => None,
        }
    }
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(border);

        // Keep the cursor visible on narrow terminals by scrolling horizontally.
        let inner_width = area.width.saturating_sub(2);
        let column = self.cursor_column();
        let scroll = column.saturating_sub(inner_width.saturating_sub(1));

        let paragraph = Paragraph::new(self.display_text())
            .block(block)
            .scroll((0, scroll));
        frame.render_widget(paragraph, area);

        if self.focused && inner_width > 0 {
            frame.set_cursor_position(Position::new(
                area.x + 1 + column - scroll,
                area.y + 1,
            ));
        }
    }
}
