//! # StatusBar Component
//!
//! Top line of the profile screen: who is signed in and what is going on.
//!
//! 1. **Loading**: `"Homestead | alice | Working..."`
//! 2. **Notice**: `"Homestead | alice | Could not read /tmp/x.png"`
//! 3. **Default**: `"Homestead | alice"`
//!
//! Stateless: every field is a prop set by the parent before `render`.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct StatusBar {
    pub username: String,
    pub notice: String,
    pub loading: bool,
}

impl StatusBar {
    pub fn new(username: impl Into<String>, notice: impl Into<String>, loading: bool) -> Self {
        Self {
            username: username.into(),
            notice: notice.into(),
            loading,
        }
    }

    fn text(&self) -> String {
        if self.loading {
            format!("Homestead | {} | Working...", self.username)
        } else if self.notice.is_empty() {
            format!("Homestead | {}", self.username)
        } else {
            format!("Homestead | {} | {}", self.username, self.notice)
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Line::from(Span::styled(self.text(), style)), area);
    }
}
