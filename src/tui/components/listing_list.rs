//! # Listing List Component
//!
//! The user's listings under the profile form, shown after "Show listings".
//! Up/Down move the selection; `d` twice deletes the selected listing.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ListingListState` lives in `TuiState`
//! - `ListingList` is created each frame with borrowed state and the
//!   listings owned by `ProfileState`

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::model::ListingSummary;
use crate::tui::event::TuiEvent;

/// Events emitted by the listing list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEvent {
    Delete(String),
}

/// Persistent selection state for the listing list.
#[derive(Default)]
pub struct ListingListState {
    pub selected: usize,
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl ListingListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selection inside `len` items (listings shrink on delete).
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        listings: &[ListingSummary],
    ) -> Option<ListingEvent> {
        if !matches!(event, TuiEvent::InputChar('d')) {
            self.confirm_delete = false;
        }
        if listings.is_empty() {
            return None;
        }

        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(listings.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::InputChar('d') => {
                if self.confirm_delete {
                    self.confirm_delete = false;
                    listings
                        .get(self.selected)
                        .map(|l| ListingEvent::Delete(l.id.clone()))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the listing list.
pub struct ListingList<'a> {
    pub state: &'a mut ListingListState,
    pub listings: &'a [ListingSummary],
    pub error: Option<&'a str>,
    pub focused: bool,
}

impl ListingList<'_> {
    /// Bottom border text: the listing count, or the pending delete.
    fn footer(&self) -> Line<'static> {
        let pending = self
            .listings
            .get(self.state.selected)
            .filter(|_| self.state.confirm_delete);
        match pending {
            Some(listing) => Line::styled(
                format!(" Remove \"{}\"? d confirms ", truncate_str(&listing.name, 24)),
                Style::default().fg(Color::Red),
            ),
            None if self.focused && !self.listings.is_empty() => {
                Line::from(format!(" {} listed | d removes ", self.listings.len()))
            }
            None => Line::from(format!(" {} listed ", self.listings.len())),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let footer = self.footer();
        let border = if self.focused { Color::Cyan } else { Color::DarkGray };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Your Listings ")
            .title_alignment(Alignment::Left)
            .title_bottom(footer.centered())
            .padding(Padding::horizontal(1));

        if let Some(error) = self.error {
            let paragraph = Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        if self.listings.is_empty() {
            let empty = Paragraph::new("No listings.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        self.state.clamp(self.listings.len());
        let inner_width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = self
            .listings
            .iter()
            .enumerate()
            .map(|(i, listing)| {
                let style = if self.focused && i == self.state.selected {
                    let fg = if self.state.confirm_delete {
                        Color::Red
                    } else {
                        Color::White
                    };
                    Style::default()
                        .fg(fg)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let image = listing.cover_image().unwrap_or("(no image)");
                let name_width = inner_width.saturating_sub(image.width() + 2).max(8);
                let name = truncate_str(&listing.name, name_width);

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<name_width$}", name), style),
                    Span::styled("  ", style),
                    Span::styled(image.to_string(), style.add_modifier(Modifier::DIM)),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Truncate to `max_width` display columns, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width - 3 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str("...");
    out
}
