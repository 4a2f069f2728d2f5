//! # TUI Adapter
//!
//! The ratatui-specific layer. Renders the profile screen and turns
//! keyboard input into `ProfileView` operations.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Focus Ring
//!
//! Tab / Shift+Tab cycle through:
//!
//! ```text
//! avatar path → username → email → password → [Update] → [Delete account]
//!   → [Sign out] → [Show listings] → listings (only while shown) → ...
//! ```
//!
//! Enter on the avatar path reads the file on a tokio task and starts the
//! upload once the bytes arrive. Enter (or Space) on a button runs its
//! operation. Esc and Ctrl+C quit.
//!
//! ## Redraw Strategy
//!
//! Background results are drained once per loop iteration. The poll
//! timeout is short while a request or upload is in flight so progress
//! shows up promptly, and longer when idle.

mod component;
mod components;
mod event;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::core::model::{AvatarFile, ProfileField, UserSession};
use crate::core::persist;
use crate::storage;
use crate::tui::component::EventHandler;
use crate::tui::components::{FieldEvent, ListingEvent, ListingListState, TextField};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::view::ProfileView;

pub use ui::{LISTINGS_ERROR_TEXT, UPDATE_SUCCESS_TEXT};

const BUSY_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(250);

/// What has keyboard focus on the profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    AvatarPath,
    Field(ProfileField),
    Update,
    DeleteAccount,
    SignOut,
    ToggleListings,
    Listings,
}

impl Focus {
    fn ring(show_listings: bool) -> Vec<Focus> {
        let mut ring = vec![Focus::AvatarPath];
        ring.extend(ProfileField::ALL.map(Focus::Field));
        ring.extend([
            Focus::Update,
            Focus::DeleteAccount,
            Focus::SignOut,
            Focus::ToggleListings,
        ]);
        if show_listings {
            ring.push(Focus::Listings);
        }
        ring
    }

    fn step(self, show_listings: bool, forward: bool) -> Focus {
        let ring = Focus::ring(show_listings);
        // Focus on a stop that just left the ring restarts from the top.
        let Some(pos) = ring.iter().position(|f| *f == self) else {
            return ring[0];
        };
        let len = ring.len();
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        ring[next]
    }
}

/// Why the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// User pressed Esc / Ctrl+C.
    Quit,
    /// The session was cleared (account deleted or signed out).
    SessionEnded,
}

/// Result of reading a picked avatar file off disk.
type FileRead = (PathBuf, io::Result<AvatarFile>);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub avatar_path: TextField,
    pub fields: [TextField; 3],
    pub listings: ListingListState,
    /// One-line message for the status bar.
    pub notice: String,
}

impl TuiState {
    pub fn new(user: Option<&UserSession>) -> Self {
        let username = user.map(|u| u.username.clone()).unwrap_or_default();
        let email = user.map(|u| u.email.clone()).unwrap_or_default();
        Self {
            focus: Focus::AvatarPath,
            avatar_path: TextField::new("Avatar file (Enter to upload)", ""),
            fields: [
                TextField::new(ProfileField::Username.label(), username),
                TextField::new(ProfileField::Email.label(), email),
                TextField::new(ProfileField::Password.label(), "").masked(),
            ],
            listings: ListingListState::new(),
            notice: String::new(),
        }
    }

    pub fn field_mut(&mut self, field: ProfileField) -> &mut TextField {
        match field {
            ProfileField::Username => &mut self.fields[0],
            ProfileField::Email => &mut self.fields[1],
            ProfileField::Password => &mut self.fields[2],
        }
    }

    /// Push `focus` into the text fields' `focused` props.
    pub fn sync_focus(&mut self) {
        self.avatar_path.focused = self.focus == Focus::AvatarPath;
        for field in ProfileField::ALL {
            let focused = self.focus == Focus::Field(field);
            self.field_mut(field).focused = focused;
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Hide);
    }
}

/// Run the profile screen until the user quits or the session ends.
///
/// `session_cache` receives every published session snapshot.
pub fn run(view: &mut ProfileView, session_cache: Option<PathBuf>) -> io::Result<Exit> {
    let mut tui = TuiState::new(view.session().current_user.as_ref());
    let mut session_rx = view.store().subscribe();
    let (files_tx, mut files_rx) = mpsc::unbounded_channel::<FileRead>();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()?;
    let mut needs_redraw = true;

    let exit = loop {
        // Background results: request outcomes, upload progress, file reads.
        if view.drain_pending() > 0 {
            needs_redraw = true;
        }
        while let Ok((path, result)) = files_rx.try_recv() {
            needs_redraw = true;
            apply_file_read(view, &mut tui, path, result);
        }

        if session_rx.has_changed().unwrap_or(false) {
            let snapshot = session_rx.borrow_and_update().clone();
            debug!("Session changed: loading={} error={:?}", snapshot.loading, snapshot.error);
            if let Some(path) = &session_cache {
                persist::sync_snapshot(path, &snapshot);
            }
            if snapshot.current_user.is_none() {
                info!("Session cleared, leaving profile screen");
                break Exit::SessionEnded;
            }
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_profile(f, view, &mut tui))?;
            needs_redraw = false;
        }

        let busy = view.session().loading || view.state().upload.is_in_progress();
        let timeout = if busy { BUSY_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(view, &mut tui, &event, &files_tx) {
                quit = true;
                break;
            }
        }
        if quit {
            break Exit::Quit;
        }
    };

    ratatui::restore();
    Ok(exit)
}

/// Route one event to whatever has focus. Returns `true` to quit.
fn handle_event(
    view: &mut ProfileView,
    tui: &mut TuiState,
    event: &TuiEvent,
    files: &mpsc::UnboundedSender<FileRead>,
) -> bool {
    let show_listings = view.state().show_listings;
    match event {
        TuiEvent::ForceQuit | TuiEvent::Escape => return true,
        TuiEvent::Resize => {}
        TuiEvent::NextFocus => tui.focus = tui.focus.step(show_listings, true),
        TuiEvent::PrevFocus => tui.focus = tui.focus.step(show_listings, false),
        _ => match tui.focus {
            Focus::AvatarPath => {
                if tui.avatar_path.handle_event(event) == Some(FieldEvent::Submit) {
                    start_file_read(tui, files);
                }
            }
            Focus::Field(field) => match tui.field_mut(field).handle_event(event) {
                Some(FieldEvent::Changed(value)) => view.edit_field(field, value),
                Some(FieldEvent::Submit) => view.submit_profile(),
                None => {}
            },
            Focus::Listings => {
                if let Some(ListingEvent::Delete(id)) =
                    tui.listings.handle_event(event, view.state().visible_listings())
                {
                    view.delete_listing(id);
                }
            }
            button => {
                if matches!(event, TuiEvent::Submit | TuiEvent::InputChar(' ')) {
                    press(view, button);
                }
            }
        },
    }
    false
}

fn press(view: &mut ProfileView, button: Focus) {
    debug!("Pressed {:?}", button);
    match button {
        Focus::Update => view.submit_profile(),
        Focus::DeleteAccount => view.delete_account(),
        Focus::SignOut => view.sign_out(),
        Focus::ToggleListings => view.toggle_listings(),
        _ => {}
    }
}

fn start_file_read(tui: &mut TuiState, files: &mpsc::UnboundedSender<FileRead>) {
    let path = PathBuf::from(tui.avatar_path.value().trim());
    if path.as_os_str().is_empty() {
        tui.notice = "Enter a file path first".to_string();
        return;
    }
    tui.notice = format!("Reading {}", path.display());
    let files = files.clone();
    tokio::spawn(async move {
        let result = storage::read_avatar_file(&path).await;
        if files.send((path, result)).is_err() {
            warn!("Avatar file read finished after the screen closed");
        }
    });
}

fn apply_file_read(
    view: &mut ProfileView,
    tui: &mut TuiState,
    path: PathBuf,
    result: io::Result<AvatarFile>,
) {
    match result {
        Ok(file) => {
            info!("Read avatar {} ({} bytes)", path.display(), file.bytes.len());
            tui.notice.clear();
            view.select_avatar_file(file);
        }
        Err(e) => {
            warn!("Failed to read avatar {}: {}", path.display(), e);
            tui.notice = format!("Could not read {}: {}", path.display(), e);
        }
    }
}
