use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::model::ProfileField;
use crate::core::upload::UploadPhase;
use crate::tui::component::Component;
use crate::tui::components::{ListingList, StatusBar};
use crate::tui::{Focus, TuiState};
use crate::view::ProfileView;

pub const LISTINGS_ERROR_TEXT: &str = "Error showing listing";
pub const UPDATE_SUCCESS_TEXT: &str = "User Updated successfully";

const HELP_TEXT: &str = " Tab/Shift+Tab move  Enter activate  Esc quit ";

pub fn draw_profile(frame: &mut Frame, view: &ProfileView, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [
        status_area,
        avatar_area,
        path_area,
        upload_area,
        username_area,
        email_area,
        password_area,
        buttons_area,
        message_area,
        listings_area,
        help_area,
    ] = Layout::vertical([
        Length(1),
        Length(1),
        Length(3),
        Length(1),
        Length(3),
        Length(3),
        Length(3),
        Length(1),
        Length(1),
        Min(0),
        Length(1),
    ])
    .areas(frame.area());

    let session = view.session();
    let state = view.state();
    let username = session
        .current_user
        .as_ref()
        .map(|u| u.username.as_str())
        .unwrap_or("");

    StatusBar::new(username, tui.notice.clone(), session.loading).render(frame, status_area);

    // Staged avatar wins over the saved one until the next submit.
    let avatar = state.pending.avatar_url.as_deref().or(session
        .current_user
        .as_ref()
        .map(|u| u.avatar_url.as_str()));
    frame.render_widget(
        Line::from(vec![
            Span::styled("Avatar: ", Style::default().fg(Color::DarkGray)),
            Span::raw(avatar.unwrap_or("(none)").to_string()),
        ]),
        avatar_area,
    );

    tui.sync_focus();
    tui.avatar_path.render(frame, path_area);
    frame.render_widget(upload_line(&state.upload), upload_area);
    for (field, area) in ProfileField::ALL
        .into_iter()
        .zip([username_area, email_area, password_area])
    {
        tui.field_mut(field).render(frame, area);
    }

    frame.render_widget(
        buttons_line(tui.focus, session.loading, state.show_listings),
        buttons_area,
    );

    let message = if let Some(error) = &session.error {
        Line::styled(error.clone(), Style::default().fg(Color::Red))
    } else if state.update_success {
        Line::styled(UPDATE_SUCCESS_TEXT, Style::default().fg(Color::Green))
    } else {
        Line::default()
    };
    frame.render_widget(message, message_area);

    if state.show_listings || state.listings_error {
        ListingList {
            state: &mut tui.listings,
            listings: state.visible_listings(),
            error: state.listings_error.then_some(LISTINGS_ERROR_TEXT),
            focused: tui.focus == Focus::Listings,
        }
        .render(frame, listings_area);
    }

    frame.render_widget(
        Line::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)).centered(),
        help_area,
    );
}

fn upload_line(upload: &UploadPhase) -> Line<'static> {
    let color = match upload {
        UploadPhase::Failed { .. } => Color::Red,
        UploadPhase::Succeeded { .. } => Color::Green,
        UploadPhase::InProgress { percent: 100, .. } => Color::Green,
        _ => Color::Gray,
    };
    Line::styled(upload.status_text(), Style::default().fg(color))
}

fn buttons_line(focus: Focus, loading: bool, show_listings: bool) -> Line<'static> {
    let button = |label: &str, target: Focus, color: Color| {
        let mut style = Style::default().fg(color);
        if focus == target {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        Span::styled(format!("[ {label} ]"), style)
    };
    let update_label = if loading { "Loading..." } else { "Update" };
    let listings_label = if show_listings {
        "Hide listings"
    } else {
        "Show listings"
    };
    Line::from(vec![
        button(update_label, Focus::Update, Color::Cyan),
        Span::raw(" "),
        button("Delete account", Focus::DeleteAccount, Color::Red),
        Span::raw(" "),
        button("Sign out", Focus::SignOut, Color::Red),
        Span::raw(" "),
        button(listings_label, Focus::ToggleListings, Color::Green),
    ])
}

/// Area of the listings panel for a given frame (used by tests).
#[cfg(test)]
fn listings_area(frame_area: ratatui::layout::Rect) -> ratatui::layout::Rect {
    use Constraint::{Length, Min};
    use ratatui::layout::Rect;
    let areas: [Rect; 11] = Layout::vertical([
        Length(1),
        Length(1),
        Length(3),
        Length(1),
        Length(3),
        Length(3),
        Length(3),
        Length(1),
        Length(1),
        Min(0),
        Length(1),
    ])
    .areas(frame_area);
    areas[9]
}
