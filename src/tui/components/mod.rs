//! # TUI Components
//!
//! ### Stateless (props only)
//! - `StatusBar`: top line with the signed-in user and a notice
//!
//! ### Stateful (event-driven)
//! - `TextField`: single-line input for the avatar path and profile fields
//! - `ListingList`: selectable list of the user's listings with two-step delete
//!
//! Each file holds the component's state, events, rendering and tests.

pub mod listing_list;
pub mod status_bar;
pub mod text_field;

pub use listing_list::{ListingEvent, ListingList, ListingListState};
pub use status_bar::StatusBar;
pub use text_field::{FieldEvent, TextField};
