//! # Core Application Logic
//!
//! This module contains Homestead's business logic for the profile page.
//! It knows nothing about any specific UI technology or HTTP client.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ProfileState         │
//!                    │  • SessionStore         │
//!                    │  • Action / Effect      │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    API     │      │  Storage   │
//!     │  Adapter   │      │  (reqwest) │      │ (uploads)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: domain types (`UserSession`, `PendingEdit`, `ListingSummary`, ...)
//! - [`store`]: the shared session store and its pure reducer
//! - [`state`]: `ProfileState`, everything the profile page owns locally
//! - [`action`]: the `Action` enum and `update()`
//! - [`upload`]: avatar upload state machine
//! - [`config`]: settings resolution
//! - [`persist`]: on-disk session cache

pub mod action;
pub mod config;
pub mod model;
pub mod persist;
pub mod state;
pub mod store;
pub mod upload;
