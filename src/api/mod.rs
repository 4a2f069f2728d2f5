pub mod backend;
pub mod client;
pub mod types;

pub use backend::{ApiError, ProfileBackend};
pub use client::HttpBackend;
