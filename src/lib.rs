//! Homestead library exports for the binary and integration tests

pub mod api;
pub mod core;
pub mod storage;
pub mod tui;
pub mod view;

#[cfg(test)]
pub mod test_support;
