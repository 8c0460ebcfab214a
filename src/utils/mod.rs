//! Shared utilities.
//!
//! - [`encoding`] - little-endian fields, 5-byte collaborator integers, [`Persist`]
//! - [`progress`] - spinners and bars, no-op without the `progress` feature

pub mod encoding;
pub mod progress;

pub use encoding::*;
