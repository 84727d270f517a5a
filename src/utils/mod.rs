//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Configuration file and application data directory
//! - [`progress`] - Progress spinner, no-op without the `progress` feature

pub mod app_data;
pub mod progress;

pub use app_data::*;
