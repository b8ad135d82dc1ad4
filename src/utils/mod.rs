//! Utility functions shared across the crate.
//!
//! ## Modules
//!
//! - [`app_data`] - Preference file storage in the app data directory
//! - [`paths`] - Home-shorthand expansion and containing-directory lookup
//! - [`open`] - Performing display item actions with the platform opener

pub mod app_data;
pub mod open;
pub mod paths;

pub use app_data::*;
pub use paths::*;
