//! # fuzzfind - fd + fzf file finder
//!
//! fuzzfind answers launcher-style queries by streaming a filesystem walk
//! (`fd`) straight into a fuzzy filter (`fzf --filter`) and turning the
//! ranked paths into display items for a host shell.
//!
//! ## Architecture
//!
//! Each query runs through these modules, in order:
//!
//! - [`deps`] - Locate the `fd` (or `fdfind`) and `fzf` executables
//! - [`prefs`] - Validate raw host preferences into a typed configuration
//! - [`search`] - Build the walker command and run the two-process pipeline
//! - [`output`] - Map the pipeline outcome to display items
//! - [`handler`] - Ties the above together, one call per query
//!
//! Hosts built on top of the handler:
//!
//! - [`server`] - Newline-delimited JSON protocol over stdin/stdout
//! - `tui` - Interactive search-as-you-type terminal UI (feature `interactive`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use fuzzfind::handler::QueryHandler;
//! use fuzzfind::prefs::RawPreferences;
//!
//! let handler = QueryHandler::new();
//! let items = handler.handle("invoice pdf", &RawPreferences::defaults());
//!
//! for item in items {
//!     println!("{}", item.name);
//! }
//! ```

pub mod deps;
pub mod handler;
pub mod logging;
pub mod output;
pub mod prefs;
pub mod search;
pub mod server;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
