//! Preference resolution: raw host strings in, typed search configuration out.
//!
//! Every check runs on every call; a failing check never hides another one.
//! The host receives the full list of violated constraints at once.

mod raw;

pub use raw::{RawPreferences, keys};

use crate::utils::paths::resolve_user_path;
use serde::Serialize;
use std::num::{IntErrorKind, NonZeroUsize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// What kind of filesystem entries the walker should emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchMode {
    Both,
    FilesOnly,
    DirsOnly,
}

impl SearchMode {
    /// Decode the ordinal the host stores (`"0"`, `"1"`, `"2"`)
    pub fn from_ordinal(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" => Some(SearchMode::Both),
            "1" => Some(SearchMode::FilesOnly),
            "2" => Some(SearchMode::DirsOnly),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            SearchMode::Both => 0,
            SearchMode::FilesOnly => 1,
            SearchMode::DirsOnly => 2,
        }
    }
}

/// Validated configuration for a single query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub mode: SearchMode,
    pub allow_hidden: bool,
    pub result_limit: NonZeroUsize,
    /// Absolute path of an existing directory
    pub base_dir: PathBuf,
    /// Absolute path of an existing file, if one was configured
    pub ignore_file: Option<PathBuf>,
}

/// Every constraint the raw preferences violated, in check order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join(" "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}

/// Validate and convert raw preferences.
pub fn resolve(raw: &RawPreferences) -> Result<ResolvedConfig, ValidationErrors> {
    debug!("Checking user preferences are valid");
    let mut errors = Vec::new();

    let base_dir = check(&mut errors, resolve_base_dir(raw));
    let ignore_file = check(&mut errors, resolve_ignore_file(raw));
    let result_limit = check(&mut errors, resolve_result_limit(raw));
    let mode = check(&mut errors, resolve_mode(raw));
    let allow_hidden = check(&mut errors, resolve_allow_hidden(raw));

    match (base_dir, ignore_file, result_limit, mode, allow_hidden) {
        (Some(base_dir), Some(ignore_file), Some(result_limit), Some(mode), Some(allow_hidden))
            if errors.is_empty() =>
        {
            let config = ResolvedConfig {
                mode,
                allow_hidden,
                result_limit,
                base_dir,
                ignore_file,
            };
            debug!(?config, "User preferences validated");
            Ok(config)
        }
        _ => Err(ValidationErrors(errors)),
    }
}

/// Only the error messages of [`resolve`]; empty when the preferences are valid
pub fn validate(raw: &RawPreferences) -> Vec<String> {
    match resolve(raw) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.into_messages(),
    }
}

fn check<T>(errors: &mut Vec<String>, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(message);
            None
        }
    }
}

fn required<'a>(raw: &'a RawPreferences, key: &str) -> Result<&'a str, String> {
    raw.get(key)
        .ok_or_else(|| format!("Preference '{key}' is not set."))
}

fn resolve_base_dir(raw: &RawPreferences) -> Result<PathBuf, String> {
    let value = required(raw, keys::BASE_DIR)?;
    let path = resolve_user_path(value);
    if !path.is_dir() {
        return Err(format!("Base directory '{value}' is not a directory."));
    }
    Ok(path)
}

fn resolve_ignore_file(raw: &RawPreferences) -> Result<Option<PathBuf>, String> {
    let value = required(raw, keys::IGNORE_FILE)?;
    if value.is_empty() {
        return Ok(None);
    }

    let path = resolve_user_path(value);
    if !path.is_file() {
        return Err(format!("Ignore file '{value}' is not a file."));
    }
    Ok(Some(path))
}

fn resolve_result_limit(raw: &RawPreferences) -> Result<NonZeroUsize, String> {
    const NOT_POSITIVE: &str = "Result limit must be greater than 0.";
    const NOT_INTEGER: &str = "Result limit must be an integer.";

    let value = required(raw, keys::RESULT_LIMIT)?;
    let limit = match value.trim().parse::<i64>() {
        Ok(n) if n <= 0 => return Err(NOT_POSITIVE.to_string()),
        Ok(n) => usize::try_from(n).unwrap_or(usize::MAX),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => usize::MAX,
            IntErrorKind::NegOverflow => return Err(NOT_POSITIVE.to_string()),
            _ => return Err(NOT_INTEGER.to_string()),
        },
    };

    NonZeroUsize::new(limit).ok_or_else(|| NOT_POSITIVE.to_string())
}

fn resolve_mode(raw: &RawPreferences) -> Result<SearchMode, String> {
    let value = required(raw, keys::SEARCH_TYPE)?;
    SearchMode::from_ordinal(value)
        .ok_or_else(|| format!("Search type '{value}' must be one of 0, 1 or 2."))
}

fn resolve_allow_hidden(raw: &RawPreferences) -> Result<bool, String> {
    let value = required(raw, keys::ALLOW_HIDDEN)?;
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(format!("Allow hidden '{value}' must be 0 or 1.")),
    }
}
