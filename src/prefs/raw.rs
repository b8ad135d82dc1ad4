//! Raw, unvalidated preference values as supplied by the host

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Preference keys understood by the resolver
pub mod keys {
    pub const SEARCH_TYPE: &str = "search_type";
    pub const ALLOW_HIDDEN: &str = "allow_hidden";
    pub const RESULT_LIMIT: &str = "result_limit";
    pub const BASE_DIR: &str = "base_dir";
    pub const IGNORE_FILE: &str = "ignore_file";

    /// All keys, in the order they are documented
    pub const ALL: [&str; 5] = [SEARCH_TYPE, ALLOW_HIDDEN, RESULT_LIMIT, BASE_DIR, IGNORE_FILE];
}

/// String-to-string preference map, read-only input to the resolver.
///
/// Serializes as a flat JSON object so hosts can pass their own
/// preference storage through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPreferences(BTreeMap<String, String>);

impl RawPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values the standalone host starts from when nothing is configured
    pub fn defaults() -> Self {
        Self::new()
            .with(keys::SEARCH_TYPE, "0")
            .with(keys::ALLOW_HIDDEN, "0")
            .with(keys::RESULT_LIMIT, "15")
            .with(keys::BASE_DIR, "~")
            .with(keys::IGNORE_FILE, "")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Overlay `overrides` on top of `self`, key by key
    pub fn merged(mut self, overrides: &RawPreferences) -> Self {
        for (key, value) in overrides.iter() {
            self.set(key, value);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawPreferences {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_key() {
        let defaults = RawPreferences::defaults();
        for key in keys::ALL {
            assert!(defaults.get(key).is_some(), "missing default for {key}");
        }
        assert_eq!(defaults.get(keys::RESULT_LIMIT), Some("15"));
    }

    #[test]
    fn test_merged_overrides_individual_keys() {
        let overrides = RawPreferences::new().with(keys::ALLOW_HIDDEN, "1");
        let merged = RawPreferences::defaults().merged(&overrides);

        assert_eq!(merged.get(keys::ALLOW_HIDDEN), Some("1"));
        assert_eq!(merged.get(keys::BASE_DIR), Some("~"));
        assert_eq!(merged.len(), 5);
    }

    #[test]
    fn test_json_is_flat_object() {
        let prefs = RawPreferences::new().with("result_limit", "7");
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(json, r#"{"result_limit":"7"}"#);

        let parsed: RawPreferences = serde_json::from_str(r#"{"base_dir": "/tmp"}"#).unwrap();
        assert_eq!(parsed.get("base_dir"), Some("/tmp"));
    }
}
