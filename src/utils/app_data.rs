use crate::prefs::{RawPreferences, keys};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fuzzfind";
const PREFERENCES_FILE: &str = "preferences.json";

/// Environment variable overriding the preferences file location
pub const CONFIG_ENV: &str = "FUZZFIND_CONFIG";

/// Raw preferences persisted for the standalone host.
///
/// Values are stored exactly as typed; they are validated per query by
/// the resolver, never on load.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store at `$FUZZFIND_CONFIG`, or `preferences.json` in the app data dir
    pub fn open_default() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(Self::at(path));
        }
        Ok(Self::at(get_app_data_dir()?.join(PREFERENCES_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored preferences over the defaults; a missing file is all defaults
    pub fn load(&self) -> Result<RawPreferences> {
        let defaults = RawPreferences::defaults();
        if !self.path.exists() {
            return Ok(defaults);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences file {}", self.path.display()))?;
        let stored: RawPreferences = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences file {}", self.path.display()))?;

        Ok(defaults.merged(&stored))
    }

    pub fn save(&self, prefs: &RawPreferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }
        let content = serde_json::to_string_pretty(prefs)
            .context("Failed to serialize preferences")?;
        fs::write(&self.path, content).context("Failed to write preferences file")?;
        Ok(())
    }

    /// Update one key and persist. Unknown keys are rejected.
    pub fn set(&self, key: &str, value: &str) -> Result<RawPreferences> {
        if !keys::ALL.iter().any(|known| *known == key) {
            bail!(
                "Unknown preference '{}'. Known preferences: {}",
                key,
                keys::ALL.join(", ")
            );
        }

        let mut prefs = self.load()?;
        prefs.set(key, value);
        self.save(&prefs)?;
        Ok(prefs)
    }

    /// Drop the stored file so every key falls back to its default
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to remove preferences file")?;
        }
        Ok(())
    }
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}
