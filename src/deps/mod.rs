//! Discovery of the external walker (`fd`) and filter (`fzf`) executables.
//!
//! Bindings are re-derived on every query; nothing is cached between calls
//! because tools can be installed or removed while the host keeps running.

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Executable probed for the filter role
pub const FILTER_CANDIDATE: &str = "fzf";

/// Executables probed for the walker role, in order. Debian and Ubuntu ship
/// `fd` as `fdfind` to avoid a name clash.
pub const WALKER_CANDIDATES: [&str; 2] = ["fd", "fdfind"];

/// Logical role an external tool plays in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToolRole {
    Walker,
    Filter,
}

impl ToolRole {
    /// Name the user should install to satisfy this role
    pub fn package(self) -> &'static str {
        match self {
            ToolRole::Walker => "fd",
            ToolRole::Filter => "fzf",
        }
    }

    pub fn missing_message(self) -> String {
        let package = self.package();
        format!("Missing dependency {package}. Please install {package}.")
    }
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolRole::Walker => write!(f, "walker"),
            ToolRole::Filter => write!(f, "filter"),
        }
    }
}

/// Executable names that satisfied each role on this system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolBinding {
    pub walker: Option<String>,
    pub filter: Option<String>,
}

impl ToolBinding {
    /// Binding with both roles filled, for callers that already know the names
    pub fn new(walker: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            walker: Some(walker.into()),
            filter: Some(filter.into()),
        }
    }

    pub fn get(&self, role: ToolRole) -> Option<&str> {
        match role {
            ToolRole::Walker => self.walker.as_deref(),
            ToolRole::Filter => self.filter.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.walker.is_some() && self.filter.is_some()
    }
}

/// Looks up whether an executable name is runnable
pub trait ExecutableProbe {
    fn find(&self, name: &str) -> which::Result<PathBuf>;
}

/// Probe against the process `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPath;

impl ExecutableProbe for SystemPath {
    fn find(&self, name: &str) -> which::Result<PathBuf> {
        which::which(name)
    }
}

/// Probe against an explicit `PATH`-style search list
#[derive(Debug, Clone)]
pub struct SearchPath {
    paths: OsString,
    cwd: PathBuf,
}

impl SearchPath {
    pub fn new(paths: impl Into<OsString>) -> Self {
        Self {
            paths: paths.into(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
        }
    }
}

impl ExecutableProbe for SearchPath {
    fn find(&self, name: &str) -> which::Result<PathBuf> {
        which::which_in(name, Some(&self.paths), &self.cwd)
    }
}

/// Resolves tool roles to executable names
pub struct Locator<P = SystemPath> {
    probe: P,
}

impl Locator<SystemPath> {
    pub fn system() -> Self {
        Self { probe: SystemPath }
    }
}

impl Default for Locator<SystemPath> {
    fn default() -> Self {
        Self::system()
    }
}

impl<P: ExecutableProbe> Locator<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Find executables for both roles.
    ///
    /// Returns the binding plus one missing-dependency message per role that
    /// could not be satisfied (filter first, then walker).
    pub fn locate(&self) -> (ToolBinding, Vec<String>) {
        debug!("Checking and getting binaries for dependencies");

        let binding = ToolBinding {
            filter: self.first_available(&[FILTER_CANDIDATE]),
            walker: self.first_available(&WALKER_CANDIDATES),
        };

        let errors: Vec<String> = [ToolRole::Filter, ToolRole::Walker]
            .into_iter()
            .filter(|role| binding.get(*role).is_none())
            .map(ToolRole::missing_message)
            .collect();

        if errors.is_empty() {
            debug!(?binding, "Using binaries");
        }

        (binding, errors)
    }

    fn first_available(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|name| self.is_available(name))
            .map(|name| name.to_string())
    }

    fn is_available(&self, name: &str) -> bool {
        match self.probe.find(name) {
            Ok(path) => {
                debug!(name, path = %path.display(), "Found executable");
                true
            }
            // Lookup failures of any kind count as "not installed"
            Err(e) => {
                debug!(name, error = %e, "Executable not available");
                false
            }
        }
    }
}
