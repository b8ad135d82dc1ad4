//! Performing display item actions with the platform's file opener

use crate::output::Action;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Carry out an item action. `DoNothing` is a no-op.
pub fn perform(action: &Action) -> Result<()> {
    match action {
        Action::OpenPath { path } => open_path(path),
        Action::DoNothing => Ok(()),
    }
}

/// Open a path with the desktop's default handler
pub fn open_path(path: &Path) -> Result<()> {
    debug!(path = %path.display(), "Opening path");
    open_path_native(path)
}

fn ensure_success(status: ExitStatus, label: &str) -> Result<()> {
    if !status.success() {
        bail!("{label} failed with {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn open_path_native(path: &Path) -> Result<()> {
    let status = Command::new("open")
        .arg(path)
        .status()
        .context("failed to run open")?;
    ensure_success(status, "open")
}

#[cfg(target_os = "windows")]
fn open_path_native(path: &Path) -> Result<()> {
    let status = Command::new("cmd")
        .arg("/C")
        .arg("start")
        .arg("")
        .arg(path)
        .status()
        .context("failed to run start")?;
    ensure_success(status, "start")
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_path_native(path: &Path) -> Result<()> {
    let status = Command::new("xdg-open")
        .arg(path)
        .status()
        .context("failed to run xdg-open")?;
    ensure_success(status, "xdg-open")
}
