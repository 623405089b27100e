//! Login shell registration

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// System list of permitted login shells
pub const SHELLS_FILE: &str = "/etc/shells";

/// Whether `shell` is listed in the contents of a shells file
pub fn is_registered(shells_contents: &str, shell: &Path) -> bool {
    shells_contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .any(|l| Path::new(l) == shell)
}

/// The user's current login shell, from `$SHELL`
pub fn current_shell() -> Option<PathBuf> {
    std::env::var_os("SHELL")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Append `shell` to `shells_file` with elevated privileges.
///
/// Returns `false` when it was already registered.
pub fn register(shell: &Path, shells_file: &Path) -> Result<bool> {
    let contents = std::fs::read_to_string(shells_file)
        .with_context(|| format!("Failed to read {}", shells_file.display()))?;
    if is_registered(&contents, shell) {
        return Ok(false);
    }

    tracing::debug!(shell = %shell.display(), file = %shells_file.display(), "registering login shell");

    let mut child = Command::new("sudo")
        .arg("tee")
        .arg("-a")
        .arg(shells_file)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .context("Failed to run sudo")?;

    if let Some(mut stdin) = child.stdin.take() {
        let mut line = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&format!("{}\n", shell.display()));
        stdin
            .write_all(line.as_bytes())
            .context("Failed to write to sudo tee")?;
    }

    let status = child.wait().context("Failed to wait for sudo")?;
    if !status.success() {
        anyhow::bail!(
            "Could not add {} to {} (exit code {})",
            shell.display(),
            shells_file.display(),
            status.code().unwrap_or(-1)
        );
    }

    Ok(true)
}

/// Make `shell` the user's default login shell.
///
/// Returns `false` when it already is.
pub fn change_default(shell: &Path) -> Result<bool> {
    if current_shell().as_deref() == Some(shell) {
        return Ok(false);
    }

    tracing::debug!(shell = %shell.display(), "changing default shell");

    let status = Command::new("chsh")
        .arg("-s")
        .arg(shell)
        .status()
        .context("Failed to run chsh")?;

    if !status.success() {
        anyhow::bail!(
            "chsh -s {} failed with exit code {}",
            shell.display(),
            status.code().unwrap_or(-1)
        );
    }

    Ok(true)
}
