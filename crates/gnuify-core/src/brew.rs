//! Package manager backend
//!
//! `PackageManager` is the seam between the installer and the real package
//! manager CLI; `Homebrew` is the only production implementation.

use crate::error::{Result, SetupError};
use crate::platform::Platform;
use crate::system::{CommandOutput, CommandRunner, SystemRunner};
use anyhow::Context;
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Official Homebrew install script
pub const INSTALL_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Timeout for a single `brew install` (15 minutes, source builds are slow)
const INSTALL_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Operations the installer needs from a package manager
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// Display name for user-facing messages
    fn display_name(&self) -> &str;

    /// Whether the package manager itself is installed
    fn is_available(&self) -> bool;

    /// Install the package manager
    async fn bootstrap(&self) -> Result<()>;

    /// Install prefix (e.g. `/opt/homebrew`)
    fn prefix(&self) -> Result<PathBuf>;

    /// Whether `package` is already installed
    fn is_installed(&self, package: &str) -> bool;

    /// Install `package`
    async fn install(&self, package: &str) -> anyhow::Result<()>;
}

/// Homebrew driven through the `brew` CLI
#[derive(Debug, Clone)]
pub struct Homebrew {
    platform: Platform,
    non_interactive: bool,
    runner: SystemRunner,
}

impl Homebrew {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            non_interactive: false,
            runner: SystemRunner::default(),
        }
    }

    /// Run the bootstrap script without prompting (`NONINTERACTIVE=1`)
    pub fn non_interactive(mut self, enabled: bool) -> Self {
        self.non_interactive = enabled;
        self
    }

    /// Command string shown before bootstrapping
    pub fn bootstrap_command(&self) -> String {
        format!("/bin/bash -c \"$(curl -fsSL {})\"", INSTALL_SCRIPT_URL)
    }

    /// Path to `brew`, either on PATH or at the default prefix.
    ///
    /// A fresh bootstrap is not on PATH until the shell is restarted, so the
    /// default prefix is always checked too.
    pub fn binary(&self) -> Option<PathBuf> {
        which::which("brew").ok().or_else(|| {
            let candidate = self.platform.default_prefix().join("bin").join("brew");
            candidate.is_file().then_some(candidate)
        })
    }

    fn brew(&self) -> anyhow::Result<PathBuf> {
        self.binary()
            .ok_or_else(|| anyhow::anyhow!("brew not found on PATH"))
    }

    /// Run a short, non-interactive `brew` query
    fn query(&self, args: &[&str]) -> Option<CommandOutput> {
        let brew = self.binary()?;
        self.runner.run(&brew.to_string_lossy(), args).ok()
    }
}

/// Pick the install prefix from the available sources, in priority order:
/// a non-empty `HOMEBREW_PREFIX`, then `brew --prefix` output, then the
/// platform default when that directory exists.
pub fn resolve_prefix(
    env_prefix: Option<OsString>,
    brew_prefix: Option<&str>,
    default_prefix: &Path,
    default_exists: bool,
) -> Option<PathBuf> {
    if let Some(prefix) = env_prefix.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(prefix));
    }

    if let Some(prefix) = brew_prefix.map(str::trim).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(prefix));
    }

    default_exists.then(|| default_prefix.to_path_buf())
}

impl PackageManager for Homebrew {
    fn display_name(&self) -> &str {
        "Homebrew"
    }

    fn is_available(&self) -> bool {
        self.binary().is_some()
    }

    async fn bootstrap(&self) -> Result<()> {
        let cmd = self.bootstrap_command();
        println!();
        println!("{} {}", "Running:".dimmed(), cmd.yellow());
        println!();

        tracing::debug!(
            program = "/bin/sh",
            command = %cmd,
            non_interactive = self.non_interactive,
            "running command"
        );

        // Inherit stdio so sudo and the script's own prompts reach the user
        let mut command = TokioCommand::new("/bin/sh");
        command
            .arg("-c")
            .arg(&cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if self.non_interactive {
            command.env("NONINTERACTIVE", "1");
        }

        let status = command.status().await.map_err(|e| SetupError::Bootstrap {
            manager: self.display_name().to_string(),
            reason: e.to_string(),
        })?;
        println!();

        if !status.success() {
            return Err(SetupError::Bootstrap {
                manager: self.display_name().to_string(),
                reason: format!(
                    "install script exited with code {}",
                    status.code().unwrap_or(-1)
                ),
            });
        }

        if !self.is_available() {
            return Err(SetupError::Bootstrap {
                manager: self.display_name().to_string(),
                reason: "brew was not found after running the install script".to_string(),
            });
        }

        Ok(())
    }

    fn prefix(&self) -> Result<PathBuf> {
        let env_prefix = std::env::var_os("HOMEBREW_PREFIX");
        // Only ask brew when the environment doesn't already say
        let brew_prefix = if env_prefix.as_ref().is_some_and(|p| !p.is_empty()) {
            None
        } else {
            self.query(&["--prefix"])
                .filter(|out| out.success)
                .map(|out| out.stdout)
        };
        let fallback = self.platform.default_prefix();
        let fallback_exists = fallback.is_dir();

        resolve_prefix(env_prefix, brew_prefix.as_deref(), &fallback, fallback_exists).ok_or_else(
            || SetupError::Prefix {
                manager: self.display_name().to_string(),
            },
        )
    }

    fn is_installed(&self, package: &str) -> bool {
        self.query(&["list", "--versions", package])
            .is_some_and(|out| out.success && !out.stdout.trim().is_empty())
    }

    /// Shows the command being executed and streams its output
    async fn install(&self, package: &str) -> anyhow::Result<()> {
        let brew = self.brew()?;
        let cmd = format!("brew install {}", package);
        println!();
        println!("{} {}", "Running:".dimmed(), cmd.yellow());
        println!();

        tracing::debug!(program = %brew.display(), args = ?["install", package], "running command");
        let mut child = TokioCommand::new(&brew)
            .arg("install")
            .arg(package)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run {}", cmd))?;

        let stdout = child.stdout.take().context("Failed to capture stdout")?;
        let stderr = child.stderr.take().context("Failed to capture stderr")?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let output_task = async {
            let mut stdout_done = false;
            let mut stderr_done = false;
            while !(stdout_done && stderr_done) {
                tokio::select! {
                    line = stdout_reader.next_line(), if !stdout_done => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line),
                            Ok(None) => stdout_done = true,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                stdout_done = true;
                            }
                        }
                    }
                    line = stderr_reader.next_line(), if !stderr_done => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => stderr_done = true,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                                stderr_done = true;
                            }
                        }
                    }
                }
            }
        };

        if timeout(INSTALL_TIMEOUT, output_task).await.is_err() {
            let _ = child.kill().await;
            println!();
            anyhow::bail!(
                "{} timed out after {} minutes",
                cmd,
                INSTALL_TIMEOUT.as_secs() / 60
            );
        }

        match timeout(Duration::from_secs(30), child.wait()).await {
            Ok(Ok(status)) => {
                println!();
                if status.success() {
                    Ok(())
                } else {
                    anyhow::bail!(
                        "{} failed with exit code: {}",
                        cmd,
                        status.code().unwrap_or(-1)
                    );
                }
            }
            Ok(Err(e)) => {
                anyhow::bail!("Failed to wait for brew: {}", e);
            }
            Err(_) => {
                let _ = child.kill().await;
                anyhow::bail!("{} hung after closing its output", cmd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_command_uses_official_script() {
        let brew = Homebrew::new(Platform::current());
        assert_eq!(
            brew.bootstrap_command(),
            "/bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\""
        );
    }

    #[test]
    fn test_prefix_env_wins() {
        let prefix = resolve_prefix(
            Some(OsString::from("/custom/brew")),
            Some("/opt/homebrew\n"),
            Path::new("/opt/homebrew"),
            true,
        );
        assert_eq!(prefix, Some(PathBuf::from("/custom/brew")));
    }

    #[test]
    fn test_prefix_empty_env_falls_through_to_brew() {
        let prefix = resolve_prefix(
            Some(OsString::new()),
            Some("/usr/local\n"),
            Path::new("/opt/homebrew"),
            true,
        );
        assert_eq!(prefix, Some(PathBuf::from("/usr/local")));
    }

    #[test]
    fn test_prefix_falls_back_to_existing_default() {
        let prefix = resolve_prefix(None, Some("  \n"), Path::new("/opt/homebrew"), true);
        assert_eq!(prefix, Some(PathBuf::from("/opt/homebrew")));
    }

    #[test]
    fn test_prefix_unresolved_when_default_missing() {
        assert_eq!(
            resolve_prefix(None, None, Path::new("/opt/homebrew"), false),
            None
        );
    }
}
