//! Charm-style CLI prompts using cliclack

use super::summary::{print_summary, FileResult, Summary};
use crate::brew::{Homebrew, PackageManager};
use crate::error::SetupError;
use crate::install::{self, InstallEvent, InstallOutcome, Provisioned};
use crate::platform::{self, Platform};
use crate::product::ProductConfig;
use crate::profile::Profile;
use crate::shell::config::{self as shell_config, ConfigOutcome};
use crate::shell::{login, path};
use crate::system::SystemRunner;
use crate::verify::{self, VerifyReport, VerifyStatus};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for an install run
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Profile file to use instead of the built-in one
    pub profile: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    /// Change the login shell without asking (only meaningful with `yes`)
    pub change_shell: bool,

    /// Skip the verification step
    pub skip_verify: bool,
}

/// Run the full setup with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: RunArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Environment check (fatal)
    let platform = check_platform()?;

    let profile = load_profile(config, args.profile.as_deref())?;

    // Step 2: Confirmation
    if !confirm_start(&profile, &args)? {
        cliclack::outro_cancel("Setup cancelled.")?;
        return Ok(());
    }

    // Step 3: Package manager bootstrap (fatal) and installs (best-effort)
    let brew = Homebrew::new(platform).non_interactive(args.yes);
    let provisioned = provision_packages(&brew, &profile, &args).await?;

    // Step 4: Optional login shell registration
    let login_shell = register_login_shell(&provisioned.prefix, &profile, &args)?;

    // Step 5: Shell startup files
    let files = update_shell_files(config, &profile, &provisioned.prefix)?;

    // Step 6: Verification
    let verification = if args.skip_verify {
        cliclack::log::info("Skipping verification")?;
        None
    } else {
        Some(run_verification(&profile, &provisioned.prefix)?)
    };

    // Step 7: Summary
    let summary = Summary {
        install: Some(&provisioned.report),
        files: &files,
        login_shell: login_shell.as_deref(),
        verification: verification.as_ref(),
    };
    print_summary(config, &summary)?;

    Ok(())
}

/// Check which variants are first on PATH without changing anything
pub async fn verify_only<C: ProductConfig>(config: &C, profile: Option<&Path>) -> Result<()> {
    cliclack::intro(format!("{} verify", config.display_name()))?;

    let platform = check_platform()?;
    let profile = load_profile(config, profile)?;

    let brew = Homebrew::new(platform);
    if !brew.is_available() {
        let err = SetupError::PackageManagerMissing(brew.display_name().to_string());
        cliclack::outro_cancel(err.to_string())?;
        return Err(err.into());
    }
    let prefix = brew.prefix()?;

    let report = run_verification(&profile, &prefix)?;
    let summary = Summary {
        install: None,
        files: &[],
        login_shell: None,
        verification: Some(&report),
    };
    print_summary(config, &summary)?;

    Ok(())
}

fn check_platform() -> Result<Platform> {
    let platform = Platform::current();

    if let Err(e) = platform::ensure_supported(&platform) {
        cliclack::outro_cancel(e.to_string())?;
        return Err(e.into());
    }

    let version = platform::os_version().unwrap_or_else(|| "unknown version".to_string());
    cliclack::log::success(format!("macOS {} ({})", version, platform.arch))?;

    Ok(platform)
}

fn load_profile<C: ProductConfig>(config: &C, path: Option<&Path>) -> Result<Profile> {
    let profile = match path {
        Some(path) => {
            cliclack::log::info(format!("Using profile {}", path.display()))?;
            Profile::load(path)?
        }
        None => config.default_profile()?,
    };
    Ok(profile)
}

fn confirm_start(profile: &Profile, args: &RunArgs) -> Result<bool> {
    let names: Vec<&str> = profile.packages.iter().map(|p| p.name.as_str()).collect();
    cliclack::log::info(format!(
        "Packages ({}): {}",
        names.len(),
        names.join(", ")
    ))?;

    let files: Vec<String> = profile
        .resolved_shell_files()
        .iter()
        .map(|f| f.display().to_string())
        .collect();
    cliclack::log::info(format!("Shell files: {}", files.join(", ")))?;

    if args.yes {
        return Ok(true);
    }

    let confirm: bool = cliclack::confirm("Install these packages and update your shell files?")
        .initial_value(true)
        .interact()?;

    Ok(confirm)
}

async fn provision_packages(
    brew: &Homebrew,
    profile: &Profile,
    args: &RunArgs,
) -> Result<Provisioned> {
    if brew.is_available() {
        cliclack::log::success(format!("{} is installed", brew.display_name()))?;
    } else {
        cliclack::log::warning(format!("{} is not installed", brew.display_name()))?;
        cliclack::log::info(format!("This will execute: {}", brew.bootstrap_command()))?;

        let confirm = if args.yes {
            true
        } else {
            cliclack::confirm(format!("Install {} now?", brew.display_name()))
                .initial_value(true)
                .interact()?
        };

        if !confirm {
            let err = SetupError::PackageManagerMissing(brew.display_name().to_string());
            cliclack::outro_cancel(format!("{} is required to continue.", brew.display_name()))?;
            return Err(err.into());
        }
    }

    let mut log = EventLog::new(log_install_event);
    let result = install::provision(brew, &profile.packages, |event| log.record(event)).await;

    match result {
        Ok(provisioned) => {
            log.finish()?;
            cliclack::log::info(format!(
                "{} prefix: {}",
                brew.display_name(),
                provisioned.prefix.display()
            ))?;
            Ok(provisioned)
        }
        Err(e) => {
            cliclack::log::error(e.to_string())?;
            cliclack::outro_cancel("Setup aborted.")?;
            Err(e.into())
        }
    }
}

/// Forwards install events to a writer, keeping the first write error.
///
/// Installs keep going after a failed write; the error surfaces once
/// provisioning is done.
struct EventLog<F> {
    write: F,
    first_error: Option<std::io::Error>,
}

impl<F> EventLog<F>
where
    F: FnMut(InstallEvent<'_>) -> std::io::Result<()>,
{
    fn new(write: F) -> Self {
        Self {
            write,
            first_error: None,
        }
    }

    fn record(&mut self, event: InstallEvent<'_>) {
        if let Err(e) = (self.write)(event) {
            self.first_error.get_or_insert(e);
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn log_install_event(event: InstallEvent<'_>) -> std::io::Result<()> {
    match event {
        InstallEvent::Bootstrapping(manager) => {
            cliclack::log::step(format!("Installing {}...", manager))
        }
        InstallEvent::Installing(package) => {
            cliclack::log::step(format!("Installing {}...", package.display_name))
        }
        InstallEvent::Finished(package, InstallOutcome::AlreadyInstalled) => {
            cliclack::log::info(format!("{} already installed", package.display_name))
        }
        InstallEvent::Finished(package, InstallOutcome::Installed) => {
            cliclack::log::success(format!("{} installed", package.display_name))
        }
        InstallEvent::Finished(package, InstallOutcome::Failed(reason)) => cliclack::log::error(
            format!("{} failed to install: {}", package.display_name, reason),
        ),
    }
}

/// Offer the profile's login shell; returns the shell when it became the default
fn register_login_shell(prefix: &Path, profile: &Profile, args: &RunArgs) -> Result<Option<PathBuf>> {
    let Some(package) = profile.login_shell_package() else {
        return Ok(None);
    };

    let shell = prefix.join("bin").join(&package.name);
    if !shell.is_file() {
        cliclack::log::warning(format!(
            "{} not found, leaving login shell unchanged",
            shell.display()
        ))?;
        return Ok(None);
    }

    if login::current_shell().as_deref() == Some(shell.as_path()) {
        cliclack::log::info(format!("Login shell is already {}", shell.display()))?;
        return Ok(None);
    }

    let change = if args.yes {
        args.change_shell
    } else {
        cliclack::log::info(format!(
            "Using {} as your login shell adds it to {} (requires sudo) and runs chsh.",
            shell.display(),
            login::SHELLS_FILE
        ))?;
        cliclack::confirm(format!("Make {} your login shell?", shell.display()))
            .initial_value(false)
            .interact()?
    };

    if !change {
        return Ok(None);
    }

    if let Err(e) = login::register(&shell, Path::new(login::SHELLS_FILE)) {
        cliclack::log::warning(format!("{:#}", e))?;
        return Ok(None);
    }

    match login::change_default(&shell) {
        Ok(_) => {
            cliclack::log::success(format!("Login shell set to {}", shell.display()))?;
            Ok(Some(shell))
        }
        Err(e) => {
            cliclack::log::warning(format!("{:#}", e))?;
            Ok(None)
        }
    }
}

fn update_shell_files<C: ProductConfig>(
    config: &C,
    profile: &Profile,
    prefix: &Path,
) -> Result<Vec<FileResult>> {
    let marker = config.block_marker();
    let block = path::render_block(
        marker,
        &path::path_entries(prefix, &profile.packages),
        &path::man_entries(prefix, &profile.packages),
    );

    let mut results = Vec::new();
    for (file, outcome) in shell_config::update_all(&profile.resolved_shell_files(), marker, &block) {
        match &outcome {
            Ok(ConfigOutcome::Appended) => {
                cliclack::log::success(format!("Updated {}", file.display()))?;
            }
            Ok(ConfigOutcome::AlreadyConfigured) => {
                cliclack::log::info(format!("{} already configured", file.display()))?;
            }
            Err(e) => {
                cliclack::log::error(format!("Could not update {}: {}", file.display(), e))?;
            }
        }
        results.push(FileResult {
            path: file,
            outcome: outcome.map_err(|e| e.to_string()),
        });
    }

    Ok(results)
}

fn run_verification(profile: &Profile, prefix: &Path) -> Result<VerifyReport> {
    let checks: Vec<_> = profile
        .packages
        .iter()
        .filter_map(|p| p.verify.clone())
        .collect();

    let entries = path::path_entries(prefix, &profile.packages);
    let runner = SystemRunner::with_path(path::search_path(
        &entries,
        std::env::var_os("PATH"),
    ));

    let spinner = cliclack::spinner();
    spinner.start("Verifying GNU tools...");
    let report = verify::verify_tools(&runner, &checks);
    spinner.stop(format!("Checked {} tools", report.results.len()));

    for result in &report.results {
        let binary = &result.check.binary;
        match &result.status {
            VerifyStatus::Verified(line) => {
                cliclack::log::success(format!("{}: {}", binary, line))?;
            }
            VerifyStatus::Mismatch(line) => {
                let seen = if line.is_empty() { "no output" } else { line.as_str() };
                cliclack::log::warning(format!(
                    "{}: expected \"{}\", got {}",
                    binary, result.check.expect, seen
                ))?;
            }
            VerifyStatus::Unavailable(reason) => {
                cliclack::log::error(format!("{}: {}", binary, reason))?;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::Package;
    use crate::shell::PathKind;
    use std::io;

    fn package(name: &str) -> Package {
        Package {
            name: name.to_string(),
            display_name: name.to_string(),
            path: PathKind::None,
            verify: None,
        }
    }

    #[test]
    fn test_event_log_keeps_first_write_error() {
        let sed = package("gnu-sed");
        let tar = package("gnu-tar");
        let failed = InstallOutcome::Failed("exit code: 1".to_string());
        let mut written = Vec::new();

        let mut log = EventLog::new(|event: InstallEvent<'_>| {
            if let InstallEvent::Finished(p, _) = event {
                written.push(p.name.clone());
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    format!("lost {}", p.name),
                ));
            }
            Ok(())
        });
        log.record(InstallEvent::Installing(&sed));
        log.record(InstallEvent::Finished(&sed, &failed));
        log.record(InstallEvent::Finished(&tar, &InstallOutcome::Installed));

        let err = log.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "lost gnu-sed");
        assert_eq!(written, vec!["gnu-sed", "gnu-tar"]);
    }

    #[test]
    fn test_event_log_without_errors_finishes_ok() {
        let grep = package("grep");
        let mut log = EventLog::new(|_: InstallEvent<'_>| Ok(()));
        log.record(InstallEvent::Finished(&grep, &InstallOutcome::AlreadyInstalled));
        assert!(log.finish().is_ok());
    }
}
