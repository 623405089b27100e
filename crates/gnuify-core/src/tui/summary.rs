//! End-of-run summary

use crate::install::InstallReport;
use crate::product::ProductConfig;
use crate::shell::ConfigOutcome;
use crate::verify::VerifyReport;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Outcome of editing one shell file
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub outcome: std::result::Result<ConfigOutcome, String>,
}

pub struct Summary<'a> {
    pub install: Option<&'a InstallReport>,
    pub files: &'a [FileResult],
    pub login_shell: Option<&'a Path>,
    pub verification: Option<&'a VerifyReport>,
}

impl Summary<'_> {
    fn updated_files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, Ok(ConfigOutcome::Appended)))
            .map(|f| f.path.clone())
            .collect()
    }

    /// Human-readable lines; the bool marks a problem
    fn lines(&self) -> Vec<(String, bool)> {
        let mut lines = Vec::new();

        if let Some(report) = self.install {
            lines.push((
                format!(
                    "Packages: {} installed, {} already present, {} failed",
                    report.installed().len(),
                    report.already_installed().len(),
                    report.failed().len()
                ),
                report.has_failures(),
            ));
            for (package, reason) in report.failed() {
                lines.push((format!("  {}: {}", package.name, reason), true));
            }
        }

        if !self.files.is_empty() {
            let updated = self.updated_files().len();
            let failed = self.files.iter().filter(|f| f.outcome.is_err()).count();
            let configured = self.files.len() - updated - failed;
            lines.push((
                format!(
                    "Shell files: {} updated, {} already configured, {} failed",
                    updated, configured, failed
                ),
                failed > 0,
            ));
        }

        if let Some(shell) = self.login_shell {
            lines.push((format!("Login shell: {}", shell.display()), false));
        }

        if let Some(report) = self.verification {
            lines.push((
                format!(
                    "Verification: {} GNU, {} not GNU, {} unavailable",
                    report.verified(),
                    report.mismatched(),
                    report.unavailable()
                ),
                !report.all_verified(),
            ));
        }

        lines
    }

    fn has_problems(&self) -> bool {
        self.lines().iter().any(|(_, problem)| *problem)
    }
}

pub fn print_summary<C: ProductConfig>(config: &C, summary: &Summary<'_>) -> Result<()> {
    for (line, problem) in summary.lines() {
        if problem {
            cliclack::log::warning(line)?;
        } else {
            cliclack::log::info(line)?;
        }
    }

    let steps = config.next_steps(&summary.updated_files());
    if !steps.is_empty() {
        println!();
        println!("  Next steps");
        println!();

        for (i, step) in steps.iter().enumerate() {
            println!("  {}.  {}", i + 1, step);
        }
        println!();
    }

    if summary.has_problems() {
        cliclack::outro("Finished with warnings, see above.")?;
    } else {
        cliclack::outro("All done!")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::{InstallOutcome, Package};
    use crate::shell::PathKind;
    use crate::verify::{VerifyCheck, VerifyResult, VerifyStatus};

    fn package(name: &str) -> Package {
        Package {
            name: name.to_string(),
            display_name: name.to_string(),
            path: PathKind::None,
            verify: None,
        }
    }

    #[test]
    fn test_clean_run_has_no_problems() {
        let install = InstallReport {
            results: vec![
                (package("grep"), InstallOutcome::Installed),
                (package("gawk"), InstallOutcome::AlreadyInstalled),
            ],
        };
        let files = vec![
            FileResult {
                path: PathBuf::from("/Users/me/.zshrc"),
                outcome: Ok(ConfigOutcome::Appended),
            },
            FileResult {
                path: PathBuf::from("/Users/me/.bashrc"),
                outcome: Ok(ConfigOutcome::AlreadyConfigured),
            },
        ];
        let summary = Summary {
            install: Some(&install),
            files: &files,
            login_shell: None,
            verification: None,
        };

        assert!(!summary.has_problems());
        assert_eq!(
            summary.updated_files(),
            vec![PathBuf::from("/Users/me/.zshrc")]
        );
        let lines = summary.lines();
        assert_eq!(
            lines[0].0,
            "Packages: 1 installed, 1 already present, 0 failed"
        );
        assert_eq!(
            lines[1].0,
            "Shell files: 1 updated, 1 already configured, 0 failed"
        );
    }

    #[test]
    fn test_failures_are_flagged() {
        let install = InstallReport {
            results: vec![(package("gnu-tar"), InstallOutcome::Failed("boom".to_string()))],
        };
        let verification = VerifyReport {
            results: vec![VerifyResult {
                check: VerifyCheck::new("tar", "GNU tar"),
                status: VerifyStatus::Mismatch("bsdtar 3.5.3".to_string()),
            }],
        };
        let summary = Summary {
            install: Some(&install),
            files: &[],
            login_shell: None,
            verification: Some(&verification),
        };

        assert!(summary.has_problems());
        let lines = summary.lines();
        assert!(lines.contains(&("  gnu-tar: boom".to_string(), true)));
        assert!(lines.contains(&(
            "Verification: 0 GNU, 1 not GNU, 0 unavailable".to_string(),
            true
        )));
    }
}
