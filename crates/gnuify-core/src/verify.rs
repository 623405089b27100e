//! Confirm the GNU variants are first on the search path
//!
//! Each check runs a binary with a version flag and looks for a
//! vendor-identifying substring in its combined output. BSD tools either
//! reject `--version` or print something without "GNU", so a missing
//! substring means the platform variant still wins the PATH lookup.

use crate::system::CommandRunner;
use serde::{Deserialize, Serialize};

fn default_args() -> Vec<String> {
    vec!["--version".to_string()]
}

/// One binary to probe and the substring its output must contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyCheck {
    pub binary: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    pub expect: String,
}

impl VerifyCheck {
    pub fn new(binary: impl Into<String>, expect: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: default_args(),
            expect: expect.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    /// Expected substring found; holds the first output line
    Verified(String),
    /// Ran, but the output lacks the expected substring
    Mismatch(String),
    /// Could not be run at all
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub check: VerifyCheck,
    pub status: VerifyStatus,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub results: Vec<VerifyResult>,
}

impl VerifyReport {
    pub fn all_verified(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r.status, VerifyStatus::Verified(_)))
    }

    pub fn verified(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Verified(_)))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Mismatch(_)))
    }

    pub fn unavailable(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Unavailable(_)))
    }

    fn count(&self, pred: impl Fn(&VerifyStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Probe a single binary
pub fn verify_tool<R: CommandRunner>(runner: &R, check: &VerifyCheck) -> VerifyStatus {
    let args: Vec<&str> = check.args.iter().map(String::as_str).collect();

    match runner.run(&check.binary, &args) {
        Ok(output) => {
            let first = output.first_line().unwrap_or_default();
            if output.combined().contains(&check.expect) {
                VerifyStatus::Verified(first)
            } else {
                VerifyStatus::Mismatch(first)
            }
        }
        Err(e) => VerifyStatus::Unavailable(e.to_string()),
    }
}

/// Probe every binary; never stops at the first failure
pub fn verify_tools<R: CommandRunner>(runner: &R, checks: &[VerifyCheck]) -> VerifyReport {
    let results = checks
        .iter()
        .map(|check| {
            let status = verify_tool(runner, check);
            tracing::debug!(binary = %check.binary, ?status, "verified");
            VerifyResult {
                check: check.clone(),
                status,
            }
        })
        .collect();

    VerifyReport { results }
}
