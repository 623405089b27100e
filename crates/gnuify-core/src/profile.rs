//! Package and shell-file profile
//!
//! A profile is the data that drives a run: which formulae to install, which
//! startup files receive the PATH block, and which installed shell (if any)
//! may be registered as a login shell. The binary ships a default profile;
//! users can supply their own YAML file instead.
//!
//! ```yaml
//! login_shell: bash
//! shell_files:
//!   - ~/.zshrc
//! packages:
//!   - name: gnu-sed
//!     display_name: GNU sed
//!     path: gnubin
//!     verify:
//!       binary: sed
//!       expect: GNU sed
//! ```

use crate::error::{Result, SetupError};
use crate::install::Package;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Package whose `<prefix>/bin/<name>` binary may become the login shell
    #[serde(default)]
    pub login_shell: Option<String>,

    /// Startup files that receive the PATH block (`~/` expands to home)
    #[serde(default)]
    pub shell_files: Vec<String>,

    pub packages: Vec<Package>,
}

impl Profile {
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&source).map_err(|source| SetupError::Profile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Shell files with `~/` expanded against the current user's home
    pub fn resolved_shell_files(&self) -> Vec<PathBuf> {
        let home = dirs::home_dir();
        self.shell_files
            .iter()
            .map(|f| expand_home(f, home.as_deref()))
            .collect()
    }

    /// The login shell package, if the profile installs it
    pub fn login_shell_package(&self) -> Option<&Package> {
        let name = self.login_shell.as_deref()?;
        self.packages.iter().find(|p| p.name == name)
    }
}

fn expand_home(file: &str, home: Option<&Path>) -> PathBuf {
    match (file.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(file),
    }
}
