//! gnuify core - install GNU utilities on macOS and prefer them on PATH
//!
//! The setup is a linear pipeline of idempotent steps:
//!
//! 1. **Environment check** (`platform`) - only macOS is supported
//! 2. **Package manager** (`brew`) - bootstrap Homebrew when missing, resolve its prefix
//! 3. **Installer** (`install`) - install each formula, skipping present ones, best-effort
//! 4. **Shell registration** (`shell::login`) - optionally make the installed bash the login shell
//! 5. **Config files** (`shell::config`) - append the PATH block once, guarded by a marker
//! 6. **Verifier** (`verify`) - check that `--version` output names the GNU variant
//! 7. **Summary** (`tui`) - report what happened
//!
//! Only steps 1 and 2 are fatal; everything else reports and continues.
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive pipeline

pub mod brew;
pub mod error;
pub mod install;
pub mod platform;
pub mod product;
pub mod profile;
pub mod shell;
pub mod system;
pub mod verify;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use brew::{Homebrew, PackageManager};
pub use error::SetupError;
pub use install::{install_all, provision, InstallOutcome, InstallReport, Package};
pub use platform::Platform;
pub use product::ProductConfig;
pub use profile::Profile;
pub use verify::{verify_tools, VerifyCheck, VerifyReport, VerifyStatus};

#[cfg(feature = "tui")]
pub use tui::{run, verify_only};
