//! Fatal errors that halt the setup before any further side effects

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Unsupported operating system: {os} (only macOS is supported)")]
    UnsupportedPlatform { os: String },

    #[error("{0} is not installed")]
    PackageManagerMissing(String),

    #[error("Failed to install {manager}: {reason}")]
    Bootstrap { manager: String, reason: String },

    #[error("Could not determine the {manager} install prefix")]
    Prefix { manager: String },

    #[error("Invalid profile {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid profile: {0}")]
    ProfileFormat(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SetupError>;
