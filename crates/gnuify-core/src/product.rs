//! Product configuration trait for the CLI binary
//!
//! The binary implements this trait to define its identity, the marker that
//! guards its shell-file edits, and the profile it installs by default.

use crate::error::Result;
use crate::profile::Profile;
use std::path::PathBuf;

pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command and env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Marker written into shell files; its presence means "already configured"
    fn block_marker(&self) -> &'static str;

    /// Profile used when no `--profile` file is given
    fn default_profile(&self) -> Result<Profile>;

    /// Instructions printed after a run, given the shell files that were updated
    fn next_steps(&self, updated_files: &[PathBuf]) -> Vec<String>;
}
