//! PATH and MANPATH block composition

use crate::install::Package;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// How a formula exposes its binaries under the Homebrew prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Unprefixed names in `opt/<name>/libexec/gnubin`, man pages in `libexec/gnuman`
    Gnubin,
    /// Keg-only formula, binaries in `opt/<name>/bin`
    KegBin,
    /// Linked into `<prefix>/bin` already
    #[default]
    None,
}

/// Directories to prepend to PATH, in package order, without duplicates.
///
/// `<prefix>/bin` and `<prefix>/sbin` always close the list so linked
/// formulae also shadow the system binaries in `/usr/bin`.
pub fn path_entries(prefix: &Path, packages: &[Package]) -> Vec<PathBuf> {
    let mut entries = Vec::new();
    for package in packages {
        let opt = prefix.join("opt").join(&package.name);
        let entry = match package.path {
            PathKind::Gnubin => opt.join("libexec").join("gnubin"),
            PathKind::KegBin => opt.join("bin"),
            PathKind::None => continue,
        };
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    for linked in [prefix.join("bin"), prefix.join("sbin")] {
        if !entries.contains(&linked) {
            entries.push(linked);
        }
    }
    entries
}

/// Directories to prepend to MANPATH for `gnubin` packages
pub fn man_entries(prefix: &Path, packages: &[Package]) -> Vec<PathBuf> {
    let mut entries = Vec::new();
    for package in packages.iter().filter(|p| p.path == PathKind::Gnubin) {
        let entry = prefix
            .join("opt")
            .join(&package.name)
            .join("libexec")
            .join("gnuman");
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    entries
}

fn join(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Text block appended to shell startup files.
///
/// The first line carries `marker`, so the presence of the marker anywhere in
/// a file means the block was already written.
pub fn render_block(marker: &str, entries: &[PathBuf], man_entries: &[PathBuf]) -> String {
    let mut block = format!("# {marker}\n");
    if !entries.is_empty() {
        block.push_str(&format!("export PATH=\"{}:$PATH\"\n", join(entries)));
    }
    if !man_entries.is_empty() {
        block.push_str(&format!(
            "export MANPATH=\"{}:${{MANPATH:-}}\"\n",
            join(man_entries)
        ));
    }
    block.push_str(&format!("# end {marker}\n"));
    block
}

/// `entries` followed by the existing search path
pub fn search_path(entries: &[PathBuf], current: Option<OsString>) -> OsString {
    let mut all: Vec<PathBuf> = entries.to_vec();
    if let Some(current) = current {
        all.extend(std::env::split_paths(&current));
    }
    // Entries come from the prefix and the split PATH, neither contains ':'
    std::env::join_paths(all).unwrap_or_default()
}
