//! Idempotent edits to shell startup files
//!
//! A file is considered configured when it contains the marker string
//! anywhere. Existing lines are never parsed or rewritten; the only edit is
//! appending the block once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A shell startup file and its current contents
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub path: PathBuf,
    pub content: String,
}

/// What `ensure_block` did to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutcome {
    AlreadyConfigured,
    Appended,
}

impl ShellConfig {
    /// Read the file; a missing file loads as empty
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, content })
    }

    pub fn is_configured(&self, marker: &str) -> bool {
        self.content.contains(marker)
    }

    /// Contents after appending `block`, separated from existing text by a blank line
    pub fn with_block(&self, block: &str) -> String {
        let mut modified = self.content.clone();
        if !modified.is_empty() {
            if !modified.ends_with('\n') {
                modified.push('\n');
            }
            modified.push('\n');
        }
        modified.push_str(block);
        if !block.ends_with('\n') {
            modified.push('\n');
        }
        modified
    }

    /// Append `block` unless `marker` is already present, then write the file
    pub fn ensure_block(&mut self, marker: &str, block: &str) -> io::Result<ConfigOutcome> {
        if self.is_configured(marker) {
            tracing::debug!(path = %self.path.display(), "already configured");
            return Ok(ConfigOutcome::AlreadyConfigured);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let modified = self.with_block(block);
        fs::write(&self.path, &modified)?;
        self.content = modified;
        tracing::debug!(path = %self.path.display(), "appended block");

        Ok(ConfigOutcome::Appended)
    }
}

/// Load `path` and ensure it carries `block`
pub fn ensure_block(path: &Path, marker: &str, block: &str) -> io::Result<ConfigOutcome> {
    ShellConfig::load(path)?.ensure_block(marker, block)
}

/// Apply `ensure_block` to every file, continuing past failures
pub fn update_all(
    files: &[PathBuf],
    marker: &str,
    block: &str,
) -> Vec<(PathBuf, io::Result<ConfigOutcome>)> {
    files
        .iter()
        .map(|path| (path.clone(), ensure_block(path, marker, block)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "gnuify: prefer GNU utilities";
    const BLOCK: &str =
        "# gnuify: prefer GNU utilities\nexport PATH=\"/x:$PATH\"\n# end gnuify: prefer GNU utilities\n";

    fn config(content: &str) -> ShellConfig {
        ShellConfig {
            path: PathBuf::from("/test/.zshrc"),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_is_configured_is_substring_match() {
        assert!(config("stuff\n# gnuify: prefer GNU utilities (edited)\n").is_configured(MARKER));
        assert!(!config("export PATH=/x:$PATH\n").is_configured(MARKER));
    }

    #[test]
    fn test_with_block_on_empty_file() {
        assert_eq!(config("").with_block(BLOCK), BLOCK);
    }

    #[test]
    fn test_with_block_adds_missing_newline() {
        let modified = config("alias ll='ls -l'").with_block(BLOCK);
        assert_eq!(modified, format!("alias ll='ls -l'\n\n{BLOCK}"));
    }

    #[test]
    fn test_with_block_keeps_existing_content() {
        let modified = config("a\nb\n").with_block(BLOCK);
        assert!(modified.starts_with("a\nb\n\n"));
        assert!(modified.ends_with(BLOCK));
    }
}
