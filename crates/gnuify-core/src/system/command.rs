//! Blocking external process invocation

use std::ffi::OsString;
use std::io;
use std::process::Command;

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }

    /// First non-empty line of the combined output
    pub fn first_line(&self) -> Option<String> {
        self.combined()
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Runs a program to completion and captures its output
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    path: Option<OsString>,
}

impl SystemRunner {
    /// Run children with `PATH` replaced by `path`
    pub fn with_path(path: OsString) -> Self {
        Self { path: Some(path) }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        tracing::debug!(program, ?args, "running command");

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(path) = &self.path {
            cmd.env("PATH", path);
        }

        let output = cmd.output()?;
        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(program, code = ?result.code, "command finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_joins_streams() {
        let out = CommandOutput {
            success: true,
            code: Some(0),
            stdout: "sed (GNU sed) 4.9".to_string(),
            stderr: "warning: locale".to_string(),
        };
        assert_eq!(out.combined(), "sed (GNU sed) 4.9\nwarning: locale");
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        let out = CommandOutput {
            stderr: "\n  grep (GNU grep) 3.11\nmore".to_string(),
            ..Default::default()
        };
        assert_eq!(out.first_line().as_deref(), Some("grep (GNU grep) 3.11"));
    }
}
