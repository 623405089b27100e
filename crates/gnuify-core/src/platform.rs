//! Host platform detection

use crate::error::{Result, SetupError};
use crate::system::{CommandRunner, SystemRunner};
use std::fmt;
use std::path::PathBuf;

/// Operating system and CPU architecture of the running host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    pub fn is_macos(&self) -> bool {
        self.os == "macos"
    }

    /// Where Homebrew installs itself on this architecture
    pub fn default_prefix(&self) -> PathBuf {
        if self.arch == "aarch64" {
            PathBuf::from("/opt/homebrew")
        } else {
            PathBuf::from("/usr/local")
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.os, self.arch)
    }
}

/// Fail unless the host is macOS
pub fn ensure_supported(platform: &Platform) -> Result<()> {
    if platform.is_macos() {
        Ok(())
    } else {
        Err(SetupError::UnsupportedPlatform {
            os: platform.os.to_string(),
        })
    }
}

/// macOS product version (e.g. "14.5"), if `sw_vers` is available
pub fn os_version() -> Option<String> {
    product_version(&SystemRunner::default())
}

fn product_version<R: CommandRunner>(runner: &R) -> Option<String> {
    runner
        .run("sw_vers", &["-productVersion"])
        .ok()
        .filter(|out| out.success)
        .map(|out| out.stdout.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::CommandOutput;
    use std::io;

    struct SwVers(Option<&'static str>);

    impl CommandRunner for SwVers {
        fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            assert_eq!((program, args), ("sw_vers", &["-productVersion"][..]));
            match self.0 {
                Some(stdout) => Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "sw_vers")),
            }
        }
    }

    #[test]
    fn test_product_version() {
        assert_eq!(product_version(&SwVers(Some("14.5\n"))).as_deref(), Some("14.5"));
        assert_eq!(product_version(&SwVers(Some("  \n"))), None);
        assert_eq!(product_version(&SwVers(None)), None);
    }

    #[test]
    fn test_only_macos_is_supported() {
        let mac = Platform {
            os: "macos",
            arch: "aarch64",
        };
        let linux = Platform {
            os: "linux",
            arch: "x86_64",
        };

        assert!(ensure_supported(&mac).is_ok());
        let err = ensure_supported(&linux).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { ref os } if os == "linux"));
    }

    #[test]
    fn test_default_prefix_follows_arch() {
        let arm = Platform {
            os: "macos",
            arch: "aarch64",
        };
        let intel = Platform {
            os: "macos",
            arch: "x86_64",
        };

        assert_eq!(arm.default_prefix(), PathBuf::from("/opt/homebrew"));
        assert_eq!(intel.default_prefix(), PathBuf::from("/usr/local"));
    }
}
