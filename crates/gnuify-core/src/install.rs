//! Best-effort package installation

use crate::brew::PackageManager;
use crate::error::{Result, SetupError};
use crate::shell::path::PathKind;
use crate::verify::VerifyCheck;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A formula to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Formula name passed to the package manager
    pub name: String,
    /// Display name for user-facing messages
    pub display_name: String,
    #[serde(default)]
    pub path: PathKind,
    #[serde(default)]
    pub verify: Option<VerifyCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Installed,
    Failed(String),
}

/// Progress notifications emitted while installing
#[derive(Debug, Clone, Copy)]
pub enum InstallEvent<'a> {
    Bootstrapping(&'a str),
    Installing(&'a Package),
    Finished(&'a Package, &'a InstallOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub results: Vec<(Package, InstallOutcome)>,
}

impl InstallReport {
    pub fn installed(&self) -> Vec<&Package> {
        self.filter(|o| *o == InstallOutcome::Installed)
    }

    pub fn already_installed(&self) -> Vec<&Package> {
        self.filter(|o| *o == InstallOutcome::AlreadyInstalled)
    }

    pub fn failed(&self) -> Vec<(&Package, &str)> {
        self.results
            .iter()
            .filter_map(|(p, o)| match o {
                InstallOutcome::Failed(reason) => Some((p, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed().is_empty()
    }

    fn filter(&self, pred: impl Fn(&InstallOutcome) -> bool) -> Vec<&Package> {
        self.results
            .iter()
            .filter(|(_, o)| pred(o))
            .map(|(p, _)| p)
            .collect()
    }
}

/// Result of a successful `provision`
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub prefix: PathBuf,
    pub report: InstallReport,
}

/// Install each package in order, skipping those already present.
///
/// A failure is recorded and the loop moves on to the next package.
pub async fn install_all<P: PackageManager>(
    pm: &P,
    packages: &[Package],
    mut observer: impl FnMut(InstallEvent<'_>),
) -> InstallReport {
    let mut report = InstallReport::default();

    for package in packages {
        let outcome = if pm.is_installed(&package.name) {
            InstallOutcome::AlreadyInstalled
        } else {
            observer(InstallEvent::Installing(package));
            match pm.install(&package.name).await {
                Ok(()) => InstallOutcome::Installed,
                Err(e) => {
                    tracing::debug!(package = %package.name, error = %e, "install failed");
                    InstallOutcome::Failed(e.to_string())
                }
            }
        };
        observer(InstallEvent::Finished(package, &outcome));
        report.results.push((package.clone(), outcome));
    }

    report
}

/// Bootstrap the package manager if needed, then install every package.
///
/// A missing package manager that cannot be bootstrapped is fatal and
/// returns before any package is touched.
pub async fn provision<P: PackageManager>(
    pm: &P,
    packages: &[Package],
    mut observer: impl FnMut(InstallEvent<'_>),
) -> Result<Provisioned> {
    if !pm.is_available() {
        observer(InstallEvent::Bootstrapping(pm.display_name()));
        pm.bootstrap().await?;
        if !pm.is_available() {
            return Err(SetupError::PackageManagerMissing(
                pm.display_name().to_string(),
            ));
        }
    }

    let prefix = pm.prefix()?;
    let report = install_all(pm, packages, observer).await;

    Ok(Provisioned { prefix, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct MockManager {
        available: Cell<bool>,
        bootstrap_succeeds: bool,
        installed: Vec<&'static str>,
        broken: Vec<&'static str>,
        queried: RefCell<Vec<String>>,
        install_calls: RefCell<Vec<String>>,
    }

    impl PackageManager for MockManager {
        fn display_name(&self) -> &str {
            "Mockbrew"
        }

        fn is_available(&self) -> bool {
            self.available.get()
        }

        async fn bootstrap(&self) -> Result<()> {
            if self.bootstrap_succeeds {
                self.available.set(true);
                Ok(())
            } else {
                Err(SetupError::Bootstrap {
                    manager: "Mockbrew".to_string(),
                    reason: "curl: (6) Could not resolve host".to_string(),
                })
            }
        }

        fn prefix(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("/opt/mock"))
        }

        fn is_installed(&self, package: &str) -> bool {
            self.queried.borrow_mut().push(package.to_string());
            self.installed.iter().any(|p| *p == package)
        }

        async fn install(&self, package: &str) -> anyhow::Result<()> {
            self.install_calls.borrow_mut().push(package.to_string());
            if self.broken.iter().any(|p| *p == package) {
                anyhow::bail!("brew install {} failed with exit code: 1", package);
            }
            Ok(())
        }
    }

    fn packages(names: &[&str]) -> Vec<Package> {
        names
            .iter()
            .map(|n| Package {
                name: n.to_string(),
                display_name: n.to_string(),
                path: PathKind::None,
                verify: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_install_all_skips_installed_and_continues_on_failure() {
        let pm = MockManager {
            available: Cell::new(true),
            installed: vec!["coreutils"],
            broken: vec!["gnu-sed"],
            ..Default::default()
        };
        let report = install_all(
            &pm,
            &packages(&["coreutils", "gnu-sed", "grep"]),
            |_| {},
        )
        .await;

        assert_eq!(*pm.install_calls.borrow(), vec!["gnu-sed", "grep"]);
        assert_eq!(report.already_installed()[0].name, "coreutils");
        assert_eq!(report.installed()[0].name, "grep");
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0.name, "gnu-sed");
        assert!(failed[0].1.contains("exit code: 1"));
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_failed_bootstrap_halts_before_installs() {
        let pm = MockManager::default();
        let mut events = Vec::new();

        let err = provision(&pm, &packages(&["coreutils", "grep"]), |e| {
            events.push(format!("{:?}", e))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SetupError::Bootstrap { .. }));
        assert!(pm.queried.borrow().is_empty());
        assert!(pm.install_calls.borrow().is_empty());
        assert_eq!(events, vec!["Bootstrapping(\"Mockbrew\")"]);
    }

    #[tokio::test]
    async fn test_successful_bootstrap_proceeds_to_installs() {
        let pm = MockManager {
            bootstrap_succeeds: true,
            ..Default::default()
        };
        let provisioned = provision(&pm, &packages(&["gawk"]), |_| {}).await.unwrap();

        assert_eq!(provisioned.prefix, PathBuf::from("/opt/mock"));
        assert_eq!(provisioned.report.installed().len(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_each_package() {
        let pm = MockManager {
            available: Cell::new(true),
            installed: vec!["make"],
            ..Default::default()
        };
        let mut finished = Vec::new();
        install_all(&pm, &packages(&["make", "wget"]), |e| {
            if let InstallEvent::Finished(p, o) = e {
                finished.push((p.name.clone(), o.clone()));
            }
        })
        .await;

        assert_eq!(
            finished,
            vec![
                ("make".to_string(), InstallOutcome::AlreadyInstalled),
                ("wget".to_string(), InstallOutcome::Installed),
            ]
        );
    }
}
