//! Fallback.
//!
//! This module installs java with the package manager of the operating system.

use crate::colors::*;
use crate::platform::{HostPlatform, OsFamily};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, instrument, warn};

// Locations of Homebrew, relative to the filesystem root (Apple Silicon, Intel).
#[doc(hidden)]
const BREW_EXES: &[&str] = &["opt/homebrew/bin/brew", "usr/local/bin/brew"];

// Location of Chocolatey, relative to the system drive.
#[doc(hidden)]
const CHOCO_EXE: &str = r"ProgramData\chocolatey\bin\choco.exe";

// Locations of the Linux package managers, relative to the filesystem root, in order of preference.
#[doc(hidden)]
const LINUX_MANAGERS: &[(&str, PackageManager)] = &[("usr/bin/apt", PackageManager::Apt), ("usr/bin/yum", PackageManager::Yum)];

// Script that installs Homebrew.
#[doc(hidden)]
const BREW_BOOTSTRAP: &str = r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

// Script that installs Chocolatey (requires administrative privileges).
#[doc(hidden)]
const CHOCO_BOOTSTRAP: &str = "Set-ExecutionPolicy Bypass -Scope Process -Force; \
    [System.Net.ServicePointManager]::SecurityProtocol = 3072; \
    iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))";

/// The error type for the fallback installation.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum FallbackError {
    /// No supported package manager is available.
    #[error("Package manager not found. Unable to install Java.")]
    NoPackageManager,
    /// The operating system has no supported package manager at all.
    #[error("Unsupported operating system '{0}'.")]
    UnsupportedPlatform(String),
}

/// Enumeration of supported package managers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PackageManager {
    /// Homebrew (macOS)
    Homebrew,
    /// APT (Debian and derivatives)
    Apt,
    /// YUM (Red Hat and derivatives)
    Yum,
    /// Chocolatey (Windows)
    Chocolatey,
}

impl PackageManager {
    /// Detects the package manager for the given operating system below the given filesystem root.
    pub(crate) fn detect(os: OsFamily, root: &Path) -> Result<Self, FallbackError> {
        match os {
            OsFamily::MacOs => Ok(Self::Homebrew),
            OsFamily::Windows => Ok(Self::Chocolatey),
            OsFamily::Linux => LINUX_MANAGERS
                .iter()
                .find(|(exe, _)| root.join(exe).exists())
                .map(|(_, manager)| *manager)
                .ok_or(FallbackError::NoPackageManager),
        }
    }

    /// Returns the invocations that install java, bootstrapping the package manager first if it is missing.
    pub(crate) fn invocations(self, root: &Path) -> Vec<Invocation> {
        match self {
            Self::Homebrew => {
                let brew = BREW_EXES.iter().map(|exe| root.join(exe)).find(|exe| exe.exists());
                let mut invocations = Vec::new();
                if brew.is_none() {
                    invocations.push(Invocation::new("/bin/bash", ["-c", BREW_BOOTSTRAP]));
                }
                // the bootstrapped brew is not on the PATH of this process yet
                let brew = brew.unwrap_or_else(|| root.join(brew_exe_for_arch(env::consts::ARCH)));
                invocations.push(Invocation::new(brew.to_string_lossy(), ["install", "openjdk"]));
                invocations
            }
            Self::Apt => vec![
                Invocation::new("sudo", ["apt", "update"]),
                Invocation::new("sudo", ["apt", "install", "-y", "default-jre", "default-jdk"]),
            ],
            Self::Yum => vec![
                Invocation::new("sudo", ["yum", "update", "-y"]),
                Invocation::new("sudo", ["yum", "install", "-y", "java-11-openjdk-devel"]),
            ],
            Self::Chocolatey => {
                let choco = root.join(CHOCO_EXE);
                let mut invocations = Vec::new();
                if !choco.exists() {
                    invocations.push(Invocation::new("powershell", ["-NoProfile", "-Command", CHOCO_BOOTSTRAP]));
                }
                invocations.push(Invocation::new(choco.to_string_lossy(), ["install", "-y", "openjdk"]));
                invocations
            }
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Homebrew => "Homebrew",
            Self::Apt => "apt",
            Self::Yum => "yum",
            Self::Chocolatey => "Chocolatey",
        };
        write!(f, "{name}")
    }
}

// Returns the location Homebrew installs itself to on the given architecture.
#[doc(hidden)]
fn brew_exe_for_arch(arch: &str) -> &'static str {
    match arch {
        "aarch64" | "arm64" => BREW_EXES[0],
        _ => BREW_EXES[1],
    }
}

/// A program together with its arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Invocation {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
}

impl Invocation {
    /// Creates a new `Invocation`.
    pub(crate) fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the invocation. The exit status is logged only.
    #[instrument(level = "trace")]
    pub(crate) fn run(&self) {
        match Command::new(&self.program).args(&self.args).status() {
            Ok(status) if status.success() => info!(invocation = %self, %status, "finished"),
            Ok(status) => warn!(invocation = %self, %status, "finished unsuccessfully"),
            Err(err) => warn!(invocation = %self, %err, "failed to launch"),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }

        Ok(())
    }
}

/// Returns the root of the filesystem the package managers live in.
pub(crate) fn system_root() -> PathBuf {
    if cfg!(windows) {
        let drive = env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
        PathBuf::from(format!(r"{drive}\"))
    } else {
        PathBuf::from("/")
    }
}

/// Installs java with the package manager of the given host.
pub(crate) fn install(host: &HostPlatform, root: &Path, dry_run: bool) -> Result<PackageManager, FallbackError> {
    let os = OsFamily::try_from(host.os.as_str()).map_err(|_| FallbackError::UnsupportedPlatform(host.os.clone()))?;
    let manager = PackageManager::detect(os, root)?;
    println!("Installing java with {}", INFO_COLOR.paint(manager.to_string()));

    for invocation in manager.invocations(root) {
        if dry_run {
            let not = ATTENTION_COLOR.paint("NOT");
            println!("dry-run: {not} running {}", PATH_COLOR.paint(invocation.to_string()));
        } else {
            println!("Running {}", PATH_COLOR.paint(invocation.to_string()));
            invocation.run();
        }
    }

    Ok(manager)
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use test_log::test;

    fn touch(root: &Path, exe: &str) {
        let path = root.join(exe);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn detect_apt() {
        let root = tempdir().unwrap();
        touch(root.path(), "usr/bin/apt");
        touch(root.path(), "usr/bin/yum");
        assert_eq!(Ok(PackageManager::Apt), PackageManager::detect(OsFamily::Linux, root.path()));
    }

    #[test]
    fn detect_yum() {
        let root = tempdir().unwrap();
        touch(root.path(), "usr/bin/yum");
        assert_eq!(Ok(PackageManager::Yum), PackageManager::detect(OsFamily::Linux, root.path()));
    }

    #[test]
    fn detect_none() {
        let root = tempdir().unwrap();
        assert_eq!(Err(FallbackError::NoPackageManager), PackageManager::detect(OsFamily::Linux, root.path()));
    }

    #[test]
    fn detect_by_os() {
        let root = tempdir().unwrap();
        assert_eq!(Ok(PackageManager::Homebrew), PackageManager::detect(OsFamily::MacOs, root.path()));
        assert_eq!(Ok(PackageManager::Chocolatey), PackageManager::detect(OsFamily::Windows, root.path()));
    }

    #[test]
    fn homebrew_is_bootstrapped_when_missing() {
        let root = tempdir().unwrap();
        let invocations = PackageManager::Homebrew.invocations(root.path());
        assert_eq!(2, invocations.len());
        assert_eq!("/bin/bash", invocations[0].program);
        let brew = root.path().join(brew_exe_for_arch(env::consts::ARCH));
        assert_eq!(Invocation::new(brew.to_string_lossy(), ["install", "openjdk"]), invocations[1]);
    }

    #[test]
    fn homebrew_location_by_arch() {
        assert_eq!("opt/homebrew/bin/brew", brew_exe_for_arch("arm64"));
        assert_eq!("opt/homebrew/bin/brew", brew_exe_for_arch("aarch64"));
        assert_eq!("usr/local/bin/brew", brew_exe_for_arch("x86_64"));
    }

    #[test]
    fn chocolatey_is_bootstrapped_when_missing() {
        let root = tempdir().unwrap();
        let invocations = PackageManager::Chocolatey.invocations(root.path());
        assert_eq!(2, invocations.len());
        assert_eq!("powershell", invocations[0].program);
        let choco = root.path().join(CHOCO_EXE);
        assert_eq!(Invocation::new(choco.to_string_lossy(), ["install", "-y", "openjdk"]), invocations[1]);
    }

    #[test]
    fn chocolatey_present() {
        let root = tempdir().unwrap();
        touch(root.path(), CHOCO_EXE);
        let invocations = PackageManager::Chocolatey.invocations(root.path());
        assert_eq!(1, invocations.len());
        assert_eq!(root.path().join(CHOCO_EXE).to_string_lossy(), invocations[0].program);
    }

    #[test]
    fn homebrew_present() {
        let root = tempdir().unwrap();
        touch(root.path(), "opt/homebrew/bin/brew");
        let invocations = PackageManager::Homebrew.invocations(root.path());
        assert_eq!(1, invocations.len());
        assert!(invocations[0].program.ends_with("brew"));
        assert_eq!(vec!["install", "openjdk"], invocations[0].args);
    }

    #[test]
    fn apt_invocations() {
        let invocations = PackageManager::Apt.invocations(Path::new("/"));
        let rendered: Vec<String> = invocations.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["sudo apt update", "sudo apt install -y default-jre default-jdk"], rendered);
    }

    #[test]
    fn yum_invocations() {
        let invocations = PackageManager::Yum.invocations(Path::new("/"));
        let rendered: Vec<String> = invocations.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["sudo yum update -y", "sudo yum install -y java-11-openjdk-devel"], rendered);
    }

    #[test]
    fn install_without_package_manager() {
        let root = tempdir().unwrap();
        let host = HostPlatform::new("Linux", "x86_64");
        assert_eq!(Err(FallbackError::NoPackageManager), install(&host, root.path(), true));
    }

    #[test]
    fn install_on_unsupported_platform() {
        let root = tempdir().unwrap();
        let host = HostPlatform::new("Haiku", "x86_64");
        assert_eq!(Err(FallbackError::UnsupportedPlatform("Haiku".to_string())), install(&host, root.path(), true));
    }

    #[test]
    fn install_dry_run() {
        let root = tempdir().unwrap();
        touch(root.path(), "usr/bin/yum");
        let host = HostPlatform::new("Linux", "aarch64");
        assert_eq!(Ok(PackageManager::Yum), install(&host, root.path(), true));
    }
}
