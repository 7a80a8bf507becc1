//! Layout.
//!
//! This module contains the fixed locations below the user's home directory.

use crate::platform::Distribution;
use anyhow::anyhow;
use std::path::{Path, PathBuf};

/// Name of the application home directory within the user's home directory.
pub(crate) const APP_HOME_DIR: &str = ".jdk-provision";

/// Name of the install directory within the user's home directory.
pub(crate) const INSTALL_DIR: &str = "jdk";

/// The fixed locations used while provisioning.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Layout {
    home: PathBuf,
}

impl Layout {
    /// Creates the `Layout` for the home directory of the current user.
    pub(crate) fn from_user_home() -> anyhow::Result<Self> {
        let home = shellexpand::tilde("~");
        if home == "~" || home.is_empty() {
            return Err(anyhow!("failed to determine home directory"));
        }

        Ok(Self::with_home(home.as_ref()))
    }

    /// Creates the `Layout` below the given home directory.
    pub(crate) fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Returns the home directory.
    pub(crate) fn home(&self) -> &Path {
        &self.home
    }

    /// Returns the application home directory (archives, configuration).
    pub(crate) fn app_home(&self) -> PathBuf {
        self.home.join(APP_HOME_DIR)
    }

    /// Returns the directory the archive is extracted into.
    pub(crate) fn install_dir(&self) -> PathBuf {
        self.home.join(INSTALL_DIR)
    }

    /// Returns the path of the downloaded archive for the given distribution.
    pub(crate) fn archive(&self, distribution: &Distribution) -> PathBuf {
        self.app_home().join(distribution.archive_name())
    }

    /// Returns the java home of the given distribution.
    pub(crate) fn java_home(&self, distribution: &Distribution) -> PathBuf {
        distribution.java_home(&self.install_dir())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::platform::detect;
    use test_log::test;

    #[test]
    fn paths_below_home() {
        let layout = Layout::with_home("/home/user");
        let distribution = detect("Darwin", "arm64").unwrap();
        assert_eq!(Path::new("/home/user/.jdk-provision/jdk.tar.gz"), layout.archive(&distribution));
        assert_eq!(Path::new("/home/user/jdk"), layout.install_dir());
    }

    #[test]
    fn windows_archive_is_zip() {
        let layout = Layout::with_home("/home/user");
        let distribution = detect("Windows", "x86").unwrap();
        assert_eq!(Path::new("/home/user/.jdk-provision/jdk.zip"), layout.archive(&distribution));
        assert_eq!(Path::new("/home/user/jdk/jdk-11.0.18+10"), layout.java_home(&distribution));
    }
}
