//! Environment.
//!
//! This module persists the java home into the user's environment, so that future shells and processes find java.
//!
//! Two kinds of targets exist: the shell profile on unix-like systems and the `Path` value of the system environment in the
//! registry on Windows.

#[cfg_attr(not(any(windows, test)), allow(dead_code))]
mod path;
mod profile;
#[cfg(windows)]
mod registry;

#[cfg(any(windows, test))]
pub(crate) use self::path::append_path_entry;
pub(crate) use self::profile::ProfileTarget;
#[cfg(windows)]
pub(crate) use self::registry::RegistryTarget;

use crate::platform::OsFamily;
use crate::report::Outcome;
use std::fmt;
use std::path::Path;

/// Trait for the places the java home can be persisted to.
pub(crate) trait EnvironmentTarget: fmt::Debug {
    /// Returns a human readable description of the target.
    fn describe(&self) -> String;

    /// Persists the given java home unless an equal entry is already present.
    fn configure(&mut self, java_home: &Path) -> anyhow::Result<Outcome>;

    /// Makes the change visible to the current session, if possible.
    fn refresh(&mut self) -> anyhow::Result<Outcome>;
}

/// Creates the environment target for the given operating system family.
pub(crate) fn for_host(os: OsFamily, home: &Path, refresh: bool) -> anyhow::Result<Box<dyn EnvironmentTarget>> {
    if os.is_unix_like() {
        let shell = std::env::var("SHELL").ok();
        let target = ProfileTarget::detect(shell.as_deref(), os, home).with_refresh(refresh);
        return Ok(Box::new(target));
    }

    registry_target(refresh)
}

// Creates the registry target.
#[cfg(windows)]
#[doc(hidden)]
fn registry_target(refresh: bool) -> anyhow::Result<Box<dyn EnvironmentTarget>> {
    Ok(Box::new(RegistryTarget::new().with_refresh(refresh)))
}

// Creates the registry target.
#[cfg(not(windows))]
#[doc(hidden)]
fn registry_target(_refresh: bool) -> anyhow::Result<Box<dyn EnvironmentTarget>> {
    Err(anyhow::anyhow!("the registry is only available on Windows"))
}


#[cfg(test)]
mod tests {

    use super::testing::MemoryTarget;
    use super::*;
    use test_log::test;

    #[test]
    fn unix_like_hosts_use_profile() {
        let target = for_host(OsFamily::Linux, Path::new("/home/user"), false).unwrap();
        assert!(target.describe().contains("/home/user"));
    }

    #[cfg(not(windows))]
    #[test]
    fn registry_unavailable_elsewhere() {
        assert!(for_host(OsFamily::Windows, Path::new("/home/user"), false).is_err());
    }

    #[test]
    fn memory_target_never_duplicates() {
        let mut target = MemoryTarget {
            path: "/usr/bin".to_string(),
            ..Default::default()
        };
        let java_home = Path::new("/opt/jdk");
        assert_eq!(Outcome::Done, target.configure(java_home).unwrap());
        assert_eq!(Outcome::Skipped, target.configure(java_home).unwrap());
        assert_eq!(Outcome::Skipped, target.configure(java_home).unwrap());
        assert_eq!(1, target.path.matches("/opt/jdk/bin").count());
    }
}
