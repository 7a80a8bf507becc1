//! Registry.
//!
//! This module appends the binaries of the java home to the system-wide `Path` in the Windows registry.

use super::{EnvironmentTarget, append_path_entry};
use crate::report::Outcome;
use anyhow::anyhow;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, instrument, trace};
use windows_registry::LOCAL_MACHINE;

/// The key of the system-wide environment.
pub(crate) const ENVIRONMENT_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// The name of the search path value.
pub(crate) const PATH_VALUE: &str = "Path";

/// [`EnvironmentTarget`] implementation for the system environment in the registry.
#[derive(Debug)]
pub(crate) struct RegistryTarget {
    refresh: bool,
    written: Option<String>,
}

impl RegistryTarget {
    /// Creates a new `RegistryTarget`.
    pub(crate) fn new() -> Self {
        Self { refresh: true, written: None }
    }

    /// Whether to propagate the changed `Path` with `setx`.
    pub(crate) fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;

        self
    }
}

impl EnvironmentTarget for RegistryTarget {
    fn describe(&self) -> String {
        format!(r"HKLM\{ENVIRONMENT_KEY}\{PATH_VALUE}")
    }

    #[instrument(level = "trace", skip(self))]
    fn configure(&mut self, java_home: &Path) -> anyhow::Result<Outcome> {
        // requires administrative privileges
        let key = LOCAL_MACHINE.options().read().write().open(ENVIRONMENT_KEY)?;
        let current = key.get_string(PATH_VALUE)?;
        trace!(current);

        let java_bin = java_home.join("bin");
        let Some(path) = append_path_entry(&current, &java_bin.to_string_lossy()) else {
            debug!("path already contains java");
            return Ok(Outcome::Skipped);
        };

        key.set_expand_string(PATH_VALUE, path.as_str())?;
        self.written = Some(path);

        Ok(Outcome::Done)
    }

    #[instrument(level = "trace", skip(self))]
    fn refresh(&mut self) -> anyhow::Result<Outcome> {
        let Some(path) = self.written.as_deref().filter(|_| self.refresh) else {
            return Ok(Outcome::Skipped);
        };

        let status = Command::new("setx")
            .args(["PATH", path])
            .stdin(Stdio::null()) // disconnect from self
            .stdout(Stdio::null()) // disconnect from self
            .status()?;
        trace!(?status);
        if !status.success() {
            return Err(anyhow!("setx exited with {status}"));
        }

        Ok(Outcome::Done)
    }
}
