//! Configuration.
//!
//! This module contains the configuration read from an (optional) YAML file.

use crate::platform::DOWNLOAD_BASE;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// Name of the default configuration file within the application home directory.
pub(crate) const CONFIG_FILENAME: &str = "jdk-provision.yml";

/// The struct that holds the configuration loaded from a YAML file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct Config {
    /// The base URL below which the releases are downloaded (for mirrors).
    #[serde(default = "download_base_default")]
    pub(crate) download_base: String,
    /// Whether to re-source the shell profile (or `setx` on Windows) after changing it.
    #[serde(default = "refresh_shell_default")]
    pub(crate) refresh_shell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_base: download_base_default(),
            refresh_shell: refresh_shell_default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the given filename.
    ///
    /// A missing file yields the default configuration unless the file has been named explicitly.
    #[instrument(err, level = "trace")]
    pub(crate) fn load<P>(filename: P, explicit: bool) -> anyhow::Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config_file = match File::open(filename) {
            Ok(config_file) => config_file,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                debug!("no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let de = serde_yaml::Deserializer::from_reader(config_file);
        let value = serde_yaml::Value::deserialize(de)?;
        // an empty file is a valid (default) configuration
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_value(value)?;

        Ok(config)
    }
}

// Returns the default value for [Config::download_base].
#[doc(hidden)]
#[inline]
fn download_base_default() -> String {
    DOWNLOAD_BASE.to_string()
}

// Returns the default value for [Config::refresh_shell].
#[doc(hidden)]
#[inline]
fn refresh_shell_default() -> bool {
    true
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(Config::default(), config);
        assert_eq!(DOWNLOAD_BASE, config.download_base);
        assert!(config.refresh_shell);
    }

    #[test]
    fn all_keys() {
        let config = r"
          download-base: https://mirror.example.org/temurin/
          refresh-shell: false
        ";
        let config: Config = serde_yaml::from_str(config).unwrap();
        assert_eq!("https://mirror.example.org/temurin/", config.download_base);
        assert!(!config.refresh_shell);
    }

    #[test]
    fn unknown_key() {
        let config = r"
          install-dir: /opt/jdk
        ";
        assert!(serde_yaml::from_str::<Config>(config).is_err());
    }

    #[test]
    fn missing_default_file() {
        let tempdir = tempdir().unwrap();
        let config = Config::load(tempdir.path().join(CONFIG_FILENAME), false).unwrap();
        assert_eq!(Config::default(), config);
    }

    #[test]
    fn missing_explicit_file() {
        let tempdir = tempdir().unwrap();
        assert!(Config::load(tempdir.path().join(CONFIG_FILENAME), true).is_err());
    }

    #[test]
    fn empty_file() {
        let tempdir = tempdir().unwrap();
        let filename = tempdir.path().join(CONFIG_FILENAME);
        fs::write(&filename, "").unwrap();
        assert_eq!(Config::default(), Config::load(&filename, true).unwrap());
    }
}
