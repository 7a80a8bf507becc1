//! Shell profile.
//!
//! This module appends the java home to the startup file of the user's shell.

use super::EnvironmentTarget;
use crate::platform::OsFamily;
use crate::report::Outcome;
use anyhow::anyhow;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, instrument, trace};

/// The line that prepends the binaries of the java home to the search path.
pub(crate) const EXPORT_PATH_LINE: &str = r#"export PATH="$JAVA_HOME/bin:$PATH""#;

// The shell used to re-source profiles of shells without a dedicated one.
#[doc(hidden)]
const DEFAULT_SHELL: &str = "bash";

/// Returns the line that exports the given java home.
pub(crate) fn export_java_home_line(java_home: &Path) -> String {
    format!(r#"export JAVA_HOME="{}""#, java_home.display())
}

/// [`EnvironmentTarget`] implementation for shell profiles.
#[derive(Debug)]
pub(crate) struct ProfileTarget {
    path: PathBuf,
    shell: String,
    refresh: bool,
}

impl ProfileTarget {
    /// Creates a new `ProfileTarget` for the given profile file, re-sourced with the given shell.
    pub(crate) fn new(path: impl Into<PathBuf>, shell: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            shell: shell.into(),
            refresh: true,
        }
    }

    /// Detects the profile file of the given shell (as in `$SHELL`).
    pub(crate) fn detect(shell: Option<&str>, os: OsFamily, home: &Path) -> Self {
        let shell = shell
            .map(Path::new)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        trace!(shell, ?os);

        let (file, shell) = match (shell.as_str(), os) {
            ("zsh", _) => (".zshrc", "zsh"),
            // login shells on macOS don't read .bashrc
            ("bash", OsFamily::MacOs) => (".bash_profile", "bash"),
            ("bash", _) => (".bashrc", "bash"),
            _ => (".profile", DEFAULT_SHELL),
        };

        Self::new(home.join(file), shell)
    }

    /// Whether to re-source the profile after changing it.
    pub(crate) fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;

        self
    }

    /// Returns the path of the profile file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    // Checks whether the profile already contains the given line (ignoring surrounding whitespace).
    #[doc(hidden)]
    fn contains_line(&self, line: &str) -> io::Result<bool> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };

        for l in BufReader::new(file).lines() {
            if l?.trim() == line.trim() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    // Checks whether the profile is non-empty and does not end with a line break.
    #[doc(hidden)]
    fn needs_line_break(&self) -> io::Result<bool> {
        match fs::read(&self.path) {
            Ok(content) => Ok(content.last().is_some_and(|b| *b != b'\n')),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl EnvironmentTarget for ProfileTarget {
    fn describe(&self) -> String {
        self.path().to_string_lossy().to_string()
    }

    #[instrument(level = "trace", skip(self), fields(profile = %self.path.display()))]
    fn configure(&mut self, java_home: &Path) -> anyhow::Result<Outcome> {
        let export_line = export_java_home_line(java_home);
        if self.contains_line(&export_line)? {
            debug!("profile already exports java home");
            return Ok(Outcome::Skipped);
        }

        let needs_line_break = self.needs_line_break()?;
        let mut profile = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_line_break {
            writeln!(profile)?;
        }
        writeln!(profile, "{export_line}")?;
        writeln!(profile, "{EXPORT_PATH_LINE}")?;
        profile.flush()?;

        Ok(Outcome::Done)
    }

    #[instrument(level = "trace", skip(self), fields(profile = %self.path.display()))]
    fn refresh(&mut self) -> anyhow::Result<Outcome> {
        if !self.refresh {
            return Ok(Outcome::Skipped);
        }

        let script = source_script(&self.path);
        let status = Command::new(&self.shell)
            .args(["-i", "-c", &script])
            .stdin(Stdio::null()) // disconnect from self
            .status()?;
        trace!(?status);
        if !status.success() {
            return Err(anyhow!("{} exited with {status}", self.shell));
        }

        Ok(Outcome::Done)
    }
}

// Returns the script that re-sources the given profile, single-quoting its path.
#[doc(hidden)]
fn source_script(profile: &Path) -> String {
    let quoted = profile.to_string_lossy().replace('\'', r"'\''");
    format!("source '{quoted}' && echo 'Java environment sourced.'")
}
