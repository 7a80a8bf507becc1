//! Probe.
//!
//! This module checks whether a java executable can be launched.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, instrument, trace};

/// Trait for checks whether java is installed.
pub(crate) trait Prober: fmt::Debug {
    /// Whether a java executable can be launched.
    fn is_installed(&self) -> bool;
}

/// [`Prober`] implementation that launches `java -version`.
#[derive(Debug)]
pub(crate) struct JavaProber {
    candidates: Vec<PathBuf>,
}

impl JavaProber {
    /// Creates a new `JavaProber` for the given candidate executables, probed in order.
    pub(crate) fn new<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Creates a new `JavaProber` for `$JAVA_HOME`, the given (provisioned) java home and the search path.
    pub(crate) fn with_java_home(java_home: Option<PathBuf>, java_exe: &str) -> Self {
        let from_env = env::var_os("JAVA_HOME").map(|home| PathBuf::from(home).join("bin").join(java_exe));
        let provisioned = java_home.map(|home| home.join("bin").join(java_exe));
        let on_path = Some(PathBuf::from(java_exe));

        Self::new([from_env, provisioned, on_path].into_iter().flatten())
    }

    /// Returns the candidate executables.
    pub(crate) fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl Prober for JavaProber {
    #[instrument(level = "trace", ret)]
    fn is_installed(&self) -> bool {
        self.candidates.iter().any(|java| {
            let result = Command::new(java)
                .arg("-version")
                .stdin(Stdio::null()) // disconnect from self
                .stderr(Stdio::null()) // disconnect from self
                .stdout(Stdio::null()) // disconnect from self
                .status();
            trace!(java = %java.display(), ?result);
            match result {
                Ok(_) => true,
                Err(err) => {
                    debug!(java = %java.display(), %err, "failed to launch java");
                    false
                }
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// [`Prober`] implementation answering from a script (the last answer repeats).
    #[derive(Debug)]
    pub(crate) struct ScriptedProber {
        answers: RefCell<VecDeque<bool>>,
    }

    impl ScriptedProber {
        pub(crate) fn new<I: IntoIterator<Item = bool>>(answers: I) -> Self {
            Self {
                answers: RefCell::new(answers.into_iter().collect()),
            }
        }
    }

    impl Prober for ScriptedProber {
        fn is_installed(&self) -> bool {
            let mut answers = self.answers.borrow_mut();
            if answers.len() > 1 {
                answers.pop_front().unwrap_or(false)
            } else {
                answers.front().copied().unwrap_or(false)
            }
        }
    }
}
