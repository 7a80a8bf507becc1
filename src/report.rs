//! Report.
//!
//! This module records what happened during a provisioning attempt.

use std::fmt;
use tracing::{debug, warn};

/// The outcome of a single step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Outcome {
    /// The step did its work.
    Done,
    /// Nothing to do (already satisfied or disabled).
    Skipped,
    /// The step failed, but the failure was not fatal.
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "done"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// The steps of a provisioning attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    /// Select the distribution for the host.
    Detect,
    /// Download the archive.
    Fetch,
    /// Unpack the archive.
    Extract,
    /// Persist the java home into the environment.
    Configure,
    /// Make the changed environment visible (re-source or `setx`).
    Refresh,
}

/// The stages of a provisioning attempt, in order.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) enum Stage {
    NotInstalled,
    Detecting,
    Downloading,
    Extracting,
    ConfiguringEnv,
    Verifying,
    Installed,
    StillNotInstalled,
}

/// The final status of a provisioning attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    /// Java was usable before anything was done.
    AlreadyInstalled,
    /// Java has been installed and is usable now.
    Installed,
    /// Java has been installed but is still not usable.
    StillNotInstalled,
    /// There is no distribution for the host.
    Unsupported,
    /// Dry-run: nothing was changed.
    Planned,
}

/// The report of a provisioning attempt.
#[derive(Debug, Default)]
pub(crate) struct Report {
    stages: Vec<Stage>,
    status: Option<Status>,
    steps: Vec<(Step, Outcome)>,
}

impl Report {
    /// Creates a new (empty) `Report`.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Moves on to the given stage. Stages only move forward.
    pub(crate) fn enter(&mut self, stage: Stage) {
        debug_assert!(self.stages.last().is_none_or(|last| *last < stage), "stage must move forward");
        debug!(?stage, "entering stage");
        self.stages.push(stage);
    }

    /// Records the outcome of the given step.
    pub(crate) fn record(&mut self, step: Step, outcome: Outcome) {
        debug!(?step, %outcome, "step finished");
        self.steps.push((step, outcome));
    }

    /// Runs the given best-effort operation and records its outcome. Errors are logged, not propagated.
    pub(crate) fn attempt<F>(&mut self, step: Step, op: F) -> Outcome
    where
        F: FnOnce() -> anyhow::Result<Outcome>,
    {
        let outcome = match op() {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(?step, ?err, "best-effort step failed");
                Outcome::Failed(format!("{err:#}"))
            }
        };
        self.record(step, outcome.clone());

        outcome
    }

    /// Concludes the attempt with the given status.
    pub(crate) fn finish(&mut self, status: Status) {
        debug!(?status, "finished");
        self.status = Some(status);
    }

    /// Returns the final status, if the attempt has been concluded.
    pub(crate) fn status(&self) -> Option<Status> {
        self.status
    }

    /// Returns the stages passed, in order.
    pub(crate) fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the outcome of the given step, if it has been run.
    pub(crate) fn outcome(&self, step: Step) -> Option<&Outcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, outcome)| outcome)
    }

    /// Returns all recorded steps.
    pub(crate) fn steps(&self) -> &[(Step, Outcome)] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use anyhow::anyhow;
    use test_log::test;

    #[test]
    fn attempt_records_failure() {
        let mut report = Report::new();
        let outcome = report.attempt(Step::Refresh, || Err(anyhow!("no shell")));
        assert_eq!(Outcome::Failed("no shell".to_string()), outcome);
        assert_eq!(Some(&outcome), report.outcome(Step::Refresh));
    }

    #[test]
    fn attempt_records_success() {
        let mut report = Report::new();
        report.attempt(Step::Configure, || Ok(Outcome::Skipped));
        assert_eq!(Some(&Outcome::Skipped), report.outcome(Step::Configure));
        assert_eq!(None, report.outcome(Step::Refresh));
    }

    #[test]
    fn stages_in_order() {
        let mut report = Report::new();
        report.enter(Stage::NotInstalled);
        report.enter(Stage::Detecting);
        assert_eq!(&[Stage::NotInstalled, Stage::Detecting], report.stages());
    }
}
