//! Provision.
//!
//! This module drives a provisioning attempt: probe, detect, download, unpack, configure the environment and probe again.

use crate::colors::*;
use crate::config::Config;
use crate::environment::{self, EnvironmentTarget};
use crate::fallback::{self, FallbackError};
use crate::layout::Layout;
use crate::package::{self, Fetcher};
use crate::platform::{HostPlatform, OsFamily};
use crate::probe::{JavaProber, Prober};
use crate::report::{Outcome, Report, Stage, Status, Step};
use tracing::{debug, instrument, warn};

/// Factory for the environment target of an operating system family.
pub(crate) type TargetFactory<'a> = dyn Fn(OsFamily) -> anyhow::Result<Box<dyn EnvironmentTarget>> + 'a;

/// Struct that holds everything to provision java from a release archive.
pub(crate) struct Provisioner<'a> {
    download_base: String,
    dry_run: bool,
    fetcher: &'a Fetcher,
    host: HostPlatform,
    layout: Layout,
    prober: &'a dyn Prober,
    targets: &'a TargetFactory<'a>,
}

impl<'a> Provisioner<'a> {
    /// Creates a new `Provisioner`.
    pub(crate) fn new(host: HostPlatform, layout: Layout, fetcher: &'a Fetcher, prober: &'a dyn Prober, targets: &'a TargetFactory<'a>) -> Self {
        Self {
            download_base: crate::platform::DOWNLOAD_BASE.to_string(),
            dry_run: false,
            fetcher,
            host,
            layout,
            prober,
            targets,
        }
    }

    /// Sets the base URL below which the releases are downloaded.
    pub(crate) fn download_base(&mut self, download_base: impl Into<String>) -> &mut Self {
        self.download_base = download_base.into();

        self
    }

    /// Whether to perform the installation or not.
    pub(crate) fn dry_run(&mut self, dry_run: bool) -> &mut Self {
        self.dry_run = dry_run;

        self
    }

    /// Runs the provisioning attempt.
    ///
    /// Download and unpack failures are returned as error. Failures to configure the environment are recorded in the
    /// report only. Nothing is rolled back.
    #[instrument(level = "trace", skip(self), fields(host = %self.host))]
    pub(crate) fn run(&self) -> anyhow::Result<Report> {
        let mut report = Report::new();

        if self.prober.is_installed() {
            report.finish(Status::AlreadyInstalled);
            return Ok(report);
        }
        report.enter(Stage::NotInstalled);
        println!("{}", PROGRESS_COLOR.paint("Java is not installed. Installing..."));

        // detect
        report.enter(Stage::Detecting);
        let distribution = match self.host.detect() {
            Ok(distribution) => distribution,
            Err(err) => {
                println!("{}", ATTENTION_COLOR.paint(err.to_string()));
                report.record(Step::Detect, Outcome::Failed(err.to_string()));
                report.finish(Status::Unsupported);
                return Ok(report);
            }
        };
        report.record(Step::Detect, Outcome::Done);
        debug!(%distribution);

        let url = distribution.download_url(&self.download_base)?;
        let archive = self.layout.archive(&distribution);
        let install_dir = self.layout.install_dir();
        let java_home = self.layout.java_home(&distribution);

        if self.dry_run {
            let not = ATTENTION_COLOR.paint("NOT");
            println!("dry-run: {not} downloading {} to {}", PATH_COLOR.paint(url.as_str()), PATH_COLOR.paint(archive.to_string_lossy()));
            println!("dry-run: {not} unpacking to {}", PATH_COLOR.paint(install_dir.to_string_lossy()));
            println!("dry-run: {not} setting JAVA_HOME to {}", PATH_COLOR.paint(java_home.to_string_lossy()));
            report.finish(Status::Planned);
            return Ok(report);
        }

        // download
        report.enter(Stage::Downloading);
        println!("Downloading {} [{}]", PATH_COLOR.paint(url.as_str()), INFO_COLOR.paint(distribution.to_string()));
        let outcome = self.fetcher.fetch(&url, &archive)?;
        if outcome == Outcome::Skipped {
            println!("{} already exists.", PATH_COLOR.paint(archive.to_string_lossy()));
        }
        report.record(Step::Fetch, outcome);

        // unpack
        report.enter(Stage::Extracting);
        println!("Extracting {}", PATH_COLOR.paint(archive.to_string_lossy()));
        let outcome = package::unpack(distribution.format(), &archive, &install_dir)?;
        if outcome == Outcome::Skipped {
            println!("{} already exists.", PATH_COLOR.paint(install_dir.to_string_lossy()));
        }
        report.record(Step::Extract, outcome);

        // configure environment (best-effort)
        report.enter(Stage::ConfiguringEnv);
        self.configure_env(distribution.os, &java_home, &mut report);

        // verify
        report.enter(Stage::Verifying);
        if self.prober.is_installed() {
            report.enter(Stage::Installed);
            report.finish(Status::Installed);
        } else {
            report.enter(Stage::StillNotInstalled);
            report.finish(Status::StillNotInstalled);
        }

        Ok(report)
    }

    // Persists the java home into the environment. Failures are recorded, never propagated.
    #[doc(hidden)]
    fn configure_env(&self, os: OsFamily, java_home: &std::path::Path, report: &mut Report) {
        let mut target = match (self.targets)(os) {
            Ok(target) => target,
            Err(err) => {
                warn!(?err, "no environment target");
                report.record(Step::Configure, Outcome::Failed(format!("{err:#}")));
                return;
            }
        };

        let target_str = PATH_COLOR.paint(target.describe());
        println!("Setting JAVA_HOME in {target_str}");
        let outcome = report.attempt(Step::Configure, || target.configure(java_home));
        match outcome {
            Outcome::Done => {
                println!("JDK environment variables set.");
                report.attempt(Step::Refresh, || target.refresh());
            }
            Outcome::Skipped => {
                println!("JDK environment variables already set.");
                report.record(Step::Refresh, Outcome::Skipped);
            }
            Outcome::Failed(reason) => {
                let reason = ATTENTION_COLOR.paint(reason);
                eprintln!("Failed to set JDK environment variables in {target_str}!\r\n\t{reason}");
            }
        }
    }
}

/// Makes sure java is installed, installing it if necessary.
///
/// Installation problems are reported on the console. Only a missing package manager (with `package_manager` set) is
/// returned to the caller.
pub(crate) fn ensure_java(host: &HostPlatform, layout: &Layout, config: &Config, dry_run: bool, package_manager: bool) -> Result<(), FallbackError> {
    let distribution = host.detect().ok();
    let java_exe = distribution.as_ref().map_or(if cfg!(windows) { "java.exe" } else { "java" }, |distribution| distribution.java_exe());
    let java_home = distribution.as_ref().map(|distribution| layout.java_home(distribution));
    let prober = JavaProber::with_java_home(java_home, java_exe);
    debug!(candidates = ?prober.candidates());

    if package_manager {
        if prober.is_installed() {
            print_installed();
            return Ok(());
        }
        println!("{}", PROGRESS_COLOR.paint("Java is not installed. Installing..."));
        fallback::install(host, &fallback::system_root(), dry_run)?;
        if !dry_run {
            print_verification(prober.is_installed());
        }
        return Ok(());
    }

    let fetcher = Fetcher::new();
    let home = layout.home().to_path_buf();
    let refresh = config.refresh_shell;
    let targets = move |os: OsFamily| environment::for_host(os, &home, refresh);
    let mut provisioner = Provisioner::new(host.clone(), layout.clone(), &fetcher, &prober, &targets);
    provisioner //
        .download_base(&config.download_base)
        .dry_run(dry_run);

    match provisioner.run() {
        Ok(report) => {
            debug!(steps = ?report.steps(), stages = ?report.stages());
            match report.status() {
                Some(Status::AlreadyInstalled) => print_installed(),
                Some(Status::Installed) => print_verification(true),
                Some(Status::StillNotInstalled) => print_verification(false),
                Some(Status::Unsupported | Status::Planned) | None => {}
            }
        }
        Err(err) => {
            eprintln!("{}", ATTENTION_COLOR.paint(format!("Error: {err:#}")));
            eprintln!("{}", ATTENTION_COLOR.paint("Please report the problem together with the output of a run with -vvv."));
        }
    }

    Ok(())
}

// Prints that java is installed.
#[doc(hidden)]
fn print_installed() {
    println!("{}", SUCCESS_COLOR.paint("Java is installed."));
}

// Prints the result of the verification after an installation.
#[doc(hidden)]
fn print_verification(installed: bool) {
    if installed {
        println!("{}", SUCCESS_COLOR.paint("Java installation complete."));
        return;
    }

    println!("{}", ATTENTION_COLOR.paint("Java is still not installed correctly. Please follow the instructions below."));
    for step in REMEDIATION_STEPS {
        println!("{}", HINT_COLOR.paint(*step));
    }
    println!("{}", ATTENTION_COLOR.paint("If you encounter any problems, please report them together with the output of a run with -vvv."));
}

// The manual steps to install java.
#[doc(hidden)]
const REMEDIATION_STEPS: &[&str] = &[
    "Step 1: Visit https://adoptium.net/ to download and install OpenJDK (Eclipse Adoptium).",
    "Step 2: Choose the appropriate JDK version for your operating system.",
    "Step 3: Follow the installation instructions provided on the website.",
    "Step 4: After installation, make sure JAVA_HOME and PATH are set correctly.",
];
