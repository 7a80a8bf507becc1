//! Arguments.
//!
//! This module contains the definition for the available command-line parameter.

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(author)]
pub(crate) struct Args {
    /// Sets a custom config file
    #[clap(short, long, value_name = "file")]
    pub(crate) config: Option<String>,
    /// Only detect and print what would be done
    #[clap(short = 'n', long, action)]
    pub(crate) dry_run: bool,
    /// Install java with the system package manager instead of a release archive
    #[clap(short = 'p', long, action)]
    pub(crate) package_manager: bool,
    /// Suppress unnecessary information
    #[clap(short = 'q', long, action)]
    pub(crate) quiet: bool,
    /// Change level of verbosity (apply multiple times to increase level)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
    /// Print version information
    #[clap(short = 'V', long, action)]
    pub(crate) version: bool,
}

#[cfg(test)]
mod tests {

    use super::*;
    use test_log::test;

    #[test]
    fn no_args() {
        let args = Args::try_parse_from(["program"]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.dry_run);
        assert!(!args.package_manager);
    }

    #[test]
    fn config_without_file() {
        let args = Args::try_parse_from(["program", "--config"]);
        assert!(args.is_err());
    }

    #[test]
    fn config_with_file() {
        let args = Args::try_parse_from(["program", "--config", "file"]).unwrap();
        assert_eq!(args.config, Some("file".into()));
    }

    #[test]
    fn package_manager_short() {
        let args = Args::try_parse_from(["program", "-p", "-n"]).unwrap();
        assert!(args.package_manager);
        assert!(args.dry_run);
    }

    #[test]
    fn verbose_counts() {
        let args = Args::try_parse_from(["program", "-vvv"]).unwrap();
        assert_eq!(args.verbose, 3);
    }
}
