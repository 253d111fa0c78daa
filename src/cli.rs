//! CLI argument parsing with clap

use crate::config::{Config, FileTypes, TransferMode, VideoBackendKind};
use crate::error::{Error, Result};
use crate::routing::{MAX_DESTINATIONS, MIN_DESTINATIONS};
use crate::sort::SortMode;
use clap::Parser;
use std::path::PathBuf;

/// Photo Triage - sort photos and videos into folders one keystroke at a time
///
/// Shows every photo and video under SOURCE in turn. Press a destination's
/// key to move (or copy) the file there, keeping its path relative to
/// SOURCE. Destinations are bound to 1-9, then A-Z.
#[derive(Parser, Debug)]
#[command(name = "photo-triage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Move or copy routed files [default: move]
    #[arg(long, value_enum)]
    pub mode: Option<TransferMode>,

    /// Order of the files: name, name-rev, natural, natural-rev, created,
    /// created-rev, modified, modified-rev, size, size-rev [default: name]
    #[arg(long)]
    pub sort: Option<SortMode>,

    /// Kinds of media to offer [default: all]
    #[arg(long, value_enum)]
    pub filetypes: Option<FileTypes>,

    /// Video playback backend [default: auto]
    #[arg(long, value_enum)]
    pub video_backend: Option<VideoBackendKind>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Directory to triage
    pub source: PathBuf,

    /// Destination directories, at least two
    #[arg(required = true, num_args = 1..)]
    pub destinations: Vec<PathBuf>,
}

impl Cli {
    /// Check the destination count
    pub fn validate(&self) -> Result<()> {
        let count = self.destinations.len();
        if count < MIN_DESTINATIONS {
            return Err(Error::Validation(format!(
                "at least {} destination directories are required, got {}",
                MIN_DESTINATIONS, count
            )));
        }
        if count > MAX_DESTINATIONS {
            return Err(Error::TooManyDestinations { count });
        }
        Ok(())
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.transfer_mode = mode;
        }
        if let Some(sort) = self.sort {
            config.sort = sort;
        }
        if let Some(file_types) = self.filetypes {
            config.file_types = file_types;
        }
        if let Some(backend) = self.video_backend {
            config.video_backend = backend;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

/// Process exit code for a clap parse failure: 0 for help/version, 1 otherwise
pub fn exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("photo-triage").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["src", "keep", "trash"]).unwrap();
        assert_eq!(cli.source, PathBuf::from("src"));
        assert_eq!(cli.destinations.len(), 2);
        cli.validate().unwrap();

        let config = cli.to_config();
        assert_eq!(config.transfer_mode, TransferMode::Move);
        assert_eq!(config.sort, SortMode::Name);
        assert_eq!(config.file_types, FileTypes::All);
        assert_eq!(config.video_backend, VideoBackendKind::Auto);
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--mode",
            "copy",
            "--sort",
            "natural-rev",
            "--filetypes",
            "video",
            "--video-backend",
            "clock",
            "-v",
            "--json-log",
            "src",
            "a",
            "b",
            "c",
        ])
        .unwrap();
        let config = cli.to_config();
        assert_eq!(config.transfer_mode, TransferMode::Copy);
        assert_eq!(config.sort, SortMode::NaturalRev);
        assert_eq!(config.file_types, FileTypes::Video);
        assert_eq!(config.video_backend, VideoBackendKind::Clock);
        assert!(config.verbose);
        assert!(cli.json_log);
        assert_eq!(cli.destinations.len(), 3);
    }

    #[test]
    fn test_sort_accepts_label() {
        let cli = parse(&["--sort", "Size (largest first)", "src", "a", "b"]).unwrap();
        assert_eq!(cli.sort, Some(SortMode::SizeRev));
    }

    #[test]
    fn test_bad_values_exit_with_one() {
        let err = parse(&["--sort", "random", "src", "a", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(exit_code(&err), 1);

        let err = parse(&["--mode", "link", "src", "a", "b"]).unwrap_err();
        assert_eq!(exit_code(&err), 1);

        let err = parse(&["--frobnicate", "src", "a", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(exit_code(&err), 1);

        let err = parse(&["src"]).unwrap_err();
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_help_exits_with_zero() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(exit_code(&err), 0);

        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(exit_code(&err), 0);
    }

    #[test]
    fn test_destination_count_validation() {
        let cli = parse(&["src", "only"]).unwrap();
        assert!(matches!(cli.validate(), Err(Error::Validation(_))));

        let mut args = vec!["src".to_string()];
        args.extend((0..36).map(|i| format!("d{}", i)));
        let cli = Cli::try_parse_from(std::iter::once("photo-triage".to_string()).chain(args)).unwrap();
        assert!(matches!(
            cli.validate(),
            Err(Error::TooManyDestinations { count: 36 })
        ));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file = Config {
            transfer_mode: TransferMode::Copy,
            sort: SortMode::Created,
            poll_interval_ms: 250,
            ..Config::default()
        };

        let cli = parse(&["--sort", "size", "src", "a", "b"]).unwrap();
        let merged = cli.merge_with_config(file);
        assert_eq!(merged.transfer_mode, TransferMode::Copy);
        assert_eq!(merged.sort, SortMode::Size);
        assert_eq!(merged.poll_interval_ms, 250);
    }
}
