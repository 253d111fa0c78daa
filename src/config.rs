//! Configuration types for photo triage

use crate::sort::SortMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What happens to a file when it is routed to a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Move files to the destination (default)
    #[default]
    Move,
    /// Copy files, leaving the source untouched
    Copy,
}

impl TransferMode {
    /// Past-tense verb for status messages
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Move => "Moved",
            TransferMode::Copy => "Copied",
        }
    }
}

/// Which kinds of media are offered for triage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileTypes {
    /// Photos only
    Photo,
    /// Videos only
    Video,
    /// Photos and videos
    #[default]
    All,
}

impl FileTypes {
    pub fn photos_allowed(&self) -> bool {
        matches!(self, FileTypes::Photo | FileTypes::All)
    }

    pub fn videos_allowed(&self) -> bool {
        matches!(self, FileTypes::Video | FileTypes::All)
    }
}

/// Video playback backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoBackendKind {
    /// Pick the best backend whose tools are installed
    #[default]
    Auto,
    /// Decode frames through an ffmpeg pipe
    Frames,
    /// Track a playback clock from ffprobe metadata (no frames)
    Clock,
    /// Disable video playback
    None,
}

/// Configuration for photo triage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Move or copy
    pub transfer_mode: TransferMode,

    /// Ordering of the triage sequence
    pub sort: SortMode,

    /// Kinds of media to offer
    pub file_types: FileTypes,

    /// Video backend selection
    pub video_backend: VideoBackendKind,

    /// Progress poll interval for live videos, in milliseconds
    pub poll_interval_ms: u64,

    /// Seek step for the left/right keys, in milliseconds
    pub seek_step_ms: u64,

    /// Seek step for the up/down keys, in milliseconds
    pub long_seek_step_ms: u64,

    /// Delay between the completion message and shutdown, in milliseconds
    pub completion_delay_ms: u64,

    /// Directory for log files (defaults to `Log` next to the executable)
    pub log_dir: Option<PathBuf>,

    /// Verbose logging
    pub verbose: bool,

    /// Supported image extensions
    pub image_extensions: Vec<String>,

    /// Supported video extensions
    pub video_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transfer_mode: TransferMode::default(),
            sort: SortMode::default(),
            file_types: FileTypes::default(),
            video_backend: VideoBackendKind::default(),
            poll_interval_ms: 500,
            seek_step_ms: 5_000,
            long_seek_step_ms: 30_000,
            completion_delay_ms: 3_000,
            log_dir: None,
            verbose: false,
            image_extensions: vec![
                "png".into(), "jpg".into(), "jpeg".into(), "gif".into(),
                "bmp".into(), "tiff".into(), "tif".into(), "webp".into(),
            ],
            video_extensions: vec![
                "mp4".into(), "mov".into(), "avi".into(), "mkv".into(),
                "webm".into(), "m4v".into(), "wmv".into(), "flv".into(),
                "3gp".into(),
            ],
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Check invariants the rest of the program relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be greater than zero".into()));
        }
        if let Some(ext) = self
            .image_extensions
            .iter()
            .find(|ext| self.video_extensions.iter().any(|v| v.eq_ignore_ascii_case(ext)))
        {
            return Err(ConfigError::Invalid(format!(
                "extension '{}' is listed as both image and video",
                ext
            )));
        }
        Ok(())
    }

    /// Lower-case every configured extension and strip leading dots
    pub fn normalize_extensions(&mut self) {
        for list in [&mut self.image_extensions, &mut self.video_extensions] {
            for ext in list.iter_mut() {
                *ext = ext.trim_start_matches('.').to_lowercase();
            }
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.normalize_extensions();

        Ok(config)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Configuration values violate an invariant
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::Invalid(message) => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_extensions_are_disjoint() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlapping_extensions_rejected() {
        let mut config = Config::default();
        config.video_extensions.push("gif".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triage.toml");
        fs::write(
            &path,
            r#"
transfer_mode = "copy"
sort = "natural-rev"
video_backend = "none"
image_extensions = [".JPG", "png"]
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.transfer_mode, TransferMode::Copy);
        assert_eq!(config.sort, SortMode::NaturalRev);
        assert_eq!(config.video_backend, VideoBackendKind::None);
        assert_eq!(config.image_extensions, vec!["jpg".to_string(), "png".to_string()]);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.completion_delay_ms, 3_000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load_from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_file_types_filters() {
        assert!(FileTypes::All.photos_allowed() && FileTypes::All.videos_allowed());
        assert!(FileTypes::Photo.photos_allowed() && !FileTypes::Photo.videos_allowed());
        assert!(!FileTypes::Video.photos_allowed() && FileTypes::Video.videos_allowed());
    }
}
