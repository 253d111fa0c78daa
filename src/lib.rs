//! Photo Triage - keyboard-driven photo and video sorting
//!
//! This library provides the pieces of the triage viewer:
//! - Media discovery and classification
//! - Deterministic sort modes
//! - Hotkey routing to destination folders
//! - Hierarchy-preserving move/copy
//! - Video playback control with pluggable backends
//! - The navigation session and its terminal UI

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod playback;
pub mod preview;
pub mod routing;
pub mod session;
pub mod sort;
pub mod timer;
pub mod transfer;
pub mod tui;

pub use catalog::{MediaCatalog, MediaEntry, MediaKind};
pub use cli::Cli;
pub use config::{Config, ConfigError, FileTypes, TransferMode, VideoBackendKind};
pub use error::{Error, Result};
pub use playback::{PlaybackController, resolve_backend};
pub use routing::DestinationRouter;
pub use session::{NavigationSession, SessionSettings, SessionStats};
pub use sort::{SortMode, sort_entries};
pub use tui::TuiApp;
