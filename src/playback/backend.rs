//! Video backend capability
//!
//! A backend opens files into handles. Which backend is used is decided
//! once at startup; when no tools are installed the [`NullBackend`] keeps
//! navigation working with playback disabled.

use super::clock::ClockBackend;
use super::frames::FrameStreamBackend;
use super::probe::{is_ffmpeg_available, is_ffprobe_available};
use crate::config::VideoBackendKind;
use crate::error::{Error, Result};
use crate::preview::{Frame, PreviewBudget};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// How a handle advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Position/duration timeline with play, pause and seek
    Timeline,
    /// Decoded frames pulled one at a time, no internal clock
    FrameStream,
}

/// State reported by the backend itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Playing,
    Paused,
    /// Reached the end of the stream
    Ended,
    /// Released or never started
    Stopped,
}

/// An open video
pub trait VideoHandle {
    fn transport(&self) -> Transport;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    fn set_paused(&mut self, paused: bool) -> Result<()>;

    fn position_ms(&self) -> u64;

    /// `None` until the backend knows it
    fn duration_ms(&self) -> Option<u64>;

    fn seek_ms(&mut self, target_ms: u64) -> Result<()>;

    fn state(&self) -> BackendState;

    /// Next decoded frame, `Ok(None)` at end of stream
    fn read_frame(&mut self) -> Result<Option<Frame>> {
        Ok(None)
    }

    /// Restart from the beginning
    fn rewind(&mut self) -> Result<()> {
        self.seek_ms(0)
    }

    /// Free decoder resources; the handle is unusable afterwards
    fn release(&mut self);
}

/// Opens videos for playback
pub trait VideoBackend {
    fn name(&self) -> &'static str;

    /// Capability flag; `false` means every `open` fails
    fn is_available(&self) -> bool;

    fn open(&mut self, path: &Path, budget: PreviewBudget) -> Result<Box<dyn VideoHandle>>;
}

/// Backend used when playback is disabled or no tools are installed
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl VideoBackend for NullBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn open(&mut self, _path: &Path, _budget: PreviewBudget) -> Result<Box<dyn VideoHandle>> {
        Err(Error::BackendUnavailable)
    }
}

/// Pick the backend for `kind`, checking installed tools once
pub fn resolve_backend(kind: VideoBackendKind, frame_interval: Duration) -> Box<dyn VideoBackend> {
    let backend: Box<dyn VideoBackend> = match kind {
        VideoBackendKind::None => Box::new(NullBackend),
        VideoBackendKind::Frames if is_ffmpeg_available() => {
            Box::new(FrameStreamBackend::new(frame_interval))
        }
        VideoBackendKind::Clock if is_ffprobe_available() => Box::new(ClockBackend::new()),
        VideoBackendKind::Auto => {
            if is_ffmpeg_available() {
                Box::new(FrameStreamBackend::new(frame_interval))
            } else if is_ffprobe_available() {
                Box::new(ClockBackend::new())
            } else {
                Box::new(NullBackend)
            }
        }
        VideoBackendKind::Frames | VideoBackendKind::Clock => {
            warn!(?kind, "Requested video backend tools not found, playback disabled");
            Box::new(NullBackend)
        }
    };

    info!(backend = backend.name(), "Video backend resolved");
    backend
}
