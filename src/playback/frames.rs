//! FFmpeg frame-stream backend
//!
//! Spawns `ffmpeg` to decode raw RGB frames at one frame per poll interval,
//! scaled and padded to the viewer budget. There is no clock in this model:
//! the position is derived from the number of frames read, pausing simply
//! stops pulling frames, and seeking restarts the decoder at an offset.

use super::backend::{BackendState, Transport, VideoBackend, VideoHandle};
use super::probe::{is_ffprobe_available, probe_duration_ms};
use crate::error::{Error, Result};
use crate::preview::{Frame, PreviewBudget};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FrameStreamBackend {
    frame_interval: Duration,
}

impl FrameStreamBackend {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }
}

impl VideoBackend for FrameStreamBackend {
    fn name(&self) -> &'static str {
        "ffmpeg-frames"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open(&mut self, path: &Path, budget: PreviewBudget) -> Result<Box<dyn VideoHandle>> {
        let duration_ms = if is_ffprobe_available() {
            probe_duration_ms(path).unwrap_or_else(|e| {
                warn!(?path, error = %e, "Duration probe failed");
                None
            })
        } else {
            None
        };

        let mut handle = FrameStreamHandle {
            path: path.to_path_buf(),
            budget,
            frame_interval_ms: (self.frame_interval.as_millis() as u64).max(1),
            duration_ms,
            decoder: None,
            start_ms: 0,
            frames_read: 0,
            pending: None,
            paused: false,
            ended: false,
            released: false,
        };

        // Decode the first frame now so unreadable files fail at open time
        handle.restart_at(0)?;
        match handle.pull_frame()? {
            Some(frame) => handle.pending = Some(frame),
            None => {
                handle.release();
                return Err(Error::PlaybackOpen {
                    path: path.to_path_buf(),
                    message: "ffmpeg produced no video frames".into(),
                });
            }
        }

        Ok(Box::new(handle))
    }
}

struct Decoder {
    child: Child,
    stdout: ChildStdout,
}

pub struct FrameStreamHandle {
    path: PathBuf,
    budget: PreviewBudget,
    frame_interval_ms: u64,
    duration_ms: Option<u64>,
    decoder: Option<Decoder>,
    start_ms: u64,
    frames_read: u64,
    pending: Option<Frame>,
    paused: bool,
    ended: bool,
    released: bool,
}

impl FrameStreamHandle {
    fn frame_len(&self) -> usize {
        self.budget.width as usize * self.budget.height as usize * 3
    }

    fn filter(&self) -> String {
        let (w, h) = (self.budget.width, self.budget.height);
        format!(
            "fps=1000/{interval},scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            interval = self.frame_interval_ms,
        )
    }

    /// Replace the decoder with one starting at `start_ms`
    fn restart_at(&mut self, start_ms: u64) -> Result<()> {
        if self.released {
            return Err(Error::Playback("handle already released".into()));
        }
        self.kill_decoder();

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-ss"])
            .arg(format!("{:.3}", start_ms as f64 / 1000.0))
            .arg("-i")
            .arg(&self.path)
            .args(["-an", "-vf"])
            .arg(self.filter())
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::PlaybackOpen {
                path: self.path.clone(),
                message: format!("Failed to execute ffmpeg: {}", e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| Error::PlaybackOpen {
            path: self.path.clone(),
            message: "ffmpeg stdout unavailable".into(),
        })?;

        debug!(path = ?self.path, start_ms, "Decoder started");
        self.decoder = Some(Decoder { child, stdout });
        self.start_ms = start_ms;
        self.frames_read = 0;
        self.pending = None;
        self.ended = false;
        Ok(())
    }

    /// Read one frame from the decoder pipe
    fn pull_frame(&mut self) -> Result<Option<Frame>> {
        let len = self.frame_len();
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(None);
        };

        let mut pixels = vec![0u8; len];
        match decoder.stdout.read_exact(&mut pixels) {
            Ok(()) => {
                self.frames_read += 1;
                Ok(Frame::from_rgb(self.budget.width, self.budget.height, pixels))
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!(path = ?self.path, frames = self.frames_read, "End of stream");
                self.ended = true;
                self.kill_decoder();
                Ok(None)
            }
            Err(e) => Err(Error::Playback(format!("ffmpeg read failed: {}", e))),
        }
    }

    fn kill_decoder(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            let _ = decoder.child.kill();
            let _ = decoder.child.wait();
        }
    }
}

impl VideoHandle for FrameStreamHandle {
    fn transport(&self) -> Transport {
        Transport::FrameStream
    }

    fn play(&mut self) -> Result<()> {
        if self.ended || self.decoder.is_none() {
            self.restart_at(self.position_ms())?;
        }
        self.paused = false;
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.paused = paused;
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        let position = self.start_ms + self.frames_read.saturating_sub(1) * self.frame_interval_ms;
        match self.duration_ms {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    fn seek_ms(&mut self, target_ms: u64) -> Result<()> {
        self.restart_at(target_ms)
    }

    fn state(&self) -> BackendState {
        if self.released {
            BackendState::Stopped
        } else if self.ended {
            BackendState::Ended
        } else if self.paused {
            BackendState::Paused
        } else {
            BackendState::Playing
        }
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        if self.ended {
            return Ok(None);
        }
        self.pull_frame()
    }

    fn rewind(&mut self) -> Result<()> {
        self.restart_at(0)
    }

    fn release(&mut self) {
        self.kill_decoder();
        self.pending = None;
        self.released = true;
    }
}

impl Drop for FrameStreamHandle {
    fn drop(&mut self) {
        self.kill_decoder();
    }
}
