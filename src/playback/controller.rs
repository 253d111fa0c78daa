//! Playback state machine
//!
//! ```text
//! Idle ──load──▶ Loading ──ok──▶ Playing ⇄ Paused
//!                   │                 │
//!                   └──error──▶ Stopped ◀──stop / exhausted
//! ```
//!
//! The controller owns at most one backend handle. Every exit path goes
//! through [`PlaybackController::stop`], which cancels the poll timer before
//! the handle is released. Polls also carry a generation number, so a poll
//! scheduled for an earlier session is ignored.

use super::backend::{BackendState, Transport, VideoBackend, VideoHandle};
use crate::error::{Error, Result};
use crate::preview::{Frame, PreviewBudget};
use crate::timer::{TimerId, TimerKind, TimerQueue};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
}

/// Snapshot for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    pub position_ms: u64,
    /// `None` while unknown
    pub duration_ms: Option<u64>,
    pub paused: bool,
    /// Frame stream ran out and the retry failed
    pub exhausted: bool,
}

struct PlaybackSession {
    path: PathBuf,
    handle: Box<dyn VideoHandle>,
    /// 0 while unknown
    duration_ms: u64,
    position_ms: u64,
    paused: bool,
    poll_timer: Option<TimerId>,
}

impl PlaybackSession {
    fn known_duration(&self) -> Option<u64> {
        (self.duration_ms > 0).then_some(self.duration_ms)
    }

    /// Cache the duration once the backend reports one
    fn refresh_duration(&mut self) {
        if let Some(duration) = self.handle.duration_ms().filter(|d| *d > 0)
            && duration != self.duration_ms
        {
            debug!(path = ?self.path, duration, "Duration known");
            self.duration_ms = duration;
        }
    }
}

/// Seek destination, clamped to `[0, duration]` (or `[0, ∞)` when unknown)
pub fn seek_target(current_ms: u64, delta_ms: i64, duration_ms: Option<u64>) -> u64 {
    let target = (current_ms as i64).saturating_add(delta_ms).max(0) as u64;
    match duration_ms {
        Some(duration) => target.min(duration),
        None => target,
    }
}

pub struct PlaybackController {
    backend: Box<dyn VideoBackend>,
    session: Option<PlaybackSession>,
    phase: PlaybackPhase,
    poll_interval: Duration,
    generation: u64,
    last_frame: Option<Frame>,
    last_status: Option<PlaybackStatus>,
}

impl PlaybackController {
    pub fn new(backend: Box<dyn VideoBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            session: None,
            phase: PlaybackPhase::Idle,
            poll_interval,
            generation: 0,
            last_frame: None,
            last_status: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// A live handle exists
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Most recent decoded frame of the current video
    pub fn frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn status(&self) -> Option<PlaybackStatus> {
        match &self.session {
            Some(session) => Some(PlaybackStatus {
                phase: self.phase,
                position_ms: session.position_ms,
                duration_ms: session.known_duration(),
                paused: session.paused,
                exhausted: false,
            }),
            None => self.last_status,
        }
    }

    /// Tear down any current video and start `path`
    pub fn load(
        &mut self,
        path: &Path,
        budget: PreviewBudget,
        timers: &mut TimerQueue,
        now: Instant,
    ) -> Result<()> {
        self.stop(timers);

        if !self.backend.is_available() {
            return Err(Error::BackendUnavailable);
        }

        self.phase = PlaybackPhase::Loading;
        let mut handle = match self.backend.open(path, budget) {
            Ok(handle) => handle,
            Err(e) => {
                self.phase = PlaybackPhase::Stopped;
                warn!(?path, error = %e, "Video open failed");
                return Err(e);
            }
        };

        if let Err(e) = handle.play() {
            handle.release();
            self.phase = PlaybackPhase::Stopped;
            warn!(?path, error = %e, "Video start failed");
            return Err(Error::PlaybackOpen {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }

        if handle.transport() == Transport::FrameStream {
            match handle.read_frame() {
                Ok(frame) => self.last_frame = frame,
                Err(e) => debug!(?path, error = %e, "No first frame"),
            }
        }

        self.generation += 1;
        let poll_timer = timers.schedule(
            now,
            self.poll_interval,
            TimerKind::PlaybackPoll {
                generation: self.generation,
            },
        );

        self.session = Some(PlaybackSession {
            path: path.to_path_buf(),
            handle,
            duration_ms: 0,
            position_ms: 0,
            paused: false,
            poll_timer: Some(poll_timer),
        });
        self.phase = PlaybackPhase::Playing;
        info!(?path, backend = self.backend.name(), "Playback started");
        Ok(())
    }

    /// Progress poll; returns whether anything visible changed
    pub fn on_poll(&mut self, generation: u64, timers: &mut TimerQueue, now: Instant) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Stale poll ignored");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.poll_timer = None;

        let exhausted = match session.handle.transport() {
            Transport::Timeline => {
                session.position_ms = session.handle.position_ms();
                session.refresh_duration();
                false
            }
            Transport::FrameStream if session.paused => false,
            Transport::FrameStream => {
                session.refresh_duration();
                match next_frame_with_retry(session.handle.as_mut()) {
                    Some(frame) => {
                        session.position_ms = session.handle.position_ms();
                        self.last_frame = Some(frame);
                        false
                    }
                    None => true,
                }
            }
        };

        if exhausted {
            info!(path = ?session.path, "Video exhausted, keeping last frame");
            let status = PlaybackStatus {
                phase: PlaybackPhase::Stopped,
                position_ms: session.position_ms,
                duration_ms: session.known_duration(),
                paused: false,
                exhausted: true,
            };
            let frame = self.last_frame.take();
            self.stop(timers);
            self.last_frame = frame;
            self.last_status = Some(status);
            return true;
        }

        session.poll_timer = Some(timers.schedule(
            now,
            self.poll_interval,
            TimerKind::PlaybackPoll {
                generation: self.generation,
            },
        ));
        true
    }

    /// Flip pause; returns the new paused flag
    pub fn toggle_pause(&mut self) -> Result<bool> {
        if !matches!(self.phase, PlaybackPhase::Playing | PlaybackPhase::Paused) {
            return Err(Error::Playback("no video is playing".into()));
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Playback("no video is playing".into()))?;

        let paused = !session.paused;
        session.handle.set_paused(paused)?;
        session.paused = paused;
        self.phase = if paused {
            PlaybackPhase::Paused
        } else {
            PlaybackPhase::Playing
        };
        debug!(path = ?session.path, paused, "Pause toggled");
        Ok(paused)
    }

    /// Reopen the current video at `budget`, keeping its position and pause
    pub fn reload(
        &mut self,
        budget: PreviewBudget,
        timers: &mut TimerQueue,
        now: Instant,
    ) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Err(Error::Playback("no video is playing".into()));
        };
        let path = session.path.clone();
        let position = session.handle.position_ms();
        let paused = session.paused;

        self.load(&path, budget, timers, now)?;
        if position > 0 {
            self.seek_with(|_, duration| seek_target(position, 0, duration))?;
        }
        if paused {
            self.toggle_pause()?;
        }
        debug!(?path, position, paused, "Playback reloaded");
        Ok(())
    }

    /// Seek by `delta_ms`; returns the target position
    pub fn seek(&mut self, delta_ms: i64) -> Result<u64> {
        self.seek_with(|current, duration| seek_target(current, delta_ms, duration))
    }

    fn seek_with(&mut self, target_for: impl FnOnce(u64, Option<u64>) -> u64) -> Result<u64> {
        if !matches!(self.phase, PlaybackPhase::Playing | PlaybackPhase::Paused) {
            return Err(Error::Playback("no video is playing".into()));
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Playback("no video is playing".into()))?;

        session.refresh_duration();
        let current = session.handle.position_ms();
        let duration = session.known_duration();
        let target = target_for(current, duration);

        // A finished handle may refuse to seek, so restart it first
        let finished = matches!(
            session.handle.state(),
            BackendState::Ended | BackendState::Stopped
        );
        if finished && duration.is_some_and(|d| target < d) {
            debug!(path = ?session.path, "Restarting finished stream before seek");
            session.handle.play()?;
            if session.paused {
                session.handle.set_paused(true)?;
            }
        }

        session.handle.seek_ms(target)?;
        session.position_ms = target;

        if session.handle.transport() == Transport::FrameStream
            && let Ok(Some(frame)) = session.handle.read_frame()
        {
            self.last_frame = Some(frame);
        }

        debug!(path = ?session.path, current, target, "Seek");
        Ok(target)
    }

    /// Cancel the poll timer and release the handle; safe from any state
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        if let Some(mut session) = self.session.take() {
            if let Some(id) = session.poll_timer.take() {
                timers.cancel(id);
            }
            session.handle.release();
            self.generation += 1;
            debug!(path = ?session.path, "Playback stopped");
        }
        if self.phase != PlaybackPhase::Idle {
            self.phase = PlaybackPhase::Stopped;
        }
        self.last_frame = None;
        self.last_status = None;
    }
}

/// Next frame, rewinding once at end of stream
fn next_frame_with_retry(handle: &mut dyn VideoHandle) -> Option<Frame> {
    match handle.read_frame() {
        Ok(Some(frame)) => return Some(frame),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Frame read failed"),
    }

    if let Err(e) = handle.rewind() {
        warn!(error = %e, "Rewind failed");
        return None;
    }
    match handle.read_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Frame read after rewind failed");
            None
        }
    }
}
