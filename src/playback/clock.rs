//! Clock backend
//!
//! Reads the duration with ffprobe and tracks the playback position with a
//! monotonic clock. It renders no frames, but gives the operator a working
//! timeline (pause, seek, end of stream) wherever ffmpeg itself is missing.

use super::backend::{BackendState, Transport, VideoBackend, VideoHandle};
use super::probe::probe_duration_ms;
use crate::error::{Error, Result};
use crate::preview::PreviewBudget;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ClockBackend;

impl ClockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VideoBackend for ClockBackend {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open(&mut self, path: &Path, _budget: PreviewBudget) -> Result<Box<dyn VideoHandle>> {
        let duration_ms = probe_duration_ms(path)?;
        debug!(?path, ?duration_ms, "Clock handle opened");
        Ok(Box::new(ClockHandle::new(duration_ms)))
    }
}

/// Position = `base_ms` plus time elapsed since `started` while running
#[derive(Debug)]
pub struct ClockHandle {
    duration_ms: Option<u64>,
    base_ms: u64,
    started: Option<Instant>,
    paused: bool,
    released: bool,
}

impl ClockHandle {
    pub fn new(duration_ms: Option<u64>) -> Self {
        Self {
            duration_ms,
            base_ms: 0,
            started: None,
            paused: false,
            released: false,
        }
    }

    fn clamp(&self, position_ms: u64) -> u64 {
        match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        }
    }

    pub fn position_at(&self, now: Instant) -> u64 {
        let elapsed = self
            .started
            .map(|started| now.saturating_duration_since(started).as_millis() as u64)
            .unwrap_or(0);
        self.clamp(self.base_ms + elapsed)
    }

    pub fn state_at(&self, now: Instant) -> BackendState {
        if self.released {
            BackendState::Stopped
        } else if self
            .duration_ms
            .is_some_and(|duration| self.position_at(now) >= duration)
        {
            BackendState::Ended
        } else if self.started.is_none() {
            if self.paused {
                BackendState::Paused
            } else {
                BackendState::Stopped
            }
        } else {
            BackendState::Playing
        }
    }

    pub fn play_at(&mut self, now: Instant) -> Result<()> {
        if self.released {
            return Err(Error::Playback("handle already released".into()));
        }
        // Playing a finished stream starts it over
        let position = self.position_at(now);
        self.base_ms = if self.duration_ms.is_some_and(|duration| position >= duration) {
            0
        } else {
            position
        };
        self.started = Some(now);
        self.paused = false;
        Ok(())
    }

    pub fn set_paused_at(&mut self, paused: bool, now: Instant) -> Result<()> {
        if self.released {
            return Err(Error::Playback("handle already released".into()));
        }
        if paused && self.started.is_some() {
            self.base_ms = self.position_at(now);
            self.started = None;
        } else if !paused && self.paused {
            self.started = Some(now);
        }
        self.paused = paused;
        Ok(())
    }

    /// A finished stream rejects seeks until playback is re-issued
    pub fn seek_at(&mut self, target_ms: u64, now: Instant) -> Result<()> {
        match self.state_at(now) {
            BackendState::Ended | BackendState::Stopped => {
                Err(Error::Playback("stream is not playing".into()))
            }
            BackendState::Playing | BackendState::Paused => {
                self.base_ms = self.clamp(target_ms);
                if self.started.is_some() {
                    self.started = Some(now);
                }
                Ok(())
            }
        }
    }
}

impl VideoHandle for ClockHandle {
    fn transport(&self) -> Transport {
        Transport::Timeline
    }

    fn play(&mut self) -> Result<()> {
        self.play_at(Instant::now())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.set_paused_at(paused, Instant::now())
    }

    fn position_ms(&self) -> u64 {
        self.position_at(Instant::now())
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    fn seek_ms(&mut self, target_ms: u64) -> Result<()> {
        self.seek_at(target_ms, Instant::now())
    }

    fn state(&self) -> BackendState {
        self.state_at(Instant::now())
    }

    fn release(&mut self) {
        self.released = true;
        self.started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_clock_advances_and_pauses() {
        let t0 = Instant::now();
        let mut handle = ClockHandle::new(Some(10_000));
        assert_eq!(handle.state_at(t0), BackendState::Stopped);

        handle.play_at(t0).unwrap();
        assert_eq!(handle.position_at(t0 + ms(1_500)), 1_500);
        assert_eq!(handle.state_at(t0 + ms(1_500)), BackendState::Playing);

        handle.set_paused_at(true, t0 + ms(2_000)).unwrap();
        assert_eq!(handle.position_at(t0 + ms(9_000)), 2_000);
        assert_eq!(handle.state_at(t0 + ms(9_000)), BackendState::Paused);

        handle.set_paused_at(false, t0 + ms(9_000)).unwrap();
        assert_eq!(handle.position_at(t0 + ms(9_500)), 2_500);
    }

    #[test]
    fn test_clock_ends_and_rejects_seek_until_replayed() {
        let t0 = Instant::now();
        let mut handle = ClockHandle::new(Some(3_000));
        handle.play_at(t0).unwrap();

        let later = t0 + ms(5_000);
        assert_eq!(handle.position_at(later), 3_000);
        assert_eq!(handle.state_at(later), BackendState::Ended);
        assert!(handle.seek_at(1_000, later).is_err());

        handle.play_at(later).unwrap();
        handle.seek_at(1_000, later).unwrap();
        assert_eq!(handle.state_at(later), BackendState::Playing);
        assert_eq!(handle.position_at(later + ms(200)), 1_200);
    }

    #[test]
    fn test_unknown_duration_never_ends() {
        let t0 = Instant::now();
        let mut handle = ClockHandle::new(None);
        handle.play_at(t0).unwrap();
        assert_eq!(handle.state_at(t0 + ms(3_600_000)), BackendState::Playing);
    }

    #[test]
    fn test_released_handle_is_stopped() {
        let t0 = Instant::now();
        let mut handle = ClockHandle::new(Some(1_000));
        handle.play_at(t0).unwrap();
        handle.release();
        assert_eq!(handle.state_at(t0), BackendState::Stopped);
        assert!(handle.play_at(t0).is_err());
    }
}
