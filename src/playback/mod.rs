//! Video playback: backends and the controller that drives them

pub mod backend;
pub mod clock;
pub mod controller;
pub mod frames;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendState, NullBackend, Transport, VideoBackend, VideoHandle, resolve_backend};
pub use controller::{PlaybackController, PlaybackPhase, PlaybackStatus};
