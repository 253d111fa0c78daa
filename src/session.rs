//! Navigation session
//!
//! Walks the ordered entries one at a time. Each key press either routes the
//! current file to a destination, skips it, quits, or controls the live
//! video. Timer callbacks (playback polls and the final shutdown) are fed in
//! by the host through [`NavigationSession::fire_due_timers`].

use crate::catalog::MediaEntry;
use crate::config::{Config, TransferMode};
use crate::playback::{PlaybackController, PlaybackStatus};
use crate::preview::{Frame, Preview, PreviewBudget, load_photo};
use crate::routing::{DestinationBinding, DestinationRouter};
use crate::timer::{TimerKind, TimerQueue};
use crate::transfer::transfer;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A key press as the session sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character other than space
    Char(char),
    Space,
    Left,
    Right,
    Up,
    Down,
    Tab,
    Esc,
    Enter,
    CtrlC,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    AwaitingInput(usize),
    /// Completion message shown, shutdown timer pending
    Completing,
    Terminated,
}

/// Tunables taken from [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub transfer_mode: TransferMode,
    pub seek_step_ms: u64,
    pub long_seek_step_ms: u64,
    pub completion_delay: Duration,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            transfer_mode: config.transfer_mode,
            seek_step_ms: config.seek_step_ms,
            long_seek_step_ms: config.long_seek_step_ms,
            completion_delay: config.completion_delay(),
        }
    }
}

/// Outcome counts for the post-session summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub transferred: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

pub struct NavigationSession {
    source_root: PathBuf,
    entries: Vec<MediaEntry>,
    cursor: isize,
    state: SessionState,
    router: DestinationRouter,
    settings: SessionSettings,
    controller: PlaybackController,
    timers: TimerQueue,
    budget: PreviewBudget,
    preview: Preview,
    notice: Option<String>,
    stats: SessionStats,
}

impl NavigationSession {
    pub fn new(
        source_root: impl Into<PathBuf>,
        entries: Vec<MediaEntry>,
        router: DestinationRouter,
        controller: PlaybackController,
        settings: SessionSettings,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            entries,
            cursor: -1,
            state: SessionState::Initializing,
            router,
            settings,
            controller,
            timers: TimerQueue::new(),
            budget: PreviewBudget::default(),
            preview: Preview::Empty,
            notice: None,
            stats: SessionStats::default(),
        }
    }

    /// Show the first entry, or finish straight away when there is none
    pub fn start(&mut self, budget: PreviewBudget, now: Instant) {
        if self.state != SessionState::Initializing {
            return;
        }
        self.budget = budget;
        info!(
            entries = self.entries.len(),
            destinations = self.router.bindings().len(),
            mode = ?self.settings.transfer_mode,
            backend = self.controller.backend_name(),
            "Session started"
        );
        self.advance(now);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&MediaEntry> {
        match self.state {
            SessionState::AwaitingInput(index) => self.entries.get(index),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn transfer_mode(&self) -> TransferMode {
        self.settings.transfer_mode
    }

    pub fn bindings(&self) -> &[DestinationBinding] {
        self.router.bindings()
    }

    pub fn budget(&self) -> PreviewBudget {
        self.budget
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Frame to draw: the live video frame when there is one
    pub fn frame(&self) -> Option<&Frame> {
        match (&self.preview, self.controller.frame()) {
            (_, Some(frame)) => Some(frame),
            (Preview::Frame(frame), None) => Some(frame),
            _ => None,
        }
    }

    pub fn playback(&self) -> Option<PlaybackStatus> {
        self.current()
            .filter(|entry| entry.is_video())
            .and_then(|_| self.controller.status())
    }

    pub fn backend_name(&self) -> &'static str {
        self.controller.backend_name()
    }

    /// Key legend for the status block
    pub fn instructions(&self) -> String {
        let mut text = format!(
            "Press {}, 'S' to skip, 'Q' to quit",
            self.router.instruction_text()
        );
        if self.controller.is_active() {
            text.push_str(" | Space pause, ←/→ seek, ↓/↑ long seek");
        }
        text
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Apply one key press; returns whether the view changed
    pub fn handle_key(&mut self, key: KeyInput, now: Instant) -> bool {
        let index = match self.state {
            SessionState::AwaitingInput(index) => index,
            SessionState::Completing
                if matches!(
                    key,
                    KeyInput::Char('q' | 'Q') | KeyInput::Esc | KeyInput::CtrlC
                ) =>
            {
                self.quit();
                return true;
            }
            _ => {
                debug!(?key, state = ?self.state, "Key ignored");
                return false;
            }
        };

        // Destination keys take precedence over the letter commands
        if let KeyInput::Char(ch) = key
            && let Some(binding) = self.router.resolve(ch).cloned()
        {
            self.route(index, &binding, now);
            return true;
        }

        match key {
            KeyInput::Char('s' | 'S') | KeyInput::Tab => {
                let name = self.entries[index].file_name();
                debug!(file = %name, "Skipped");
                self.stats.skipped += 1;
                self.notice = Some(format!("Skipped: {}", name));
                self.advance(now);
            }
            KeyInput::Char('q' | 'Q') | KeyInput::Esc | KeyInput::CtrlC => self.quit(),
            KeyInput::Space
            | KeyInput::Left
            | KeyInput::Right
            | KeyInput::Up
            | KeyInput::Down
                if self.controller.is_active() =>
            {
                self.media_key(key);
            }
            _ => {
                debug!(?key, "Unrecognized key");
                self.notice = Some(format!(
                    "Unknown key. Use {}, 'S' or 'Q'.",
                    self.router.instruction_text()
                ));
            }
        }
        true
    }

    /// Re-measure the viewer and reload the current entry at the new size
    pub fn on_resize(&mut self, budget: PreviewBudget, now: Instant) -> bool {
        if budget == self.budget {
            return false;
        }
        self.budget = budget;
        match self.state {
            SessionState::AwaitingInput(index) => {
                debug!(index, ?budget, "Reloading after resize");
                if self.entries[index].is_video() && self.controller.is_active() {
                    if let Err(e) = self.controller.reload(budget, &mut self.timers, now) {
                        warn!(error = %e, "Video reload failed");
                        self.preview = Preview::Placeholder {
                            title: self.entries[index].file_name(),
                            detail: e.to_string(),
                        };
                    }
                } else {
                    self.display(index, now);
                }
                true
            }
            _ => false,
        }
    }

    /// Run every timer due at `now`; returns whether the view changed
    pub fn fire_due_timers(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some((_, kind)) = self.timers.pop_due(now) {
            match kind {
                TimerKind::PlaybackPoll { generation } => {
                    changed |= self.controller.on_poll(generation, &mut self.timers, now);
                }
                TimerKind::Shutdown => {
                    info!("Session complete");
                    self.state = SessionState::Terminated;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Stop playback and end the session now
    pub fn quit(&mut self) {
        self.controller.stop(&mut self.timers);
        if self.state != SessionState::Terminated {
            info!(cursor = self.cursor, "Session quit");
        }
        self.timers = TimerQueue::new();
        self.state = SessionState::Terminated;
    }

    fn route(&mut self, index: usize, binding: &DestinationBinding, now: Instant) {
        // The decoder may hold the file open
        self.controller.stop(&mut self.timers);

        let mode = self.settings.transfer_mode;
        let entry = &self.entries[index];
        let name = entry.file_name();
        match transfer(entry.path(), &self.source_root, &binding.path, mode) {
            Ok(_) => {
                self.stats.transferred += 1;
                self.notice = Some(format!("{}: {} to {}", mode.verb(), name, binding.label));
            }
            Err(e) => {
                warn!(file = %entry.path().display(), error = %e, "Transfer failed");
                self.stats.failed += 1;
                self.stats
                    .failures
                    .push((entry.path().to_path_buf(), e.to_string()));
                self.notice = Some(format!("Failed to process {}: {}", name, e));
            }
        }
        self.advance(now);
    }

    fn media_key(&mut self, key: KeyInput) {
        let result = match key {
            KeyInput::Space => self.controller.toggle_pause().map(|paused| {
                if paused { "Paused".to_string() } else { "Playing".to_string() }
            }),
            KeyInput::Left => self.seek(-(self.settings.seek_step_ms as i64)),
            KeyInput::Right => self.seek(self.settings.seek_step_ms as i64),
            KeyInput::Down => self.seek(-(self.settings.long_seek_step_ms as i64)),
            KeyInput::Up => self.seek(self.settings.long_seek_step_ms as i64),
            _ => return,
        };
        self.notice = Some(match result {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Playback control failed");
                e.to_string()
            }
        });
    }

    fn seek(&mut self, delta_ms: i64) -> crate::Result<String> {
        let target = self.controller.seek(delta_ms)?;
        Ok(format!("Seek to {}", format_millis(target)))
    }

    fn advance(&mut self, now: Instant) {
        self.controller.stop(&mut self.timers);
        self.cursor += 1;
        let index = self.cursor as usize;

        if index < self.entries.len() {
            self.state = SessionState::AwaitingInput(index);
            self.display(index, now);
            return;
        }

        self.preview = Preview::Empty;
        if self.entries.is_empty() {
            info!("No media files found");
            self.notice = Some("No media files found in the source directory!".into());
            self.state = SessionState::Terminated;
        } else {
            info!(entries = self.entries.len(), "All entries handled");
            self.notice = Some("All files sorted! Closing.".into());
            self.state = SessionState::Completing;
            self.timers
                .schedule(now, self.settings.completion_delay, TimerKind::Shutdown);
        }
    }

    /// Load the preview for `index`; failures leave a placeholder
    fn display(&mut self, index: usize, now: Instant) {
        let entry = &self.entries[index];
        let path = entry.path().to_path_buf();
        let name = entry.file_name();

        if !entry.is_video() {
            self.controller.stop(&mut self.timers);
            self.preview = match load_photo(&path, self.budget) {
                Ok(frame) => Preview::Frame(frame),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Preview failed");
                    Preview::Placeholder {
                        title: name,
                        detail: e.to_string(),
                    }
                }
            };
            return;
        }

        if !self.controller.is_available() {
            self.controller.stop(&mut self.timers);
            self.preview = Preview::Placeholder {
                title: name,
                detail: "Video playback is unavailable (ffmpeg not found)".into(),
            };
            return;
        }

        self.preview = match self.controller.load(&path, self.budget, &mut self.timers, now) {
            Ok(()) => Preview::Placeholder {
                title: name,
                detail: format!("Playing with the {} backend", self.controller.backend_name()),
            },
            Err(e) => Preview::Placeholder {
                title: name,
                detail: e.to_string(),
            },
        };
    }

    #[cfg(test)]
    fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

/// `m:ss`, or `h:mm:ss` past an hour
pub fn format_millis(ms: u64) -> String {
    let total = ms / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Position of `path` relative to `root` for display
pub fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MediaCatalog;
    use crate::config::FileTypes;
    use crate::playback::backend::{NullBackend, Transport};
    use crate::playback::testing::{Script, ScriptedBackend, tiny_frame};
    use crate::playback::PlaybackPhase;
    use crate::sort::{SortMode, sort_entries};
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::{TempDir, tempdir};

    const POLL: Duration = Duration::from_millis(500);

    struct Fixture {
        _dir: TempDir,
        source: PathBuf,
        keep: PathBuf,
        trash: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let keep = dir.path().join("Keep");
        let trash = dir.path().join("Trash");
        fs::create_dir_all(source.join("trip/day1")).unwrap();
        Fixture {
            _dir: dir,
            source,
            keep,
            trash,
        }
    }

    fn write_png(path: &Path) {
        RgbImage::from_pixel(4, 2, Rgb([200, 10, 10])).save(path).unwrap();
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            completion_delay: Duration::from_millis(3_000),
            ..SessionSettings::from(&Config::default())
        }
    }

    fn session_with(
        fx: &Fixture,
        transport: Transport,
    ) -> (NavigationSession, Rc<RefCell<Script>>) {
        let config = Config::default();
        let mut entries = MediaCatalog::new(&config).discover(&fx.source, FileTypes::All);
        sort_entries(&mut entries, SortMode::Name);
        let router = DestinationRouter::new(&[fx.keep.clone(), fx.trash.clone()]).unwrap();
        let (backend, script) = ScriptedBackend::new(transport);
        let controller = PlaybackController::new(Box::new(backend), POLL);
        (
            NavigationSession::new(&fx.source, entries, router, controller, settings()),
            script,
        )
    }

    #[test]
    fn test_end_to_end_move_session() {
        let fx = fixture();
        write_png(&fx.source.join("a.png"));
        fs::write(fx.source.join("trip/b.jpg"), b"not really a jpeg").unwrap();
        write_png(&fx.source.join("trip/day1/c.png"));
        fs::write(fx.source.join("trip/day1/d.mp4"), b"video bytes").unwrap();

        let (mut session, script) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::new(40, 20), t0);

        assert_eq!(session.len(), 4);
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert!(session.frame().is_some());

        assert!(session.handle_key(KeyInput::Char('1'), t0));
        assert_eq!(session.notice(), Some("Moved: a.png to Keep"));

        // Undecodable photo shows a placeholder, still skippable
        assert!(matches!(session.preview(), Preview::Placeholder { .. }));
        assert!(session.handle_key(KeyInput::Char('s'), t0));
        assert!(session.handle_key(KeyInput::Char('1'), t0));

        assert_eq!(session.state(), SessionState::AwaitingInput(3));
        assert!(session.controller().is_active());
        assert_eq!(script.borrow().live_handles, 1);

        assert!(session.handle_key(KeyInput::Char('1'), t0));
        assert_eq!(session.state(), SessionState::Completing);
        assert_eq!(script.borrow().live_handles, 0);
        assert_eq!(session.notice(), Some("All files sorted! Closing."));

        // Keys are ignored while completing
        assert!(!session.handle_key(KeyInput::Char('1'), t0));

        assert!(!session.fire_due_timers(t0 + Duration::from_millis(2_999)));
        assert_eq!(session.state(), SessionState::Completing);
        assert!(session.fire_due_timers(t0 + Duration::from_millis(3_000)));
        assert!(session.is_terminated());

        assert!(fx.keep.join("a.png").exists());
        assert!(fx.keep.join("trip/day1/c.png").exists());
        assert!(fx.keep.join("trip/day1/d.mp4").exists());
        assert!(!fx.source.join("a.png").exists());
        assert!(fx.source.join("trip/b.jpg").exists());
        assert_eq!(fs::read_dir(&fx.trash).unwrap().count(), 0);

        let stats = session.stats();
        assert_eq!((stats.transferred, stats.skipped, stats.failed), (3, 1, 0));
    }

    #[test]
    fn test_empty_source_terminates_immediately() {
        let fx = fixture();
        fs::write(fx.source.join("notes.txt"), b"text").unwrap();

        let (mut session, _) = session_with(&fx, Transport::Timeline);
        session.start(PreviewBudget::default(), Instant::now());

        assert!(session.is_terminated());
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(
            session.notice(),
            Some("No media files found in the source directory!")
        );
        assert!(!session.handle_key(KeyInput::Char('1'), Instant::now()));
    }

    #[test]
    fn test_unknown_key_stays_and_shows_help() {
        let fx = fixture();
        write_png(&fx.source.join("a.png"));
        let (mut session, _) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);

        assert!(session.handle_key(KeyInput::Char('x'), t0));
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert_eq!(
            session.notice(),
            Some("Unknown key. Use '1' for Keep, '2' for Trash, 'S' or 'Q'.")
        );

        // Media keys without a live video are unknown too
        session.handle_key(KeyInput::Space, t0);
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert!(session.notice().unwrap().starts_with("Unknown key"));
    }

    #[test]
    fn test_quit_releases_video() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        let (mut session, script) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);
        assert_eq!(session.pending_timers(), 1);

        assert!(session.handle_key(KeyInput::Esc, t0));
        assert!(session.is_terminated());
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(script.borrow().live_handles, 0);
        assert!(!session.fire_due_timers(t0 + POLL * 4));
        assert!(fx.source.join("clip.mp4").exists());
    }

    #[test]
    fn test_resize_reloads_same_entry_without_transfer() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        write_png(&fx.source.join("z.png"));
        let (mut session, script) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::new(40, 20), t0);

        assert!(session.on_resize(PreviewBudget::new(80, 40), t0));
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.budget(), PreviewBudget::new(80, 40));
        {
            let s = script.borrow();
            assert_eq!(s.opened.len(), 2);
            assert_eq!(s.live_handles, 1);
            assert_eq!(s.released, 1);
        }
        assert_eq!(session.pending_timers(), 1);
        assert_eq!(session.stats().transferred, 0);

        // Same size is not a resize
        assert!(!session.on_resize(PreviewBudget::new(80, 40), t0));
    }

    #[test]
    fn test_resize_keeps_video_position_and_pause() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        let (mut session, script) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::new(40, 20), t0);
        {
            let mut s = script.borrow_mut();
            s.duration_ms = Some(60_000);
            s.position_ms = 30_000;
        }
        session.handle_key(KeyInput::Space, t0);

        assert!(session.on_resize(PreviewBudget::new(80, 40), t0));

        let status = session.playback().unwrap();
        assert_eq!(status.phase, PlaybackPhase::Paused);
        assert_eq!(status.position_ms, 30_000);
        assert_eq!(script.borrow().seeks, vec![30_000]);
        assert_eq!(session.pending_timers(), 1);
    }

    #[test]
    fn test_quit_during_completion_delay() {
        let fx = fixture();
        write_png(&fx.source.join("a.png"));
        let (mut session, _) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);
        session.handle_key(KeyInput::Char('2'), t0);
        assert_eq!(session.state(), SessionState::Completing);

        assert!(session.handle_key(KeyInput::Esc, t0));
        assert!(session.is_terminated());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_media_keys_drive_the_controller() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        let (mut session, script) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);
        {
            let mut s = script.borrow_mut();
            s.duration_ms = Some(60_000);
            s.position_ms = 58_000;
        }

        session.handle_key(KeyInput::Right, t0);
        assert_eq!(session.notice(), Some("Seek to 1:00"));
        session.handle_key(KeyInput::Down, t0);
        assert_eq!(script.borrow().seeks, vec![60_000, 30_000]);

        session.handle_key(KeyInput::Space, t0);
        assert_eq!(session.notice(), Some("Paused"));
        assert_eq!(
            session.playback().map(|status| status.phase),
            Some(PlaybackPhase::Paused)
        );
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
    }

    #[test]
    fn test_poll_timers_reach_the_controller() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        let (mut session, script) = session_with(&fx, Transport::FrameStream);
        script
            .borrow_mut()
            .frames
            .extend([tiny_frame(1), tiny_frame(2)]);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);
        assert_eq!(session.frame(), Some(&tiny_frame(1)));
        assert_eq!(session.next_deadline(), Some(t0 + POLL));

        assert!(session.fire_due_timers(t0 + POLL));
        assert_eq!(session.frame(), Some(&tiny_frame(2)));
    }

    #[test]
    fn test_video_without_backend_shows_placeholder() {
        let fx = fixture();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();
        let entries = MediaCatalog::new(&Config::default()).discover(&fx.source, FileTypes::All);
        let router = DestinationRouter::new(&[fx.keep.clone(), fx.trash.clone()]).unwrap();
        let controller = PlaybackController::new(Box::new(NullBackend), POLL);
        let mut session = NavigationSession::new(&fx.source, entries, router, controller, settings());
        session.start(PreviewBudget::default(), Instant::now());

        match session.preview() {
            Preview::Placeholder { title, .. } => assert_eq!(title, "clip.mp4"),
            other => panic!("unexpected preview {:?}", other),
        }
        assert_eq!(session.pending_timers(), 0);
        assert!(session.handle_key(KeyInput::Char('2'), Instant::now()));
        assert!(fx.trash.join("clip.mp4").exists());
    }

    #[test]
    fn test_failed_transfer_still_advances() {
        let fx = fixture();
        write_png(&fx.source.join("a.png"));
        write_png(&fx.source.join("b.png"));
        let (mut session, _) = session_with(&fx, Transport::Timeline);
        let t0 = Instant::now();
        session.start(PreviewBudget::default(), t0);

        fs::remove_file(fx.source.join("a.png")).unwrap();
        session.handle_key(KeyInput::Char('1'), t0);

        assert_eq!(session.state(), SessionState::AwaitingInput(1));
        assert_eq!(session.stats().failed, 1);
        assert!(session.notice().unwrap().starts_with("Failed to process a.png"));
    }

    #[test]
    fn test_routing_letters_override_commands() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        write_png(&source.join("a.png"));
        let destinations: Vec<PathBuf> =
            (0..28).map(|i| dir.path().join(format!("d{:02}", i))).collect();

        let entries = MediaCatalog::new(&Config::default()).discover(&source, FileTypes::All);
        let router = DestinationRouter::new(&destinations).unwrap();
        let controller = PlaybackController::new(Box::new(NullBackend), POLL);
        let mut session = NavigationSession::new(&source, entries, router, controller, settings());
        session.start(PreviewBudget::default(), Instant::now());

        // 'q' is bound to the 26th destination
        session.handle_key(KeyInput::Char('q'), Instant::now());
        assert!(destinations[25].join("a.png").exists());
        assert_eq!(session.state(), SessionState::Completing);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "0:00");
        assert_eq!(format_millis(61_999), "1:01");
        assert_eq!(format_millis(3_725_000), "1:02:05");
    }
}
