//! TUI application main module
//!
//! Owns the terminal and drives the session: wait for input until the next
//! timer deadline, apply the event, fire due timers, redraw.

use crate::preview::PreviewBudget;
use crate::session::{NavigationSession, SessionState, SessionStats};
use crate::tui::components::{budget_for, preview_area};
use crate::tui::event::{TuiEvent, poll_event};
use crate::tui::ui::render;
use ratatui::{DefaultTerminal, layout::Rect};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Wait used when no timer is pending
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// TUI application
pub struct TuiApp {
    /// Terminal
    terminal: DefaultTerminal,
    /// Triage session
    session: NavigationSession,
    /// Source root, for relative display paths
    source_root: PathBuf,
}

impl TuiApp {
    /// Take over the terminal
    pub fn new(session: NavigationSession, source_root: PathBuf) -> Self {
        let terminal = ratatui::init();
        Self {
            terminal,
            session,
            source_root,
        }
    }

    /// Run until the session terminates, then restore the terminal
    pub fn run(mut self) -> std::io::Result<SessionStats> {
        let result = self.event_loop();
        ratatui::restore();
        result.map(|()| self.session.stats().clone())
    }

    fn event_loop(&mut self) -> std::io::Result<()> {
        let budget = self.measure()?;
        self.session.start(budget, Instant::now());
        self.redraw()?;

        // An empty source ends at once; keep the message up until a key
        if self.session.is_terminated() {
            info!("Nothing to triage, waiting for a key");
            loop {
                match poll_event(IDLE_WAIT)? {
                    TuiEvent::Key(_) => return Ok(()),
                    TuiEvent::Resize => self.redraw()?,
                    TuiEvent::None => {}
                }
            }
        }

        while !self.session.is_terminated() {
            let timeout = self
                .session
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);

            let mut dirty = match poll_event(timeout)? {
                TuiEvent::Key(key) => self.session.handle_key(key, Instant::now()),
                TuiEvent::Resize => {
                    let budget = self.measure()?;
                    debug!(?budget, "Terminal resized");
                    self.session.on_resize(budget, Instant::now());
                    true
                }
                TuiEvent::None => false,
            };
            dirty |= self.session.fire_due_timers(Instant::now());

            if dirty && self.session.state() != SessionState::Terminated {
                self.redraw()?;
            }
        }
        Ok(())
    }

    /// Preview budget for the current terminal size
    fn measure(&self) -> std::io::Result<PreviewBudget> {
        let size = self.terminal.size()?;
        Ok(budget_for(preview_area(Rect::new(0, 0, size.width, size.height))))
    }

    fn redraw(&mut self) -> std::io::Result<()> {
        render(&mut self.terminal, &self.session, &self.source_root)
    }
}
