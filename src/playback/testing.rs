//! Scripted in-memory backend for controller and session tests

use super::backend::{BackendState, Transport, VideoBackend, VideoHandle};
use crate::error::{Error, Result};
use crate::preview::{Frame, PreviewBudget};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Shared view of everything the scripted handles did
#[derive(Debug)]
pub struct Script {
    pub transport: Transport,
    pub fail_open: bool,
    pub opened: Vec<PathBuf>,
    pub live_handles: usize,
    pub released: usize,
    pub plays: usize,
    pub seeks: Vec<u64>,
    pub pause_calls: Vec<bool>,
    pub rewinds: usize,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub state: BackendState,
    pub frames: VecDeque<Frame>,
    pub frames_after_rewind: VecDeque<Frame>,
}

impl Script {
    fn new(transport: Transport) -> Self {
        Self {
            transport,
            fail_open: false,
            opened: Vec::new(),
            live_handles: 0,
            released: 0,
            plays: 0,
            seeks: Vec::new(),
            pause_calls: Vec::new(),
            rewinds: 0,
            position_ms: 0,
            duration_ms: None,
            state: BackendState::Stopped,
            frames: VecDeque::new(),
            frames_after_rewind: VecDeque::new(),
        }
    }
}

pub fn tiny_frame(shade: u8) -> Frame {
    Frame {
        width: 1,
        height: 1,
        pixels: vec![shade, shade, shade],
    }
}

pub struct ScriptedBackend {
    script: Rc<RefCell<Script>>,
}

impl ScriptedBackend {
    pub fn new(transport: Transport) -> (Self, Rc<RefCell<Script>>) {
        let script = Rc::new(RefCell::new(Script::new(transport)));
        (
            Self {
                script: Rc::clone(&script),
            },
            script,
        )
    }
}

impl VideoBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open(&mut self, path: &Path, _budget: PreviewBudget) -> Result<Box<dyn VideoHandle>> {
        let mut script = self.script.borrow_mut();
        script.opened.push(path.to_path_buf());
        if script.fail_open {
            return Err(Error::PlaybackOpen {
                path: path.to_path_buf(),
                message: "scripted failure".into(),
            });
        }
        script.live_handles += 1;
        script.state = BackendState::Stopped;
        Ok(Box::new(ScriptedHandle {
            script: Rc::clone(&self.script),
            released: false,
        }))
    }
}

struct ScriptedHandle {
    script: Rc<RefCell<Script>>,
    released: bool,
}

impl ScriptedHandle {
    fn guard(&self) -> Result<()> {
        assert!(!self.released, "scripted handle used after release");
        Ok(())
    }
}

impl VideoHandle for ScriptedHandle {
    fn transport(&self) -> Transport {
        self.script.borrow().transport
    }

    fn play(&mut self) -> Result<()> {
        self.guard()?;
        let mut script = self.script.borrow_mut();
        script.plays += 1;
        script.state = BackendState::Playing;
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.guard()?;
        let mut script = self.script.borrow_mut();
        script.pause_calls.push(paused);
        script.state = if paused {
            BackendState::Paused
        } else {
            BackendState::Playing
        };
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.script.borrow().position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.script.borrow().duration_ms
    }

    fn seek_ms(&mut self, target_ms: u64) -> Result<()> {
        self.guard()?;
        let mut script = self.script.borrow_mut();
        if matches!(script.state, BackendState::Ended | BackendState::Stopped) {
            return Err(Error::Playback("scripted handle rejects seek".into()));
        }
        script.seeks.push(target_ms);
        script.position_ms = target_ms;
        Ok(())
    }

    fn state(&self) -> BackendState {
        self.script.borrow().state
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        self.guard()?;
        let mut script = self.script.borrow_mut();
        let frame = script.frames.pop_front();
        if frame.is_none() {
            script.state = BackendState::Ended;
        }
        Ok(frame)
    }

    fn rewind(&mut self) -> Result<()> {
        self.guard()?;
        let mut script = self.script.borrow_mut();
        script.rewinds += 1;
        let refill = std::mem::take(&mut script.frames_after_rewind);
        script.frames = refill;
        script.state = BackendState::Playing;
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            let mut script = self.script.borrow_mut();
            script.released += 1;
            script.live_handles -= 1;
            script.state = BackendState::Stopped;
        }
    }
}
