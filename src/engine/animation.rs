//! Frame-stepped playback of one simulation result.
//!
//! An [`AnimationController`] moves through
//! `Idle → Running → {Completed | Cancelled}`. While running it lives on the
//! frame scheduler as a [`FrameTask`]. Each run composes one frame and
//! re-queues itself until the terminal frame is on screen. The caller keeps
//! an [`AnimationHandle`] to observe progress and cancel.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::scheduler::{FrameScheduler, FrameTask};
use crate::orbit::compose::FrameComposer;
use crate::orbit::render::DrawingSurface;
use crate::orbit::SimulationResult;

/// Lifecycle phase of one playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Created, not yet started.
    Idle,
    /// Frames are being composed.
    Running,
    /// Terminal frame composed; playback halted there.
    Completed,
    /// Stopped by `cancel()` before completion.
    Cancelled,
}

impl PlaybackPhase {
    /// Check if the phase can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Progress of one playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    /// Next frame to compose, or the last frame composed once completed.
    pub current_frame: usize,
    /// Frames composed so far.
    pub frames_composed: usize,
}

impl PlaybackState {
    const fn idle() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current_frame: 0,
            frames_composed: 0,
        }
    }
}

/// Plays one [`SimulationResult`] back frame by frame.
#[derive(Debug)]
pub struct AnimationController {
    id: u64,
    result: Rc<SimulationResult>,
    composer: FrameComposer,
    state: Rc<RefCell<PlaybackState>>,
}

impl AnimationController {
    /// Create an idle controller over a result.
    #[must_use]
    pub fn new(id: u64, result: Rc<SimulationResult>, composer: FrameComposer) -> Self {
        Self {
            id,
            result,
            composer,
            state: Rc::new(RefCell::new(PlaybackState::idle())),
        }
    }

    /// Handle sharing this controller's state.
    #[must_use]
    pub fn handle(&self) -> AnimationHandle {
        AnimationHandle {
            id: self.id,
            frames: self.result.len(),
            state: Rc::clone(&self.state),
        }
    }

    /// Enter `Running` and queue frame 0 for the next frame.
    ///
    /// Nothing is drawn synchronously. A controller that already left
    /// `Idle` is not scheduled again.
    pub fn start(self, scheduler: &mut dyn FrameScheduler) -> AnimationHandle {
        let handle = self.handle();
        {
            let mut state = self.state.borrow_mut();
            if state.phase != PlaybackPhase::Idle {
                return handle;
            }
            state.phase = PlaybackPhase::Running;
            state.current_frame = 0;
        }
        tracing::debug!(animation = self.id, frames = self.result.len(), "playback started");
        scheduler.request_frame(Box::new(self));
        handle
    }

    /// Compose the current frame. Returns true if another step is needed.
    fn step(&self, surface: &mut dyn DrawingSurface) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase != PlaybackPhase::Running {
            return false;
        }

        let frame = state.current_frame;
        self.composer.compose(&self.result, frame, surface);
        state.frames_composed += 1;

        if frame >= self.result.last_frame() {
            state.phase = PlaybackPhase::Completed;
            tracing::debug!(animation = self.id, frames = state.frames_composed, "playback completed");
            return false;
        }
        state.current_frame = frame + 1;
        true
    }
}

impl FrameTask for AnimationController {
    fn run(self: Box<Self>, surface: &mut dyn DrawingSurface, scheduler: &mut dyn FrameScheduler) {
        if self.step(surface) {
            scheduler.request_frame(self);
        }
    }
}

/// Observer and cancel switch for a running [`AnimationController`].
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    id: u64,
    frames: usize,
    state: Rc<RefCell<PlaybackState>>,
}

impl AnimationHandle {
    /// Stop playback. Only a running animation is affected; returns whether
    /// this call cancelled it.
    ///
    /// A step already queued sees the cancellation before drawing.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase != PlaybackPhase::Running {
            return false;
        }
        state.phase = PlaybackPhase::Cancelled;
        tracing::warn!(animation = self.id, frame = state.current_frame, "playback cancelled");
        true
    }

    /// Controller id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Frames in the full playback.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Snapshot of the playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.state.borrow().phase
    }

    /// Check if frames are still being composed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase() == PlaybackPhase::Running
    }
}
