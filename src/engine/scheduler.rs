//! Cooperative per-frame scheduling.
//!
//! A [`FrameTask`] is a callback that runs once on the next rendering frame.
//! Tasks that want to keep running re-queue themselves from inside `run`.
//! [`FrameQueue`] is the deterministic scheduler. Hosts call
//! [`FrameQueue::tick`] from their frame clock and tests call it directly.
//!
//! # Example
//!
//! ```rust
//! use orbcompare::engine::scheduler::{FrameQueue, FrameScheduler};
//! use orbcompare::orbit::prelude::*;
//!
//! let mut queue = FrameQueue::new();
//! let mut surface = CommandBuffer::new(SurfaceSize::default());
//! queue.request_frame(Box::new(|s: &mut dyn DrawingSurface, _: &mut dyn FrameScheduler| {
//!     s.clear(Color::BLACK);
//! }));
//! assert_eq!(queue.tick(&mut surface), 1);
//! assert!(queue.is_idle());
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::orbit::render::DrawingSurface;

/// Work for one rendering frame.
pub trait FrameTask {
    /// Run on the current frame. Re-queue through `scheduler` to continue.
    fn run(self: Box<Self>, surface: &mut dyn DrawingSurface, scheduler: &mut dyn FrameScheduler);
}

impl<F> FrameTask for F
where
    F: FnOnce(&mut dyn DrawingSurface, &mut dyn FrameScheduler),
{
    fn run(self: Box<Self>, surface: &mut dyn DrawingSurface, scheduler: &mut dyn FrameScheduler) {
        (*self)(surface, scheduler);
    }
}

/// "Run this on the next frame" capability.
pub trait FrameScheduler {
    /// Queue a task for the next frame.
    fn request_frame(&mut self, task: Box<dyn FrameTask>);
}

/// FIFO frame scheduler driven by explicit ticks.
///
/// A tick runs exactly the tasks queued before it started. Tasks queued
/// during a tick wait for the next one, so a self-rescheduling task runs
/// once per tick.
#[derive(Default)]
pub struct FrameQueue {
    pending: VecDeque<Box<dyn FrameTask>>,
    ticks: u64,
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl FrameQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame. Returns the number of tasks that ran.
    pub fn tick(&mut self, surface: &mut dyn DrawingSurface) -> usize {
        let batch = std::mem::take(&mut self.pending);
        self.ticks += 1;
        let count = batch.len();
        for task in batch {
            task.run(surface, self);
        }
        count
    }

    /// Tick until no task is pending or `max_ticks` is reached.
    ///
    /// Returns the number of ticks that ran at least one task.
    pub fn run_until_idle(&mut self, surface: &mut dyn DrawingSurface, max_ticks: u64) -> u64 {
        let mut busy_ticks = 0;
        while !self.is_idle() && busy_ticks < max_ticks {
            self.tick(surface);
            busy_ticks += 1;
        }
        busy_ticks
    }

    /// Number of tasks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total ticks so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, task: Box<dyn FrameTask>) {
        self.pending.push_back(task);
    }
}
