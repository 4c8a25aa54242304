//! Playback engine.
//!
//! Implements the single-threaded playback loop with:
//! - Cooperative per-frame scheduling behind the `FrameScheduler` seam
//! - Animation controllers with an explicit lifecycle and cancellation

pub mod animation;
pub mod scheduler;

pub use animation::{AnimationController, AnimationHandle, PlaybackPhase, PlaybackState};
pub use scheduler::{FrameQueue, FrameScheduler, FrameTask};
