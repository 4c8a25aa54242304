//! # orbcompare
//!
//! Side-by-side playback of two predicted orbits.
//!
//! A prediction service returns one trajectory computed by numerical physics
//! and one produced by a learned model for the same initial state. This crate
//! turns form input into a request, validates the paired response, fits both
//! paths into a fixed drawing surface and plays them back one frame at a time:
//! - `orbit`: data model, unit conversion, scale fitting and frame composition
//! - `engine`: frame scheduling and the animation lifecycle
//! - `session`: request lifecycle, busy trigger and user notification
//!
//! ## Example
//!
//! ```rust
//! use orbcompare::prelude::*;
//!
//! let request = DisplayInput::earth_like().to_request();
//! assert_eq!(request.steps, Some(365));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::future_not_send, // single-threaded by construction
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod orbit;
pub mod session;
pub mod tui;

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ViewerConfig, ViewerConfigBuilder};
    pub use crate::engine::{AnimationController, AnimationHandle, FrameQueue, FrameScheduler, PlaybackPhase};
    pub use crate::error::{ViewerError, ViewerResult};
    pub use crate::orbit::prelude::*;
    pub use crate::session::{
        AlertSlot, HttpPredictionService, Notifier, PredictionService, SessionController,
        TriggerControl, TriggerState,
    };
}

/// Re-export for public API
pub use error::{ViewerError, ViewerResult};

const DEFAULT_LOG_FILTER: &str = "orbcompare=info";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once is
/// harmless.
pub fn init_logging() {
    let _ = fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging to a file, for front-ends that own the terminal.
///
/// # Errors
///
/// Returns `Io` if the file cannot be created.
pub fn init_file_logging(path: &Path) -> ViewerResult<()> {
    let file = std::fs::File::create(path)?;
    let _ = fmt()
        .with_env_filter(log_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
