//! TUI module for orbcompare.
//!
//! Testable application state for the terminal viewer. Terminal I/O stays
//! in `bin/orbit_viewer.rs`; form editing, the trigger, the blocking alert
//! and playback ticking live here.

#[cfg(feature = "tui")]
pub mod viewer_app;
