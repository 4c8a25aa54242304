//! CLI command handlers.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::engine::{FrameQueue, FrameScheduler, PlaybackPhase};
use crate::error::ViewerResult;
use crate::orbit::export::{FileExporter, FrameExporter};
use crate::orbit::render::CommandBuffer;
use crate::orbit::units::DisplayInput;
use crate::session::{HttpPredictionService, Notifier, PredictionService, SessionController};

use super::{Args, Command, RunArgs};

/// Upper bound on scheduler ticks for one headless playback.
const MAX_TICKS: u64 = 10_000_000;

/// Main CLI entry point.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(run) => match run_headless(&run) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                // Session failures were already shown by the notifier.
                if !e.is_session_failure() {
                    eprintln!("Error: {e}");
                }
                ExitCode::from(1)
            }
        },
        Command::Config { config } => match print_config(config.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(1)
            }
        },
    }
}

/// Notifier for the command line: alerts go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

/// Outcome of one headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Points per trajectory.
    pub points: usize,
    /// Frames composed by the playback.
    pub frames: usize,
    /// Final playback phase.
    pub phase: PlaybackPhase,
    /// Fitted drawing units per meter.
    pub scale: f64,
    /// Marker positions on the last frame (physics, ML), in drawing units.
    pub final_markers: Vec<(f64, f64)>,
    /// Frames written by the exporter, if any.
    pub exported: Option<usize>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Points per path:  {}", self.points)?;
        writeln!(f, "Frames composed:  {} ({:?})", self.frames, self.phase)?;
        writeln!(f, "Scale:            {:.6e} units/m", self.scale)?;
        for (label, (x, y)) in ["Physics", "ML"].iter().zip(&self.final_markers) {
            writeln!(f, "{label:<8} final:   ({x:.1}, {y:.1})")?;
        }
        if let Some(n) = self.exported {
            writeln!(f, "Exported frames:  {n}")?;
        }
        Ok(())
    }
}

/// Load a configuration file, or the defaults.
///
/// # Errors
///
/// Returns error if the file cannot be read or fails validation.
pub fn load_config(path: Option<&Path>) -> ViewerResult<ViewerConfig> {
    path.map_or_else(|| Ok(ViewerConfig::default()), ViewerConfig::load)
}

/// Print the effective configuration.
///
/// # Errors
///
/// Returns error if loading or serialization fails.
pub fn print_config(path: Option<&Path>) -> ViewerResult<()> {
    let config = load_config(path)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// Run one session against the configured HTTP service.
///
/// # Errors
///
/// Returns the session error (already reported on stderr) or a
/// configuration or export error.
pub fn run_headless(args: &RunArgs) -> ViewerResult<RunSummary> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(endpoint) = &args.endpoint {
        config.service.endpoint.clone_from(endpoint);
        config.check()?;
    }

    let service = HttpPredictionService::new(config.service.endpoint.clone(), config.request_timeout())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let exporter = args
        .export
        .as_deref()
        .map(FileExporter::create)
        .transpose()?;

    runtime.block_on(play(service, &config, &args.display_input(), exporter))
}

/// Run one session and play it to completion on an in-memory surface.
///
/// # Errors
///
/// Returns the session error or an export error.
pub async fn play<P: PredictionService, W: Write>(
    service: P,
    config: &ViewerConfig,
    input: &DisplayInput,
    mut exporter: Option<FrameExporter<W>>,
) -> ViewerResult<RunSummary> {
    let queue = Rc::new(RefCell::new(FrameQueue::new()));
    let scheduler: Rc<RefCell<dyn FrameScheduler>> = queue.clone();
    let session = SessionController::new(service, StderrNotifier, scheduler, config);

    let handle = session.run_simulation(input).await?;
    let scale = session.last_view().map_or(0.0, |view| view.scale);

    let mut surface = CommandBuffer::new(config.surface_size());
    let mut queue = queue.borrow_mut();
    let mut composed = 0;
    while !queue.is_idle() && queue.ticks() < MAX_TICKS {
        queue.tick(&mut surface);
        let frames = handle.state().frames_composed;
        if frames > composed {
            composed = frames;
            if let Some(exporter) = exporter.as_mut() {
                exporter.write_frame(surface.commands())?;
            }
        }
    }

    let exported = exporter
        .map(|e| e.finish().map(|(_, n)| n))
        .transpose()?;
    let state = handle.state();
    tracing::info!(frames = state.frames_composed, phase = ?state.phase, "headless playback finished");

    Ok(RunSummary {
        points: handle.frames(),
        frames: state.frames_composed,
        phase: state.phase,
        scale,
        final_markers: surface
            .circles()
            .skip(1)
            .map(|(x, y, _, _)| (x, y))
            .collect(),
        exported,
    })
}
