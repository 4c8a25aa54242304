//! Simulation sessions: one user-triggered request, response and playback.
//!
//! [`SessionController::run_simulation`] is the only place where the
//! asynchronous request lifecycle meets the playback loop. It:
//!
//! 1. refuses to start while the trigger is busy
//! 2. cancels the live animation
//! 3. holds a [`BusyGuard`] for the rest of the run
//! 4. builds and sends the request, bounded by the configured timeout
//! 5. starts a new [`AnimationController`] over the validated result
//!
//! Every failure is logged, reported once through the [`Notifier`] and
//! returned to the caller. The busy guard releases on every exit path.

pub mod client;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::engine::animation::{AnimationController, AnimationHandle};
use crate::engine::scheduler::FrameScheduler;
use crate::error::{ViewerError, ViewerResult};
use crate::orbit::compose::{FrameComposer, FrameStyle};
use crate::orbit::render::SurfaceSize;
use crate::orbit::scale::{ViewOptions, ViewTransform};
use crate::orbit::units::{DisplayInput, SimulationRequest};
use crate::orbit::SimulationResult;

pub use client::{HttpPredictionService, PredictionService};

/// Trigger label while idle.
pub const READY_LABEL: &str = "Simulate";
/// Trigger label while a run is in flight.
pub const BUSY_LABEL: &str = "Simulating...";

/// State of the control that starts a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Ready,
    Busy,
}

impl TriggerState {
    /// Label shown on the control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => READY_LABEL,
            Self::Busy => BUSY_LABEL,
        }
    }
}

/// The trigger control's enabled/busy state.
#[derive(Debug, Default)]
pub struct TriggerControl {
    state: Cell<TriggerState>,
}

impl TriggerControl {
    /// Create a ready control.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state.get()
    }

    /// Check if the control accepts a new run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state() == TriggerState::Ready
    }

    /// Current label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    /// Disable the control until the returned guard drops.
    ///
    /// Returns `None` if the control is already busy.
    #[must_use]
    pub fn acquire(&self) -> Option<BusyGuard<'_>> {
        if !self.is_enabled() {
            return None;
        }
        self.state.set(TriggerState::Busy);
        Some(BusyGuard { control: self })
    }
}

/// Scoped busy state; re-enables the trigger on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    control: &'a TriggerControl,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.control.state.set(TriggerState::Ready);
    }
}

/// Blocking user notification.
pub trait Notifier {
    /// Show a message the user must acknowledge.
    fn alert(&self, message: &str);
}

/// Notifier that holds one pending alert until dismissed.
///
/// Front-ends render the alert modally and call [`AlertSlot::dismiss`].
#[derive(Debug, Clone, Default)]
pub struct AlertSlot {
    message: Rc<RefCell<Option<String>>>,
}

impl AlertSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending alert text, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.message.borrow().clone()
    }

    /// Check if an alert is waiting for acknowledgement.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.message.borrow().is_some()
    }

    /// Acknowledge the pending alert.
    pub fn dismiss(&self) -> Option<String> {
        self.message.borrow_mut().take()
    }
}

impl Notifier for AlertSlot {
    fn alert(&self, message: &str) {
        *self.message.borrow_mut() = Some(message.to_string());
    }
}

/// Orchestrates simulation runs and owns the single live animation slot.
pub struct SessionController<P, N> {
    service: P,
    notifier: N,
    scheduler: Rc<RefCell<dyn FrameScheduler>>,
    trigger: Rc<TriggerControl>,
    live: RefCell<Option<AnimationHandle>>,
    last_view: Cell<Option<ViewTransform>>,
    surface: SurfaceSize,
    style: FrameStyle,
    view_options: ViewOptions,
    timeout: Duration,
    runs: Cell<u64>,
}

impl<P, N> std::fmt::Debug for SessionController<P, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("trigger", &self.trigger.state())
            .field("live", &self.live.borrow().as_ref().map(AnimationHandle::id))
            .field("runs", &self.runs.get())
            .finish_non_exhaustive()
    }
}

impl<P: PredictionService, N: Notifier> SessionController<P, N> {
    /// Create a session controller.
    ///
    /// Playback steps are queued on `scheduler`; surface size, style, view
    /// fitting and the request timeout come from `config`.
    #[must_use]
    pub fn new(
        service: P,
        notifier: N,
        scheduler: Rc<RefCell<dyn FrameScheduler>>,
        config: &ViewerConfig,
    ) -> Self {
        Self {
            service,
            notifier,
            scheduler,
            trigger: Rc::new(TriggerControl::new()),
            live: RefCell::new(None),
            last_view: Cell::new(None),
            surface: config.surface_size(),
            style: config.frame_style(),
            view_options: config.view_options(),
            timeout: config.request_timeout(),
            runs: Cell::new(0),
        }
    }

    /// The trigger control this controller drives.
    #[must_use]
    pub fn trigger(&self) -> Rc<TriggerControl> {
        Rc::clone(&self.trigger)
    }

    /// The notifier in use.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Handle of the most recently started animation.
    #[must_use]
    pub fn live_animation(&self) -> Option<AnimationHandle> {
        self.live.borrow().clone()
    }

    /// View transform fitted for the most recent successful run.
    #[must_use]
    pub fn last_view(&self) -> Option<ViewTransform> {
        self.last_view.get()
    }

    /// Cancel the live animation, if any. Returns whether one was running.
    pub fn cancel_live(&self) -> bool {
        self.live
            .borrow_mut()
            .take()
            .is_some_and(|handle| handle.cancel())
    }

    /// Run one simulation from form input.
    ///
    /// # Errors
    ///
    /// - `Busy` if a run is already in flight (nothing else happens)
    /// - `RequestFailed`, `Network`, `Timeout`, `MalformedResponse` or
    ///   `UnequalTrajectoryLengths` if the exchange fails; these are also
    ///   reported through the notifier
    pub async fn run_simulation(&self, input: &DisplayInput) -> ViewerResult<AnimationHandle> {
        let Some(_busy) = self.trigger.acquire() else {
            tracing::debug!("run ignored, trigger is busy");
            return Err(ViewerError::Busy);
        };

        self.cancel_live();
        let run = self.runs.get() + 1;
        self.runs.set(run);

        let request = input.to_request();
        if !request.is_well_formed() {
            tracing::debug!(run, ?request, "request contains unparsable fields");
        }
        tracing::info!(run, steps = ?request.steps, "starting simulation");

        match self.fetch(&request).await {
            Ok(result) => {
                tracing::info!(run, points = result.len(), "received trajectories");
                Ok(self.start_playback(run, result))
            }
            Err(err) => {
                tracing::error!(run, error = %err, "simulation request failed");
                self.notifier.alert(&err.user_message());
                Err(err)
            }
        }
    }

    async fn fetch(&self, request: &SimulationRequest) -> ViewerResult<SimulationResult> {
        tokio::time::timeout(self.timeout, self.service.predict(request))
            .await
            .unwrap_or_else(|_| {
                Err(ViewerError::Timeout {
                    after_ms: self.timeout.as_millis() as u64,
                })
            })
    }

    fn start_playback(&self, run: u64, result: SimulationResult) -> AnimationHandle {
        let result = Rc::new(result);
        let view = ViewTransform::fit(&result, self.surface, &self.view_options);
        tracing::debug!(run, scale = view.scale, "view transform fitted");
        self.last_view.set(Some(view));

        let controller = AnimationController::new(run, result, FrameComposer::new(self.style, view));
        let handle = controller.start(&mut *self.scheduler.borrow_mut());
        *self.live.borrow_mut() = Some(handle.clone());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::PlaybackPhase;
    use crate::engine::scheduler::FrameQueue;
    use crate::orbit::render::{CommandBuffer, RenderCommand};
    use crate::orbit::{Point, Trajectory};
    use std::collections::VecDeque;

    /// Scripted service answering from a queue after an optional delay.
    #[derive(Default)]
    struct ScriptedService {
        responses: RefCell<VecDeque<ViewerResult<SimulationResult>>>,
        requests: RefCell<Vec<SimulationRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedService {
        fn answering(responses: Vec<ViewerResult<SimulationResult>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                ..Self::default()
            }
        }
    }

    impl PredictionService for ScriptedService {
        async fn predict(&self, request: &SimulationRequest) -> ViewerResult<SimulationResult> {
            self.requests.borrow_mut().push(*request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ViewerError::Network("no scripted response".into())))
        }
    }

    /// Never answers.
    struct HangingService;

    impl PredictionService for HangingService {
        async fn predict(&self, _: &SimulationRequest) -> ViewerResult<SimulationResult> {
            std::future::pending().await
        }
    }

    fn orbit(n: usize, radius: f64) -> SimulationResult {
        let path = |r: f64| -> Trajectory {
            (0..n)
                .map(|i| {
                    let a = i as f64 * 0.1;
                    Point::new(r * a.cos(), r * a.sin())
                })
                .collect()
        };
        SimulationResult::new(path(radius), path(radius * 0.9)).unwrap()
    }

    fn session<P: PredictionService>(
        service: P,
        config: &ViewerConfig,
    ) -> (SessionController<P, AlertSlot>, Rc<RefCell<FrameQueue>>) {
        let queue = Rc::new(RefCell::new(FrameQueue::new()));
        let scheduler: Rc<RefCell<dyn FrameScheduler>> = queue.clone();
        (
            SessionController::new(service, AlertSlot::new(), scheduler, config),
            queue,
        )
    }

    fn drain(queue: &Rc<RefCell<FrameQueue>>, surface: &mut CommandBuffer) -> u64 {
        queue.borrow_mut().run_until_idle(surface, 10_000)
    }

    #[tokio::test]
    async fn test_successful_run_starts_playback() {
        let config = ViewerConfig::default();
        let (session, queue) = session(ScriptedService::answering(vec![Ok(orbit(5, 1e11))]), &config);

        let handle = session.run_simulation(&DisplayInput::earth_like()).await.unwrap();

        assert!(handle.is_running());
        assert!(session.trigger().is_enabled());
        assert_eq!(session.trigger().label(), READY_LABEL);
        assert!(!session.notifier().is_open());
        assert_eq!(session.live_animation().unwrap().id(), handle.id());
        assert!(session.last_view().unwrap().scale > 0.0);

        let mut surface = CommandBuffer::new(config.surface_size());
        assert_eq!(drain(&queue, &mut surface), 5);
        assert_eq!(handle.phase(), PlaybackPhase::Completed);
    }

    #[tokio::test]
    async fn test_request_is_built_from_display_units() {
        let config = ViewerConfig::default();
        let service = ScriptedService::answering(vec![Ok(orbit(2, 1.0))]);
        let (session, _queue) = session(service, &config);

        session
            .run_simulation(&DisplayInput::new("1.0", "0", "30", "0", "360"))
            .await
            .unwrap();

        let requests = session.service.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!((requests[0].x - 1e11).abs() < 1e-3);
        assert!((requests[0].vx - 30_000.0).abs() < 1e-9);
        assert_eq!(requests[0].steps, Some(360));
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_trigger_restored() {
        let config = ViewerConfig::default();
        let service = ScriptedService::answering(vec![Err(ViewerError::RequestFailed { status: 500 })]);
        let (session, queue) = session(service, &config);

        let err = session.run_simulation(&DisplayInput::earth_like()).await.unwrap_err();

        assert!(matches!(err, ViewerError::RequestFailed { status: 500 }));
        assert!(session.trigger().is_enabled());
        assert!(session.notifier().current().unwrap().contains("500"));
        assert!(session.live_animation().is_none());
        assert!(queue.borrow().is_idle());
    }

    #[tokio::test]
    async fn test_unequal_result_is_reported() {
        let config = ViewerConfig::default();
        let service = ScriptedService::answering(vec![Err(ViewerError::UnequalTrajectoryLengths {
            physics: 3,
            ml: 2,
        })]);
        let (session, queue) = session(service, &config);

        let err = session.run_simulation(&DisplayInput::earth_like()).await.unwrap_err();
        assert!(matches!(err, ViewerError::UnequalTrajectoryLengths { .. }));
        assert!(session.notifier().is_open());
        assert!(queue.borrow().is_idle());
    }

    #[tokio::test]
    async fn test_timeout_releases_trigger() {
        let config = ViewerConfig::builder().timeout_ms(20).build();
        let (session, _queue) = session(HangingService, &config);

        let err = session.run_simulation(&DisplayInput::earth_like()).await.unwrap_err();

        assert!(matches!(err, ViewerError::Timeout { after_ms: 20 }));
        assert!(session.trigger().is_enabled());
        assert!(session.notifier().is_open());
    }

    #[tokio::test]
    async fn test_new_run_cancels_previous_animation() {
        let config = ViewerConfig::default();
        let service = ScriptedService::answering(vec![Ok(orbit(100, 1e11)), Ok(orbit(3, 2e11))]);
        let (session, queue) = session(service, &config);
        let mut surface = CommandBuffer::new(config.surface_size());

        let first = session.run_simulation(&DisplayInput::earth_like()).await.unwrap();
        queue.borrow_mut().tick(&mut surface);
        queue.borrow_mut().tick(&mut surface);

        let second = session.run_simulation(&DisplayInput::earth_like()).await.unwrap();
        assert_eq!(first.phase(), PlaybackPhase::Cancelled);
        assert_eq!(first.state().frames_composed, 2);

        while !queue.borrow().is_idle() {
            queue.borrow_mut().tick(&mut surface);
            for cmd in surface.commands() {
                if let RenderCommand::StrokePath { points, .. } = cmd {
                    assert!(points.len() <= 3);
                }
            }
        }
        assert_eq!(first.state().frames_composed, 2);
        assert_eq!(second.phase(), PlaybackPhase::Completed);
        assert_eq!(second.state().frames_composed, 3);
    }

    #[tokio::test]
    async fn test_failed_run_still_cancels_previous_animation() {
        let config = ViewerConfig::default();
        let service = ScriptedService::answering(vec![
            Ok(orbit(50, 1e11)),
            Err(ViewerError::Network("refused".into())),
        ]);
        let (session, queue) = session(service, &config);

        let first = session.run_simulation(&DisplayInput::earth_like()).await.unwrap();
        assert!(session.run_simulation(&DisplayInput::earth_like()).await.is_err());

        assert_eq!(first.phase(), PlaybackPhase::Cancelled);
        let mut surface = CommandBuffer::new(config.surface_size());
        drain(&queue, &mut surface);
        assert_eq!(first.state().frames_composed, 0);
    }

    #[tokio::test]
    async fn test_busy_trigger_rejects_second_run() {
        let config = ViewerConfig::default();
        let service = ScriptedService {
            delay: Some(Duration::from_millis(20)),
            ..ScriptedService::answering(vec![Ok(orbit(4, 1e11)), Ok(orbit(4, 1e11))])
        };
        let (session, _queue) = session(service, &config);
        let session = Rc::new(session);

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let background = Rc::clone(&session);
                let task = tokio::task::spawn_local(async move {
                    background.run_simulation(&DisplayInput::earth_like()).await
                });

                for _ in 0..100 {
                    if !session.trigger().is_enabled() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                assert_eq!(session.trigger().state(), TriggerState::Busy);
                assert_eq!(session.trigger().label(), BUSY_LABEL);

                let err = session.run_simulation(&DisplayInput::earth_like()).await.unwrap_err();
                assert!(matches!(err, ViewerError::Busy));
                assert!(!session.notifier().is_open());

                task.await.unwrap().unwrap();
                assert!(session.trigger().is_enabled());
            })
            .await;

        assert_eq!(session.service.requests.borrow().len(), 1);
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let control = TriggerControl::new();
        {
            let _guard = control.acquire().unwrap();
            assert_eq!(control.state(), TriggerState::Busy);
            assert!(control.acquire().is_none());
        }
        assert!(control.is_enabled());
    }

    #[test]
    fn test_alert_slot() {
        let slot = AlertSlot::new();
        assert!(!slot.is_open());
        slot.alert("boom");
        assert_eq!(slot.current().as_deref(), Some("boom"));
        assert_eq!(slot.dismiss().as_deref(), Some("boom"));
        assert!(!slot.is_open());
    }

    #[test]
    fn test_cancel_live_without_animation() {
        let (session, _queue) = session(HangingService, &ViewerConfig::default());
        assert!(!session.cancel_live());
    }
}
