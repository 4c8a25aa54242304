//! Viewer TUI application state and logic.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use crossterm::event::KeyCode;

use crate::config::ViewerConfig;
use crate::engine::{AnimationHandle, FrameQueue, FrameScheduler};
use crate::error::ViewerResult;
use crate::orbit::compose::FrameComposer;
use crate::orbit::render::CommandBuffer;
use crate::orbit::units::DisplayInput;
use crate::session::{AlertSlot, PredictionService, SessionController, TriggerControl};

/// Editable form fields, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
    Vx,
    Vy,
    Steps,
}

impl Field {
    /// All fields in focus order.
    pub const ALL: [Self; 5] = [Self::X, Self::Y, Self::Vx, Self::Vy, Self::Steps];

    /// Field label with its unit.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "x (AU)",
            Self::Y => "y (AU)",
            Self::Vx => "vx (km/s)",
            Self::Vy => "vy (km/s)",
            Self::Steps => "steps",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Vx => 2,
            Self::Vy => 3,
            Self::Steps => 4,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub const fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Request from the app to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Start a simulation with this input.
    Simulate(DisplayInput),
}

/// Application state for the viewer.
pub struct ViewerApp<P> {
    /// Form contents.
    pub input: DisplayInput,
    /// Focused field.
    pub focus: Field,
    /// Whether the app should quit.
    pub should_quit: bool,
    session: Rc<SessionController<P, AlertSlot>>,
    queue: Rc<RefCell<FrameQueue>>,
    surface: CommandBuffer,
    alert: AlertSlot,
}

impl<P: PredictionService> ViewerApp<P> {
    /// Create the app around a prediction service.
    #[must_use]
    pub fn new(service: P, config: &ViewerConfig) -> Self {
        let queue = Rc::new(RefCell::new(FrameQueue::new()));
        let scheduler: Rc<RefCell<dyn FrameScheduler>> = queue.clone();
        let alert = AlertSlot::new();
        let session = SessionController::new(service, alert.clone(), scheduler, config);

        let mut surface = CommandBuffer::new(config.surface_size());
        FrameComposer::compose_idle(&config.frame_style(), &mut surface);

        Self {
            input: DisplayInput::earth_like(),
            focus: Field::X,
            should_quit: false,
            session: Rc::new(session),
            queue,
            surface,
            alert,
        }
    }

    /// Handle a key press.
    ///
    /// While an alert is open only Enter and Esc are accepted; both dismiss
    /// it.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<AppAction> {
        if self.alert.is_open() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                self.alert.dismiss();
            }
            return None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') => {
                self.field_mut().push(c);
            }
            KeyCode::Enter | KeyCode::F(5) => {
                if self.trigger().is_enabled() {
                    return Some(AppAction::Simulate(self.input.clone()));
                }
            }
            _ => {}
        }
        None
    }

    /// Future running one simulation on this app's session.
    ///
    /// The future is `'static` so the event loop can spawn it locally.
    pub fn simulation(
        &self,
        input: DisplayInput,
    ) -> impl Future<Output = ViewerResult<AnimationHandle>> + 'static
    where
        P: 'static,
    {
        let session = Rc::clone(&self.session);
        async move { session.run_simulation(&input).await }
    }

    /// Advance playback by one frame.
    pub fn update(&mut self) {
        self.queue.borrow_mut().tick(&mut self.surface);
    }

    /// Current image.
    #[must_use]
    pub fn surface(&self) -> &CommandBuffer {
        &self.surface
    }

    /// Trigger control state.
    #[must_use]
    pub fn trigger(&self) -> Rc<TriggerControl> {
        self.session.trigger()
    }

    /// Pending alert text.
    #[must_use]
    pub fn alert(&self) -> Option<String> {
        self.alert.current()
    }

    /// Handle of the latest playback.
    #[must_use]
    pub fn animation(&self) -> Option<AnimationHandle> {
        self.session.live_animation()
    }

    /// Text of a form field.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::X => &self.input.x,
            Field::Y => &self.input.y,
            Field::Vx => &self.input.vx,
            Field::Vy => &self.input.vy,
            Field::Steps => &self.input.steps,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            Field::X => &mut self.input.x,
            Field::Y => &mut self.input.y,
            Field::Vx => &mut self.input.vx,
            Field::Vy => &mut self.input.vy,
            Field::Steps => &mut self.input.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlaybackPhase;
    use crate::error::ViewerError;
    use crate::orbit::units::SimulationRequest;
    use crate::orbit::{Point, SimulationResult, Trajectory};
    use crate::session::{Notifier, BUSY_LABEL, READY_LABEL};

    struct StubService {
        fail: bool,
    }

    impl PredictionService for StubService {
        async fn predict(&self, request: &SimulationRequest) -> ViewerResult<SimulationResult> {
            if self.fail {
                return Err(ViewerError::RequestFailed { status: 500 });
            }
            let n = request.steps.unwrap_or(1).max(1) as usize;
            let path: Trajectory = (0..n).map(|i| Point::new(request.x, i as f64 * 1e9)).collect();
            SimulationResult::new(path.clone(), path)
        }
    }

    fn app(fail: bool) -> ViewerApp<StubService> {
        ViewerApp::new(StubService { fail }, &ViewerConfig::default())
    }

    #[test]
    fn test_new_app_shows_idle_screen() {
        let app = app(false);
        assert!(!app.should_quit);
        assert_eq!(app.focus, Field::X);
        assert_eq!(app.input, DisplayInput::earth_like());
        assert_eq!(app.surface().circles().count(), 1);
        assert_eq!(app.trigger().label(), READY_LABEL);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = app(false);
        for expected in [Field::Y, Field::Vx, Field::Vy, Field::Steps, Field::X] {
            app.handle_key(KeyCode::Tab);
            assert_eq!(app.focus, expected);
        }
        app.handle_key(KeyCode::BackTab);
        assert_eq!(app.focus, Field::Steps);
    }

    #[test]
    fn test_edit_focused_field() {
        let mut app = app(false);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('2'));
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.field(Field::Y), "-2");
        assert_eq!(app.field(Field::X), "1.0");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(false);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app2 = self::app(false);
        app2.handle_key(KeyCode::Esc);
        assert!(app2.should_quit);
    }

    #[test]
    fn test_enter_and_f5_request_simulation() {
        let mut app = app(false);
        assert_eq!(
            app.handle_key(KeyCode::Enter),
            Some(AppAction::Simulate(DisplayInput::earth_like()))
        );
        assert!(app.handle_key(KeyCode::F(5)).is_some());
    }

    #[tokio::test]
    async fn test_simulation_plays_back() {
        let mut app = app(false);
        app.input.steps = "4".to_string();
        let Some(AppAction::Simulate(input)) = app.handle_key(KeyCode::Enter) else {
            panic!("expected simulate action");
        };

        let handle = app.simulation(input).await.unwrap();
        assert_eq!(handle.frames(), 4);
        for _ in 0..4 {
            app.update();
        }
        assert_eq!(handle.phase(), PlaybackPhase::Completed);
        assert_eq!(app.animation().unwrap().id(), handle.id());
        // star plus two markers
        assert_eq!(app.surface().circles().count(), 3);
        assert_eq!(app.surface().paths().next().unwrap().0.len(), 4);
    }

    #[tokio::test]
    async fn test_failure_opens_blocking_alert() {
        let mut app = app(true);
        let input = app.input.clone();
        assert!(app.simulation(input).await.is_err());

        assert!(app.alert().unwrap().contains("500"));
        assert!(app.trigger().is_enabled());

        // blocked while open
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert!(app.alert().is_none());
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_alert_swallows_other_keys() {
        let mut app = app(false);
        app.alert.alert("boom");
        app.handle_key(KeyCode::Char('q'));
        app.handle_key(KeyCode::Tab);
        assert!(!app.should_quit);
        assert_eq!(app.focus, Field::X);
        app.handle_key(KeyCode::Esc);
        assert!(app.alert().is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_busy_trigger_blocks_enter() {
        let mut app = app(false);
        let trigger = app.trigger();
        let _busy = trigger.acquire().unwrap();
        assert_eq!(trigger.label(), BUSY_LABEL);
        assert_eq!(app.handle_key(KeyCode::Enter), None);
    }
}
