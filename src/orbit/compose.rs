//! Path renderer and frame composer.
//!
//! A frame is a pure function of (result, frame index, view transform,
//! style): composing the same frame twice produces the same image.

use serde::{Deserialize, Serialize};

use super::render::{Color, DrawingSurface};
use super::scale::ViewTransform;
use super::{SimulationResult, Trajectory};

/// Colors and sizes used when composing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStyle {
    pub background: Color,
    pub star_color: Color,
    pub star_radius: f64,
    pub physics_color: Color,
    pub ml_color: Color,
    pub marker_radius: f64,
    pub trail_alpha: f64,
    pub trail_width: f64,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            star_color: Color::YELLOW,
            star_radius: 8.0,
            physics_color: Color::PHYSICS,
            ml_color: Color::ML,
            marker_radius: 5.0,
            trail_alpha: 0.6,
            trail_width: 1.0,
        }
    }
}

/// Draws one trajectory's trail and current-position marker.
#[derive(Debug, Clone, Copy)]
pub struct PathRenderer<'a> {
    view: &'a ViewTransform,
    style: &'a FrameStyle,
}

impl<'a> PathRenderer<'a> {
    /// Create a renderer bound to a view and style.
    #[must_use]
    pub const fn new(view: &'a ViewTransform, style: &'a FrameStyle) -> Self {
        Self { view, style }
    }

    /// Draw points `0..=frame` as a translucent trail, then an opaque marker
    /// at `frame`.
    ///
    /// `frame` past the end is clamped to the last point. An empty
    /// trajectory draws nothing.
    pub fn draw(
        &self,
        path: &Trajectory,
        color: Color,
        frame: usize,
        surface: &mut dyn DrawingSurface,
    ) {
        let Some(last) = path.len().checked_sub(1) else {
            return;
        };
        let frame = frame.min(last);

        let trail: Vec<(f64, f64)> = path.points()[..=frame]
            .iter()
            .map(|p| self.view.apply(*p))
            .collect();
        surface.stroke_path(
            &trail,
            color.with_alpha(self.style.trail_alpha),
            self.style.trail_width,
        );

        let (x, y) = trail[frame];
        surface.fill_circle(x, y, self.style.marker_radius, color);
    }
}

/// Composes whole frames for one run.
///
/// Holds the run's view transform so both trajectories are drawn with the
/// same scale on every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameComposer {
    style: FrameStyle,
    view: ViewTransform,
}

impl FrameComposer {
    /// Create a composer for one run.
    #[must_use]
    pub const fn new(style: FrameStyle, view: ViewTransform) -> Self {
        Self { style, view }
    }

    /// The run's view transform.
    #[must_use]
    pub const fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// The style in use.
    #[must_use]
    pub const fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Clear, draw the central body, then both trajectories up to `frame`.
    pub fn compose(&self, result: &SimulationResult, frame: usize, surface: &mut dyn DrawingSurface) {
        self.draw_background(surface);

        let renderer = PathRenderer::new(&self.view, &self.style);
        renderer.draw(result.physics_path(), self.style.physics_color, frame, surface);
        renderer.draw(result.ml_path(), self.style.ml_color, frame, surface);
    }

    /// Screen shown before any run: just the central body.
    pub fn compose_idle(style: &FrameStyle, surface: &mut dyn DrawingSurface) {
        surface.clear(style.background);
        let (cx, cy) = surface.size().center();
        surface.fill_circle(cx, cy, style.star_radius, style.star_color);
    }

    fn draw_background(&self, surface: &mut dyn DrawingSurface) {
        surface.clear(self.style.background);
        let (cx, cy) = surface.size().center();
        surface.fill_circle(cx, cy, self.style.star_radius, self.style.star_color);
    }
}
