//! Trajectory data model and the per-frame drawing pipeline.
//!
//! - `units`: display-unit input and the SI request payload
//! - `scale`: one view transform per run, fitted to both trajectories
//! - `render`: colors, render commands and the drawing-surface seam
//! - `compose`: path renderer and frame composer
//! - `export`: JSON Lines frame export
//!
//! # Example
//!
//! ```rust
//! use orbcompare::orbit::prelude::*;
//!
//! let physics = Trajectory::from_points(vec![Point::new(1e11, 0.0), Point::new(0.0, 1e11)]);
//! let ml = Trajectory::from_points(vec![Point::new(1e11, 0.0), Point::new(0.0, 0.9e11)]);
//! let result = SimulationResult::new(physics, ml).expect("equal lengths");
//!
//! let view = ViewTransform::fit(&result, SurfaceSize::square(800.0), &ViewOptions::default());
//! let mut surface = CommandBuffer::new(SurfaceSize::square(800.0));
//! FrameComposer::new(FrameStyle::default(), view).compose(&result, 1, &mut surface);
//! assert!(!surface.commands().is_empty());
//! ```

pub mod compose;
pub mod export;
pub mod render;
pub mod scale;
pub mod units;

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::compose::{FrameComposer, FrameStyle, PathRenderer};
    pub use super::export::{FileExporter, FrameExporter, FrameRecord};
    pub use super::render::{
        Color, CommandBuffer, DrawingSurface, RenderCommand, SurfaceSize,
    };
    pub use super::scale::{ViewOptions, ViewTransform};
    pub use super::units::{DisplayInput, SimulationRequest, METERS_PER_DISPLAY_UNIT};
    pub use super::{Point, PredictionResponse, SimulationResult, Trajectory};
}

/// A position in simulation space, in meters.
///
/// On the wire a point is a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest absolute coordinate component.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    /// Check if both components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Ordered sequence of points; the index is the discrete time step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<Point>,
}

impl Trajectory {
    /// Create a trajectory from points.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// All points in time order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the trajectory has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at a time step.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Largest absolute x or y over the whole trajectory (0 when empty).
    #[must_use]
    pub fn max_abs_component(&self) -> f64 {
        self.points.iter().map(Point::max_abs).fold(0.0, f64::max)
    }
}

impl FromIterator<Point> for Trajectory {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

/// Response body of the prediction service, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub physics_path: Trajectory,
    pub ml_path: Trajectory,
}

/// A validated pair of trajectories ready for playback.
///
/// Both trajectories are non-empty, have equal length and contain only
/// finite coordinates. A result is never mutated; the next run replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    physics_path: Trajectory,
    ml_path: Trajectory,
}

impl SimulationResult {
    /// Validate and pair two trajectories.
    ///
    /// # Errors
    ///
    /// - `UnequalTrajectoryLengths` if the lengths differ
    /// - `MalformedResponse` if a trajectory is empty or holds a non-finite point
    pub fn new(physics_path: Trajectory, ml_path: Trajectory) -> ViewerResult<Self> {
        if physics_path.len() != ml_path.len() {
            return Err(ViewerError::UnequalTrajectoryLengths {
                physics: physics_path.len(),
                ml: ml_path.len(),
            });
        }
        if physics_path.is_empty() {
            return Err(ViewerError::malformed("trajectories contain no points"));
        }
        for (name, path) in [("physics_path", &physics_path), ("ml_path", &ml_path)] {
            if let Some(index) = path.points().iter().position(|p| !p.is_finite()) {
                return Err(ViewerError::malformed(format!(
                    "{name} has a non-finite point at index {index}"
                )));
            }
        }
        Ok(Self {
            physics_path,
            ml_path,
        })
    }

    /// Reference trajectory.
    #[must_use]
    pub fn physics_path(&self) -> &Trajectory {
        &self.physics_path
    }

    /// Predicted trajectory.
    #[must_use]
    pub fn ml_path(&self) -> &Trajectory {
        &self.ml_path
    }

    /// Number of frames in a playback of this result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.physics_path.len()
    }

    /// False for any validated result; construction rejects empty paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.physics_path.is_empty()
    }

    /// Index of the terminal frame.
    #[must_use]
    pub fn last_frame(&self) -> usize {
        self.len() - 1
    }

    /// Largest absolute coordinate over both trajectories.
    #[must_use]
    pub fn max_abs_component(&self) -> f64 {
        self.physics_path
            .max_abs_component()
            .max(self.ml_path.max_abs_component())
    }
}

impl TryFrom<PredictionResponse> for SimulationResult {
    type Error = ViewerError;

    fn try_from(response: PredictionResponse) -> ViewerResult<Self> {
        Self::new(response.physics_path, response.ml_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(f64, f64)]) -> Trajectory {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_point_wire_format() {
        let p: Point = serde_json::from_str("[1.5, -2.0]").unwrap();
        assert_eq!(p, Point::new(1.5, -2.0));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1.5,-2.0]");
    }

    #[test]
    fn test_point_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Point>("[1.0]").is_err());
        assert!(serde_json::from_str::<Point>("[1.0, 2.0, 3.0]").is_err());
        assert!(serde_json::from_str::<Point>(r#"{"x": 1.0, "y": 2.0}"#).is_err());
    }

    #[test]
    fn test_trajectory_max_abs_component() {
        let t = path(&[(1.0, -5.0), (3.0, 2.0)]);
        assert!((t.max_abs_component() - 5.0).abs() < 1e-12);
        assert!(Trajectory::default().max_abs_component().abs() < 1e-12);
    }

    #[test]
    fn test_response_decodes() {
        let body = r#"{"physics_path": [[1.0, 0.0], [0.0, 1.0]], "ml_path": [[1.0, 0.0], [0.0, 0.9]], "extra": 1}"#;
        let response: PredictionResponse = serde_json::from_str(body).unwrap();
        let result = SimulationResult::try_from(response).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
        assert_eq!(result.last_frame(), 1);
        assert_eq!(result.ml_path().get(1), Some(Point::new(0.0, 0.9)));
    }

    #[test]
    fn test_response_missing_field_fails() {
        let body = r#"{"physics_path": [[1.0, 0.0]]}"#;
        assert!(serde_json::from_str::<PredictionResponse>(body).is_err());
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        let err = SimulationResult::new(path(&[(0.0, 0.0), (1.0, 1.0)]), path(&[(0.0, 0.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::UnequalTrajectoryLengths { physics: 2, ml: 1 }
        ));
    }

    #[test]
    fn test_empty_result_rejected() {
        let err = SimulationResult::new(Trajectory::default(), Trajectory::default()).unwrap_err();
        assert!(matches!(err, ViewerError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let err = SimulationResult::new(
            path(&[(0.0, 0.0), (1.0, 1.0)]),
            path(&[(0.0, 0.0), (f64::NAN, 1.0)]),
        )
        .unwrap_err();
        match err {
            ViewerError::MalformedResponse(msg) => assert!(msg.contains("ml_path") && msg.contains('1')),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_result_max_abs_spans_both_paths() {
        let result =
            SimulationResult::new(path(&[(1.0, 2.0)]), path(&[(-7.0, 0.5)])).unwrap();
        assert!((result.max_abs_component() - 7.0).abs() < 1e-12);
    }
}
