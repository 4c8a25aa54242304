//! View transform: simulation meters to drawing units.
//!
//! One transform is fitted per run from the full extent of both
//! trajectories and then held fixed, so trails never rescale mid-playback.

use serde::{Deserialize, Serialize};

use super::render::SurfaceSize;
use super::{Point, SimulationResult};

/// Tuning for [`ViewTransform::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Visible extent as a multiple of the largest coordinate.
    ///
    /// `2.2` leaves a 10% margin on each side of the symmetric extent.
    pub margin_factor: f64,
    /// Scale used when the trajectories have no extent at all.
    pub fallback_scale: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            margin_factor: 2.2,
            fallback_scale: 1.0,
        }
    }
}

/// Linear map from simulation space to the drawing surface.
///
/// `draw = center + position * scale` on both axes; y is not flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl ViewTransform {
    /// Fit both trajectories of a result onto a surface.
    ///
    /// The scale uses the shorter surface side so the margin holds on both
    /// axes. A zero or non-finite extent falls back to
    /// `options.fallback_scale`.
    #[must_use]
    pub fn fit(result: &SimulationResult, size: SurfaceSize, options: &ViewOptions) -> Self {
        Self::fit_extent(result.max_abs_component(), size, options)
    }

    /// Fit a known maximum absolute coordinate onto a surface.
    #[must_use]
    pub fn fit_extent(max_dist: f64, size: SurfaceSize, options: &ViewOptions) -> Self {
        let (center_x, center_y) = size.center();
        let extent = size.width.min(size.height);
        let scale = extent / (max_dist * options.margin_factor);

        let scale = if max_dist > 0.0 && scale.is_finite() && scale > 0.0 {
            scale
        } else {
            tracing::warn!(
                max_dist,
                fallback = options.fallback_scale,
                "trajectories have no usable extent, using fallback scale"
            );
            options.fallback_scale
        };

        Self {
            scale,
            center_x,
            center_y,
        }
    }

    /// Map a simulation point to drawing coordinates.
    #[must_use]
    pub fn apply(&self, point: Point) -> (f64, f64) {
        (
            self.center_x + point.x * self.scale,
            self.center_y + point.y * self.scale,
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::orbit::Trajectory;
    use proptest::prelude::*;

    fn path_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-1e13f64..1e13, -1e13f64..1e13), 1..40)
    }

    proptest! {
        /// Every point of either trajectory lands inside the surface with
        /// at least a 10% margin of the half-extent on each axis.
        #[test]
        fn prop_all_points_within_margin(
            physics in path_strategy(),
            ml_seed in path_strategy(),
            width in 50.0f64..2000.0,
            height in 50.0f64..2000.0,
        ) {
            let n = physics.len().min(ml_seed.len());
            let to_path = |pts: &[(f64, f64)]| -> Trajectory {
                pts[..n].iter().map(|&(x, y)| Point::new(x, y)).collect()
            };
            let result = SimulationResult::new(to_path(&physics), to_path(&ml_seed)).unwrap();
            let size = SurfaceSize::new(width, height);
            let view = ViewTransform::fit(&result, size, &ViewOptions::default());

            prop_assert!(view.scale > 0.0 && view.scale.is_finite());
            let limit = width.min(height) / 2.2 * (1.0 + 1e-9);
            for p in result.physics_path().points().iter().chain(result.ml_path().points()) {
                let (dx, dy) = view.apply(*p);
                prop_assert!(size.contains(dx, dy));
                prop_assert!((dx - view.center_x).abs() <= limit);
                prop_assert!((dy - view.center_y).abs() <= limit);
            }
        }

        /// The mapping is linear: the midpoint maps to the midpoint.
        #[test]
        fn prop_mapping_linear(
            ax in -1e12f64..1e12, ay in -1e12f64..1e12,
            bx in -1e12f64..1e12, by in -1e12f64..1e12,
            max_dist in 1e9f64..1e13,
        ) {
            let view = ViewTransform::fit_extent(max_dist, SurfaceSize::square(800.0), &ViewOptions::default());
            let (ax_d, ay_d) = view.apply(Point::new(ax, ay));
            let (bx_d, by_d) = view.apply(Point::new(bx, by));
            let (mx, my) = view.apply(Point::new((ax + bx) / 2.0, (ay + by) / 2.0));
            prop_assert!((mx - (ax_d + bx_d) / 2.0).abs() < 1e-6);
            prop_assert!((my - (ay_d + by_d) / 2.0).abs() < 1e-6);
        }
    }
}
