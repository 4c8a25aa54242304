//! Viewer configuration with YAML schema and validation.
//!
//! - Type-safe configuration structs
//! - Schema checks via serde (`deny_unknown_fields`) and `validator`
//! - Runtime semantic validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::error::{ViewerError, ViewerResult};
use crate::orbit::compose::FrameStyle;
use crate::orbit::render::{Color, SurfaceSize};
use crate::orbit::scale::ViewOptions;

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Prediction service connection.
    #[validate(nested)]
    #[serde(default)]
    pub service: ServiceConfig,

    /// Drawing-surface dimensions.
    #[validate(nested)]
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Colors and sizes.
    #[validate(nested)]
    #[serde(default)]
    pub style: StyleConfig,

    /// View-transform fitting.
    #[validate(nested)]
    #[serde(default)]
    pub view: ViewConfig,

    /// Playback clock.
    #[validate(nested)]
    #[serde(default)]
    pub playback: PlaybackConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl ViewerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> ViewerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ViewerResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> ViewerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ViewerConfigBuilder {
        ViewerConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> ViewerResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> ViewerResult<()> {
        if self.style.physics_color == self.style.ml_color {
            return Err(ViewerError::config(
                "physics_color and ml_color must differ",
            ));
        }
        if !(self.view.margin_factor > 2.0 && self.view.margin_factor.is_finite()) {
            return Err(ViewerError::config(format!(
                "margin_factor must exceed 2.0 to keep trajectories on screen, got {}",
                self.view.margin_factor
            )));
        }
        if !(self.view.fallback_scale > 0.0 && self.view.fallback_scale.is_finite()) {
            return Err(ViewerError::config("fallback_scale must be positive"));
        }
        Ok(())
    }

    /// Surface dimensions.
    #[must_use]
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.surface.width, self.surface.height)
    }

    /// Frame style for the composer.
    #[must_use]
    pub fn frame_style(&self) -> FrameStyle {
        FrameStyle {
            background: self.style.background,
            star_color: self.style.star_color,
            star_radius: self.style.star_radius,
            physics_color: self.style.physics_color,
            ml_color: self.style.ml_color,
            marker_radius: self.style.marker_radius,
            trail_alpha: self.style.trail_alpha,
            trail_width: self.style.trail_width,
        }
    }

    /// View-fitting options.
    #[must_use]
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            margin_factor: self.view.margin_factor,
            fallback_scale: self.view.fallback_scale,
        }
    }

    /// Request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.service.timeout_ms)
    }

    /// Interval between playback frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.playback.frame_interval_ms)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            service: ServiceConfig::default(),
            surface: SurfaceConfig::default(),
            style: StyleConfig::default(),
            view: ViewConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ViewerConfigBuilder {
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
    surface: Option<SurfaceSize>,
    frame_interval_ms: Option<u64>,
}

impl ViewerConfigBuilder {
    /// Set the prediction endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the surface dimensions.
    #[must_use]
    pub const fn surface(mut self, size: SurfaceSize) -> Self {
        self.surface = Some(size);
        self
    }

    /// Set the playback frame interval in milliseconds.
    #[must_use]
    pub const fn frame_interval_ms(mut self, ms: u64) -> Self {
        self.frame_interval_ms = Some(ms);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ViewerConfig {
        let mut config = ViewerConfig::default();

        if let Some(endpoint) = self.endpoint {
            config.service.endpoint = endpoint;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.service.timeout_ms = timeout_ms;
        }
        if let Some(size) = self.surface {
            config.surface.width = size.width;
            config.surface.height = size.height;
        }
        if let Some(ms) = self.frame_interval_ms {
            config.playback.frame_interval_ms = ms;
        }

        config
    }
}

/// Prediction service connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Full URL of the predict endpoint.
    #[validate(url)]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in milliseconds.
    #[validate(range(min = 1))]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/predict".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Drawing-surface dimensions in drawing units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SurfaceConfig {
    #[validate(range(min = 1.0))]
    #[serde(default = "default_side")]
    pub width: f64,
    #[validate(range(min = 1.0))]
    #[serde(default = "default_side")]
    pub height: f64,
}

const fn default_side() -> f64 {
    800.0
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_side(),
            height: default_side(),
        }
    }
}

/// Colors (`#rrggbb`) and sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_star_color")]
    pub star_color: Color,
    #[serde(default = "default_physics_color")]
    pub physics_color: Color,
    #[serde(default = "default_ml_color")]
    pub ml_color: Color,
    /// Trail opacity.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_trail_alpha")]
    pub trail_alpha: f64,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_trail_width")]
    pub trail_width: f64,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_star_radius")]
    pub star_radius: f64,
}

const fn default_background() -> Color {
    Color::BLACK
}

const fn default_star_color() -> Color {
    Color::YELLOW
}

const fn default_physics_color() -> Color {
    Color::PHYSICS
}

const fn default_ml_color() -> Color {
    Color::ML
}

const fn default_trail_alpha() -> f64 {
    0.6
}

const fn default_trail_width() -> f64 {
    1.0
}

const fn default_marker_radius() -> f64 {
    5.0
}

const fn default_star_radius() -> f64 {
    8.0
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            star_color: default_star_color(),
            physics_color: default_physics_color(),
            ml_color: default_ml_color(),
            trail_alpha: default_trail_alpha(),
            trail_width: default_trail_width(),
            marker_radius: default_marker_radius(),
            star_radius: default_star_radius(),
        }
    }
}

/// View-transform fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Visible extent as a multiple of the largest coordinate (> 2).
    #[serde(default = "default_margin_factor")]
    pub margin_factor: f64,
    /// Drawing units per meter when trajectories have no extent.
    #[serde(default = "default_fallback_scale")]
    pub fallback_scale: f64,
}

const fn default_margin_factor() -> f64 {
    2.2
}

const fn default_fallback_scale() -> f64 {
    1.0
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            margin_factor: default_margin_factor(),
            fallback_scale: default_fallback_scale(),
        }
    }
}

/// Playback clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Milliseconds between frame ticks in the interactive viewer.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

const fn default_frame_interval_ms() -> u64 {
    33
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}
