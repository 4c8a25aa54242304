//! Platform-agnostic render commands and the drawing-surface seam.
//!
//! The composer never talks to a terminal or a canvas directly. It issues
//! calls on a [`DrawingSurface`]. [`CommandBuffer`] records those calls as
//! [`RenderCommand`]s, which the TUI paints, the CLI exports and the tests
//! inspect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ViewerError;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with an opacity in `[0, 1]`.
    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Color blended over black by its own alpha.
    ///
    /// Used by surfaces that cannot draw translucently.
    #[must_use]
    pub fn premultiplied(self) -> Self {
        let f = f64::from(self.a) / 255.0;
        let scale = |c: u8| (f64::from(c) * f).round() as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    /// Reference trajectory (light blue).
    pub const PHYSICS: Self = Self::rgb(0x42, 0xa5, 0xf5);
    /// Predicted trajectory (orange).
    pub const ML: Self = Self::rgb(0xff, 0xa7, 0x26);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ViewerError;

    /// Parse `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ViewerError::config(format!("color '{s}' must start with '#'")))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(ViewerError::config(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ViewerError::config(format!("color '{s}' is not hexadecimal")))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ViewerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Drawing-surface dimensions, in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    /// Create a surface size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square surface.
    #[must_use]
    pub const fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Check if a point lies on the surface.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::square(800.0)
    }
}

/// Platform-agnostic render command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Clear the whole surface.
    Clear { color: Color },

    /// Filled circle (central body or marker).
    FillCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },

    /// Connected polyline (trajectory trail).
    StrokePath {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f64,
    },
}

/// Target of the frame composer.
///
/// Coordinates are drawing units with the origin at the top-left corner
/// and y growing downwards.
pub trait DrawingSurface {
    /// Surface dimensions.
    fn size(&self) -> SurfaceSize;

    /// Clear the entire surface.
    fn clear(&mut self, color: Color);

    /// Draw a filled circle.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color);

    /// Draw a connected polyline through `points`.
    fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, width: f64);
}

/// Surface that records draw calls since the last clear.
///
/// A clear discards everything drawn before it, so the buffer always holds
/// exactly the current image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBuffer {
    size: SurfaceSize,
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    /// Create an empty buffer for a surface.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Commands making up the current image.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take the current image, leaving the buffer empty.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Filled circles of the current image, in draw order.
    pub fn circles(&self) -> impl Iterator<Item = (f64, f64, f64, Color)> + '_ {
        self.commands.iter().filter_map(|cmd| match *cmd {
            RenderCommand::FillCircle {
                x,
                y,
                radius,
                color,
            } => Some((x, y, radius, color)),
            _ => None,
        })
    }

    /// Polylines of the current image, in draw order.
    pub fn paths(&self) -> impl Iterator<Item = (&[(f64, f64)], Color)> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            RenderCommand::StrokePath { points, color, .. } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }
}

impl DrawingSurface for CommandBuffer {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(RenderCommand::Clear { color });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
        self.commands.push(RenderCommand::FillCircle {
            x,
            y,
            radius,
            color,
        });
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, width: f64) {
        self.commands.push(RenderCommand::StrokePath {
            points: points.to_vec(),
            color,
            width,
        });
    }
}
