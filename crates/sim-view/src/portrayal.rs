//! Portrayal Types
//!
//! How a single agent or environment feature should be drawn.

use serde::{Deserialize, Serialize};

/// Shape used to draw an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    /// Directional triangle, oriented by `Portrayal::angle`
    ArrowHead,
    Rect,
}

/// Named or hex color understood by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A drawable description of one entity at one tick.
///
/// `x` and `y` are normalized into `[0, 1]` by linear mapping from the
/// simulation bounds. Kind-specific fields are omitted when not relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portrayal {
    pub x: f64,
    pub y: f64,
    pub shape: Shape,
    pub color: Color,
    pub filled: bool,
    pub layer: u8,
    /// Radius for circles and area features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Heading in radians for directional shapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Portrayal {
    pub fn circle(color: impl Into<Color>, layer: u8, radius: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            shape: Shape::Circle,
            color: color.into(),
            filled: true,
            layer,
            radius: Some(radius),
            angle: None,
            width: None,
            height: None,
        }
    }

    pub fn arrow_head(color: impl Into<Color>, layer: u8, angle: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            shape: Shape::ArrowHead,
            color: color.into(),
            filled: true,
            layer,
            radius: None,
            angle: Some(angle),
            width: None,
            height: None,
        }
    }

    pub fn rect(color: impl Into<Color>, layer: u8, width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            shape: Shape::Rect,
            color: color.into(),
            filled: true,
            layer,
            radius: None,
            angle: None,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Place the portrayal at normalized coordinates
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}
