//! Space Components
//!
//! Bounds of the simulated rectangle or lattice, and the coordinate math
//! that keeps every agent inside it.

use bevy_ecs::prelude::*;
use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Tolerance for "agent is at a point" in continuous space
pub const POSITION_EPSILON: f64 = 1e-3;

/// Whether positions are continuous or integer lattice cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    Continuous,
    Grid,
}

/// Resource: the bounded space every agent lives in
///
/// Continuous space spans `[0, width] x [0, height]`. Grid space spans the
/// cells `0..width` by `0..height`, so its inclusive maximum is
/// `(width - 1, height - 1)`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub kind: SpaceKind,
    pub min: DVec2,
    pub max: DVec2,
}

impl Space {
    pub fn continuous(width: f64, height: f64) -> SimResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SimError::config(format!(
                "space dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            kind: SpaceKind::Continuous,
            min: DVec2::ZERO,
            max: DVec2::new(width, height),
        })
    }

    pub fn grid(width: i32, height: i32) -> SimResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SimError::config(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            kind: SpaceKind::Grid,
            min: DVec2::ZERO,
            max: DVec2::new(f64::from(width - 1), f64::from(height - 1)),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Number of columns of a grid space
    pub fn columns(&self) -> i32 {
        self.width() as i32 + 1
    }

    /// Number of rows of a grid space
    pub fn rows(&self) -> i32 {
        self.height() as i32 + 1
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_cell(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.columns() && cell.y < self.rows()
    }

    pub fn clamp(&self, p: DVec2) -> DVec2 {
        p.clamp(self.min, self.max)
    }

    /// Linear map into `[0, 1] x [0, 1]`
    pub fn normalize(&self, p: DVec2) -> DVec2 {
        let span = self.max - self.min;
        let norm = |v: f64, lo: f64, s: f64| if s > 0.0 { (v - lo) / s } else { 0.0 };
        DVec2::new(norm(p.x, self.min.x, span.x), norm(p.y, self.min.y, span.y))
    }
}

/// Whether two continuous points coincide within `POSITION_EPSILON`
pub fn same_point(a: DVec2, b: DVec2) -> bool {
    (a.x - b.x).abs() < POSITION_EPSILON && (a.y - b.y).abs() < POSITION_EPSILON
}
