//! Basic geometric types for component placement.
//!
//! Positions are rendering hints only; apart from the positive-extent
//! invariant on [`Position`], nothing in validation depends on geometry.

use serde::{Deserialize, Serialize};

/// A point in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Placement and extent of a component on the canvas.
///
/// `width` and `height` must stay strictly positive; this is checked by
/// component validation, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            x: 100.0,
            y: 100.0,
            width: 160.0,
            height: 80.0,
            rotation: 0.0,
        }
    }
}

impl Position {
    /// Returns the center of the bounding box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A merge-patch over [`Position`]. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
}

impl PositionPatch {
    /// Applies every present field onto `target`.
    pub fn apply(&self, target: &mut Position) {
        if let Some(x) = self.x {
            target.x = x;
        }
        if let Some(y) = self.y {
            target.y = y;
        }
        if let Some(width) = self.width {
            target.width = width;
        }
        if let Some(height) = self.height {
            target.height = height;
        }
        if let Some(rotation) = self.rotation {
            target.rotation = rotation;
        }
    }

    /// Convenience patch that only moves the origin.
    pub fn moved_to(x: f64, y: f64) -> Self {
        PositionPatch {
            x: Some(x),
            y: Some(y),
            ..PositionPatch::default()
        }
    }

    /// Convenience patch that only resizes the bounding box.
    pub fn resized(width: f64, height: f64) -> Self {
        PositionPatch {
            width: Some(width),
            height: Some(height),
            ..PositionPatch::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_present_fields() {
        let mut position = Position::default();
        PositionPatch::moved_to(10.0, 20.0).apply(&mut position);

        assert_eq!(position.x, 10.0);
        assert_eq!(position.y, 20.0);
        assert_eq!(position.width, 160.0);
        assert_eq!(position.height, 80.0);
    }

    #[test]
    fn center_is_midpoint_of_bounds() {
        let position = Position {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            rotation: 0.0,
        };
        assert_eq!(position.center(), Point::new(50.0, 25.0));
    }
}
