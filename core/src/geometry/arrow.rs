use serde::{Deserialize, Serialize};

/// Angular spread of each arrowhead barb away from the shaft.
pub const HEAD_SPREAD_DEG: f64 = 22.5;
/// Length of each arrowhead barb in pixels.
pub const HEAD_LENGTH_PX: f64 = 12.0;

/// Point in screen space, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Offset along a compass heading (0 = up, clockwise).
    fn heading_offset(&self, bearing_deg: f64, distance: f64) -> ScreenPoint {
        let radians = bearing_deg.to_radians();
        ScreenPoint {
            x: self.x + distance * radians.sin(),
            y: self.y - distance * radians.cos(),
        }
    }
}

/// Screen-space arrow: shaft from `origin` to `tip` plus a filled head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowOverlay {
    pub origin: ScreenPoint,
    pub tip: ScreenPoint,
    pub head_left: ScreenPoint,
    pub head_right: ScreenPoint,
}

impl ArrowOverlay {
    /// Head triangle in drawing order.
    pub fn head(&self) -> [ScreenPoint; 3] {
        [self.tip, self.head_left, self.head_right]
    }

    pub fn shaft_length(&self) -> f64 {
        self.origin.distance_to(self.tip)
    }
}

/// Builds the overlay for an arrow of `length_px` pointing along `bearing_deg`.
pub fn arrow_overlay(origin: ScreenPoint, bearing_deg: f64, length_px: f64) -> ArrowOverlay {
    let tip = origin.heading_offset(bearing_deg, length_px);
    // Barbs run back from the tip, so walk the reversed heading.
    let back = bearing_deg + 180.0;
    let head_left = tip.heading_offset(back + HEAD_SPREAD_DEG, HEAD_LENGTH_PX);
    let head_right = tip.heading_offset(back - HEAD_SPREAD_DEG, HEAD_LENGTH_PX);

    ArrowOverlay {
        origin,
        tip,
        head_left,
        head_right,
    }
}
