pub mod arrow;
pub mod bearing;

pub use arrow::{arrow_overlay, ArrowOverlay, ScreenPoint, HEAD_LENGTH_PX, HEAD_SPREAD_DEG};
pub use bearing::{bearing_between, normalize_bearing};
