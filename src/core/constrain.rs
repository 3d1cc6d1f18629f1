//! Hard clamp keeping the viewport on the image
//!
//! Along each axis independently: when the visible span is wider than the
//! whole image the view is centered on it, otherwise the view is moved just
//! far enough that no edge of the image scrolls past the viewport edge.

use crate::core::{
    constants::{CENTER_TOLERANCE, FULL_EXTENT, HALF_EXTENT},
    geo::{ImageBounds, ImagePoint},
};

/// Clamps one axis. `low`/`high` are the visible edges on that axis.
fn constrain_axis(current: f64, low: f64, high: f64) -> f64 {
    let span = high - low;
    if span > FULL_EXTENT {
        0.0
    } else if low < -HALF_EXTENT {
        -HALF_EXTENT + span / 2.0
    } else if high > HALF_EXTENT {
        HALF_EXTENT - span / 2.0
    } else {
        current
    }
}

/// Center the view should have so that `bounds` stays on the image
pub fn constrained_center(center: ImagePoint, bounds: &ImageBounds) -> ImagePoint {
    ImagePoint::new(
        constrain_axis(center.x, bounds.west(), bounds.east()),
        constrain_axis(center.y, bounds.south(), bounds.north()),
    )
}

/// Corrective center, if one is needed.
///
/// Returns `None` when the clamped center is within [`CENTER_TOLERANCE`] of
/// the current one on both axes, so a correction never triggers another.
pub fn correction(center: ImagePoint, bounds: &ImageBounds) -> Option<ImagePoint> {
    let target = constrained_center(center, bounds);
    if (target.x - center.x).abs() > CENTER_TOLERANCE
        || (target.y - center.y).abs() > CENTER_TOLERANCE
    {
        Some(target)
    } else {
        None
    }
}
