//! Mapping between the normalized image plane and the widget's world
//! coordinates.
//!
//! The world is the coarsest pyramid level laid out in pixels, top-left at
//! the origin. The image's middle is normalized `(0, 0)`, its lower-left
//! corner `(-50, -50)` and its upper-right corner `(50, 50)`.

use crate::core::{
    constants::{FULL_EXTENT, HALF_EXTENT},
    geo::{ImagePoint, Point},
    pyramid::Pyramid,
};
use serde::{Deserialize, Serialize};

/// Capability installed on the widget to translate between coordinate spaces
pub trait Projection {
    /// Normalized image coordinates to world pixels
    fn to_native(&self, point: &ImagePoint) -> Point;

    /// World pixels to normalized image coordinates
    fn to_normalized(&self, point: &Point) -> ImagePoint;
}

/// Flat projection parameterized by the coarsest level's pixel size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageProjection {
    pub world_width: f64,
    pub world_height: f64,
}

impl ImageProjection {
    pub fn new(world_width: f64, world_height: f64) -> Self {
        Self {
            world_width,
            world_height,
        }
    }

    /// Projection for a pyramid, sized by its level 0
    pub fn for_pyramid(pyramid: &Pyramid) -> Self {
        let coarsest = pyramid.coarsest();
        Self::new(coarsest.width_in_pixels, coarsest.height_in_pixels)
    }
}

impl Projection for ImageProjection {
    fn to_native(&self, point: &ImagePoint) -> Point {
        let x = self.world_width * ((point.x + HALF_EXTENT) / FULL_EXTENT);
        let y = -self.world_height * ((point.y - HALF_EXTENT) / FULL_EXTENT);
        Point::new(x, y)
    }

    fn to_normalized(&self, point: &Point) -> ImagePoint {
        let x = (point.x / self.world_width) * FULL_EXTENT - HALF_EXTENT;
        let y = -(point.y / self.world_height) * FULL_EXTENT + HALF_EXTENT;
        ImagePoint::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_map_to_world_corners() {
        let projection = ImageProjection::new(250.0, 125.0);

        let top_left = projection.to_native(&ImagePoint::new(-50.0, 50.0));
        assert_eq!(top_left, Point::new(0.0, 0.0));

        let bottom_right = projection.to_native(&ImagePoint::new(50.0, -50.0));
        assert_eq!(bottom_right, Point::new(250.0, 125.0));

        let middle = projection.to_native(&ImagePoint::center());
        assert_eq!(middle, Point::new(125.0, 62.5));
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let projection = ImageProjection::new(187.5, 250.0);
        let mut x = -50.0;
        while x <= 50.0 {
            let mut y = -50.0;
            while y <= 50.0 {
                let point = ImagePoint::new(x, y);
                let back = projection.to_normalized(&projection.to_native(&point));
                assert!((back.x - point.x).abs() < 1e-9, "x drifted at {:?}", point);
                assert!((back.y - point.y).abs() < 1e-9, "y drifted at {:?}", point);
                y += 6.25;
            }
            x += 3.125;
        }
    }
}
