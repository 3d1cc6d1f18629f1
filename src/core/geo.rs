use serde::{Deserialize, Serialize};

/// A coordinate in the normalized image plane.
///
/// The image spans `[-50, 50]` horizontally (west to east) and `[50, -50]`
/// vertically (top to bottom), independent of its size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    /// Creates a new normalized coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The middle of the image
    pub fn center() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Largest per-axis distance to another point
    pub fn max_axis_delta(&self, other: &ImagePoint) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Default for ImagePoint {
    fn default() -> Self {
        Self::center()
    }
}

/// A point in the widget's native world coordinates (pixels at zoom 0,
/// origin at the top-left corner of the image).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Pixel size of a container or viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn as_point(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

/// Visible area of the widget in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub south_west: ImagePoint,
    pub north_east: ImagePoint,
}

impl ImageBounds {
    pub fn new(south_west: ImagePoint, north_east: ImagePoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual edges
    pub fn from_edges(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(ImagePoint::new(west, south), ImagePoint::new(east, north))
    }

    /// Creates bounds of the given span around a center
    pub fn around(center: ImagePoint, span_x: f64, span_y: f64) -> Self {
        let half_x = span_x / 2.0;
        let half_y = span_y / 2.0;
        Self::new(
            ImagePoint::new(center.x - half_x, center.y - half_y),
            ImagePoint::new(center.x + half_x, center.y + half_y),
        )
    }

    pub fn west(&self) -> f64 {
        self.south_west.x
    }

    pub fn east(&self) -> f64 {
        self.north_east.x
    }

    pub fn south(&self) -> f64 {
        self.south_west.y
    }

    pub fn north(&self) -> f64 {
        self.north_east.y
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> ImagePoint {
        ImagePoint::new(
            (self.south_west.x + self.north_east.x) / 2.0,
            (self.south_west.y + self.north_east.y) / 2.0,
        )
    }

    /// Gets the span of the bounds on each axis
    pub fn span(&self) -> ImagePoint {
        ImagePoint::new(
            self.north_east.x - self.south_west.x,
            self.north_east.y - self.south_west.y,
        )
    }

    /// Same span, moved so that it is centered on `center`
    pub fn recentered(&self, center: ImagePoint) -> ImageBounds {
        let span = self.span();
        ImageBounds::around(center, span.x, span.y)
    }
}

/// Address of one tile within a zoom level of the pyramid.
///
/// Coordinates are signed: the widget asks for tiles beside the image
/// while panning near its edges, and those must resolve to "no tile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}
