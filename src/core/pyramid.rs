//! Tile pyramid addressing
//!
//! Derives the discrete zoom levels of a pre-sliced image from its original
//! size and the tile edge length. Level 0 is the coarsest level, where the
//! whole image fits into a single tile; the last level is full resolution.

use crate::{
    core::geo::{Size, TileCoord},
    Result, ViewerError,
};
use serde::{Deserialize, Serialize};

/// Image size and tile grid at one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLevelExtent {
    pub width_in_pixels: f64,
    pub height_in_pixels: f64,
    pub width_in_tiles: u32,
    pub height_in_tiles: u32,
}

impl ZoomLevelExtent {
    fn at_divisor(width: u32, height: u32, tile_size: u32, divisor: f64) -> Self {
        // Always derived from the original dimensions so rounding never accumulates.
        let width_in_pixels = width as f64 / divisor;
        let height_in_pixels = height as f64 / divisor;
        Self {
            width_in_pixels,
            height_in_pixels,
            width_in_tiles: (width_in_pixels / tile_size as f64).ceil() as u32,
            height_in_tiles: (height_in_pixels / tile_size as f64).ceil() as u32,
        }
    }

    /// Number of tiles making up this level
    pub fn tile_count(&self) -> u64 {
        self.width_in_tiles as u64 * self.height_in_tiles as u64
    }

    /// Whether the tile coordinate addresses a tile of this level
    pub fn contains_tile(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width_in_tiles as i64
            && coord.y < self.height_in_tiles as i64
    }

    /// Whether the whole level fits strictly inside a container
    pub fn fits_within(&self, container: Size) -> bool {
        self.width_in_pixels < container.width && self.height_in_pixels < container.height
    }
}

/// Computes the zoom levels for an image, coarsest first.
///
/// The result is never empty: an image that already fits into one tile
/// yields a single full-resolution level. Zero dimensions or a zero tile
/// size are rejected with [`ViewerError::InvalidDimension`].
pub fn compute_extents(width: u32, height: u32, tile_size: u32) -> Result<Vec<ZoomLevelExtent>> {
    if width == 0 || height == 0 {
        return Err(ViewerError::InvalidDimension(format!(
            "image size must be positive, got {}x{}",
            width, height
        )));
    }
    if tile_size == 0 {
        return Err(ViewerError::InvalidDimension(
            "tile size must be positive".to_string(),
        ));
    }

    let mut levels = Vec::new();
    let mut divisor = 1.0;
    loop {
        let extent = ZoomLevelExtent::at_divisor(width, height, tile_size, divisor);
        levels.push(extent);

        if extent.width_in_pixels <= tile_size as f64 && extent.height_in_pixels <= tile_size as f64 {
            break;
        }
        divisor *= 2.0;
    }

    levels.reverse();
    Ok(levels)
}

/// The immutable set of zoom levels owned by one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pyramid {
    tile_size: u32,
    levels: Vec<ZoomLevelExtent>,
}

impl Pyramid {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Result<Self> {
        Ok(Self {
            tile_size,
            levels: compute_extents(width, height, tile_size)?,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn levels(&self) -> &[ZoomLevelExtent] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Deepest zoom level index
    pub fn max_zoom(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    pub fn level(&self, zoom: usize) -> Option<&ZoomLevelExtent> {
        self.levels.get(zoom)
    }

    /// The level where the whole image fits into one tile
    pub fn coarsest(&self) -> &ZoomLevelExtent {
        &self.levels[0]
    }

    /// Full resolution
    pub fn finest(&self) -> &ZoomLevelExtent {
        &self.levels[self.max_zoom()]
    }

    /// Total number of tiles in all levels coarser than `zoom`, saturating at `u64::MAX`
    pub fn tiles_before(&self, zoom: usize) -> u64 {
        self.levels
            .iter()
            .take(zoom)
            .fold(0u64, |total, level| total.saturating_add(level.tile_count()))
    }

    /// Deepest level that still fits inside the container.
    ///
    /// Walks from the finest level down to level 1. Level 0 is never tested:
    /// when nothing above it fits, the search falls through to 0 whether or
    /// not level 0 itself fits.
    pub fn fit_zoom(&self, container: Size) -> usize {
        (1..self.levels.len())
            .rev()
            .find(|&zoom| self.levels[zoom].fits_within(container))
            .unwrap_or(0)
    }
}
