use crate::core::{constants::ZOOMIFY_TILES_PER_GROUP, geo::TileCoord, pyramid::Pyramid};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Trait representing anything that can produce tile URLs.
///
/// `None` means there is no tile at that address; the widget leaves the
/// space blank and issues no request.
pub trait TileSource {
    /// Build a URL for the tile at `coord` on pyramid level `zoom`.
    fn tile_url(&self, coord: TileCoord, zoom: usize) -> Option<String>;
}

impl<F> TileSource for F
where
    F: Fn(TileCoord, usize) -> Option<String>,
{
    fn tile_url(&self, coord: TileCoord, zoom: usize) -> Option<String> {
        self(coord, zoom)
    }
}

fn trimmed(tile_path: &str) -> String {
    tile_path.trim_end_matches('/').to_string()
}

/// Tiles sliced by ImageMagick: `{tile_path}/tile_{zoom}_{x}_{y}.jpg`
#[derive(Debug, Clone)]
pub struct ImageMagickSource {
    tile_path: String,
    pyramid: Rc<Pyramid>,
}

impl ImageMagickSource {
    pub fn new(tile_path: &str, pyramid: Rc<Pyramid>) -> Self {
        Self {
            tile_path: trimmed(tile_path),
            pyramid,
        }
    }
}

impl TileSource for ImageMagickSource {
    fn tile_url(&self, coord: TileCoord, zoom: usize) -> Option<String> {
        let level = self.pyramid.level(zoom)?;
        if !level.contains_tile(coord) {
            return None;
        }

        Some(format!(
            "{}/tile_{}_{}_{}.jpg",
            self.tile_path, zoom, coord.x, coord.y
        ))
    }
}

/// Tiles exported in the Zoomify layout:
/// `{tile_path}/TileGroup{group}/{zoom}-{x}-{y}.jpg`.
///
/// Tiles are numbered row by row, continuing across levels from coarsest to
/// finest, and stored 256 to a group directory.
#[derive(Debug, Clone)]
pub struct ZoomifySource {
    tile_path: String,
    pyramid: Rc<Pyramid>,
}

impl ZoomifySource {
    pub fn new(tile_path: &str, pyramid: Rc<Pyramid>) -> Self {
        Self {
            tile_path: trimmed(tile_path),
            pyramid,
        }
    }

    fn group(&self, coord: TileCoord, zoom: usize, width_in_tiles: u32) -> u64 {
        let tile_number = (coord.y as u64)
            .saturating_mul(width_in_tiles as u64)
            .saturating_add(coord.x as u64)
            .saturating_add(self.pyramid.tiles_before(zoom));
        tile_number / ZOOMIFY_TILES_PER_GROUP
    }
}

impl TileSource for ZoomifySource {
    fn tile_url(&self, coord: TileCoord, zoom: usize) -> Option<String> {
        let level = self.pyramid.level(zoom)?;
        if !level.contains_tile(coord) {
            return None;
        }

        let group = self.group(coord, zoom, level.width_in_tiles);
        Some(format!(
            "{}/TileGroup{}/{}-{}-{}.jpg",
            self.tile_path, group, zoom, coord.x, coord.y
        ))
    }
}

/// Built-in tile naming schemes selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileScheme {
    #[default]
    #[serde(alias = "imageMagick", alias = "image_magick")]
    ImageMagick,
    Zoomify,
}

impl TileScheme {
    /// Builds the resolver for this scheme
    pub fn source(&self, tile_path: &str, pyramid: Rc<Pyramid>) -> Rc<dyn TileSource> {
        match self {
            Self::ImageMagick => Rc::new(ImageMagickSource::new(tile_path, pyramid)),
            Self::Zoomify => Rc::new(ZoomifySource::new(tile_path, pyramid)),
        }
    }
}
