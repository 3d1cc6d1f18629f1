use crate::{
    core::{
        config::{ViewerConfig, ZoomControlSize},
        constants::MAP_TYPE_ID,
        geo::{ImagePoint, TileCoord},
        projection::ImageProjection,
        pyramid::Pyramid,
    },
    tiles::TileSource,
};
use std::{fmt, rc::Rc};

/// Construction options handed to the widget
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub zoom: usize,
    pub center: ImagePoint,
    pub map_type_id: String,
    pub pan_control: bool,
    pub zoom_control: bool,
    pub zoom_control_size: ZoomControlSize,
    pub street_view_control: bool,
    pub map_type_control: bool,
    pub scale_control: bool,
    pub background_color: String,
}

impl MapOptions {
    /// Options for showing the image map type at the given initial view.
    ///
    /// Controls that only make sense for geographic maps are always off.
    pub fn for_viewer(config: &ViewerConfig, zoom: usize, center: ImagePoint) -> Self {
        Self {
            zoom,
            center,
            map_type_id: MAP_TYPE_ID.to_string(),
            pan_control: config.show_pan_control,
            zoom_control: true,
            zoom_control_size: config.zoom_size,
            street_view_control: false,
            map_type_control: false,
            scale_control: false,
            background_color: config.background_color.clone(),
        }
    }
}

/// Image tiles plus the projection placing them on the normalized plane
#[derive(Clone)]
pub struct ImageMapType {
    pub tile_size: u32,
    pub min_zoom: usize,
    pub max_zoom: usize,
    pub opacity: f32,
    pub is_png: bool,
    pub projection: ImageProjection,
    pub source: Rc<dyn TileSource>,
}

impl ImageMapType {
    /// Map type covering every level of the pyramid
    pub fn new(pyramid: &Pyramid, source: Rc<dyn TileSource>) -> Self {
        Self {
            tile_size: pyramid.tile_size(),
            min_zoom: 0,
            max_zoom: pyramid.max_zoom(),
            opacity: 1.0,
            is_png: false,
            projection: ImageProjection::for_pyramid(pyramid),
            source,
        }
    }

    pub fn tile_url(&self, coord: TileCoord, zoom: usize) -> Option<String> {
        self.source.tile_url(coord, zoom)
    }

    pub fn clamp_zoom(&self, zoom: usize) -> usize {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl fmt::Debug for ImageMapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageMapType")
            .field("tile_size", &self.tile_size)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("opacity", &self.opacity)
            .field("is_png", &self.is_png)
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}
