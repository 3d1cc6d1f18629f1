//! Core constants for the image plane and the widget integration.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Half the extent of the normalized image plane. The image spans
/// `[-50, 50]` on both axes.
pub const HALF_EXTENT: f64 = 50.0;

/// Full extent of the normalized image plane on either axis.
pub const FULL_EXTENT: f64 = 2.0 * HALF_EXTENT;

/// A corrective re-center is only issued when the clamped center moves
/// further than this on either axis.
pub const CENTER_TOLERANCE: f64 = 0.0001;

/// Map type id the image projection is registered under.
pub const MAP_TYPE_ID: &str = "LIV";

/// Log prefix used when the container carries no id.
pub const DEFAULT_LOG_ID: &str = "[element with no id]";

/// Css class applied to caption overlays when the config names none.
pub const CAPTION_CSS_CLASS: &str = "LIVCaption";

/// Css class toggled on the container while in full-screen mode.
pub const FULL_SCREEN_CSS_CLASS: &str = "LIVFullScreen";

/// Number of tiles stored per `TileGroup` directory in the Zoomify layout.
pub const ZOOMIFY_TILES_PER_GROUP: u64 = 256;
