pub mod source;

// Re-exports for convenience
pub use source::{ImageMagickSource, TileScheme, TileSource, ZoomifySource};
