//! # largeview
//!
//! Deep-zoom viewer core for very large images sliced into a pyramid of
//! fixed-size tiles.
//!
//! The image is mapped onto a flat, normalized plane and handed to an
//! interactive map widget for panning and zooming. This crate owns the parts
//! the widget knows nothing about: zoom level and tile grid addressing, the
//! projection onto the plane, initial placement, and a hard clamp that keeps
//! the viewport on the image after every gesture.

pub mod core;
pub mod logging;
pub mod prelude;
pub mod tiles;
pub mod widget;

#[cfg(feature = "wasm")]
pub mod web;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{Caption, Copyright, InitialCoordinate, InitialZoom, ViewerConfig, ZoomControlSize},
    geo::{ImageBounds, ImagePoint, Point, Size, TileCoord},
    projection::{ImageProjection, Projection},
    pyramid::{compute_extents, Pyramid, ZoomLevelExtent},
    viewer::{attach, Viewer, ViewerHandle, ViewerState},
};

pub use tiles::{TileScheme, TileSource};

pub use widget::{
    plane::{PlaneContainer, PlaneFactory, PlaneMap},
    traits::{Container, MapEventKind, MapWidget, WidgetFactory},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Errors a viewer can fail with. Each is scoped to a single viewer instance.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Widget initialization failed: {0}")]
    WidgetInitialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation not allowed while viewer is {0:?}")]
    InvalidState(ViewerState),
}

/// Error type alias for convenience
pub type Error = ViewerError;
