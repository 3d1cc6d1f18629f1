//! Prelude module for common largeview types and traits
//!
//! `use largeview::prelude::*;` brings in everything a host needs to attach
//! a viewer and drive it.

pub use crate::core::{
    config::{Caption, Copyright, InitialCoordinate, InitialZoom, ViewerConfig, ZoomControlSize},
    geo::{ImageBounds, ImagePoint, Point, Size, TileCoord},
    projection::{ImageProjection, Projection},
    pyramid::{Pyramid, ZoomLevelExtent},
    viewer::{attach, Viewer, ViewerHandle, ViewerState},
};

pub use crate::tiles::{ImageMagickSource, TileScheme, TileSource, ZoomifySource};

pub use crate::widget::{
    controls::{Control, ControlPosition},
    fullscreen::FullScreenControl,
    options::{ImageMapType, MapOptions},
    plane::{PlaneContainer, PlaneFactory, PlaneMap, VisibleTile},
    traits::{Container, MapEventKind, MapWidget, WidgetFactory},
};

pub use crate::{Error, Result, ViewerError};
