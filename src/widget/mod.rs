//! The seam between the viewer and the interactive map widget it drives
//!
//! The widget owns rendering, gestures and tile fetching. The viewer only
//! needs the narrow surface in [`traits`]: construct, register the image map
//! type, read center and bounds, re-center, and subscribe to changes.

pub mod controls;
pub mod fullscreen;
pub mod options;
pub mod plane;
pub mod traits;

// Re-export the essential types
pub use controls::{Control, ControlContent, ControlId, ControlPosition};
pub use fullscreen::FullScreenControl;
pub use options::{ImageMapType, MapOptions};
pub use plane::{PlaneContainer, PlaneFactory, PlaneMap, VisibleTile};
pub use traits::{Container, EventHandler, MapEventKind, MapWidget, WidgetFactory};
