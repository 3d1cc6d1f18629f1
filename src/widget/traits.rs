use crate::{
    core::geo::{ImageBounds, ImagePoint, Size},
    widget::{
        controls::{Control, ControlId, ControlPosition},
        options::{ImageMapType, MapOptions},
    },
    Result,
};
use std::rc::Rc;

/// Change notifications the viewer listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    BoundsChanged,
    CenterChanged,
    Resize,
}

impl MapEventKind {
    /// Event name as used by the widget's event system
    pub fn name(&self) -> &'static str {
        match self {
            Self::BoundsChanged => "bounds_changed",
            Self::CenterChanged => "center_changed",
            Self::Resize => "resize",
        }
    }
}

/// Callback invoked synchronously when a subscribed event fires
pub type EventHandler = Rc<dyn Fn()>;

/// Everything the viewer needs from an interactive map widget.
///
/// All methods take `&self`: handlers run synchronously inside the widget's
/// notification dispatch and may call back into it (a corrective
/// `set_center` fires `center_changed` again before returning), so
/// implementations must not hold internal borrows while dispatching.
pub trait MapWidget {
    /// Registers a map type under `id`; the widget shows it if `id` is the
    /// map type its options selected.
    fn register_map_type(&self, id: &str, map_type: ImageMapType) -> Result<()>;

    /// Current center in normalized coordinates
    fn center(&self) -> ImagePoint;

    /// Visible area, or `None` while the widget is still bootstrapping
    fn bounds(&self) -> Option<ImageBounds>;

    /// Moves the view; fires `center_changed` when the center actually moves
    fn set_center(&self, center: ImagePoint);

    /// Current pyramid level
    fn zoom(&self) -> usize;

    /// Registers `handler` for `event`; fails if the widget's event system
    /// rejects the listener
    fn subscribe(&self, event: MapEventKind, handler: EventHandler) -> Result<()>;

    /// Fires an event manually, e.g. `resize` after the container changed size
    fn trigger(&self, event: MapEventKind);

    /// Places overlay content on top of the map
    fn add_control(&self, position: ControlPosition, control: Control) -> ControlId;

    /// Replaces the label of a button control
    fn set_control_label(&self, id: ControlId, label: &str);
}

/// Host element the widget is attached to
pub trait Container {
    /// Element id, used to tell viewers apart in logs
    fn id(&self) -> Option<String>;

    /// Current pixel size
    fn size(&self) -> Size;

    /// Pixel size of the surrounding window
    fn window_size(&self) -> Size;

    /// Adds or removes a css class on the element
    fn set_class(&self, class: &str, enabled: bool);
}

/// Constructs widgets inside containers
pub trait WidgetFactory {
    type Container: Container + 'static;
    type Widget: MapWidget + 'static;

    /// Fails with [`crate::ViewerError::WidgetInitialization`] when the
    /// mapping engine is unavailable or refuses to build a map.
    fn create(&self, container: &Rc<Self::Container>, options: &MapOptions) -> Result<Rc<Self::Widget>>;
}
