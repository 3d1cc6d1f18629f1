//! In-process map widget over a flat plane
//!
//! Behaves like a tile map widget showing a custom projected map type:
//! integer zoom levels, a center in normalized coordinates, visible bounds
//! derived from the container size, and synchronous change notifications.
//! Used headless, by the desktop host, and to exercise viewers in tests.

use crate::{
    core::geo::{ImageBounds, ImagePoint, Point, Size, TileCoord},
    core::projection::Projection,
    widget::{
        controls::{Control, ControlContent, ControlId, ControlPosition},
        options::{ImageMapType, MapOptions},
        traits::{Container, EventHandler, MapEventKind, MapWidget, WidgetFactory},
    },
    Result, ViewerError,
};
use fxhash::{FxHashMap, FxHashSet};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// A tile intersecting the container at the current zoom
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub zoom: usize,
    /// Top-left corner relative to the container, in pixels
    pub offset: Point,
    pub size: f64,
    pub url: Option<String>,
}

struct PlaneState {
    center: ImagePoint,
    zoom: usize,
    size: Size,
    map_type_id: String,
    map_types: FxHashMap<String, ImageMapType>,
    controls: Vec<(ControlPosition, Control)>,
}

/// Flat-plane map widget
pub struct PlaneMap {
    options: MapOptions,
    state: RefCell<PlaneState>,
    listeners: RefCell<FxHashMap<MapEventKind, Vec<EventHandler>>>,
    dispatched: Cell<usize>,
}

impl PlaneMap {
    pub fn new(size: Size, options: MapOptions) -> Self {
        let state = PlaneState {
            center: options.center,
            zoom: options.zoom,
            size,
            map_type_id: options.map_type_id.clone(),
            map_types: FxHashMap::default(),
            controls: Vec::new(),
        };

        Self {
            options,
            state: RefCell::new(state),
            listeners: RefCell::new(FxHashMap::default()),
            dispatched: Cell::new(0),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn size(&self) -> Size {
        self.state.borrow().size
    }

    /// The map type currently shown, once registered
    pub fn map_type(&self) -> Option<ImageMapType> {
        let state = self.state.borrow();
        state.map_types.get(&state.map_type_id).cloned()
    }

    /// Total number of notifications delivered so far
    pub fn dispatched_events(&self) -> usize {
        self.dispatched.get()
    }

    fn emit(&self, event: MapEventKind) {
        // Handlers may call back into the widget, so nothing stays borrowed.
        let handlers = self
            .listeners
            .borrow()
            .get(&event)
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            self.dispatched.set(self.dispatched.get() + 1);
            handler();
        }
    }

    /// World pixels per pixel at the current zoom
    fn scale(zoom: usize) -> f64 {
        2_f64.powi(zoom as i32)
    }

    /// Center in pixel coordinates of the current zoom level
    fn center_pixel(&self, map_type: &ImageMapType) -> Point {
        let state = self.state.borrow();
        map_type
            .projection
            .to_native(&state.center)
            .multiply(Self::scale(state.zoom))
    }

    /// Drags the image by a pixel offset, as a pointer gesture would
    pub fn pan_by(&self, delta: Point) {
        let Some(map_type) = self.map_type() else {
            return;
        };
        let zoom = self.zoom();
        let target = self
            .center_pixel(&map_type)
            .subtract(&delta)
            .multiply(1.0 / Self::scale(zoom));
        self.set_center(map_type.projection.to_normalized(&target));
    }

    /// Changes zoom, clamped to the shown map type
    pub fn set_zoom(&self, zoom: usize) {
        let zoom = match self.map_type() {
            Some(map_type) => map_type.clamp_zoom(zoom),
            None => zoom,
        };
        {
            let mut state = self.state.borrow_mut();
            if state.zoom == zoom {
                return;
            }
            state.zoom = zoom;
        }
        self.emit(MapEventKind::BoundsChanged);
    }

    pub fn zoom_in(&self) {
        self.set_zoom(self.zoom() + 1);
    }

    pub fn zoom_out(&self) {
        self.set_zoom(self.zoom().saturating_sub(1));
    }

    /// Follows a container resize
    pub fn set_size(&self, size: Size) {
        self.state.borrow_mut().size = size;
        self.trigger(MapEventKind::Resize);
    }

    /// Tiles covering the container at the current zoom, row by row
    pub fn visible_tiles(&self) -> Vec<VisibleTile> {
        let Some(map_type) = self.map_type() else {
            return Vec::new();
        };
        let zoom = self.zoom();
        let size = self.size();
        let tile_size = map_type.tile_size as f64;
        let origin = self
            .center_pixel(&map_type)
            .subtract(&size.as_point().multiply(0.5));

        let first = Point::new(origin.x / tile_size, origin.y / tile_size).floor();
        let (first_x, first_y) = (first.x as i64, first.y as i64);
        let last_x = ((origin.x + size.width) / tile_size).ceil() as i64 - 1;
        let last_y = ((origin.y + size.height) / tile_size).ceil() as i64 - 1;

        let mut tiles = Vec::new();
        for y in first_y..=last_y {
            for x in first_x..=last_x {
                let coord = TileCoord::new(x, y);
                tiles.push(VisibleTile {
                    coord,
                    zoom,
                    offset: Point::new(x as f64 * tile_size - origin.x, y as f64 * tile_size - origin.y),
                    size: tile_size,
                    url: map_type.tile_url(coord, zoom),
                });
            }
        }
        tiles
    }

    /// Overlay content with its placement, in insertion order
    pub fn controls(&self) -> Vec<(ControlPosition, Control)> {
        self.state.borrow().controls.clone()
    }

    /// Simulates a click on a control
    pub fn click_control(&self, id: ControlId) {
        let handler = self
            .state
            .borrow()
            .controls
            .get(id.0)
            .and_then(|(_, control)| control.on_click.clone());
        if let Some(handler) = handler {
            handler();
        }
    }
}

impl MapWidget for PlaneMap {
    fn register_map_type(&self, id: &str, map_type: ImageMapType) -> Result<()> {
        if map_type.max_zoom < map_type.min_zoom {
            return Err(ViewerError::WidgetInitialization(format!(
                "map type {} has an empty zoom range",
                id
            )));
        }

        let mut state = self.state.borrow_mut();
        if state.map_type_id == id {
            state.zoom = map_type.clamp_zoom(state.zoom);
        }
        state.map_types.insert(id.to_string(), map_type);
        Ok(())
    }

    fn center(&self) -> ImagePoint {
        self.state.borrow().center
    }

    fn bounds(&self) -> Option<ImageBounds> {
        let map_type = self.map_type()?;
        let scale = Self::scale(self.zoom());
        let half = self.size().as_point().multiply(0.5);
        let center = self.center_pixel(&map_type);

        let top_left = center.subtract(&half).multiply(1.0 / scale);
        let bottom_right = center.add(&half).multiply(1.0 / scale);
        let north_west = map_type.projection.to_normalized(&top_left);
        let south_east = map_type.projection.to_normalized(&bottom_right);

        Some(ImageBounds::from_edges(
            south_east.y,
            north_west.x,
            north_west.y,
            south_east.x,
        ))
    }

    fn set_center(&self, center: ImagePoint) {
        {
            let mut state = self.state.borrow_mut();
            if state.center == center {
                return;
            }
            state.center = center;
        }
        self.emit(MapEventKind::CenterChanged);
        self.emit(MapEventKind::BoundsChanged);
    }

    fn zoom(&self) -> usize {
        self.state.borrow().zoom
    }

    fn subscribe(&self, event: MapEventKind, handler: EventHandler) -> Result<()> {
        self.listeners.borrow_mut().entry(event).or_default().push(handler);
        Ok(())
    }

    fn trigger(&self, event: MapEventKind) {
        self.emit(event);
        if event == MapEventKind::Resize {
            self.emit(MapEventKind::BoundsChanged);
        }
    }

    fn add_control(&self, position: ControlPosition, control: Control) -> ControlId {
        let mut state = self.state.borrow_mut();
        state.controls.push((position, control));
        ControlId(state.controls.len() - 1)
    }

    fn set_control_label(&self, id: ControlId, label: &str) {
        let mut state = self.state.borrow_mut();
        if let Some((_, control)) = state.controls.get_mut(id.0) {
            if let ControlContent::Button { label: current, .. } = &mut control.content {
                *current = label.to_string();
            }
        }
    }
}

/// Container element for plane widgets
pub struct PlaneContainer {
    id: Option<String>,
    size: Cell<Size>,
    window_size: Size,
    classes: RefCell<FxHashSet<String>>,
}

impl PlaneContainer {
    pub fn new(id: Option<&str>, size: Size) -> Self {
        Self::in_window(id, size, Size::new(f64::INFINITY, f64::INFINITY))
    }

    pub fn in_window(id: Option<&str>, size: Size, window_size: Size) -> Self {
        Self {
            id: id.map(str::to_string),
            size: Cell::new(size),
            window_size,
            classes: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn set_size(&self, size: Size) {
        self.size.set(size);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }
}

impl Container for PlaneContainer {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn window_size(&self) -> Size {
        self.window_size
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let mut classes = self.classes.borrow_mut();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }
}

/// Builds [`PlaneMap`]s sized to their container
#[derive(Debug, Clone, Default)]
pub struct PlaneFactory {
    unavailable: Option<String>,
}

impl PlaneFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose engine is missing; every construction fails
    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Some(reason.to_string()),
        }
    }
}

impl WidgetFactory for PlaneFactory {
    type Container = PlaneContainer;
    type Widget = PlaneMap;

    fn create(&self, container: &Rc<PlaneContainer>, options: &MapOptions) -> Result<Rc<PlaneMap>> {
        if let Some(reason) = &self.unavailable {
            return Err(ViewerError::WidgetInitialization(reason.clone()));
        }
        Ok(Rc::new(PlaneMap::new(container.size(), options.clone())))
    }
}
