//! Browser binding over the Google Maps JavaScript API
//!
//! The widget is a `google.maps.Map` reached through `js_sys::Reflect`, so
//! no generated bindings for the maps API are needed. Callbacks handed to
//! the API are converted with `Closure::into_js_value` and owned by the
//! JavaScript side from then on.

use crate::{
    core::{
        config::{ViewerConfig, ZoomControlSize},
        geo::{ImageBounds, ImagePoint, Point, Size, TileCoord},
        projection::Projection,
        viewer::{Viewer, ViewerHandle},
    },
    logging::InstanceLogger,
    tiles::TileSource,
    viewer_log,
    widget::{
        controls::{escape_html, Control, ControlContent, ControlId, ControlPosition},
        options::{ImageMapType, MapOptions},
        traits::{Container, EventHandler, MapEventKind, MapWidget, WidgetFactory},
    },
    Result, ViewerError,
};
use js_sys::{Array, Function, Object, Reflect};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{prelude::*, JsCast};

fn js_error(value: JsValue) -> ViewerError {
    ViewerError::WidgetInitialization(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(js_error)
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

fn function(target: &JsValue, key: &str) -> Result<Function> {
    get(target, key)?
        .dyn_into::<Function>()
        .map_err(|_| ViewerError::WidgetInitialization(format!("{} is not a function", key)))
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue> {
    let args: Array = args.iter().collect();
    function(target, method)?.apply(target, &args).map_err(js_error)
}

fn construct(namespace: &JsValue, class: &str, args: &[JsValue]) -> Result<JsValue> {
    let args: Array = args.iter().collect();
    Reflect::construct(&function(namespace, class)?, &args)
        .map(JsValue::from)
        .map_err(js_error)
}

fn number(value: Result<JsValue>) -> Option<f64> {
    value.ok().and_then(|value| value.as_f64())
}

/// The `google.maps` namespace
#[derive(Clone)]
struct GoogleMaps {
    maps: JsValue,
}

impl GoogleMaps {
    fn detect() -> Result<Self> {
        let google = get(&js_sys::global(), "google")?;
        if google.is_undefined() || google.is_null() {
            return Err(ViewerError::WidgetInitialization(
                "Google Maps not detected".to_string(),
            ));
        }
        let maps = get(&google, "maps")?;
        if maps.is_undefined() {
            return Err(ViewerError::WidgetInitialization(
                "Google Maps not detected".to_string(),
            ));
        }
        Ok(Self { maps })
    }

    fn lat_lng(&self, point: ImagePoint) -> Result<JsValue> {
        construct(&self.maps, "LatLng", &[point.y.into(), point.x.into()])
    }

    fn point_of(lat_lng: &JsValue) -> Option<ImagePoint> {
        let lat = number(call(lat_lng, "lat", &[]))?;
        let lng = number(call(lat_lng, "lng", &[]))?;
        Some(ImagePoint::new(lng, lat))
    }

    fn constant(&self, group: &str, name: &str) -> Result<JsValue> {
        get(&get(&self.maps, group)?, name)
    }

    fn event(&self) -> Result<JsValue> {
        get(&self.maps, "event")
    }
}

fn position_name(position: ControlPosition) -> &'static str {
    match position {
        ControlPosition::TopCenter => "TOP_CENTER",
        ControlPosition::TopRight => "TOP_RIGHT",
        ControlPosition::BottomCenter => "BOTTOM_CENTER",
        ControlPosition::BottomRight => "BOTTOM_RIGHT",
    }
}

fn zoom_style_name(size: ZoomControlSize) -> &'static str {
    match size {
        ZoomControlSize::Large => "LARGE",
        ZoomControlSize::Small => "SMALL",
        ZoomControlSize::Default => "DEFAULT",
    }
}

const COPYRIGHT_STYLE: &str = "font-size: 11px; font-family: Arial, sans-serif; margin: 0 2px 4px 0; white-space: nowrap;";
const BUTTON_STYLE: &str = "background-color: #fff; border: 1px solid #000; cursor: pointer; text-align: center; margin: 10px 5px 5px 5px; font-size: 10px; font-family: Arial,sans-serif; color: #000; padding: 4px;";

/// A `google.maps.Map` driven through the [`MapWidget`] surface
pub struct JsMapWidget {
    maps: GoogleMaps,
    map: JsValue,
    controls: RefCell<Vec<web_sys::Element>>,
    logger: InstanceLogger,
}

impl JsMapWidget {
    /// The underlying `google.maps.Map`
    pub fn map(&self) -> &JsValue {
        &self.map
    }

    fn projection(&self, map_type: &ImageMapType) -> Result<JsValue> {
        let projection = Object::new();

        let maps = self.maps.clone();
        let plane = map_type.projection;
        let to_lat_lng = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |point: JsValue| {
            let native = Point::new(
                number(get(&point, "x")).unwrap_or_default(),
                number(get(&point, "y")).unwrap_or_default(),
            );
            maps.lat_lng(plane.to_normalized(&native))
                .unwrap_or(JsValue::NULL)
        });
        set(&projection, "fromPointToLatLng", &to_lat_lng.into_js_value())?;

        let maps = self.maps.clone();
        let to_point = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |lat_lng: JsValue| {
            let Some(normalized) = GoogleMaps::point_of(&lat_lng) else {
                return JsValue::NULL;
            };
            let native = plane.to_native(&normalized);
            construct(&maps.maps, "Point", &[native.x.into(), native.y.into()]).unwrap_or(JsValue::NULL)
        });
        set(&projection, "fromLatLngToPoint", &to_point.into_js_value())?;

        Ok(projection.into())
    }

    fn push_control(&self, position: ControlPosition, element: &web_sys::Element) -> Result<()> {
        let index = self.maps.constant("ControlPosition", position_name(position))?;
        let controls = get(&self.map, "controls")?;
        let slot = Reflect::get(&controls, &index).map_err(js_error)?;
        call(&slot, "push", &[element.clone().into()])?;
        Ok(())
    }

    fn try_add_control(&self, position: ControlPosition, control: Control) -> Result<web_sys::Element> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ViewerError::WidgetInitialization("no document".to_string()))?;
        let element = document.create_element("div").map_err(js_error)?;
        element.set_inner_html(&control.to_html());

        let style = match &control.content {
            ControlContent::Caption { .. } => None,
            ControlContent::Copyright { .. } => Some(COPYRIGHT_STYLE),
            ControlContent::Button { title, .. } => {
                element.set_attribute("title", title).map_err(js_error)?;
                Some(BUTTON_STYLE)
            }
        };
        if let Some(style) = style {
            element.set_attribute("style", style).map_err(js_error)?;
        }

        if let Some(on_click) = control.on_click {
            let listener = Closure::<dyn Fn()>::new(move || on_click());
            call(
                &self.maps.event()?,
                "addDomListener",
                &[element.clone().into(), "click".into(), listener.into_js_value()],
            )?;
        }

        self.push_control(position, &element)?;
        Ok(element)
    }
}

impl MapWidget for JsMapWidget {
    fn register_map_type(&self, id: &str, map_type: ImageMapType) -> Result<()> {
        let options = Object::new();
        let source = map_type.source.clone();
        let tile_url = Closure::<dyn Fn(JsValue, f64) -> JsValue>::new(move |coord: JsValue, zoom: f64| {
            let coord = TileCoord::new(
                number(get(&coord, "x")).unwrap_or_default() as i64,
                number(get(&coord, "y")).unwrap_or_default() as i64,
            );
            if zoom < 0.0 {
                return JsValue::NULL;
            }
            match source.tile_url(coord, zoom as usize) {
                Some(url) => JsValue::from_str(&url),
                None => JsValue::NULL,
            }
        });
        let tile_size = map_type.tile_size as f64;

        set(&options, "getTileUrl", &tile_url.into_js_value())?;
        set(&options, "isPng", &map_type.is_png.into())?;
        set(&options, "minZoom", &(map_type.min_zoom as f64).into())?;
        set(&options, "maxZoom", &(map_type.max_zoom as f64).into())?;
        set(&options, "opacity", &(map_type.opacity as f64).into())?;
        set(
            &options,
            "tileSize",
            &construct(&self.maps.maps, "Size", &[tile_size.into(), tile_size.into()])?,
        )?;

        let image_map_type = construct(&self.maps.maps, "ImageMapType", &[options.into()])?;
        set(&image_map_type, "projection", &self.projection(&map_type)?)?;

        let registry = get(&self.map, "mapTypes")?;
        call(&registry, "set", &[JsValue::from_str(id), image_map_type])?;
        Ok(())
    }

    fn center(&self) -> ImagePoint {
        call(&self.map, "getCenter", &[])
            .ok()
            .and_then(|center| GoogleMaps::point_of(&center))
            .unwrap_or_else(ImagePoint::center)
    }

    fn bounds(&self) -> Option<ImageBounds> {
        let bounds = call(&self.map, "getBounds", &[]).ok()?;
        if bounds.is_undefined() || bounds.is_null() {
            return None;
        }
        let south_west = GoogleMaps::point_of(&call(&bounds, "getSouthWest", &[]).ok()?)?;
        let north_east = GoogleMaps::point_of(&call(&bounds, "getNorthEast", &[]).ok()?)?;
        Some(ImageBounds::new(south_west, north_east))
    }

    fn set_center(&self, center: ImagePoint) {
        let moved = self
            .maps
            .lat_lng(center)
            .and_then(|lat_lng| call(&self.map, "setCenter", &[lat_lng]));
        if let Err(e) = moved {
            viewer_log!(self.logger, "could not set center ({}, {}): {}", center.x, center.y, e);
        }
    }

    fn zoom(&self) -> usize {
        number(call(&self.map, "getZoom", &[]))
            .map(|zoom| zoom.max(0.0) as usize)
            .unwrap_or_default()
    }

    fn subscribe(&self, event: MapEventKind, handler: EventHandler) -> Result<()> {
        let listener = Closure::<dyn Fn()>::new(move || handler());
        call(
            &self.maps.event()?,
            "addListener",
            &[self.map.clone(), event.name().into(), listener.into_js_value()],
        )?;
        Ok(())
    }

    fn trigger(&self, event: MapEventKind) {
        let triggered = self
            .maps
            .event()
            .and_then(|events| call(&events, "trigger", &[self.map.clone(), event.name().into()]));
        if let Err(e) = triggered {
            viewer_log!(self.logger, "could not trigger {}: {}", event.name(), e);
        }
    }

    fn add_control(&self, position: ControlPosition, control: Control) -> ControlId {
        let mut controls = self.controls.borrow_mut();
        match self.try_add_control(position, control) {
            Ok(element) => controls.push(element),
            Err(e) => viewer_log!(self.logger, "could not add control: {}", e),
        }
        ControlId(controls.len().saturating_sub(1))
    }

    fn set_control_label(&self, id: ControlId, label: &str) {
        if let Some(element) = self.controls.borrow().get(id.0) {
            element.set_inner_html(&escape_html(label));
        }
    }
}

/// The host element of a browser viewer
pub struct JsContainer {
    element: web_sys::HtmlElement,
}

impl JsContainer {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self { element }
    }
}

impl Container for JsContainer {
    fn id(&self) -> Option<String> {
        Some(self.element.id()).filter(|id| !id.is_empty())
    }

    fn size(&self) -> Size {
        Size::new(self.element.client_width() as f64, self.element.client_height() as f64)
    }

    fn window_size(&self) -> Size {
        let Some(window) = web_sys::window() else {
            return Size::new(0.0, 0.0);
        };
        Size::new(
            window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or_default(),
            window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or_default(),
        )
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let classes = self.element.class_list();
        let _ = if enabled {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
    }
}

/// Creates `google.maps.Map` widgets that report through one viewer's logger
#[derive(Debug, Default)]
pub struct JsFactory {
    logger: InstanceLogger,
}

impl JsFactory {
    pub fn new(logger: InstanceLogger) -> Self {
        Self { logger }
    }
}

impl WidgetFactory for JsFactory {
    type Container = JsContainer;
    type Widget = JsMapWidget;

    fn create(&self, container: &Rc<JsContainer>, options: &MapOptions) -> Result<Rc<JsMapWidget>> {
        let maps = GoogleMaps::detect()?;

        let zoom_control_options = Object::new();
        set(
            &zoom_control_options,
            "style",
            &maps.constant("ZoomControlStyle", zoom_style_name(options.zoom_control_size))?,
        )?;

        let js_options = Object::new();
        set(&js_options, "zoom", &(options.zoom as f64).into())?;
        set(&js_options, "center", &maps.lat_lng(options.center)?)?;
        set(&js_options, "mapTypeId", &options.map_type_id.as_str().into())?;
        set(&js_options, "panControl", &options.pan_control.into())?;
        set(&js_options, "zoomControl", &options.zoom_control.into())?;
        set(&js_options, "zoomControlOptions", &zoom_control_options.into())?;
        set(&js_options, "streetViewControl", &options.street_view_control.into())?;
        set(&js_options, "mapTypeControl", &options.map_type_control.into())?;
        set(&js_options, "scaleControl", &options.scale_control.into())?;
        set(&js_options, "backgroundColor", &options.background_color.as_str().into())?;

        let map = construct(
            &maps.maps,
            "Map",
            &[container.element.clone().into(), js_options.into()],
        )?;
        if !map.is_truthy() {
            return Err(ViewerError::WidgetInitialization(
                "Google Maps creation failed.".to_string(),
            ));
        }

        Ok(Rc::new(JsMapWidget {
            maps,
            map,
            controls: RefCell::new(Vec::new()),
            logger: self.logger.clone(),
        }))
    }
}

fn js_tile_source(function: Function) -> Rc<dyn TileSource> {
    Rc::new(move |coord: TileCoord, zoom: usize| {
        let js_coord = Object::new();
        set(&js_coord, "x", &(coord.x as f64).into()).ok()?;
        set(&js_coord, "y", &(coord.y as f64).into()).ok()?;
        function
            .call2(&JsValue::NULL, &js_coord, &(zoom as f64).into())
            .ok()
            .and_then(|url| url.as_string())
    })
}

fn to_js(e: ViewerError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A viewer attached to a page element
#[wasm_bindgen]
pub struct LargeImageViewer {
    inner: ViewerHandle<JsMapWidget>,
}

#[wasm_bindgen]
impl LargeImageViewer {
    /// The `google.maps.Map` instance
    #[wasm_bindgen(js_name = getMap)]
    pub fn get_map(&self) -> JsValue {
        self.inner
            .widget()
            .map(|widget| widget.map().clone())
            .unwrap_or(JsValue::NULL)
    }

    /// Current state without an argument, enters or leaves full screen with one
    #[wasm_bindgen(js_name = fullScreen)]
    pub fn full_screen(&self, show: Option<bool>) -> std::result::Result<bool, JsValue> {
        let control = self
            .inner
            .full_screen()
            .ok_or_else(|| JsValue::from_str("full screen control is not enabled"))?;
        if let Some(show) = show {
            control.set_full_screen(show);
        }
        Ok(control.is_full_screen())
    }

    pub fn refresh(&self) -> std::result::Result<(), JsValue> {
        self.inner.refresh().map_err(to_js)
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.inner.state())
    }

    /// Per-level extents as plain objects
    #[wasm_bindgen(js_name = imageExtents)]
    pub fn image_extents(&self) -> std::result::Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.inner.extents().unwrap_or_default())
            .map_err(|e| to_js(e.into()))?;
        js_sys::JSON::parse(&json)
    }
}

/// Attaches a viewer to `element`.
///
/// `options` is a plain object merged over the defaults; `tile_url`, when
/// given, replaces the configured tile naming scheme and is called as
/// `tile_url({x, y}, zoom)`.
#[wasm_bindgen]
pub fn attach(
    element: web_sys::HtmlElement,
    options: JsValue,
    tile_url: Option<Function>,
) -> std::result::Result<LargeImageViewer, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let config = if options.is_undefined() {
        ViewerConfig::default()
    } else {
        let json = js_sys::JSON::stringify(&options)?;
        ViewerConfig::from_json(&String::from(json)).map_err(to_js)?
    };

    let logger = InstanceLogger::for_instance(Some(element.id().as_str()), config.log_id.as_deref(), config.debug);
    let mut viewer = Viewer::new(config).map_err(to_js)?;
    if let Some(function) = tile_url {
        viewer = viewer.with_tile_source(js_tile_source(function));
    }

    let viewer = Rc::new(viewer);
    viewer
        .attach(&JsFactory::new(logger), Rc::new(JsContainer::new(element)))
        .map_err(to_js)?;
    Ok(LargeImageViewer { inner: viewer })
}
