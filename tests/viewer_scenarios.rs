//! Whole viewers driven through the in-process plane widget

use largeview::{
    widget::{ControlContent, ControlPosition},
    ImagePoint, InitialZoom, MapEventKind, MapWidget, PlaneContainer, PlaneFactory, PlaneMap,
    Point, Size, TileCoord, TileScheme, Viewer, ViewerConfig, ViewerError, ViewerHandle,
    ViewerState,
};
use std::rc::Rc;

fn container(id: &str, width: f64, height: f64) -> Rc<PlaneContainer> {
    Rc::new(PlaneContainer::new(Some(id), Size::new(width, height)))
}

fn attached(config: ViewerConfig, width: f64, height: f64) -> ViewerHandle<PlaneMap> {
    largeview::attach(&PlaneFactory::new(), container("liv_0", width, height), config).unwrap()
}

fn assert_on_image(widget: &PlaneMap) {
    let bounds = widget.bounds().unwrap();
    let span = bounds.span();
    if span.x <= 100.0 {
        assert!(bounds.west() >= -50.0 - 1e-3, "west edge {} off image", bounds.west());
        assert!(bounds.east() <= 50.0 + 1e-3, "east edge {} off image", bounds.east());
    } else {
        assert!(widget.center().x.abs() < 1e-3);
    }
    if span.y <= 100.0 {
        assert!(bounds.south() >= -50.0 - 1e-3, "south edge {} off image", bounds.south());
        assert!(bounds.north() <= 50.0 + 1e-3, "north edge {} off image", bounds.north());
    } else {
        assert!(widget.center().y.abs() < 1e-3);
    }
}

#[test]
fn test_json_config_to_active_viewer() {
    let config = ViewerConfig::from_json(
        r#"{
            "imageWidth": "4000",
            "imageHeight": "3000",
            "tilePath": "/media/harbor/",
            "titleTop": "Harbor",
            "copyright": { "text": "(c) 2013", "URL": "https://example.com" }
        }"#,
    )
    .unwrap();
    let viewer = attached(config, 800.0, 600.0);

    assert_eq!(viewer.state(), ViewerState::Active);
    let widget = viewer.widget().unwrap();
    assert_eq!(widget.zoom(), 1);
    assert_eq!(widget.options().map_type_id, "LIV");
    assert!(!widget.options().pan_control);

    let map_type = widget.map_type().unwrap();
    assert_eq!(map_type.max_zoom, 4);
    assert_eq!(
        map_type.tile_url(TileCoord::new(1, 0), 1).as_deref(),
        Some("/media/harbor/tile_1_1_0.jpg")
    );
    assert_eq!(map_type.tile_url(TileCoord::new(2, 0), 1), None);

    let controls = widget.controls();
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0].0, ControlPosition::TopCenter);
    assert_eq!(controls[0].1.text(), "Harbor");
    assert_eq!(controls[1].0, ControlPosition::BottomRight);
    assert!(matches!(
        &controls[1].1.content,
        ControlContent::Copyright { url: Some(url), .. } if url == "https://example.com"
    ));
}

#[test]
fn test_panning_past_edge_is_corrected() {
    let config = ViewerConfig::new(4000, 3000).with_initial_zoom(InitialZoom::Level(4));
    let viewer = attached(config, 800.0, 600.0);
    let widget = viewer.widget().unwrap();

    // drag the image far to the right, past its west edge
    widget.pan_by(Point::new(5000.0, 0.0));
    assert_on_image(widget);
    let bounds = widget.bounds().unwrap();
    assert!((bounds.west() + 50.0).abs() < 1e-6);

    // and far down, past its north edge
    widget.pan_by(Point::new(0.0, 4000.0));
    assert_on_image(widget);
    assert!((widget.bounds().unwrap().north() - 50.0).abs() < 1e-6);
}

#[test]
fn test_correction_settles_quickly() {
    let config = ViewerConfig::new(4000, 3000).with_initial_zoom(InitialZoom::Level(3));
    let viewer = attached(config, 800.0, 600.0);
    let widget = viewer.widget().unwrap();

    let before = widget.dispatched_events();
    widget.set_center(ImagePoint::new(49.0, -49.0));
    let delivered = widget.dispatched_events() - before;

    assert_on_image(widget);
    // user move plus one corrective move, each firing center and bounds
    assert!(delivered <= 4, "{} notifications for one gesture", delivered);
}

#[test]
fn test_small_image_stays_centered_at_every_zoom() {
    let viewer = attached(ViewerConfig::new(300, 200), 1024.0, 768.0);
    let widget = viewer.widget().unwrap();
    assert_eq!(viewer.pyramid().unwrap().len(), 2);
    assert_eq!(widget.zoom(), 1);

    for zoom in [0, 1] {
        widget.set_zoom(zoom);
        widget.pan_by(Point::new(300.0, -200.0));
        assert_eq!(widget.center(), ImagePoint::center());
    }
}

#[test]
fn test_zoom_in_at_edge_stays_on_image() {
    let config = ViewerConfig::new(4000, 3000).with_initial_zoom(InitialZoom::Level(2));
    let viewer = attached(config, 800.0, 600.0);
    let widget = viewer.widget().unwrap();

    widget.pan_by(Point::new(-10_000.0, 0.0));
    widget.zoom_out();
    widget.zoom_in();
    widget.zoom_in();
    assert_on_image(widget);
}

#[test]
fn test_resize_recenters_when_container_outgrows_image() {
    let config = ViewerConfig::new(2000, 1000).with_initial_zoom(InitialZoom::Level(2));
    let container = container("resizable", 400.0, 300.0);
    let viewer = largeview::attach(&PlaneFactory::new(), container.clone(), config).unwrap();
    let widget = viewer.widget().unwrap();

    widget.pan_by(Point::new(-600.0, 0.0));
    assert!(widget.center().x > 0.0);

    container.set_size(Size::new(3000.0, 300.0));
    widget.set_size(Size::new(3000.0, 300.0));
    assert!(widget.center().x.abs() < 1e-9);
}

#[test]
fn test_full_screen_control_round_trip() {
    let config = ViewerConfig::new(4000, 3000).with_full_screen_control(true);
    let container = container("fs", 800.0, 600.0);
    let viewer = largeview::attach(&PlaneFactory::new(), container.clone(), config).unwrap();
    let widget = viewer.widget().unwrap();
    let control = viewer.full_screen().unwrap();

    assert!(!control.is_full_screen());
    let (position, button) = &widget.controls()[control.control_id().0];
    assert_eq!(*position, ControlPosition::TopRight);
    assert_eq!(button.text(), "Full Screen");

    let before = widget.dispatched_events();
    widget.click_control(control.control_id());
    assert!(control.is_full_screen());
    assert!(container.has_class("LIVFullScreen"));
    assert_eq!(widget.controls()[control.control_id().0].1.text(), "Exit Full Screen");
    assert!(widget.dispatched_events() > before);

    control.toggle();
    assert!(!control.is_full_screen());
    assert!(!container.has_class("LIVFullScreen"));
    assert_eq!(widget.controls()[control.control_id().0].1.text(), "Full Screen");
}

#[test]
fn test_full_screen_starts_on_when_container_fills_window() {
    let window = Size::new(1280.0, 720.0);
    let container = Rc::new(PlaneContainer::in_window(Some("page"), window, window));
    let config = ViewerConfig::new(4000, 3000).with_full_screen_control(true);
    let viewer = largeview::attach(&PlaneFactory::new(), container, config).unwrap();

    let control = viewer.full_screen().unwrap();
    assert!(control.is_full_screen());
    let widget = viewer.widget().unwrap();
    assert_eq!(widget.controls()[control.control_id().0].1.text(), "Exit Full Screen");
}

#[test]
fn test_viewers_are_independent() {
    let factory = PlaneFactory::new();
    let first = largeview::attach(
        &factory,
        container("first", 800.0, 600.0),
        ViewerConfig::new(4000, 3000).with_initial_zoom(InitialZoom::Level(4)),
    )
    .unwrap();
    let second = largeview::attach(
        &factory,
        container("second", 800.0, 600.0),
        ViewerConfig::new(1000, 500).with_debug(true),
    )
    .unwrap();

    first.widget().unwrap().pan_by(Point::new(-200.0, 0.0));
    assert_eq!(second.widget().unwrap().center(), ImagePoint::center());
    assert_eq!(first.log_id(), "first");
    assert_eq!(second.log_id(), "second");
    assert_ne!(first.extents().unwrap().len(), second.extents().unwrap().len());
}

#[test]
fn test_failed_viewer_does_not_affect_others() {
    let broken = Rc::new(Viewer::<PlaneMap>::new(ViewerConfig::new(100, 100)).unwrap());
    let result = broken.attach(&PlaneFactory::unavailable("maps engine missing"), container("a", 10.0, 10.0));
    assert!(matches!(result, Err(ViewerError::WidgetInitialization(_))));
    assert_eq!(broken.state(), ViewerState::Failed);

    let healthy = attached(ViewerConfig::new(100, 100), 200.0, 200.0);
    assert!(healthy.is_active());
}

#[test]
fn test_invalid_dimensions_fail_before_widget() {
    let result = largeview::attach(
        &PlaneFactory::new(),
        container("bad", 100.0, 100.0),
        ViewerConfig::from_json(r#"{ "imageWidth": 0, "imageHeight": 500 }"#).unwrap(),
    );
    assert!(matches!(result, Err(ViewerError::InvalidDimension(_))));
}

#[test]
fn test_zoomify_scheme_addresses_tile_groups() {
    let config = ViewerConfig::new(4000, 3000)
        .with_tile_scheme(TileScheme::Zoomify)
        .with_tile_path("zoomify");
    let viewer = attached(config, 800.0, 600.0);
    let map_type = viewer.widget().unwrap().map_type().unwrap();

    assert_eq!(
        map_type.tile_url(TileCoord::new(0, 0), 0).as_deref(),
        Some("zoomify/TileGroup0/0-0-0.jpg")
    );
    assert_eq!(map_type.tile_url(TileCoord::new(-1, 0), 0), None);
}

#[test]
fn test_refresh_fires_resize() {
    let viewer = attached(ViewerConfig::new(4000, 3000), 800.0, 600.0);
    let widget = viewer.widget().unwrap();

    let resized = Rc::new(std::cell::Cell::new(false));
    let seen = resized.clone();
    widget.subscribe(MapEventKind::Resize, Rc::new(move || seen.set(true))).unwrap();

    viewer.refresh().unwrap();
    assert!(resized.get());
}
