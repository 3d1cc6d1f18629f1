//! Viewport controller
//!
//! A [`Viewer`] owns one widget, one pyramid and one resolved configuration.
//! Attaching it to a container computes the zoom levels, picks the initial
//! view, builds the widget with the image map type and overlay content, and
//! subscribes to the widget's change notifications so every pan or zoom is
//! clamped back onto the image.

use crate::{
    core::{
        config::{InitialZoom, ViewerConfig},
        constants::MAP_TYPE_ID,
        constrain,
        geo::{ImagePoint, Size},
        pyramid::{Pyramid, ZoomLevelExtent},
    },
    logging::InstanceLogger,
    tiles::TileSource,
    viewer_log,
    widget::{
        controls::{Control, ControlPosition},
        fullscreen::FullScreenControl,
        options::{ImageMapType, MapOptions},
        traits::{Container, EventHandler, MapEventKind, MapWidget, WidgetFactory},
    },
    Result, ViewerError,
};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

/// Lifecycle of a viewer. `Active` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewerState {
    Uninitialized,
    Initializing,
    Active,
    Failed,
}

/// Shared handle to an attached viewer
pub type ViewerHandle<W> = Rc<Viewer<W>>;

/// Everything that exists only once the viewer is active
struct Attached<W: MapWidget> {
    widget: Rc<W>,
    pyramid: Rc<Pyramid>,
    full_screen: Option<Rc<FullScreenControl<W>>>,
}

pub struct Viewer<W: MapWidget> {
    config: ViewerConfig,
    tile_source: Option<Rc<dyn TileSource>>,
    state: Cell<ViewerState>,
    logger: RefCell<InstanceLogger>,
    attached: OnceCell<Attached<W>>,
}

/// Resolves the configuration, attaches a viewer to `container`, and
/// returns its handle.
pub fn attach<F: WidgetFactory>(
    factory: &F,
    container: Rc<F::Container>,
    config: ViewerConfig,
) -> Result<ViewerHandle<F::Widget>> {
    let viewer = Rc::new(Viewer::new(config)?);
    viewer.attach(factory, container)?;
    Ok(viewer)
}

impl<W: MapWidget + 'static> Viewer<W> {
    /// Creates an unattached viewer.
    ///
    /// Invalid image or tile dimensions fail here, before any widget exists.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let logger = InstanceLogger::for_instance(None, config.log_id.as_deref(), config.debug);

        Ok(Self {
            config,
            tile_source: None,
            state: Cell::new(ViewerState::Uninitialized),
            logger: RefCell::new(logger),
            attached: OnceCell::new(),
        })
    }

    /// Replaces the configured tile naming scheme with a custom resolver
    pub fn with_tile_source(mut self, source: Rc<dyn TileSource>) -> Self {
        self.tile_source = Some(source);
        self
    }

    pub fn state(&self) -> ViewerState {
        self.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state() == ViewerState::Active
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The widget driven by this viewer, once active
    pub fn widget(&self) -> Option<&Rc<W>> {
        self.attached.get().map(|attached| &attached.widget)
    }

    /// Zoom levels of the image, once active
    pub fn pyramid(&self) -> Option<&Rc<Pyramid>> {
        self.attached.get().map(|attached| &attached.pyramid)
    }

    /// Per-level pixel and tile extents, coarsest first
    pub fn extents(&self) -> Option<&[ZoomLevelExtent]> {
        self.pyramid().map(|pyramid| pyramid.levels())
    }

    pub fn full_screen(&self) -> Option<&Rc<FullScreenControl<W>>> {
        self.attached.get().and_then(|attached| attached.full_screen.as_ref())
    }

    pub fn log_id(&self) -> String {
        self.logger.borrow().id().to_string()
    }

    /// Initial zoom level for a container of the given size
    pub fn initial_zoom(&self, pyramid: &Pyramid, container: Size) -> usize {
        match self.config.initial_zoom {
            InitialZoom::Fit => pyramid.fit_zoom(container),
            InitialZoom::Level(level) => level.min(pyramid.max_zoom()),
        }
    }

    /// Builds the widget inside `container` and starts enforcing bounds.
    ///
    /// Only an uninitialized viewer can be attached. The initial view is
    /// clamped onto the image before this returns. On failure the viewer
    /// ends up `Failed` and no widget is kept.
    pub fn attach<F>(self: &Rc<Self>, factory: &F, container: Rc<F::Container>) -> Result<()>
    where
        F: WidgetFactory<Widget = W>,
    {
        if self.state() != ViewerState::Uninitialized {
            return Err(ViewerError::InvalidState(self.state()));
        }
        self.state.set(ViewerState::Initializing);

        *self.logger.borrow_mut() = InstanceLogger::for_instance(
            container.id().as_deref(),
            self.config.log_id.as_deref(),
            self.config.debug,
        );

        let attached = self
            .initialize(factory, container)
            .and_then(|attached| self.subscribe(&attached.widget).map(|_| attached))
            .map_err(|e| self.fail(e))?;
        if self.attached.set(attached).is_err() {
            return Err(self.fail(ViewerError::InvalidState(ViewerState::Failed)));
        }

        self.state.set(ViewerState::Active);
        viewer_log!(self.logger.borrow(), "viewer active");
        self.constrain_bounds();
        Ok(())
    }

    fn fail(&self, error: ViewerError) -> ViewerError {
        self.state.set(ViewerState::Failed);
        viewer_log!(self.logger.borrow(), "attach failed: {}", error);
        error
    }

    fn initialize<F>(&self, factory: &F, container: Rc<F::Container>) -> Result<Attached<W>>
    where
        F: WidgetFactory<Widget = W>,
    {
        let logger = self.logger.borrow().clone();
        logger.dump("attaching with options", &self.config);

        let pyramid = Rc::new(self.config.pyramid()?);
        logger.dump("image extents", pyramid.levels());

        let zoom = self.initial_zoom(&pyramid, container.size());
        viewer_log!(logger, "initial zoom: {}", zoom);

        let center = self.config.initial_center();
        viewer_log!(logger, "initial center: ({}, {})", center.x, center.y);

        let source = match &self.tile_source {
            Some(source) => source.clone(),
            None => self
                .config
                .tile_scheme
                .source(&self.config.tile_path, pyramid.clone()),
        };
        let map_type = ImageMapType::new(&pyramid, source);
        let options = MapOptions::for_viewer(&self.config, zoom, center);

        let widget = factory
            .create(&container, &options)
            .map_err(|e| match e {
                ViewerError::WidgetInitialization(_) => e,
                other => ViewerError::WidgetInitialization(other.to_string()),
            })?;
        widget
            .register_map_type(MAP_TYPE_ID, map_type)
            .map_err(|e| ViewerError::WidgetInitialization(e.to_string()))?;

        if let Some(control) = Control::caption(&self.config.title_top) {
            widget.add_control(ControlPosition::TopCenter, control);
        }
        if let Some(control) = Control::caption(&self.config.title_bottom) {
            widget.add_control(ControlPosition::BottomCenter, control);
        }
        if let Some(control) = Control::copyright(&self.config.copyright) {
            widget.add_control(ControlPosition::BottomRight, control);
        }

        let full_screen = if self.config.show_full_screen_control {
            let container: Rc<dyn Container> = container;
            Some(FullScreenControl::install(widget.clone(), container, logger))
        } else {
            None
        };

        Ok(Attached {
            widget,
            pyramid,
            full_screen,
        })
    }

    fn subscribe(self: &Rc<Self>, widget: &W) -> Result<()> {
        for event in [MapEventKind::BoundsChanged, MapEventKind::CenterChanged] {
            let viewer: Weak<Self> = Rc::downgrade(self);
            let handler: EventHandler = Rc::new(move || {
                if let Some(viewer) = viewer.upgrade() {
                    viewer.constrain_bounds();
                }
            });
            widget.subscribe(event, handler).map_err(|e| match e {
                ViewerError::WidgetInitialization(_) => e,
                other => ViewerError::WidgetInitialization(format!(
                    "subscribing to {}: {}",
                    event.name(),
                    other
                )),
            })?;
        }
        Ok(())
    }

    /// Moves the view back onto the image if it drifted off.
    ///
    /// Runs inside the widget's change notifications. Returns the corrective
    /// center when one was issued.
    pub fn constrain_bounds(&self) -> Option<ImagePoint> {
        if !self.is_active() {
            return None;
        }
        let widget = self.widget()?;
        // No bounds yet while the widget is bootstrapping.
        let bounds = widget.bounds()?;
        let center = widget.center();

        let target = constrain::correction(center, &bounds)?;
        viewer_log!(
            self.logger.borrow(),
            "constrained center ({}, {}) -> ({}, {})",
            center.x,
            center.y,
            target.x,
            target.y
        );
        widget.set_center(target);
        Some(target)
    }

    /// Tells the widget its container may have changed size and clamps again
    pub fn refresh(&self) -> Result<()> {
        let widget = self
            .widget()
            .filter(|_| self.is_active())
            .ok_or(ViewerError::InvalidState(self.state()))?;
        widget.trigger(MapEventKind::Resize);
        self.constrain_bounds();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::TileCoord,
        widget::plane::{PlaneContainer, PlaneFactory, PlaneMap},
    };

    fn container(width: f64, height: f64) -> Rc<PlaneContainer> {
        Rc::new(PlaneContainer::new(Some("liv_0"), Size::new(width, height)))
    }

    #[test]
    fn test_new_rejects_invalid_dimensions() {
        let result = Viewer::<PlaneMap>::new(ViewerConfig::new(0, 100));
        assert!(matches!(result, Err(ViewerError::InvalidDimension(_))));
    }

    #[test]
    fn test_attach_activates_viewer() {
        let viewer = Rc::new(Viewer::new(ViewerConfig::new(4000, 3000)).unwrap());
        assert_eq!(viewer.state(), ViewerState::Uninitialized);
        assert!(viewer.widget().is_none());

        viewer.attach(&PlaneFactory::new(), container(800.0, 600.0)).unwrap();
        assert_eq!(viewer.state(), ViewerState::Active);
        assert_eq!(viewer.log_id(), "liv_0");

        let widget = viewer.widget().unwrap();
        assert_eq!(widget.zoom(), 1);
        assert_eq!(widget.center(), ImagePoint::center());
        assert_eq!(viewer.pyramid().unwrap().len(), 5);
        assert_eq!(viewer.extents().unwrap()[0].width_in_pixels, 250.0);
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let viewer = attach(&PlaneFactory::new(), container(800.0, 600.0), ViewerConfig::new(4000, 3000)).unwrap();
        let again = viewer.attach(&PlaneFactory::new(), container(800.0, 600.0));
        assert!(matches!(again, Err(ViewerError::InvalidState(ViewerState::Active))));
    }

    #[test]
    fn test_widget_failure_leaves_viewer_failed() {
        let viewer = Rc::new(Viewer::<PlaneMap>::new(ViewerConfig::new(4000, 3000)).unwrap());
        let result = viewer.attach(&PlaneFactory::unavailable("engine missing"), container(800.0, 600.0));

        assert!(matches!(result, Err(ViewerError::WidgetInitialization(_))));
        assert_eq!(viewer.state(), ViewerState::Failed);
        assert!(viewer.widget().is_none());
        assert!(viewer.constrain_bounds().is_none());
        assert!(matches!(viewer.refresh(), Err(ViewerError::InvalidState(ViewerState::Failed))));
    }

    #[test]
    fn test_explicit_initial_zoom_is_clamped() {
        let config = ViewerConfig::new(4000, 3000).with_initial_zoom(InitialZoom::Level(12));
        let viewer = attach(&PlaneFactory::new(), container(800.0, 600.0), config).unwrap();
        assert_eq!(viewer.widget().unwrap().zoom(), 4);
    }

    #[test]
    fn test_custom_tile_source_overrides_scheme() {
        let source = |coord: TileCoord, zoom: usize| Some(format!("cdn/{}/{}/{}.png", zoom, coord.x, coord.y));
        let viewer = Rc::new(
            Viewer::new(ViewerConfig::new(1000, 500))
                .unwrap()
                .with_tile_source(Rc::new(source)),
        );
        viewer.attach(&PlaneFactory::new(), container(1000.0, 600.0)).unwrap();

        let map_type = viewer.widget().unwrap().map_type().unwrap();
        assert_eq!(
            map_type.tile_url(TileCoord::new(-3, 0), 1).as_deref(),
            Some("cdn/1/-3/0.png")
        );
    }

    #[test]
    fn test_initial_off_image_center_is_clamped_on_attach() {
        let config = ViewerConfig::new(4000, 3000)
            .with_initial_zoom(InitialZoom::Level(4))
            .with_initial_center(60.0, -70.0);
        let viewer = attach(&PlaneFactory::new(), container(800.0, 600.0), config).unwrap();
        let widget = viewer.widget().unwrap();

        // 800x600 at full resolution spans 20x20 units
        let bounds = widget.bounds().unwrap();
        assert!(bounds.east() <= 50.0 && bounds.south() >= -50.0);
        assert!((bounds.east() - 50.0).abs() < 1e-9);
        assert!((bounds.south() + 50.0).abs() < 1e-9);
        assert!(widget.center().max_axis_delta(&ImagePoint::new(40.0, -40.0)) < 1e-9);
    }

    /// Plane widget that can hold back its bounds or refuse listeners
    struct StubMap {
        inner: PlaneMap,
        bounds_ready: bool,
        refuse_events: bool,
        recenters: Cell<usize>,
    }

    impl MapWidget for StubMap {
        fn register_map_type(&self, id: &str, map_type: ImageMapType) -> Result<()> {
            self.inner.register_map_type(id, map_type)
        }

        fn center(&self) -> ImagePoint {
            self.inner.center()
        }

        fn bounds(&self) -> Option<crate::core::geo::ImageBounds> {
            self.inner.bounds().filter(|_| self.bounds_ready)
        }

        fn set_center(&self, center: ImagePoint) {
            self.recenters.set(self.recenters.get() + 1);
            self.inner.set_center(center);
        }

        fn zoom(&self) -> usize {
            self.inner.zoom()
        }

        fn subscribe(&self, event: MapEventKind, handler: EventHandler) -> Result<()> {
            if self.refuse_events {
                return Err(ViewerError::Config(format!("listener for {} rejected", event.name())));
            }
            self.inner.subscribe(event, handler)
        }

        fn trigger(&self, event: MapEventKind) {
            self.inner.trigger(event);
        }

        fn add_control(&self, position: ControlPosition, control: Control) -> crate::widget::ControlId {
            self.inner.add_control(position, control)
        }

        fn set_control_label(&self, id: crate::widget::ControlId, label: &str) {
            self.inner.set_control_label(id, label);
        }
    }

    struct StubFactory {
        bounds_ready: bool,
        refuse_events: bool,
    }

    impl WidgetFactory for StubFactory {
        type Container = PlaneContainer;
        type Widget = StubMap;

        fn create(&self, container: &Rc<PlaneContainer>, options: &MapOptions) -> Result<Rc<StubMap>> {
            Ok(Rc::new(StubMap {
                inner: PlaneMap::new(container.size(), options.clone()),
                bounds_ready: self.bounds_ready,
                refuse_events: self.refuse_events,
                recenters: Cell::new(0),
            }))
        }
    }

    #[test]
    fn test_no_recenter_while_bounds_unknown() {
        let factory = StubFactory {
            bounds_ready: false,
            refuse_events: false,
        };
        let config = ViewerConfig::new(4000, 3000)
            .with_initial_zoom(InitialZoom::Level(4))
            .with_initial_center(60.0, -70.0);
        let viewer = attach(&factory, container(800.0, 600.0), config).unwrap();
        assert!(viewer.is_active());

        let widget = viewer.widget().unwrap();
        assert!(viewer.constrain_bounds().is_none());
        assert!(viewer.refresh().is_ok());
        assert_eq!(widget.center(), ImagePoint::new(60.0, -70.0));
        assert_eq!(widget.recenters.get(), 0);
    }

    #[test]
    fn test_rejected_subscription_fails_attach() {
        let factory = StubFactory {
            bounds_ready: true,
            refuse_events: true,
        };
        let viewer = Rc::new(Viewer::new(ViewerConfig::new(4000, 3000)).unwrap());
        let result = viewer.attach(&factory, container(800.0, 600.0));

        assert!(matches!(result, Err(ViewerError::WidgetInitialization(ref reason)) if reason.contains("bounds_changed")));
        assert_eq!(viewer.state(), ViewerState::Failed);
        assert!(viewer.widget().is_none());
        assert!(viewer.constrain_bounds().is_none());
    }
}
