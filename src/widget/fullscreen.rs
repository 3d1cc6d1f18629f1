use crate::{
    core::constants::FULL_SCREEN_CSS_CLASS,
    logging::InstanceLogger,
    viewer_log,
    widget::{
        controls::{Control, ControlId, ControlPosition},
        traits::{Container, EventHandler, MapEventKind, MapWidget},
    },
};
use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

const ENTER_LABEL: &str = "Full Screen";
const EXIT_LABEL: &str = "Exit Full Screen";
const BUTTON_TITLE: &str = "Toggle the full screen mode";

fn label(is_full_screen: bool) -> &'static str {
    if is_full_screen {
        EXIT_LABEL
    } else {
        ENTER_LABEL
    }
}

/// Button in the top-right corner switching the container in and out of
/// full-screen mode
pub struct FullScreenControl<W: MapWidget> {
    widget: Rc<W>,
    container: Rc<dyn Container>,
    control: ControlId,
    is_full_screen: Cell<bool>,
    logger: InstanceLogger,
}

impl<W: MapWidget + 'static> FullScreenControl<W> {
    /// Adds the button to the widget.
    ///
    /// The starting state is full screen when the container already fills
    /// the window.
    pub fn install(widget: Rc<W>, container: Rc<dyn Container>, logger: InstanceLogger) -> Rc<Self> {
        let initial = container.size() == container.window_size();
        viewer_log!(logger, "initial full screen state: {}", initial);

        Rc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let on_click: EventHandler = Rc::new(move || {
                if let Some(control) = this.upgrade() {
                    control.toggle();
                }
            });
            let control = widget.add_control(
                ControlPosition::TopRight,
                Control::button(label(initial), BUTTON_TITLE, on_click),
            );

            Self {
                widget,
                container,
                control,
                is_full_screen: Cell::new(initial),
                logger,
            }
        })
    }

    pub fn is_full_screen(&self) -> bool {
        self.is_full_screen.get()
    }

    pub fn enter(&self) {
        self.set_full_screen(true);
    }

    pub fn exit(&self) {
        self.set_full_screen(false);
    }

    pub fn toggle(&self) {
        self.set_full_screen(!self.is_full_screen());
    }

    pub fn set_full_screen(&self, full_screen: bool) {
        self.is_full_screen.set(full_screen);
        viewer_log!(self.logger, "full screen: {}", full_screen);

        self.container.set_class(FULL_SCREEN_CSS_CLASS, full_screen);
        self.widget.trigger(MapEventKind::Resize);
        self.widget.set_control_label(self.control, label(full_screen));
    }

    pub fn control_id(&self) -> ControlId {
        self.control
    }
}
