use anyhow::Context;
use largeview::{
    widget::{ControlContent, ControlPosition},
    MapWidget, PlaneContainer, PlaneFactory, PlaneMap, Point, Size, ViewerConfig, ViewerHandle,
};
use std::rc::Rc;

const WINDOW_SIZE: [f32; 2] = [1200.0, 800.0];

const DEMO_CONFIG: &str = r#"{
    "imageWidth": 12000,
    "imageHeight": 8000,
    "tilePath": "tiles",
    "debug": true,
    "showFullScreenControl": true,
    "titleTop": "Large Image Viewer",
    "copyright": { "text": "(c) largeview" }
}"#;

/// Standalone deep-zoom viewer
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("largeview=debug")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            ViewerConfig::from_json(&json).with_context(|| format!("parsing {}", path))?
        }
        None => ViewerConfig::from_json(DEMO_CONFIG)?,
    };
    config.validate()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title("largeview"),
        ..Default::default()
    };

    eframe::run_native(
        "largeview-app",
        options,
        Box::new(move |cc| Box::new(ViewerApp::new(cc, config))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

struct ViewerApp {
    config: ViewerConfig,
    container: Rc<PlaneContainer>,
    viewer: Option<ViewerHandle<PlaneMap>>,
    error: Option<String>,
    /// Pinch and ctrl-scroll input not yet turned into a whole zoom step
    pending_zoom: f32,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let window = Size::new(WINDOW_SIZE[0] as f64, WINDOW_SIZE[1] as f64);
        let container = Rc::new(PlaneContainer::in_window(Some("largeview"), window, window));

        let (viewer, error) = match largeview::attach(&PlaneFactory::new(), container.clone(), config.clone()) {
            Ok(viewer) => (Some(viewer), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            config,
            container,
            viewer,
            error,
            pending_zoom: 0.0,
        }
    }

    fn widget(&self) -> Option<Rc<PlaneMap>> {
        self.viewer.as_ref().and_then(|viewer| viewer.widget().cloned())
    }

    fn follow_size(&self, widget: &PlaneMap, rect: egui::Rect) {
        let size = Size::new(rect.width() as f64, rect.height() as f64);
        if widget.size() != size {
            self.container.set_size(size);
            widget.set_size(size);
        }
    }

    fn handle_input(&mut self, ui: &egui::Ui, widget: &PlaneMap, response: &egui::Response) {
        let drag = response.drag_delta();
        if drag.length_sq() > 0.0 {
            widget.pan_by(Point::new(drag.x as f64, drag.y as f64));
        }

        if !response.hovered() {
            return;
        }
        self.pending_zoom += ui.input(|i| i.zoom_delta()).ln();
        if self.pending_zoom > 0.5 {
            widget.zoom_in();
            self.pending_zoom = 0.0;
        } else if self.pending_zoom < -0.5 {
            widget.zoom_out();
            self.pending_zoom = 0.0;
        }
    }

    fn paint_tiles(&self, painter: &egui::Painter, rect: egui::Rect, widget: &PlaneMap) {
        painter.rect_filled(rect, 0.0, background(&self.config.background_color));

        for tile in widget.visible_tiles() {
            let Some(url) = tile.url else {
                continue;
            };
            let min = rect.min + egui::vec2(tile.offset.x as f32, tile.offset.y as f32);
            let tile_rect = egui::Rect::from_min_size(min, egui::Vec2::splat(tile.size as f32));

            painter.rect_filled(tile_rect, 0.0, egui::Color32::from_gray(40));
            painter.rect_stroke(tile_rect, 0.0, egui::Stroke::new(1.0, egui::Color32::from_gray(90)));
            painter.text(
                tile_rect.center(),
                egui::Align2::CENTER_CENTER,
                url,
                egui::FontId::monospace(10.0),
                egui::Color32::from_gray(160),
            );
        }
    }

    fn paint_controls(&self, ui: &mut egui::Ui, rect: egui::Rect, widget: &PlaneMap) {
        for (index, (position, control)) in widget.controls().into_iter().enumerate() {
            let (anchor, align) = match position {
                ControlPosition::TopCenter => (rect.center_top() + egui::vec2(0.0, 12.0), egui::Align2::CENTER_TOP),
                ControlPosition::TopRight => (rect.right_top() + egui::vec2(-8.0, 8.0), egui::Align2::RIGHT_TOP),
                ControlPosition::BottomCenter => {
                    (rect.center_bottom() + egui::vec2(0.0, -12.0), egui::Align2::CENTER_BOTTOM)
                }
                ControlPosition::BottomRight => {
                    (rect.right_bottom() + egui::vec2(-4.0, -4.0), egui::Align2::RIGHT_BOTTOM)
                }
            };

            match &control.content {
                ControlContent::Button { label, title } => {
                    let button_rect = align.anchor_rect(egui::Rect::from_min_size(anchor, egui::vec2(110.0, 22.0)));
                    let response = ui.put(button_rect, egui::Button::new(label.as_str())).on_hover_text(title);
                    if response.clicked() {
                        widget.click_control(largeview::widget::ControlId(index));
                        let full_screen = self
                            .viewer
                            .as_ref()
                            .and_then(|viewer| viewer.full_screen().map(|control| control.is_full_screen()))
                            .unwrap_or(false);
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Fullscreen(full_screen));
                    }
                }
                ControlContent::Caption { text, .. } => {
                    ui.painter().text(
                        anchor,
                        align,
                        text,
                        egui::FontId::proportional(18.0),
                        egui::Color32::WHITE,
                    );
                }
                ControlContent::Copyright { text, .. } => {
                    ui.painter().text(
                        anchor,
                        align,
                        text,
                        egui::FontId::proportional(11.0),
                        egui::Color32::from_gray(170),
                    );
                }
            }
        }
    }
}

/// Parses `#rgb` and `#rrggbb` css colors
fn background(color: &str) -> egui::Color32 {
    let digits = color.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => digits.to_string(),
    };
    match u32::from_str_radix(&expanded, 16) {
        Ok(rgb) if expanded.len() == 6 => {
            egui::Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
        }
        _ => egui::Color32::BLACK,
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match self.widget() {
                Some(widget) => {
                    let center = widget.center();
                    ui.label(format!("Center: {:.3}, {:.3} | Zoom: {}", center.x, center.y, widget.zoom()));
                    if ui.button("-").clicked() {
                        widget.zoom_out();
                    }
                    if ui.button("+").clicked() {
                        widget.zoom_in();
                    }
                }
                None => {
                    ui.label(self.error.as_deref().unwrap_or("viewer not attached"));
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let Some(widget) = self.widget() else {
                    return;
                };
                let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

                self.follow_size(&widget, rect);
                self.handle_input(ui, &widget, &response);
                self.paint_tiles(&ui.painter_at(rect), rect, &widget);
                self.paint_controls(ui, rect, &widget);
            });
    }
}
