//! Drag-to-select a rectangle on a rendered page.

use crate::geometry::Region;

/// Rectangle selection state for a single click-drag-release gesture
#[derive(Debug, Clone)]
pub struct DragSelection {
    width: f32,
    height: f32,
    start: Option<(f32, f32)>,
    end: Option<(f32, f32)>,
}

impl DragSelection {
    /// Positions are clamped to a `width` x `height` pixel image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            start: None,
            end: None,
        }
    }

    fn clamp(&self, pos: (f32, f32)) -> (f32, f32) {
        (pos.0.clamp(0.0, self.width), pos.1.clamp(0.0, self.height))
    }

    /// Start a new rectangle; any previous one is discarded
    pub fn begin(&mut self, pos: (f32, f32)) {
        let pos = self.clamp(pos);
        self.start = Some(pos);
        self.end = Some(pos);
    }

    pub fn update(&mut self, pos: (f32, f32)) {
        if self.start.is_some() {
            self.end = Some(self.clamp(pos));
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    /// Live rectangle while dragging
    pub fn current(&self) -> Option<Region> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Region::from_corners(start, end)),
            _ => None,
        }
    }

    /// End the gesture at the last known position
    pub fn finish(&mut self) -> Option<Region> {
        let region = self.current();
        self.clear();
        region
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }
}

#[cfg(feature = "gui")]
pub use window::select_region;

#[cfg(feature = "gui")]
mod window {
    use eframe::egui;
    use image::DynamicImage;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing::{debug, info};

    use super::DragSelection;
    use crate::error::{RoiError, RoiResult};
    use crate::geometry::Region;

    const MAX_WINDOW: [f32; 2] = [1400.0, 1000.0];

    struct RegionSelectorApp {
        texture: egui::TextureHandle,
        image_size: egui::Vec2,
        drag: DragSelection,
        result: Rc<RefCell<Option<Region>>>,
    }

    impl RegionSelectorApp {
        fn new(cc: &eframe::CreationContext<'_>, image: egui::ColorImage, result: Rc<RefCell<Option<Region>>>) -> Self {
            let [width, height] = image.size;
            let texture = cc
                .egui_ctx
                .load_texture("roi_page", image, egui::TextureOptions::default());

            Self {
                texture,
                image_size: egui::vec2(width as f32, height as f32),
                drag: DragSelection::new(width as u32, height as u32),
                result,
            }
        }

        fn close(&self, ctx: &egui::Context) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    impl eframe::App for RegionSelectorApp {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                debug!("Selection abandoned with Escape");
                self.close(ctx);
                return;
            }

            egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    egui::ScrollArea::both().show(ui, |ui| {
                        let response = ui.add(
                            egui::Image::from_texture(&self.texture)
                                .fit_to_exact_size(self.image_size)
                                .sense(egui::Sense::click_and_drag()),
                        );

                        // Screen points -> image pixels; display scaling cancels out
                        let rect = response.rect;
                        let image_size = self.image_size;
                        let to_pixels = |pos: egui::Pos2| {
                            let rel = pos - rect.min;
                            (
                                rel.x * image_size.x / rect.width(),
                                rel.y * image_size.y / rect.height(),
                            )
                        };
                        let to_screen = |x: u32, y: u32| {
                            rect.min
                                + egui::vec2(
                                    x as f32 * rect.width() / image_size.x,
                                    y as f32 * rect.height() / image_size.y,
                                )
                        };

                        if response.hovered() || self.drag.is_dragging() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                        }

                        if response.drag_started() {
                            let origin = ui.input(|i| i.pointer.press_origin());
                            if let Some(pos) = origin.or_else(|| response.interact_pointer_pos()) {
                                self.drag.begin(to_pixels(pos));
                            }
                        }

                        if response.dragged() {
                            if let Some(pos) = response.interact_pointer_pos() {
                                self.drag.update(to_pixels(pos));
                            }
                        }

                        if let Some(region) = self.drag.current() {
                            ui.painter().rect_stroke(
                                egui::Rect::from_min_max(
                                    to_screen(region.x, region.y),
                                    to_screen(region.right(), region.bottom()),
                                ),
                                egui::Rounding::ZERO,
                                egui::Stroke::new(2.0, egui::Color32::RED),
                            );
                        }

                        if response.drag_stopped() {
                            if let Some(region) = self.drag.finish() {
                                info!("Selected region {}", region);
                                *self.result.borrow_mut() = Some(region);
                            }
                            self.close(ui.ctx());
                        } else if response.clicked() {
                            debug!("Click without drag; closing with no region");
                            self.close(ui.ctx());
                        }
                    });
                });
        }
    }

    /// Show `image` in a window and wait for the user to drag a rectangle.
    /// Returns `None` when the window is closed without one.
    pub fn select_region(image: &DynamicImage, title: &str) -> RoiResult<Option<Region>> {
        let rgba = image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        let inner_size = [
            (size[0] as f32).min(MAX_WINDOW[0]),
            (size[1] as f32).min(MAX_WINDOW[1]),
        ];
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(inner_size)
                .with_resizable(true)
                .with_title(title),
            ..Default::default()
        };

        let result = Rc::new(RefCell::new(None));
        let app_result = Rc::clone(&result);

        eframe::run_native(
            title,
            options,
            Box::new(move |cc| Ok(Box::new(RegionSelectorApp::new(cc, color_image, app_result)))),
        )
        .map_err(|e| RoiError::gui(format!("Selection window failed: {}", e)))?;

        let region = result.borrow_mut().take();
        Ok(region)
    }
}
