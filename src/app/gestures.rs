use eframe::egui::{self, Ui, Vec2};
use petal::ViewportController;

/// Turns egui pointer input into the cumulative pan and pinch streams a
/// [`ViewportController`] expects.
#[derive(Debug)]
pub(super) struct GestureTracker {
    pan_total: Vec2,
    pinch_total: f32,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self {
            pan_total: Vec2::ZERO,
            pinch_total: 1.0,
        }
    }
}

impl GestureTracker {
    /// Feeds this frame's input to `viewport`. Returns true while a gesture is live.
    pub(super) fn drive(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        viewport: &mut ViewportController,
    ) -> bool {
        if response.drag_started() {
            self.pan_total = Vec2::ZERO;
            viewport.begin_pan();
        }
        if response.dragged() {
            self.pan_total += response.drag_delta();
            viewport.update_pan(self.pan_total);
        }
        if response.drag_stopped() {
            viewport.end_pan();
            self.pan_total = Vec2::ZERO;
        }

        match ui.input(|input| input.multi_touch()) {
            Some(touch) => {
                if !viewport.is_pinching() {
                    self.pinch_total = 1.0;
                    viewport.begin_pinch();
                }
                self.pinch_total *= touch.zoom_delta;
                viewport.update_pinch(self.pinch_total);
            }
            None if viewport.is_pinching() => {
                viewport.end_pinch();
                self.pinch_total = 1.0;
            }
            None => {}
        }

        if response.hovered() && !viewport.is_pinching() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                viewport.begin_pinch();
                viewport.update_pinch((1.0 + (scroll * 0.0018)).clamp(0.85, 1.15));
                viewport.end_pinch();
            }
        }

        viewport.is_panning() || viewport.is_pinching()
    }
}
