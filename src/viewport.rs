//! Pan/pinch transform accumulation for the graph and map scenes.
//!
//! Each gesture stream keeps a committed value plus the delta of the session
//! in flight. Pans add to the committed translation and pinches multiply the
//! committed scale; the two never interact, so scaling is anchor-less. Nothing
//! is clamped.

use eframe::egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn new(translation: Vec2, scale: f32) -> Self {
        Self {
            translate_x: translation.x,
            translate_y: translation.y,
            scale,
        }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Maps a scene point to the screen, relative to the screen `origin`.
    pub fn apply(&self, origin: Pos2, world: Vec2) -> Pos2 {
        origin + self.translation() + world * self.scale
    }

    /// Inverse of [`Transform::apply`]; `None` when the scale is zero.
    pub fn invert(&self, origin: Pos2, screen: Pos2) -> Option<Vec2> {
        (self.scale != 0.0).then(|| (screen - origin - self.translation()) / self.scale)
    }
}

/// A discrete step of one of the two gesture streams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    PanStart,
    /// Cumulative translation since the pan started.
    PanUpdate(Vec2),
    PanEnd,
    PinchStart,
    /// Cumulative scale factor since the pinch started.
    PinchUpdate(f32),
    PinchEnd,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewportController {
    committed: Transform,
    pan_delta: Option<Vec2>,
    pinch_factor: Option<f32>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: Transform) -> Self {
        Self {
            committed: transform,
            pan_delta: None,
            pinch_factor: None,
        }
    }

    /// Live transform, including any gesture in flight.
    pub fn transform(&self) -> Transform {
        let translation = self.committed.translation() + self.pan_delta.unwrap_or(Vec2::ZERO);
        Transform::new(translation, self.committed.scale * self.pinch_factor.unwrap_or(1.0))
    }

    pub fn committed(&self) -> Transform {
        self.committed
    }

    pub fn is_panning(&self) -> bool {
        self.pan_delta.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_factor.is_some()
    }

    pub fn begin_pan(&mut self) {
        self.pan_delta = Some(Vec2::ZERO);
    }

    pub fn update_pan(&mut self, cumulative: Vec2) {
        self.pan_delta = Some(cumulative);
    }

    pub fn end_pan(&mut self) {
        if let Some(delta) = self.pan_delta.take() {
            self.committed.translate_x += delta.x;
            self.committed.translate_y += delta.y;
            log::trace!("pan committed at {:?}", self.committed.translation());
        }
    }

    pub fn begin_pinch(&mut self) {
        self.pinch_factor = Some(1.0);
    }

    pub fn update_pinch(&mut self, cumulative: f32) {
        self.pinch_factor = Some(cumulative);
    }

    pub fn end_pinch(&mut self) {
        if let Some(factor) = self.pinch_factor.take() {
            self.committed.scale *= factor;
            log::trace!("pinch committed at scale {}", self.committed.scale);
        }
    }

    pub fn handle(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::PanStart => self.begin_pan(),
            GestureEvent::PanUpdate(cumulative) => self.update_pan(cumulative),
            GestureEvent::PanEnd => self.end_pan(),
            GestureEvent::PinchStart => self.begin_pinch(),
            GestureEvent::PinchUpdate(cumulative) => self.update_pinch(cumulative),
            GestureEvent::PinchEnd => self.end_pinch(),
        }
    }

    /// Drops any gesture in flight and returns to the identity transform.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn pans_compose_additively() {
        let mut viewport = ViewportController::new();

        viewport.begin_pan();
        viewport.update_pan(vec2(5.0, 1.0));
        viewport.update_pan(vec2(10.0, -4.0));
        viewport.end_pan();
        viewport.begin_pan();
        viewport.update_pan(vec2(-3.0, 7.0));
        viewport.end_pan();

        assert_eq!(viewport.committed().translation(), vec2(7.0, 3.0));
        assert_eq!(viewport.transform(), viewport.committed());
    }

    #[test]
    fn pinches_compose_multiplicatively() {
        let mut viewport = ViewportController::with_transform(Transform::new(Vec2::ZERO, 2.0));

        for event in [
            GestureEvent::PinchStart,
            GestureEvent::PinchUpdate(1.2),
            GestureEvent::PinchUpdate(1.5),
            GestureEvent::PinchEnd,
            GestureEvent::PinchStart,
            GestureEvent::PinchUpdate(0.5),
            GestureEvent::PinchEnd,
        ] {
            viewport.handle(event);
        }

        assert!((viewport.committed().scale - 2.0 * 1.5 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn live_transform_reflects_gesture_in_flight() {
        let mut viewport = ViewportController::new();
        viewport.begin_pan();
        viewport.update_pan(vec2(4.0, 4.0));

        assert_eq!(viewport.transform().translation(), vec2(4.0, 4.0));
        assert_eq!(viewport.committed(), Transform::IDENTITY);
        assert!(viewport.is_panning());
    }

    #[test]
    fn pan_and_pinch_run_simultaneously_without_coupling() {
        let mut viewport = ViewportController::new();
        viewport.handle(GestureEvent::PanStart);
        viewport.handle(GestureEvent::PinchStart);
        viewport.handle(GestureEvent::PanUpdate(vec2(20.0, 0.0)));
        viewport.handle(GestureEvent::PinchUpdate(3.0));
        viewport.handle(GestureEvent::PinchEnd);

        let live = viewport.transform();
        assert_eq!(live.translation(), vec2(20.0, 0.0));
        assert_eq!(live.scale, 3.0);

        viewport.handle(GestureEvent::PanEnd);
        assert_eq!(viewport.committed(), Transform::new(vec2(20.0, 0.0), 3.0));
    }

    #[test]
    fn update_without_start_and_stray_end() {
        let mut viewport = ViewportController::new();
        viewport.end_pan();
        viewport.end_pinch();
        assert_eq!(viewport.committed(), Transform::IDENTITY);

        viewport.update_pan(vec2(1.0, 2.0));
        viewport.end_pan();
        assert_eq!(viewport.committed().translation(), vec2(1.0, 2.0));
    }

    #[test]
    fn scale_is_not_clamped() {
        let mut viewport = ViewportController::new();
        viewport.begin_pinch();
        viewport.update_pinch(0.0);
        viewport.end_pinch();
        assert_eq!(viewport.committed().scale, 0.0);
        assert_eq!(viewport.committed().invert(Pos2::ZERO, pos2(1.0, 1.0)), None);

        viewport.begin_pinch();
        viewport.update_pinch(-2.0);
        viewport.end_pinch();
        assert_eq!(viewport.committed().scale, 0.0);

        viewport.reset();
        viewport.begin_pinch();
        viewport.update_pinch(-2.0);
        viewport.end_pinch();
        assert_eq!(viewport.committed().scale, -2.0);
    }

    #[test]
    fn apply_and_invert_round_trip() {
        let transform = Transform::new(vec2(30.0, -10.0), 2.5);
        let origin = pos2(400.0, 300.0);
        let world = vec2(-12.0, 48.0);

        let screen = transform.apply(origin, world);
        assert_eq!(screen, pos2(400.0 + 30.0 - 30.0, 300.0 - 10.0 + 120.0));
        let back = transform.invert(origin, screen).expect("non-zero scale");
        assert!((back - world).length() < 1e-4);
    }
}
