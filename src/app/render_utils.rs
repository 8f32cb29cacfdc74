use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};
use petal::viewport::Transform;

pub(super) const VIEWER_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const FOLLOWED_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
pub(super) const OTHER_COLOR: Color32 = Color32::from_rgb(150, 156, 170);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(200, 208, 220);
pub(super) const HIGHLIGHT_EDGE_COLOR: Color32 = Color32::from_rgb(241, 146, 94);
pub(super) const CLUSTER_COLOR: Color32 = Color32::from_rgb(236, 110, 150);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * amount) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Fills the canvas and draws a grid that follows the live transform.
pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: Transform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = 56.0 * transform.scale.abs().clamp(0.6, 1.8);
    let origin = rect.center() + transform.translation();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Whether any part of the segment, padded by `padding`, can land inside `rect`.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    if !bounds.intersects(rect) {
        return false;
    }
    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    if !Rect::from_two_pos(a1, a2).intersects(Rect::from_two_pos(b1, b2)) {
        return false;
    }

    let straddles = |c1: f32, c2: f32| c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0;
    straddles(cross(a1, a2, b1), cross(a1, a2, b2)) && straddles(cross(b1, b2, a1), cross(b1, b2, a2))
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn crossing_edge_is_visible_even_with_both_ends_outside() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 150.0), 0.0));
    }

    #[test]
    fn dimming_keeps_some_alpha() {
        let dimmed = dim_color(Color32::WHITE, 0.0);
        assert_eq!(dimmed.r(), 0);
        assert!(dimmed.a() > 100);
    }
}
