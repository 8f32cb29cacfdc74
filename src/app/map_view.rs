use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2, vec2};
use petal::cluster::{Coordinate, Region, cluster, cluster_radius};
use petal::viewport::Transform;
use petal::ViewportController;

use super::render_utils::{CLUSTER_COLOR, blend_color, circle_visible, draw_background};
use super::{ClusterCache, ViewModel};

/// Region shown when there are no plays to fit.
const WORLD: Region = Region {
    center: Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    },
    latitude_delta: 170.0,
    longitude_delta: 360.0,
};

const MARKER_RADIUS: f32 = 9.0;

/// Equirectangular offset from `origin`, north up.
fn project(origin: Coordinate, coordinate: Coordinate) -> Vec2 {
    vec2(
        (coordinate.longitude - origin.longitude) as f32,
        -(coordinate.latitude - origin.latitude) as f32,
    )
}

fn unproject(origin: Coordinate, world: Vec2) -> Coordinate {
    Coordinate::new(
        origin.latitude - world.y as f64,
        origin.longitude + world.x as f64,
    )
}

/// Region covered by `rect` under `transform`; `None` once the scale collapses to zero.
fn visible_region(rect: Rect, origin: Coordinate, transform: Transform) -> Option<Region> {
    let top_left = transform.invert(rect.center(), rect.left_top())?;
    let bottom_right = transform.invert(rect.center(), rect.right_bottom())?;
    Some(Region::from_bounds(
        unproject(origin, bottom_right),
        unproject(origin, top_left),
    ))
}

impl ViewModel {
    /// Centers the map on the plays and scales it so all of them fit.
    pub(super) fn fit_map(&mut self, rect: Rect) {
        let region = self.dataset.play_region().unwrap_or(WORLD);
        let scale = (rect.width() as f64 / region.longitude_delta)
            .min(rect.height() as f64 / region.latitude_delta) as f32;

        self.map_origin = region.center;
        self.map_viewport = ViewportController::with_transform(Transform::new(Vec2::ZERO, scale));
        self.map_fitted = true;
        self.cluster_cache = None;
    }

    pub(super) fn active_radius(&self, region: &Region) -> f64 {
        if self.use_fixed_radius {
            self.fixed_radius
        } else {
            cluster_radius(region)
        }
    }

    fn refresh_clusters(&mut self, region: Region) {
        let radius = self.active_radius(&region);
        if self
            .cluster_cache
            .as_ref()
            .is_some_and(|cache| cache.region == region && cache.radius == radius)
        {
            return;
        }

        let clusters = cluster(&self.dataset.plays, Some(&region), Some(radius));
        if self
            .selected_cluster
            .as_ref()
            .is_some_and(|id| !clusters.iter().any(|cluster| &cluster.id == id))
        {
            self.selected_cluster = None;
        }
        self.cluster_cache = Some(ClusterCache {
            region,
            radius,
            clusters,
        });
    }

    pub(super) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if !self.map_fitted {
            self.fit_map(rect);
        }

        if self
            .map_gestures
            .drive(ui, &response, &mut self.map_viewport)
        {
            ui.ctx().request_repaint();
        }

        let transform = self.map_viewport.transform();
        draw_background(&painter, rect, transform);

        let Some(region) = visible_region(rect, self.map_origin, transform) else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Zoomed out to nothing; reset the view",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        };
        self.refresh_clusters(region);

        let Some(cache) = self.cluster_cache.as_ref() else {
            return;
        };

        let origin = rect.center();
        let markers = cache
            .clusters
            .iter()
            .map(|cluster| {
                let radius = MARKER_RADIUS + (cluster.count as f32).sqrt() * 3.0;
                let position = transform.apply(origin, project(self.map_origin, cluster.coordinate()));
                (position, radius)
            })
            .collect::<Vec<(Pos2, f32)>>();

        let hovered = response.hover_pos().and_then(|pointer| {
            markers
                .iter()
                .position(|&(position, radius)| position.distance(pointer) <= radius)
        });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        let clicked = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered.map(|index| cache.clusters[index].id.clone()));

        for (index, (cluster, &(position, radius))) in cache.clusters.iter().zip(&markers).enumerate()
        {
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let selected = self.selected_cluster.as_deref() == Some(cluster.id.as_str());
            let mut color = CLUSTER_COLOR;
            if hovered == Some(index) || selected {
                color = blend_color(color, Color32::WHITE, 0.3);
            }
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(if selected { 2.5 } else { 1.0 }, Color32::from_gray(20)),
            );

            if let Some(badge) = cluster.badge() {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    badge,
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }
        }

        let considered = self.dataset.plays.len().min(region.item_cap());
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            format!(
                "zoom {:.1}  |  cap {}  |  radius {:.4}\u{b0}  |  {} clusters from {} of {} plays",
                region.zoom_level(),
                region.item_cap(),
                cache.radius,
                cache.clusters.len(),
                considered,
                self.dataset.plays.len()
            ),
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );

        if let Some(selection) = clicked {
            self.selected_cluster = selection;
        }
    }
}
