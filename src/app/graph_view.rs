use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use petal::{GraphNode, UserId};

use super::ViewModel;
use super::render_utils::{
    EDGE_COLOR, FOLLOWED_COLOR, HIGHLIGHT_EDGE_COLOR, OTHER_COLOR, VIEWER_COLOR, blend_color,
    circle_visible, dim_color, draw_background, edge_visible,
};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn node_color(node: &GraphNode) -> Color32 {
    if node.pinned {
        VIEWER_COLOR
    } else if node.followed {
        FOLLOWED_COLOR
    } else {
        OTHER_COLOR
    }
}

impl ViewModel {
    /// Ids matching the search box, or `None` when no search is active.
    pub(super) fn search_matches(&self) -> Option<HashSet<UserId>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        Some(
            self.graph
                .nodes
                .iter()
                .filter(|node| {
                    fuzzy_match_score(&matcher, &node.user.username, query).is_some()
                        || fuzzy_match_score(&matcher, node.user.label(), query).is_some()
                })
                .map(|node| node.id)
                .collect(),
        )
    }

    pub(super) fn relayout(&mut self) {
        self.graph.run_layout(&self.layout_config);
        self.layout_dirty = false;
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.layout_dirty {
            self.relayout();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let moving = self
            .graph_gestures
            .drive(ui, &response, &mut self.graph_viewport);
        if moving {
            ui.ctx().request_repaint();
        }

        let transform = self.graph_viewport.transform();
        draw_background(&painter, rect, transform);

        if self.graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No users to show",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let origin = rect.center();
        let screen_positions = self
            .graph
            .nodes
            .iter()
            .map(|node| transform.apply(origin, node.position()))
            .collect::<Vec<Pos2>>();
        let screen_radii = self
            .graph
            .nodes
            .iter()
            .map(|node| (node.radius * transform.scale.abs()).max(2.0))
            .collect::<Vec<f32>>();
        let index_by_id = self.graph.index_by_id();

        let hovered = response.hover_pos().and_then(|pointer| {
            (0..screen_positions.len())
                .filter(|&index| screen_positions[index].distance(pointer) <= screen_radii[index])
                .min_by(|&a, &b| {
                    screen_positions[a]
                        .distance(pointer)
                        .total_cmp(&screen_positions[b].distance(pointer))
                })
        });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        if response.clicked_by(egui::PointerButton::Primary) {
            self.selected = hovered.map(|index| self.graph.nodes[index].id);
        }

        let focus = self.selected.map(|id| {
            let mut focus = self.graph.neighbors(id);
            focus.insert(id);
            focus
        });
        let matches = self.search_matches();

        let line_scale = transform.scale.abs().sqrt().clamp(0.4, 2.5);
        for edge in &self.graph.edges {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&edge.source), index_by_id.get(&edge.target))
            else {
                continue;
            };
            let (start, end) = (screen_positions[source], screen_positions[target]);
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let style = edge.style();
            let in_focus = self.selected.is_none_or(|id| edge.touches(id));
            let base = if edge.highlighted {
                HIGHLIGHT_EDGE_COLOR
            } else {
                EDGE_COLOR
            };
            let mut color = base.gamma_multiply(style.opacity);
            if !in_focus {
                color = dim_color(color, 0.35);
            }
            painter.line_segment([start, end], Stroke::new(style.width * line_scale, color));
        }

        for (index, node) in self.graph.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = self.selected == Some(node.id);
            let is_hovered = hovered == Some(index);
            let matched = matches.as_ref().is_none_or(|ids| ids.contains(&node.id));
            let focused = focus.as_ref().is_none_or(|ids| ids.contains(&node.id));

            let mut color = node_color(node);
            if is_hovered {
                color = blend_color(color, Color32::WHITE, 0.35);
            } else if !matched || !focused {
                color = dim_color(color, 0.4);
            }

            painter.circle_filled(position, radius, color);
            let stroke = if is_selected {
                Stroke::new(2.5, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, stroke);

            if is_selected || is_hovered || radius > 14.0 || (matches.is_some() && matched) {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.user.label(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(node) = hovered.map(|index| &self.graph.nodes[index]) {
            let relation = if node.pinned {
                "you"
            } else if node.followed {
                "following"
            } else {
                "not following"
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("@{}  |  {relation}", node.user.username),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
