use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, RichText, Ui};
use petal::cluster::{Coordinate, DEFAULT_CLUSTER_RADIUS};
use petal::{LayoutConfig, ViewportController};

use super::gestures::GestureTracker;
use super::{LoadedData, Scene, ViewModel};

impl ViewModel {
    pub(super) fn new(
        loaded: LoadedData,
        layout_config: LayoutConfig,
        fixed_radius: Option<f64>,
    ) -> Self {
        let LoadedData { dataset, graph } = loaded;

        Self {
            dataset,
            graph,
            layout_config,
            layout_dirty: false,
            scene: Scene::Graph,
            graph_viewport: ViewportController::new(),
            graph_gestures: GestureTracker::default(),
            map_viewport: ViewportController::new(),
            map_gestures: GestureTracker::default(),
            map_origin: Coordinate::default(),
            map_fitted: false,
            search: String::new(),
            selected: None,
            selected_cluster: None,
            use_fixed_radius: fixed_radius.is_some(),
            fixed_radius: fixed_radius.unwrap_or(DEFAULT_CLUSTER_RADIUS),
            cluster_cache: None,
        }
    }

    pub(super) fn show(
        &mut self,
        ctx: &Context,
        data_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("petal");
                    ui.separator();
                    ui.selectable_value(&mut self.scene, Scene::Graph, "Follow graph");
                    ui.selectable_value(&mut self.scene, Scene::Map, "Plays map");
                    ui.separator();
                    ui.label(format!("data: {}", data_path.display()));
                    ui.label(format!("users: {}", self.graph.nodes.len()));
                    ui.label(format!("edges: {}", self.graph.edges.len()));
                    ui.label(format!("plays: {}", self.dataset.plays.len()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| match self.scene {
                Scene::Graph => self.draw_graph(ui),
                Scene::Map => self.draw_map(ui),
            });
    }

    fn active_viewport(&mut self) -> &mut ViewportController {
        match self.scene {
            Scene::Graph => &mut self.graph_viewport,
            Scene::Map => &mut self.map_viewport,
        }
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        let transform = self.active_viewport().transform();
        ui.label(format!(
            "translate ({:.1}, {:.1})  scale {:.3}",
            transform.translate_x, transform.translate_y, transform.scale
        ));
        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.active_viewport().reset();
                if self.scene == Scene::Map {
                    self.map_fitted = false;
                }
            }
        });
        ui.separator();

        match self.scene {
            Scene::Graph => self.draw_graph_controls(ui),
            Scene::Map => self.draw_map_controls(ui),
        }
    }

    fn draw_graph_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("username or name"));
        if let Some(matches) = self.search_matches() {
            ui.label(format!("{} matching users", matches.len()));
        }
        ui.separator();

        ui.heading("Layout");
        egui::Grid::new("layout_controls")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("seed");
                ui.add(egui::DragValue::new(&mut self.layout_config.seed));
                ui.end_row();

                ui.label("ticks");
                ui.add(egui::DragValue::new(&mut self.layout_config.ticks).range(1..=2000));
                ui.end_row();
            });
        if ui.button("Re-run layout").clicked() {
            self.layout_dirty = true;
        }
    }

    fn draw_map_controls(&mut self, ui: &mut Ui) {
        ui.heading("Clustering");
        ui.checkbox(&mut self.use_fixed_radius, "fixed radius");
        ui.add_enabled(
            self.use_fixed_radius,
            egui::Slider::new(&mut self.fixed_radius, 0.0001..=1.0)
                .logarithmic(true)
                .suffix("\u{b0}"),
        );
        if !self.use_fixed_radius {
            ui.label(RichText::new("radius follows the visible latitude span").weak());
        }
        if ui.button("Fit plays").clicked() {
            self.map_fitted = false;
        }
    }

    fn draw_details(&mut self, ui: &mut Ui) {
        match self.scene {
            Scene::Graph => self.draw_user_details(ui),
            Scene::Map => self.draw_cluster_details(ui),
        }
    }

    fn draw_user_details(&mut self, ui: &mut Ui) {
        ui.heading("User");
        let Some(node) = self.selected.and_then(|id| self.graph.node(id)) else {
            ui.label("Click a node to inspect it.");
            return;
        };

        ui.label(RichText::new(node.user.label()).strong());
        ui.label(format!("@{}", node.user.username));
        if let Some(avatar) = &node.user.avatar_url {
            ui.hyperlink_to("avatar", avatar);
        }
        ui.label(if node.pinned {
            "this is you"
        } else if node.followed {
            "you follow them"
        } else {
            "you do not follow them"
        });
        ui.separator();

        let mut neighbors = self
            .graph
            .neighbors(node.id)
            .into_iter()
            .filter_map(|id| self.graph.node(id))
            .collect::<Vec<_>>();
        neighbors.sort_by(|a, b| a.user.username.cmp(&b.user.username));

        ui.label(format!("{} connections", neighbors.len()));
        let mut next_selection = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for neighbor in neighbors {
                if ui.link(format!("@{}", neighbor.user.username)).clicked() {
                    next_selection = Some(neighbor.id);
                }
            }
        });
        if next_selection.is_some() {
            self.selected = next_selection;
        }
    }

    fn draw_cluster_details(&mut self, ui: &mut Ui) {
        ui.heading("Cluster");
        let selected = self.selected_cluster.as_ref().and_then(|id| {
            self.cluster_cache
                .as_ref()?
                .clusters
                .iter()
                .find(|cluster| &cluster.id == id)
        });
        let Some(cluster) = selected else {
            ui.label("Click a marker to list its plays.");
            return;
        };

        ui.label(format!(
            "{} plays around ({:.5}, {:.5})",
            cluster.count, cluster.latitude, cluster.longitude
        ));
        if let Some(play) = cluster.representative()
            && let Some(artwork) = &play.artwork_url
        {
            ui.hyperlink_to("artwork", artwork);
        }
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for play in &cluster.members {
                let listener = play
                    .user_id
                    .and_then(|id| self.graph.node(id))
                    .map(|node| format!("  @{}", node.user.username))
                    .unwrap_or_default();
                if play.artist.is_empty() {
                    ui.label(format!("{}{listener}", play.track));
                } else {
                    ui.label(format!("{} - {}{listener}", play.track, play.artist));
                }
            }
        });
    }
}
