use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use petal::cluster::{Cluster, Coordinate, Region};
use petal::{Dataset, LayoutConfig, Play, SocialGraph, UserId, ViewportController};

mod gestures;
mod graph_view;
mod map_view;
mod panels;
mod render_utils;

use gestures::GestureTracker;

pub struct PetalApp {
    data_path: PathBuf,
    layout_config: LayoutConfig,
    fixed_radius: Option<f64>,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedData, String>>>,
}

/// Dataset plus the graph laid out off the UI thread.
struct LoadedData {
    dataset: Dataset,
    graph: SocialGraph,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scene {
    Graph,
    Map,
}

struct ViewModel {
    dataset: Dataset,
    graph: SocialGraph,
    layout_config: LayoutConfig,
    layout_dirty: bool,
    scene: Scene,
    graph_viewport: ViewportController,
    graph_gestures: GestureTracker,
    map_viewport: ViewportController,
    map_gestures: GestureTracker,
    map_origin: Coordinate,
    map_fitted: bool,
    search: String,
    selected: Option<UserId>,
    selected_cluster: Option<String>,
    use_fixed_radius: bool,
    fixed_radius: f64,
    cluster_cache: Option<ClusterCache>,
}

/// Clusters for the last visible region; rebuilt only when region or radius changes.
struct ClusterCache {
    region: Region,
    radius: f64,
    clusters: Vec<Cluster<Play>>,
}

impl PetalApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_path: PathBuf,
        layout_config: LayoutConfig,
        fixed_radius: Option<f64>,
    ) -> Self {
        let state = Self::start_load(data_path.clone(), layout_config);
        Self {
            data_path,
            layout_config,
            fixed_radius,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        data_path: PathBuf,
        layout_config: LayoutConfig,
    ) -> Receiver<Result<LoadedData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Dataset::load(&data_path)
                .map(|dataset| {
                    let mut graph = dataset.social_graph();
                    graph.run_layout(&layout_config);
                    LoadedData { dataset, graph }
                })
                .map_err(|error| format!("{error}: {}", error_chain(&error)));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf, layout_config: LayoutConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path, layout_config),
        }
    }

    fn ready_state(&self, loaded: LoadedData) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            loaded,
            self.layout_config,
            self.fixed_radius,
        )))
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    if causes.is_empty() {
        "no further detail".to_owned()
    } else {
        causes.join(": ")
    }
}

impl eframe::App for PetalApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(loaded)) => transition = Some(Ok(loaded)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading dataset and laying out the follow graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.layout_config = model.layout_config;
                    self.reload_rx = Some(Self::spawn_load(
                        self.data_path.clone(),
                        self.layout_config,
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.data_path.clone(), self.layout_config);
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(loaded) => self.ready_state(loaded),
                Err(error) => {
                    log::error!("{error}");
                    AppState::Error(error)
                }
            };
        }
    }
}
