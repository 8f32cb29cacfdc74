mod app;
mod export;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use petal::{Dataset, LayoutConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset JSON with users, follows and geotagged plays.
    #[arg(long, default_value = "data/sample.json")]
    data: PathBuf,

    /// Force simulation ticks per layout run.
    #[arg(long, default_value_t = 300)]
    ticks: usize,

    /// Seed for the initial ring jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Fixed cluster radius in degrees instead of the zoom-proportional one.
    #[arg(long)]
    radius: Option<f64>,

    /// Write clusters and the laid-out graph to this JSON file and exit.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let layout_config = LayoutConfig::default()
        .with_ticks(args.ticks)
        .with_seed(args.seed);

    if let Some(export_path) = &args.export {
        let dataset = Dataset::load(&args.data)
            .with_context(|| format!("failed to load {}", args.data.display()))?;
        let document = export::build_export(&dataset, &layout_config, args.radius);
        return export::write_export(&document, export_path);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let Args { data, radius, .. } = args;
    eframe::run_native(
        "petal",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PetalApp::new(
                cc,
                data,
                layout_config,
                radius,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
