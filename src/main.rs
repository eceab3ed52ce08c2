mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::MinePlannerApp;
use clap::Parser;
use config::{ConfigOverrides, DashboardConfig};
use eframe::egui;
use state::AppState;

/// Interactive dashboard for planning visits to Zambian mining properties.
#[derive(Debug, Parser)]
#[command(name = "mine-planner", version, about)]
struct Cli {
    /// Property table to open (CSV, JSON or Parquet).
    data: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Average road speed used for travel-time estimates (km/h).
    #[arg(long)]
    speed_kmh: Option<f64>,

    /// Width of the distance histogram buckets (km).
    #[arg(long)]
    bucket_km: Option<f64>,

    /// Number of commodities shown in the top-N chart.
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        data_path: cli.data,
        average_speed_kmh: cli.speed_kmh,
        histogram_bucket_km: cli.bucket_km,
        top_commodities: cli.top,
    };
    let config = DashboardConfig::load(cli.config.as_deref(), &overrides)
        .context("failed to resolve configuration")?;
    log::info!(
        "Base of operations: {} ({}, {})",
        config.base.name,
        config.base.latitude,
        config.base.longitude
    );

    let data_path = config.data_path.clone();
    let mut state = AppState::new(config);
    // A missing or broken file is reported in the UI; the user can open another.
    if state.load_path(&data_path).is_ok() {
        log::info!("Loaded {}", data_path.display());
    }
    let app = MinePlannerApp::new(state);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mining Site Assessment Planner",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_maps_flags() {
        let cli = Cli::try_parse_from([
            "mine-planner",
            "props.parquet",
            "--config",
            "planner.toml",
            "--speed-kmh",
            "55",
            "--top",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("props.parquet")));
        assert_eq!(cli.config, Some(PathBuf::from("planner.toml")));
        assert_eq!(cli.speed_kmh, Some(55.0));
        assert_eq!(cli.bucket_km, None);
        assert_eq!(cli.top, Some(5));
    }
}
