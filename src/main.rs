//! Floorplan Editor - properties panel for rooms, walls and furniture
//!
//! Loads a floor plan from GeoJSON files and edits it through a line-oriented
//! properties panel. Edits are applied locally right away and persisted to
//! the configured record store in the background.
//!
//! # Usage
//!
//! ```bash
//! # Edit the plan in ./plan, persisting to the in-memory store
//! floorplan-editor --data ./plan
//!
//! # Persist to a REST endpoint
//! floorplan-editor --data ./plan --store-url https://project.example/rest/v1
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floorplan_editor::cli::Session;
use floorplan_editor::config::Config;
use floorplan_editor::constants::{APP_BINARY_NAME, APP_NAME};
use floorplan_editor::models::{FloorPlan, RoomColor};
use floorplan_editor::panel::PropertiesPanel;
use floorplan_editor::services::persistence::build_store;
use floorplan_editor::services::persistence::DEFAULT_HISTORY_LIMIT;
use floorplan_editor::services::{GeoJsonExporter, PersistenceWorker};

/// Floorplan Editor - properties panel for floor plan features
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding rooms.geojson, walls.geojson and furniture.geojson
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,

    /// Config file to use instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Persist edits to this REST endpoint (overrides the config file)
    #[arg(long, value_name = "URL")]
    store_url: Option<String>,

    /// Directory exports are written to (overrides the config file)
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for the panel
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = args.store_url {
        config.set_store_url(url)?;
    }
    if let Some(dir) = args.export_dir {
        config.export.output_dir = dir;
    }

    let plan = match &args.data {
        Some(dir) => FloorPlan::load_dir(dir)?,
        None => FloorPlan::default(),
    };
    info!(
        "Loaded {} rooms, {} walls, {} furniture",
        plan.rooms.len(),
        plan.walls.len(),
        plan.furniture.len()
    );

    let store = build_store(&config.store)?;
    let history_limit = config
        .store
        .history_limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    let worker = Arc::new(PersistenceWorker::with_history_limit(store, history_limit));
    let exporter = Arc::new(GeoJsonExporter::from_config(&config.export));
    let default_color = RoomColor::from_hex(&config.ui.default_room_color)
        .context("Invalid default room color")?;
    let panel = PropertiesPanel::new(worker.clone(), exporter).with_default_room_color(default_color);

    println!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'quit' to exit. Run '{APP_BINARY_NAME} --help' for options.");

    let mut session = Session::new(plan, panel, worker);
    session.run(io::stdin().lock(), io::stdout().lock())
}
