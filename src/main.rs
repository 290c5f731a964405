//! Gobang GUI
//!
//! Five in a row on a 15x15 board: two players on one machine, against the
//! AI, or across the LAN.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gobang::config::Config;
use gobang::ui::GobangApp;
use tracing_subscriber::EnvFilter;

/// Gobang desktop game
#[derive(Parser, Debug)]
#[command(name = "gobang")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file (missing file means defaults)
    #[arg(long, default_value = "gobang.toml")]
    config: PathBuf,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)))
        .init();

    let config = Config::load_or_default(&args.config)?;
    tracing::info!(config = %args.config.display(), "starting gobang");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Gobang"),
        ..Default::default()
    };

    eframe::run_native(
        "Gobang",
        options,
        Box::new(move |cc| Ok(Box::new(GobangApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))
}
