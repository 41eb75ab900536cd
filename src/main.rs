//! Binary entrypoint for rasterview.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Pan/zoom raster image viewer
#[derive(Debug, Parser)]
#[command(name = "rasterview", about = "Pan/zoom raster image viewer")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image to open at startup (overrides the config)
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("rasterview={level}").parse().expect("directive"))
        .add_directive("wgpu=warn".parse().expect("directive"))
        .add_directive("winit=warn".parse().expect("directive"));
    fmt().with_env_filter(filter).with_target(true).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => rasterview::config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => rasterview::config::Configuration::default(),
    };
    cfg.validate().context("validating configuration")?;

    if cli.image.is_some() {
        cfg.image = cli.image;
    }

    rasterview::tasks::viewer::run_viewer(&cfg, None)?;
    Ok(())
}
