//! voxform headless batch runner
//!
//! Runs the Import → Voxelise → Assign → Export pipeline from a JSON
//! config file, with no interactive surface.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p voxform-cli -- <config.json> [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--show-logs`: Print stage banners and info status messages
//! - `--show-warnings`: Print warning status messages
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use voxform_pipeline::{run_headless, HeadlessConfig};

fn main() -> anyhow::Result<()> {
    // Check for help flag before parsing anything else
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config_path: Option<PathBuf> = None;
    let mut show_logs = false;
    let mut show_warnings = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--show-logs" => show_logs = true,
            "--show-warnings" => show_warnings = true,
            other if other.starts_with('-') => {
                anyhow::bail!("Unknown option '{other}' (see --help)");
            }
            other => {
                if config_path.replace(PathBuf::from(other)).is_some() {
                    anyhow::bail!("Only one config file may be given (see --help)");
                }
            }
        }
    }

    let Some(config_path) = config_path else {
        print_help();
        anyhow::bail!("Missing config file argument");
    };

    let mut config = HeadlessConfig::load(&config_path)?;
    config.debug.show_logs |= show_logs;
    config.debug.show_warnings |= show_warnings;

    run_headless(&config)?;
    Ok(())
}

fn print_help() {
    eprintln!(
        "voxform headless batch runner

USAGE:
    cargo run -p voxform-cli -- <config.json> [OPTIONS]

OPTIONS:
    --show-logs             Print stage banners and info status messages
    --show-warnings         Print warning status messages
    -h, --help              Print this help message

CONFIG:
    A JSON file with one object per stage, for example:

    {{
      \"import\":   {{ \"filepath\": \"model.obj\" }},
      \"voxelise\": {{ \"voxeliser\": \"raster\", \"desired_height\": 80 }},
      \"assign\":   {{ \"atlas\": \"atlas.json\", \"palette\": \"palette.json\",
                   \"assigner\": \"ordered-dithering\", \"colour_space\": \"rgb\",
                   \"fallable\": \"do-nothing\" }},
      \"export\":   {{ \"exporter\": \"json\", \"filepath\": \"out/structure\" }}
    }}

EXAMPLES:
    # Full pipeline with warnings printed
    cargo run -p voxform-cli -- job.json --show-warnings

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
