//! Headless batch execution.
//!
//! Runs Import, Voxelise, Assign, and Export strictly in sequence on the
//! calling thread, with no job queue or callback indirection. Status is
//! dumped and cleared after each stage.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::job::{AssignParams, ExportParams, ImportParams, VoxeliseJobParams};
use crate::session::Session;
use crate::status::{ProgressReporter, Status, StatusHandler};

/// Debug flags for headless runs.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DebugOptions {
    #[serde(default)]
    pub show_logs: bool,
    #[serde(default)]
    pub show_warnings: bool,
}

/// Parameters for all four stages of a headless run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeadlessConfig {
    pub import: ImportParams,
    #[serde(default)]
    pub voxelise: VoxeliseJobParams,
    pub assign: AssignParams,
    pub export: ExportParams,
    #[serde(default)]
    pub debug: DebugOptions,
}

impl HeadlessConfig {
    /// Load a config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Run the four pipeline stages strictly in sequence.
pub fn run_headless(config: &HeadlessConfig) -> Result<()> {
    let mut session = Session::new();
    let mut status = StatusHandler::new();
    let progress = ProgressReporter::noop();
    let debug = config.debug;

    stage_banner(debug, "Importing...");
    session.import(&config.import, &mut status, &progress)?;
    dump_status(&mut status, debug);

    stage_banner(debug, "Voxelising...");
    session.voxelise(&config.voxelise, &mut status, &progress)?;
    dump_status(&mut status, debug);

    stage_banner(debug, "Assigning...");
    session.assign(&config.assign, &mut status, &progress)?;
    dump_status(&mut status, debug);

    stage_banner(debug, "Exporting...");
    session.export(&config.export, &mut status, &progress)?;
    dump_status(&mut status, debug);

    Ok(())
}

fn stage_banner(debug: DebugOptions, message: &str) {
    if debug.show_logs {
        info!("{message}");
    }
}

/// Log accumulated status messages and clear them before the next stage.
fn dump_status(status: &mut StatusHandler, debug: DebugOptions) {
    for message in status.drain() {
        match message.status {
            Status::Info => {
                if debug.show_logs {
                    info!("{}", message.message);
                }
            }
            Status::Warning => {
                if debug.show_warnings {
                    warn!("{}", message.message);
                }
            }
        }
    }
}
