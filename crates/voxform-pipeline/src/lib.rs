//! Pipeline execution for voxform.
//!
//! Each top-level action (Import, Voxelise, Assign, Export, plus the
//! render-preparation actions) is modelled as a [`job::JobPayload`]
//! executed by a single background worker. The foreground side submits
//! jobs through a [`JobController`] and receives exactly one terminal
//! callback per job; [`run_headless`] runs the same stages strictly in
//! sequence for scripted use.

pub mod controller;
pub mod error;
pub mod headless;
pub mod job;
pub mod render;
pub mod session;
pub mod status;
mod worker;

pub use controller::{JobCallback, JobController};
pub use error::{PipelineError, Result};
pub use headless::{run_headless, DebugOptions, HeadlessConfig};
pub use job::{
    Action, AssignParams, AssignSummary, ExportParams, ExportSummary, ImportParams,
    ImportSummary, JobId, JobOutcome, JobPayload, JobResponse, JobResult, VoxeliseJobParams,
    VoxeliseSummary,
};
pub use render::{
    BlockInstance, BlockRenderBuffer, MeshRenderBuffer, MeshVertex, VoxelInstance,
    VoxelRenderBuffer,
};
pub use session::Session;
pub use status::{ProgressReporter, Status, StatusHandler, StatusMessage};
