//! Error types for pipeline execution.
//!
//! Every `PipelineError` is an expected domain failure and is surfaced
//! verbatim to callers as a known error; panics during stage execution
//! are wrapped separately as unknown errors by the worker.

use thiserror::Error;

use crate::job::Action;

/// Pipeline error type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Import has not run yet
    #[error("No mesh is loaded; run the import stage first")]
    MissingMesh,

    /// Voxelise has not run yet
    #[error("No voxel mesh is available; run the voxelise stage first")]
    MissingVoxelMesh,

    /// Assign has not run yet
    #[error("No block mesh is available; run the assign stage first")]
    MissingBlockMesh,

    /// Voxeliser id not registered with the factory
    #[error("Unknown voxeliser: {0}")]
    UnknownVoxeliser(String),

    /// Assigner id not registered with the factory
    #[error("Unknown block assigner: {0}")]
    UnknownAssigner(String),

    /// Exporter id not registered with the factory
    #[error("Unknown exporter: {0}")]
    UnknownExporter(String),

    /// The action already has a job queued or running
    #[error("Action '{0}' already has a job in flight")]
    SlotBusy(Action),

    /// The background worker is no longer accepting jobs
    #[error("Pipeline worker is shut down")]
    WorkerClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Headless config parse error
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Mesh import error
    #[error(transparent)]
    Mesh(#[from] voxform_mesh::MeshError),

    /// Palette, assignment, or export error
    #[error(transparent)]
    Block(#[from] voxform_block::BlockError),
}

/// Result type alias using our PipelineError type.
pub type Result<T> = std::result::Result<T, PipelineError>;
