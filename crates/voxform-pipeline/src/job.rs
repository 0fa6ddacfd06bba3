//! Job model: actions, request payloads, and response envelopes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use voxform_block::FallableBehaviour;
use voxform_core::{Aabb, ColourSpace, VoxelPos};
use voxform_voxel::VoxeliseParams;

use crate::render::{BlockRenderBuffer, MeshRenderBuffer, VoxelRenderBuffer};
use crate::status::StatusMessage;

/// Identifier correlating a response with its submitted job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

/// Top-level pipeline actions. At most one job per action may be in
/// flight at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Import,
    RenderMesh,
    Voxelise,
    RenderVoxelMesh,
    Assign,
    RenderBlockMesh,
    Export,
}

impl Action {
    /// Stable name of the action
    pub const fn name(self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::RenderMesh => "RenderMesh",
            Self::Voxelise => "Voxelise",
            Self::RenderVoxelMesh => "RenderVoxelMesh",
            Self::Assign => "Assign",
            Self::RenderBlockMesh => "RenderBlockMesh",
            Self::Export => "Export",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for the import stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportParams {
    pub filepath: PathBuf,
}

/// Parameters for the voxelise stage: strategy id plus voxeliser
/// settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoxeliseJobParams {
    #[serde(default = "default_voxeliser")]
    pub voxeliser: String,
    #[serde(flatten)]
    pub params: VoxeliseParams,
}

fn default_voxeliser() -> String {
    "raster".to_string()
}

impl Default for VoxeliseJobParams {
    fn default() -> Self {
        Self {
            voxeliser: default_voxeliser(),
            params: VoxeliseParams::default(),
        }
    }
}

/// Parameters for the assign stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignParams {
    /// Path to the texture atlas JSON (all known blocks)
    pub atlas: PathBuf,
    /// Path to the block palette JSON (enabled block names)
    pub palette: PathBuf,
    #[serde(default = "default_assigner")]
    pub assigner: String,
    #[serde(default)]
    pub colour_space: ColourSpace,
    #[serde(default)]
    pub fallable: FallableBehaviour,
}

fn default_assigner() -> String {
    "nearest".to_string()
}

/// Parameters for the export stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportParams {
    pub exporter: String,
    pub filepath: PathBuf,
}

/// Job request payload, one case per action.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum JobPayload {
    Import(ImportParams),
    RenderMesh,
    Voxelise(VoxeliseJobParams),
    RenderVoxelMesh,
    Assign(AssignParams),
    RenderBlockMesh,
    Export(ExportParams),
}

impl JobPayload {
    /// The action slot this payload occupies
    pub const fn action(&self) -> Action {
        match self {
            Self::Import(_) => Action::Import,
            Self::RenderMesh => Action::RenderMesh,
            Self::Voxelise(_) => Action::Voxelise,
            Self::RenderVoxelMesh => Action::RenderVoxelMesh,
            Self::Assign(_) => Action::Assign,
            Self::RenderBlockMesh => Action::RenderBlockMesh,
            Self::Export(_) => Action::Export,
        }
    }
}

/// Result of a successful import.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportSummary {
    pub triangle_count: usize,
    pub material_count: usize,
    pub bounds: Option<Aabb>,
}

/// Result of a successful voxelisation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoxeliseSummary {
    pub voxel_count: usize,
    pub voxel_size: f32,
    pub bounds: Option<(VoxelPos, VoxelPos)>,
}

/// Result of a successful assignment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignSummary {
    pub block_count: usize,
    pub distinct_blocks: usize,
}

/// Result of a successful export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportSummary {
    pub filepath: PathBuf,
}

/// Tagged success results, one case per action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobResult {
    Import(ImportSummary),
    RenderMesh(MeshRenderBuffer),
    Voxelise(VoxeliseSummary),
    RenderVoxelMesh(VoxelRenderBuffer),
    Assign(AssignSummary),
    RenderBlockMesh(BlockRenderBuffer),
    Export(ExportSummary),
}

/// Terminal outcome of a job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The stage completed
    Success(JobResult),
    /// Expected domain failure; the message is surfaced verbatim
    KnownError { message: String },
    /// Unanticipated failure; details are only in the logs
    UnknownError,
}

/// Response envelope delivered to the job's callback, exactly once.
#[derive(Debug)]
pub struct JobResponse {
    pub id: JobId,
    pub action: Action,
    pub outcome: JobOutcome,
    /// Advisory messages accumulated during this stage's execution
    pub status_messages: Vec<StatusMessage>,
}
