//! Stage functions and the state they hand between each other.

use tracing::info;
use voxform_block::{
    assigner_for, exporter_for, Atlas, AtlasPalette, BlockMesh, BlockPalette,
};
use voxform_mesh::importer_for;
use voxform_voxel::voxeliser_for;

use crate::error::{PipelineError, Result};
use crate::job::{
    AssignParams, AssignSummary, ExportParams, ExportSummary, ImportParams, ImportSummary,
    JobPayload, JobResult, VoxeliseJobParams, VoxeliseSummary,
};
use crate::render::{
    build_block_buffer, build_mesh_buffer, build_voxel_buffer, BlockRenderBuffer,
    MeshRenderBuffer, VoxelRenderBuffer,
};
use crate::status::{ProgressReporter, StatusHandler};

/// Owns the structures passed between pipeline stages.
///
/// Each stage stores its output here by ownership transfer; later stages
/// read it immutably. Re-running a stage invalidates everything
/// downstream of it.
#[derive(Debug, Default)]
pub struct Session {
    mesh: Option<voxform_mesh::Mesh>,
    voxel_mesh: Option<voxform_voxel::VoxelMesh>,
    block_mesh: Option<BlockMesh>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a payload to its stage function.
    pub fn execute(
        &mut self,
        payload: &JobPayload,
        status: &mut StatusHandler,
        progress: &ProgressReporter,
    ) -> Result<JobResult> {
        match payload {
            JobPayload::Import(params) => self
                .import(params, status, progress)
                .map(JobResult::Import),
            JobPayload::RenderMesh => self.render_mesh().map(JobResult::RenderMesh),
            JobPayload::Voxelise(params) => self
                .voxelise(params, status, progress)
                .map(JobResult::Voxelise),
            JobPayload::RenderVoxelMesh => {
                self.render_voxel_mesh().map(JobResult::RenderVoxelMesh)
            }
            JobPayload::Assign(params) => self
                .assign(params, status, progress)
                .map(JobResult::Assign),
            JobPayload::RenderBlockMesh => {
                self.render_block_mesh().map(JobResult::RenderBlockMesh)
            }
            JobPayload::Export(params) => self
                .export(params, status, progress)
                .map(JobResult::Export),
        }
    }

    /// Import a mesh file. Invalidates voxel and block meshes.
    pub fn import(
        &mut self,
        params: &ImportParams,
        status: &mut StatusHandler,
        progress: &ProgressReporter,
    ) -> Result<ImportSummary> {
        let importer = importer_for(&params.filepath)?;
        progress.report(0.1);

        let report = importer.import(&params.filepath)?;
        for warning in report.warnings {
            status.warning(warning);
        }

        let summary = ImportSummary {
            triangle_count: report.mesh.triangle_count(),
            material_count: report.mesh.material_count(),
            bounds: report.mesh.bounds(),
        };
        status.info(format!(
            "Imported {} triangles across {} materials",
            summary.triangle_count, summary.material_count
        ));

        self.voxel_mesh = None;
        self.block_mesh = None;
        self.mesh = Some(report.mesh);
        progress.report(1.0);

        info!(triangles = summary.triangle_count, "import stage complete");
        Ok(summary)
    }

    /// Voxelise the imported mesh. Invalidates the block mesh.
    pub fn voxelise(
        &mut self,
        params: &VoxeliseJobParams,
        status: &mut StatusHandler,
        progress: &ProgressReporter,
    ) -> Result<VoxeliseSummary> {
        let mesh = self.mesh.as_ref().ok_or(PipelineError::MissingMesh)?;
        let voxeliser = voxeliser_for(&params.voxeliser)
            .ok_or_else(|| PipelineError::UnknownVoxeliser(params.voxeliser.clone()))?;
        progress.report(0.1);

        let report = voxeliser.voxelise(mesh, &params.params);
        for warning in report.warnings {
            status.warning(warning);
        }

        let summary = VoxeliseSummary {
            voxel_count: report.voxel_mesh.len(),
            voxel_size: report.voxel_mesh.voxel_size(),
            bounds: report.voxel_mesh.bounds(),
        };
        status.info(format!("Voxelised into {} voxels", summary.voxel_count));

        self.block_mesh = None;
        self.voxel_mesh = Some(report.voxel_mesh);
        progress.report(1.0);

        info!(voxels = summary.voxel_count, "voxelise stage complete");
        Ok(summary)
    }

    /// Assign a palette block to every voxel.
    ///
    /// The atlas and palette are loaded fresh for each invocation and
    /// stay immutable during assignment.
    pub fn assign(
        &mut self,
        params: &AssignParams,
        status: &mut StatusHandler,
        progress: &ProgressReporter,
    ) -> Result<AssignSummary> {
        let voxel_mesh = self
            .voxel_mesh
            .as_ref()
            .ok_or(PipelineError::MissingVoxelMesh)?;

        let atlas = Atlas::load(&params.atlas)?;
        let palette_names = BlockPalette::load(&params.palette)?;
        let palette = AtlasPalette::from_atlas(&atlas, &palette_names)?;
        let mut assigner = assigner_for(&params.assigner)
            .ok_or_else(|| PipelineError::UnknownAssigner(params.assigner.clone()))?;
        progress.report(0.1);

        let report = BlockMesh::from_voxel_mesh(
            voxel_mesh,
            &palette,
            assigner.as_mut(),
            params.colour_space,
            params.fallable,
        )?;
        for warning in report.warnings {
            status.warning(warning);
        }

        let summary = AssignSummary {
            block_count: report.block_mesh.len(),
            distinct_blocks: report.block_mesh.distinct_blocks(),
        };
        status.info(format!(
            "Assigned {} blocks ({} distinct)",
            summary.block_count, summary.distinct_blocks
        ));

        self.block_mesh = Some(report.block_mesh);
        progress.report(1.0);

        info!(blocks = summary.block_count, "assign stage complete");
        Ok(summary)
    }

    /// Export the block mesh through the selected exporter.
    pub fn export(
        &mut self,
        params: &ExportParams,
        status: &mut StatusHandler,
        progress: &ProgressReporter,
    ) -> Result<ExportSummary> {
        let block_mesh = self
            .block_mesh
            .as_ref()
            .ok_or(PipelineError::MissingBlockMesh)?;
        let exporter = exporter_for(&params.exporter)
            .ok_or_else(|| PipelineError::UnknownExporter(params.exporter.clone()))?;
        progress.report(0.1);

        // Append the exporter's extension when the caller left it off
        let mut filepath = params.filepath.clone();
        if filepath
            .extension()
            .and_then(|e| e.to_str())
            .map_or(true, |e| e != exporter.file_extension())
        {
            let mut name = filepath.file_name().unwrap_or_default().to_os_string();
            name.push(".");
            name.push(exporter.file_extension());
            filepath.set_file_name(name);
        }

        exporter.export(block_mesh, &filepath)?;
        status.info(format!("Exported to {}", filepath.display()));
        progress.report(1.0);

        info!(path = %filepath.display(), "export stage complete");
        Ok(ExportSummary { filepath })
    }

    /// Build the mesh preview buffer for the render collaborator.
    pub fn render_mesh(&self) -> Result<MeshRenderBuffer> {
        let mesh = self.mesh.as_ref().ok_or(PipelineError::MissingMesh)?;
        Ok(build_mesh_buffer(mesh))
    }

    /// Build the voxel preview buffer for the render collaborator.
    pub fn render_voxel_mesh(&self) -> Result<VoxelRenderBuffer> {
        let voxel_mesh = self
            .voxel_mesh
            .as_ref()
            .ok_or(PipelineError::MissingVoxelMesh)?;
        Ok(build_voxel_buffer(voxel_mesh))
    }

    /// Build the block preview buffer for the render collaborator.
    pub fn render_block_mesh(&self) -> Result<BlockRenderBuffer> {
        let block_mesh = self
            .block_mesh
            .as_ref()
            .ok_or(PipelineError::MissingBlockMesh)?;
        Ok(build_block_buffer(block_mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_red_triangle_obj(dir: &std::path::Path) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("red.mtl"), "newmtl red\nKd 1.0 0.0 0.0\n").unwrap();
        let obj = "\
mtllib red.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl red
f 1/1 2/2 3/3
";
        let path = dir.join("red.obj");
        fs::write(&path, obj).unwrap();
        path
    }

    #[test]
    fn stages_require_their_inputs() {
        let mut session = Session::new();
        let mut status = StatusHandler::new();
        let progress = ProgressReporter::noop();

        let result = session.voxelise(&VoxeliseJobParams::default(), &mut status, &progress);
        assert!(matches!(result, Err(PipelineError::MissingMesh)));

        assert!(matches!(
            session.render_voxel_mesh(),
            Err(PipelineError::MissingVoxelMesh)
        ));
        assert!(matches!(
            session.render_block_mesh(),
            Err(PipelineError::MissingBlockMesh)
        ));
    }

    #[test]
    fn import_then_voxelise_produces_voxels() {
        let dir = std::env::temp_dir().join("voxform-session-test");
        let obj_path = write_red_triangle_obj(&dir);

        let mut session = Session::new();
        let mut status = StatusHandler::new();
        let progress = ProgressReporter::noop();

        let import = session
            .import(
                &ImportParams {
                    filepath: obj_path,
                },
                &mut status,
                &progress,
            )
            .unwrap();
        assert_eq!(import.triangle_count, 1);
        status.clear();

        let voxelise = session
            .voxelise(
                &VoxeliseJobParams {
                    voxeliser: "raster".to_string(),
                    params: voxform_voxel::VoxeliseParams {
                        desired_height: 4,
                        ..Default::default()
                    },
                },
                &mut status,
                &progress,
            )
            .unwrap();
        assert!(voxelise.voxel_count > 0);

        let buffer = session.render_voxel_mesh().unwrap();
        assert_eq!(buffer.instances.len(), voxelise.voxel_count);
    }

    #[test]
    fn unknown_voxeliser_is_a_known_error() {
        let dir = std::env::temp_dir().join("voxform-session-unknown-test");
        let obj_path = write_red_triangle_obj(&dir);

        let mut session = Session::new();
        let mut status = StatusHandler::new();
        let progress = ProgressReporter::noop();
        session
            .import(
                &ImportParams {
                    filepath: obj_path,
                },
                &mut status,
                &progress,
            )
            .unwrap();

        let result = session.voxelise(
            &VoxeliseJobParams {
                voxeliser: "gpu".to_string(),
                params: Default::default(),
            },
            &mut status,
            &progress,
        );
        assert!(matches!(result, Err(PipelineError::UnknownVoxeliser(_))));
    }
}
