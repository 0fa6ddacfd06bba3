//! Render-buffer preparation for the display collaborator.
//!
//! The pipeline does not render; these builders flatten each structure
//! into `Pod` vertex/instance arrays a renderer can upload directly.
//! Instances are sorted by coordinate so buffers are deterministic.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use voxform_block::BlockMesh;
use voxform_mesh::Mesh;
use voxform_voxel::VoxelMesh;

/// Flat triangle vertex for mesh preview.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle-soup vertex buffer for mesh preview.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshRenderBuffer {
    pub vertices: Vec<MeshVertex>,
}

/// One voxel instance for voxel mesh preview.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct VoxelInstance {
    pub position: [i32; 3],
    pub colour: [f32; 4],
    /// 26-neighbour occupancy bitmask for ambient-occlusion shading
    pub neighbour_mask: u32,
}

/// Instance buffer for voxel mesh preview.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoxelRenderBuffer {
    pub voxel_size: f32,
    pub instances: Vec<VoxelInstance>,
}

/// One block instance for block mesh preview.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct BlockInstance {
    pub position: [i32; 3],
    pub palette_index: u32,
}

/// Instance buffer plus palette colour table for block mesh preview.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BlockRenderBuffer {
    pub palette_colours: Vec<[f32; 4]>,
    pub instances: Vec<BlockInstance>,
}

/// Flatten a mesh into a triangle-soup vertex buffer.
///
/// Degenerate triangles have no normal and are dropped.
pub fn build_mesh_buffer(mesh: &Mesh) -> MeshRenderBuffer {
    let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
    for triangle in mesh.triangles() {
        let Some(normal) = triangle.normal() else {
            continue;
        };
        let normal = normal.to_array();
        for (v, uv) in [
            (triangle.v0, triangle.uv0),
            (triangle.v1, triangle.uv1),
            (triangle.v2, triangle.uv2),
        ] {
            vertices.push(MeshVertex {
                position: v.to_array(),
                normal,
                uv: uv.to_array(),
            });
        }
    }
    MeshRenderBuffer { vertices }
}

/// Flatten a voxel mesh into a sorted instance buffer.
pub fn build_voxel_buffer(voxel_mesh: &VoxelMesh) -> VoxelRenderBuffer {
    let mut instances: Vec<VoxelInstance> = voxel_mesh
        .iter()
        .map(|(pos, voxel)| VoxelInstance {
            position: [pos.x, pos.y, pos.z],
            colour: [
                voxel.colour.r,
                voxel.colour.g,
                voxel.colour.b,
                voxel.colour.a,
            ],
            neighbour_mask: voxel_mesh.neighbour_mask(pos),
        })
        .collect();
    instances.sort_unstable_by_key(|i| (i.position[1], i.position[2], i.position[0]));

    VoxelRenderBuffer {
        voxel_size: voxel_mesh.voxel_size(),
        instances,
    }
}

/// Flatten a block mesh into a sorted instance buffer with its palette's
/// colour table.
pub fn build_block_buffer(block_mesh: &BlockMesh) -> BlockRenderBuffer {
    let palette_colours = block_mesh
        .palette()
        .iter()
        .map(|b| [b.colour.r, b.colour.g, b.colour.b, b.colour.a])
        .collect();

    let mut instances: Vec<BlockInstance> = block_mesh
        .iter_indices()
        .map(|(pos, index)| BlockInstance {
            position: [pos.x, pos.y, pos.z],
            palette_index: u32::from(index),
        })
        .collect();
    instances.sort_unstable_by_key(|i| (i.position[1], i.position[2], i.position[0]));

    BlockRenderBuffer {
        palette_colours,
        instances,
    }
}
