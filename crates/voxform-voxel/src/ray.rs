//! Axis-aligned ray casting voxeliser.

use glam::Vec3;
use tracing::debug;
use voxform_core::{Rgba, VoxelPos};
use voxform_mesh::Mesh;

use crate::voxel_mesh::VoxelMesh;
use crate::voxeliser::{to_grid, voxel_size_for, ColourSampler, VoxeliseParams, VoxeliseReport, Voxeliser};

const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];
/// The two axes spanning the plane perpendicular to each ray axis.
const PERPENDICULAR: [(usize, usize); 3] = [(1, 2), (0, 2), (0, 1)];

/// Ray offsets within a footprint cell: the centre, or four sub-rays
/// when multisample colouring is on.
const CENTRE_OFFSET: [(f32, f32); 1] = [(0.0, 0.0)];
const SUB_RAY_OFFSETS: [(f32, f32); 4] = [
    (-0.25, -0.25),
    (0.25, -0.25),
    (-0.25, 0.25),
    (0.25, 0.25),
];

/// Casts axis-aligned rays through the centres of each triangle's
/// projected footprint cells, committing a voxel at every intersection.
pub struct RayVoxeliser;

impl Voxeliser for RayVoxeliser {
    fn id(&self) -> &'static str {
        "ray"
    }

    fn voxelise(&self, mesh: &Mesh, params: &VoxeliseParams) -> VoxeliseReport {
        let Some(voxel_size) = voxel_size_for(mesh, params.desired_height) else {
            return VoxeliseReport {
                voxel_mesh: VoxelMesh::new(1.0),
                warnings: Vec::new(),
            };
        };

        let mut voxel_mesh = VoxelMesh::new(voxel_size);
        let mut sampler = ColourSampler::new(mesh, params.texture_filtering);
        let inv_voxel_size = 1.0 / voxel_size;

        let offsets: &[(f32, f32)] = if params.multisample_colouring {
            &SUB_RAY_OFFSETS
        } else {
            &CENTRE_OFFSET
        };

        // Hits of one cell's sub-rays, grouped by voxel before commit
        let mut cell_hits: Vec<(VoxelPos, Rgba)> = Vec::new();

        for triangle in mesh.triangles() {
            if triangle.is_degenerate() {
                continue;
            }
            let tri = to_grid(triangle, inv_voxel_size);
            let aabb = tri.aabb();
            let min = aabb.min.to_array();
            let max = aabb.max.to_array();

            for (axis, &(a1, a2)) in PERPENDICULAR.iter().enumerate() {
                let direction = AXES[axis];
                let lo1 = min[a1].floor() as i32;
                let hi1 = max[a1].floor() as i32;
                let lo2 = min[a2].floor() as i32;
                let hi2 = max[a2].floor() as i32;

                for i in lo1..=hi1 {
                    for j in lo2..=hi2 {
                        cell_hits.clear();
                        for &(du, dv) in offsets {
                            let mut origin = [0.0f32; 3];
                            origin[axis] = min[axis] - 1.0;
                            origin[a1] = i as f32 + 0.5 + du;
                            origin[a2] = j as f32 + 0.5 + dv;
                            let origin = Vec3::from_array(origin);

                            if let Some(t) = tri.intersect_ray(origin, direction) {
                                let hit = origin + direction * t;
                                let pos = VoxelPos::from_grid_point(hit);
                                cell_hits.push((pos, sampler.sample(&tri, hit)));
                            }
                        }
                        commit_cell_hits(&mut voxel_mesh, &cell_hits, params);
                    }
                }
            }
        }

        if params.enable_ambient_occlusion || params.calculate_neighbours {
            voxel_mesh.calculate_neighbours();
        }

        debug!(voxels = voxel_mesh.len(), voxel_size, "ray-voxelised mesh");
        VoxeliseReport {
            voxel_mesh,
            warnings: sampler.into_warnings(),
        }
    }
}

/// Average each voxel's sub-ray hits before committing under the overlap
/// rule.
fn commit_cell_hits(voxel_mesh: &mut VoxelMesh, hits: &[(VoxelPos, Rgba)], params: &VoxeliseParams) {
    let mut index = 0;
    while index < hits.len() {
        let (pos, _) = hits[index];
        if hits[..index].iter().any(|(p, _)| *p == pos) {
            index += 1;
            continue;
        }

        let mut sum = [0.0f32; 4];
        let mut count = 0u32;
        for (p, colour) in &hits[index..] {
            if *p == pos {
                sum[0] += colour.r;
                sum[1] += colour.g;
                sum[2] += colour.b;
                sum[3] += colour.a;
                count += 1;
            }
        }

        let n = count as f32;
        voxel_mesh.add_voxel(
            pos,
            Rgba::new(sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n),
            params.voxel_overlap_rule,
        );
        index += 1;
    }
}
