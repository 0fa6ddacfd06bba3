//! Conservative triangle rasterization voxeliser.

use glam::Vec3;
use tracing::debug;
use voxform_core::{Rgba, VoxelPos};
use voxform_mesh::Mesh;

use crate::voxel_mesh::VoxelMesh;
use crate::voxeliser::{to_grid, voxel_size_for, ColourSampler, VoxeliseParams, VoxeliseReport, Voxeliser};

/// Half the diagonal of a unit voxel; samples farther from the triangle
/// plane than this cannot belong to the voxel.
const PLANE_DISTANCE_LIMIT: f32 = 0.866_025_4;

/// Tolerance for the sub-area containment test.
const CONTAINMENT_EPSILON: f32 = 1e-4;

/// Single centre sample.
const CENTRE_SAMPLE: [Vec3; 1] = [Vec3::ZERO];

/// Fixed 2x2x2 sub-sample offsets at ±¼ voxel used by multisample
/// colouring.
const SUB_SAMPLES: [Vec3; 8] = [
    Vec3::new(-0.25, -0.25, -0.25),
    Vec3::new(0.25, -0.25, -0.25),
    Vec3::new(-0.25, 0.25, -0.25),
    Vec3::new(0.25, 0.25, -0.25),
    Vec3::new(-0.25, -0.25, 0.25),
    Vec3::new(0.25, -0.25, 0.25),
    Vec3::new(-0.25, 0.25, 0.25),
    Vec3::new(0.25, 0.25, 0.25),
];

/// Rasterizes each triangle's conservative voxel footprint, testing
/// point-in-triangle containment of projected samples and interpolating
/// UV by sub-area barycentric weights.
pub struct RasterVoxeliser;

impl Voxeliser for RasterVoxeliser {
    fn id(&self) -> &'static str {
        "raster"
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

        let samples: &[Vec3] = if params.multisample_colouring {
            &SUB_SAMPLES
        } else {
            &CENTRE_SAMPLE
        };

        for triangle in mesh.triangles() {
            if triangle.is_degenerate() {
                continue;
            }
            let tri = to_grid(triangle, inv_voxel_size);
            let aabb = tri.aabb();
            let min = VoxelPos::from_grid_point(aabb.min);
            let max = VoxelPos::from_grid_point(aabb.max);

            for z in min.z..=max.z {
                for y in min.y..=max.y {
                    for x in min.x..=max.x {
                        let pos = VoxelPos::new(x, y, z);
                        let centre = pos.centre();

                        let mut hits = 0u32;
                        let mut sum = [0.0f32; 4];
                        for offset in samples {
                            let Some((projected, dist)) =
                                tri.project_onto_plane(centre + *offset)
                            else {
                                continue;
                            };
                            if dist.abs() > PLANE_DISTANCE_LIMIT {
                                continue;
                            }
                            if !tri.contains_coplanar(projected, CONTAINMENT_EPSILON) {
                                continue;
                            }
                            let colour = sampler.sample(&tri, projected);
                            sum[0] += colour.r;
                            sum[1] += colour.g;
                            sum[2] += colour.b;
                            sum[3] += colour.a;
                            hits += 1;
                        }

                        if hits > 0 {
                            let n = hits as f32;
                            let colour = Rgba::new(sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n);
                            voxel_mesh.add_voxel(pos, colour, params.voxel_overlap_rule);
                        }
                    }
                }
            }
        }

        if params.enable_ambient_occlusion || params.calculate_neighbours {
            voxel_mesh.calculate_neighbours();
        }

        debug!(voxels = voxel_mesh.len(), voxel_size, "rasterized mesh");
        VoxeliseReport {
            voxel_mesh,
            warnings: sampler.into_warnings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;
    use voxform_mesh::{Material, UvTriangle};

    fn red_triangle_mesh() -> Mesh {
        let tri = UvTriangle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Some(0),
        );
        Mesh::new(
            vec![tri],
            vec![(
                "red".to_string(),
                Material::Solid(Rgba::new(1.0, 0.0, 0.0, 1.0)),
            )],
        )
    }

    #[test]
    fn empty_mesh_yields_empty_voxel_mesh() {
        let report = RasterVoxeliser.voxelise(&Mesh::default(), &VoxeliseParams::default());
        assert!(report.voxel_mesh.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn red_triangle_fills_red_voxels() {
        let params = VoxeliseParams {
            desired_height: 4,
            multisample_colouring: false,
            ..VoxeliseParams::default()
        };
        let report = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params);

        assert!(!report.voxel_mesh.is_empty());
        assert!(report.warnings.is_empty());
        assert_relative_eq!(report.voxel_mesh.voxel_size(), 0.25);
        for (_, voxel) in report.voxel_mesh.iter() {
            assert_relative_eq!(voxel.colour.r, 1.0, epsilon = 1e-5);
            assert_relative_eq!(voxel.colour.g, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn multisampling_also_covers_the_triangle() {
        let params = VoxeliseParams {
            desired_height: 4,
            multisample_colouring: true,
            ..VoxeliseParams::default()
        };
        let report = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params);
        assert!(!report.voxel_mesh.is_empty());
        for (_, voxel) in report.voxel_mesh.iter() {
            assert_relative_eq!(voxel.colour.r, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let tri = UvTriangle::new(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(2.0, 0.0, 0.0),
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::ZERO,
            None,
        );
        let mesh = Mesh::new(vec![tri], Vec::new());
        let report = RasterVoxeliser.voxelise(&mesh, &VoxeliseParams::default());
        assert!(report.voxel_mesh.is_empty());
    }

    #[test]
    fn missing_material_warns_and_uses_fallback() {
        let tri = UvTriangle::new(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec2::ZERO,
            Vec2::X,
            Vec2::Y,
            None,
        );
        let mesh = Mesh::new(vec![tri], Vec::new());
        let params = VoxeliseParams {
            desired_height: 2,
            multisample_colouring: false,
            ..VoxeliseParams::default()
        };
        let report = RasterVoxeliser.voxelise(&mesh, &params);

        assert!(!report.voxel_mesh.is_empty());
        assert_eq!(report.warnings.len(), 1);
        for (_, voxel) in report.voxel_mesh.iter() {
            assert_eq!(voxel.colour, Rgba::FALLBACK);
        }
    }

    #[test]
    fn voxelisation_is_deterministic() {
        let params = VoxeliseParams {
            desired_height: 8,
            ..VoxeliseParams::default()
        };
        let a = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params);
        let b = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params);

        assert_eq!(a.voxel_mesh.len(), b.voxel_mesh.len());
        for (pos, voxel) in a.voxel_mesh.iter() {
            assert_eq!(b.voxel_mesh.get(pos), Some(voxel));
        }
    }

    #[test]
    fn neighbour_masks_precomputed_when_enabled() {
        let params = VoxeliseParams {
            desired_height: 8,
            enable_ambient_occlusion: true,
            calculate_neighbours: true,
            ..VoxeliseParams::default()
        };
        let report = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params);
        assert!(report.voxel_mesh.has_neighbour_masks());

        let params_off = VoxeliseParams {
            desired_height: 8,
            enable_ambient_occlusion: false,
            calculate_neighbours: false,
            ..VoxeliseParams::default()
        };
        let report_off = RasterVoxeliser.voxelise(&red_triangle_mesh(), &params_off);
        assert!(!report_off.voxel_mesh.has_neighbour_masks());
    }
}
