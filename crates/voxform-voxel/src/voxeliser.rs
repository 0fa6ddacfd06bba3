//! Voxeliser strategy interface and factory.

use glam::Vec3;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use voxform_core::Rgba;
use voxform_mesh::{Mesh, TextureFiltering, UvTriangle};

use crate::raster::RasterVoxeliser;
use crate::ray::RayVoxeliser;
use crate::voxel_mesh::{VoxelMesh, VoxelOverlapRule};

/// Parameters controlling voxelisation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxeliseParams {
    /// Desired grid height: voxels along the mesh's largest axis.
    pub desired_height: u32,
    /// Average colour over eight fixed sub-samples per voxel instead of a
    /// single centre sample.
    pub multisample_colouring: bool,
    /// Texture filtering used when sampling surface colour.
    pub texture_filtering: TextureFiltering,
    /// Precompute neighbour occupancy for ambient-occlusion shading.
    pub enable_ambient_occlusion: bool,
    /// Policy when two triangles claim the same voxel.
    pub voxel_overlap_rule: VoxelOverlapRule,
    /// Record per-voxel 26-neighbour occupancy bitmasks.
    pub calculate_neighbours: bool,
}

impl Default for VoxeliseParams {
    fn default() -> Self {
        Self {
            desired_height: 80,
            multisample_colouring: true,
            texture_filtering: TextureFiltering::Bilinear,
            enable_ambient_occlusion: true,
            voxel_overlap_rule: VoxelOverlapRule::Average,
            calculate_neighbours: true,
        }
    }
}

/// Result of voxelisation: the voxel mesh plus any non-fatal warnings
/// (unresolvable materials).
#[derive(Debug)]
pub struct VoxeliseReport {
    pub voxel_mesh: VoxelMesh,
    pub warnings: Vec<String>,
}

/// A mesh-to-voxel conversion strategy.
pub trait Voxeliser {
    /// Strategy identifier used by [`voxeliser_for`]
    fn id(&self) -> &'static str;

    /// Rasterize the mesh into a sparse voxel grid
    fn voxelise(&self, mesh: &Mesh, params: &VoxeliseParams) -> VoxeliseReport;
}

/// Look up a voxeliser strategy by identifier.
pub fn voxeliser_for(id: &str) -> Option<Box<dyn Voxeliser>> {
    match id {
        "raster" => Some(Box::new(RasterVoxeliser)),
        "ray" => Some(Box::new(RayVoxeliser)),
        _ => None,
    }
}

/// Grid cell size for the mesh at the desired height.
///
/// Returns `None` when the mesh is empty or has no spatial extent.
pub(crate) fn voxel_size_for(mesh: &Mesh, desired_height: u32) -> Option<f32> {
    let bounds = mesh.bounds()?;
    let size = bounds.largest_dimension() / desired_height.max(1) as f32;
    size.is_normal().then_some(size)
}

/// Scale a triangle's positions into grid space. UVs and material are
/// unchanged; barycentric weights are invariant under the uniform scale.
pub(crate) fn to_grid(triangle: &UvTriangle, inv_voxel_size: f32) -> UvTriangle {
    UvTriangle::new(
        triangle.v0 * inv_voxel_size,
        triangle.v1 * inv_voxel_size,
        triangle.v2 * inv_voxel_size,
        triangle.uv0,
        triangle.uv1,
        triangle.uv2,
        triangle.material,
    )
}

/// Samples surface colour at triangle locations, warning once per
/// unresolvable material and falling back to [`Rgba::FALLBACK`].
pub(crate) struct ColourSampler<'a> {
    mesh: &'a Mesh,
    filtering: TextureFiltering,
    warned: HashSet<Option<usize>>,
    warnings: Vec<String>,
}

impl<'a> ColourSampler<'a> {
    pub(crate) fn new(mesh: &'a Mesh, filtering: TextureFiltering) -> Self {
        Self {
            mesh,
            filtering,
            warned: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Sample the triangle's material at a point on its plane, using
    /// sub-area barycentric weights to interpolate UV.
    pub(crate) fn sample(&mut self, triangle: &UvTriangle, location: Vec3) -> Rgba {
        let weights = triangle
            .barycentric_weights(location)
            .unwrap_or([1.0 / 3.0; 3]);
        let uv = triangle.interpolate_uv(weights);
        match self.mesh.sample_material(triangle.material, uv, self.filtering) {
            Some(colour) => colour,
            None => {
                if self.warned.insert(triangle.material) {
                    let description = triangle
                        .material
                        .map_or_else(
                            || "triangle has no material".to_string(),
                            |index| {
                                format!(
                                    "could not resolve material '{}'",
                                    self.mesh.material_name(index).unwrap_or("<unknown>")
                                )
                            },
                        );
                    self.warnings
                        .push(format!("{description}; using fallback colour"));
                }
                Rgba::FALLBACK
            }
        }
    }

    pub(crate) fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}
