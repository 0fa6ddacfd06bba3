//! Mesh voxelisation for voxform.
//!
//! [`VoxelMesh`] is the sparse voxel container produced by a
//! [`Voxeliser`]. Two strategies are provided, selected by id through
//! [`voxeliser_for`]:
//! - `"raster"` — conservative rasterization of each triangle's voxel
//!   footprint, sampling at voxel centres (or sub-samples).
//! - `"ray"` — axis-aligned ray casting through the triangle's projected
//!   footprint cells.

pub mod raster;
pub mod ray;
pub mod voxel_mesh;
pub mod voxeliser;

pub use raster::RasterVoxeliser;
pub use ray::RayVoxeliser;
pub use voxel_mesh::{Voxel, VoxelMesh, VoxelOverlapRule};
pub use voxeliser::{voxeliser_for, VoxeliseParams, VoxeliseReport, Voxeliser};
