//! Triangle mesh representation and colour sampling for voxform.
//!
//! A [`Mesh`] is an immutable triangle soup with UV coordinates and a
//! material table. It is produced by a [`MeshImporter`] and consumed
//! read-only by the voxelisation stage, which samples surface colour
//! through [`Mesh::sample_material`].

pub mod error;
pub mod import;
pub mod material;
pub mod mesh;
pub mod triangle;

pub use error::{MeshError, Result};
pub use import::{importer_for, ImportReport, MeshImporter, ObjImporter};
pub use material::{Material, Texture, TextureFiltering};
pub use mesh::Mesh;
pub use triangle::UvTriangle;
