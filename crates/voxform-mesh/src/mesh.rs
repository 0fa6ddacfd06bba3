//! Immutable triangle soup with a material table.

use glam::Vec2;
use voxform_core::{Aabb, Rgba};

use crate::material::{Material, TextureFiltering};
use crate::triangle::UvTriangle;

/// An immutable triangle mesh with per-material textures.
///
/// Constructed once by an importer and read-only thereafter; the
/// voxelisation stage samples surface colour through
/// [`Mesh::sample_material`].
#[derive(Debug, Default)]
pub struct Mesh {
    triangles: Vec<UvTriangle>,
    materials: Vec<(String, Material)>,
}

impl Mesh {
    /// Create a mesh from triangles and a material table.
    ///
    /// Triangle material indices refer to positions in `materials`.
    pub fn new(triangles: Vec<UvTriangle>, materials: Vec<(String, Material)>) -> Self {
        Self {
            triangles,
            materials,
        }
    }

    /// All triangles, in declaration order
    pub fn triangles(&self) -> &[UvTriangle] {
        &self.triangles
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Name of the material at the given index
    pub fn material_name(&self, index: usize) -> Option<&str> {
        self.materials.get(index).map(|(name, _)| name.as_str())
    }

    /// Bounding box over all triangle vertices.
    ///
    /// Returns `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.triangles
                .iter()
                .flat_map(|t| [t.v0, t.v1, t.v2]),
        )
    }

    /// Sample the colour of a material at a UV coordinate.
    ///
    /// Returns `None` when the material index does not resolve; the caller
    /// decides how to surface that (the voxelisers warn once and fall back
    /// to [`Rgba::FALLBACK`]).
    pub fn sample_material(
        &self,
        index: Option<usize>,
        uv: Vec2,
        filtering: TextureFiltering,
    ) -> Option<Rgba> {
        let (_, material) = self.materials.get(index?)?;
        Some(material.sample(uv, filtering))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn solid_mesh() -> Mesh {
        let tri = UvTriangle::new(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec2::ZERO,
            Vec2::X,
            Vec2::Y,
            Some(0),
        );
        Mesh::new(
            vec![tri],
            vec![("red".to_string(), Material::Solid(Rgba::new(1.0, 0.0, 0.0, 1.0)))],
        )
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = solid_mesh();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let mesh = Mesh::default();
        assert!(mesh.bounds().is_none());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn sample_resolves_material() {
        let mesh = solid_mesh();
        let c = mesh
            .sample_material(Some(0), Vec2::new(0.5, 0.5), TextureFiltering::Nearest)
            .unwrap();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn sample_unresolvable_material_is_none() {
        let mesh = solid_mesh();
        assert!(mesh
            .sample_material(Some(7), Vec2::ZERO, TextureFiltering::Nearest)
            .is_none());
        assert!(mesh
            .sample_material(None, Vec2::ZERO, TextureFiltering::Nearest)
            .is_none());
    }
}
