//! Mesh import boundary.
//!
//! File-format parsing sits behind [`MeshImporter`] so the pipeline only
//! ever sees a [`Mesh`]. The built-in [`ObjImporter`] covers Wavefront
//! OBJ/MTL via `tobj`; other formats plug in through the same trait.

use std::path::Path;

use glam::{Vec2, Vec3};
use tracing::debug;
use voxform_core::Rgba;

use crate::error::{MeshError, Result};
use crate::material::{Material, Texture};
use crate::mesh::Mesh;
use crate::triangle::UvTriangle;

/// Result of a mesh import: the mesh plus any non-fatal warnings
/// (missing textures, unloadable material libraries).
#[derive(Debug)]
pub struct ImportReport {
    pub mesh: Mesh,
    pub warnings: Vec<String>,
}

/// Boundary trait for mesh file importers.
pub trait MeshImporter {
    /// Import a mesh from the given file
    fn import(&self, path: &Path) -> Result<ImportReport>;
}

/// Select an importer for the given file by extension.
pub fn importer_for(path: &Path) -> Result<Box<dyn MeshImporter>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("obj") => Ok(Box::new(ObjImporter)),
        other => Err(MeshError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

/// Wavefront OBJ/MTL importer backed by `tobj`.
///
/// Geometry is triangulated on load. Texture references are resolved
/// relative to the OBJ's directory; a texture that fails to decode
/// degrades to the material's diffuse colour with a warning.
pub struct ObjImporter;

impl MeshImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<ImportReport> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options)?;

        let mut warnings = Vec::new();
        let obj_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let raw_materials = match materials {
            Ok(materials) => materials,
            Err(e) => {
                warnings.push(format!("Could not load material library: {e}"));
                Vec::new()
            }
        };

        let mut material_table = Vec::with_capacity(raw_materials.len());
        for raw in &raw_materials {
            let material = match &raw.diffuse_texture {
                Some(texture_path) => match Texture::load(&obj_dir.join(texture_path)) {
                    Ok(texture) => Material::Textured(texture),
                    Err(e) => {
                        warnings.push(format!(
                            "Could not load texture '{}' for material '{}': {e}",
                            texture_path, raw.name
                        ));
                        Material::Solid(diffuse_colour(raw))
                    }
                },
                None => Material::Solid(diffuse_colour(raw)),
            };
            material_table.push((raw.name.clone(), material));
        }

        let mut triangles = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let has_uvs = !mesh.texcoords.is_empty();

            let position = |i: u32| {
                let i = i as usize;
                Vec3::new(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                )
            };
            let uv = |i: u32| {
                if has_uvs {
                    let i = i as usize;
                    Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                } else {
                    Vec2::ZERO
                }
            };

            for face in mesh.indices.chunks_exact(3) {
                triangles.push(UvTriangle::new(
                    position(face[0]),
                    position(face[1]),
                    position(face[2]),
                    uv(face[0]),
                    uv(face[1]),
                    uv(face[2]),
                    mesh.material_id,
                ));
            }
        }

        debug!(
            triangles = triangles.len(),
            materials = material_table.len(),
            "imported OBJ"
        );

        Ok(ImportReport {
            mesh: Mesh::new(triangles, material_table),
            warnings,
        })
    }
}

fn diffuse_colour(material: &tobj::Material) -> Rgba {
    material
        .diffuse
        .map_or(Rgba::FALLBACK, |[r, g, b]| Rgba::new(r, g, b, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            importer_for(Path::new("model.fbx")),
            Err(MeshError::UnsupportedFormat(_))
        ));
        assert!(importer_for(Path::new("model.obj")).is_ok());
    }

    #[test]
    fn import_simple_obj() {
        let dir = std::env::temp_dir().join("voxform-obj-import-test");
        fs::create_dir_all(&dir).unwrap();

        let mtl = "newmtl red\nKd 1.0 0.0 0.0\n";
        fs::write(dir.join("tri.mtl"), mtl).unwrap();

        let obj = "\
mtllib tri.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl red
f 1/1 2/2 3/3
";
        let obj_path = dir.join("tri.obj");
        fs::write(&obj_path, obj).unwrap();

        let report = ObjImporter.import(&obj_path).unwrap();
        assert_eq!(report.mesh.triangle_count(), 1);
        assert_eq!(report.mesh.material_count(), 1);
        assert_eq!(report.mesh.material_name(0), Some("red"));
        assert!(report.warnings.is_empty());

        let tri = &report.mesh.triangles()[0];
        assert_eq!(tri.material, Some(0));
        assert_eq!(tri.v1, Vec3::X);
    }

    #[test]
    fn missing_texture_degrades_with_warning() {
        let dir = std::env::temp_dir().join("voxform-obj-missing-tex-test");
        fs::create_dir_all(&dir).unwrap();

        let mtl = "newmtl skin\nKd 0.5 0.5 0.5\nmap_Kd does_not_exist.png\n";
        fs::write(dir.join("tex.mtl"), mtl).unwrap();

        let obj = "\
mtllib tex.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
usemtl skin
f 1 2 3
";
        let obj_path = dir.join("tex.obj");
        fs::write(&obj_path, obj).unwrap();

        let report = ObjImporter.import(&obj_path).unwrap();
        assert_eq!(report.mesh.triangle_count(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("does_not_exist.png"));
    }
}
