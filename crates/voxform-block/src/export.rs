//! Block mesh export boundary.
//!
//! Real game formats are external collaborators; the built-in exporters
//! write a self-describing structure document as JSON or bincode.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::block_mesh::BlockMesh;
use crate::error::Result;
use crate::palette::BlockInfo;

/// Boundary trait for block mesh exporters.
pub trait Exporter {
    /// Exporter identifier used by [`exporter_for`]
    fn id(&self) -> &'static str;

    /// File extension written by this exporter
    fn file_extension(&self) -> &'static str;

    /// Write the block mesh to the given file
    fn export(&self, block_mesh: &BlockMesh, path: &Path) -> Result<()>;
}

/// Look up an exporter by identifier.
pub fn exporter_for(id: &str) -> Option<Box<dyn Exporter>> {
    match id {
        "json" => Some(Box::new(JsonExporter)),
        "bin" => Some(Box::new(BinExporter)),
        _ => None,
    }
}

/// One placed block in the structure document.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockPlacement {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub palette_index: u16,
}

/// The serialized structure shared by the built-in exporters.
#[derive(Debug, Serialize, Deserialize)]
pub struct StructureDocument {
    pub palette: Vec<BlockInfo>,
    pub blocks: Vec<BlockPlacement>,
}

impl StructureDocument {
    /// Build the document with placements in a stable coordinate order.
    pub fn from_block_mesh(block_mesh: &BlockMesh) -> Self {
        let mut blocks: Vec<BlockPlacement> = block_mesh
            .iter_indices()
            .map(|(pos, palette_index)| BlockPlacement {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                palette_index,
            })
            .collect();
        blocks.sort_unstable_by_key(|b| (b.y, b.z, b.x));

        Self {
            palette: block_mesh.palette().to_vec(),
            blocks,
        }
    }
}

/// Writes the structure document as pretty-printed JSON.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn id(&self) -> &'static str {
        "json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, block_mesh: &BlockMesh, path: &Path) -> Result<()> {
        let document = StructureDocument::from_block_mesh(block_mesh);
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        info!(path = %path.display(), blocks = document.blocks.len(), "exported JSON structure");
        Ok(())
    }
}

/// Writes the structure document as bincode.
pub struct BinExporter;

impl Exporter for BinExporter {
    fn id(&self) -> &'static str {
        "bin"
    }

    fn file_extension(&self) -> &'static str {
        "bin"
    }

    fn export(&self, block_mesh: &BlockMesh, path: &Path) -> Result<()> {
        let document = StructureDocument::from_block_mesh(block_mesh);
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &document)?;
        writer.flush()?;
        info!(path = %path.display(), blocks = document.blocks.len(), "exported binary structure");
        Ok(())
    }
}
