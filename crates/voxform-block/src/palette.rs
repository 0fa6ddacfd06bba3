//! Block atlas and palette.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;
use voxform_core::{ColourSpace, Rgba};

use crate::error::{BlockError, Result};

/// A named block and its representative colour.
///
/// Equality is by name only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockInfo {
    pub name: String,
    pub colour: Rgba,
}

impl BlockInfo {
    /// Create a new block entry
    pub fn new(name: impl Into<String>, colour: Rgba) -> Self {
        Self {
            name: name.into(),
            colour,
        }
    }
}

impl PartialEq for BlockInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for BlockInfo {}

/// The full set of known blocks and their representative colours.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Atlas {
    pub blocks: Vec<BlockInfo>,
}

impl Atlas {
    /// Create an atlas from block entries
    pub fn new(blocks: Vec<BlockInfo>) -> Self {
        Self { blocks }
    }

    /// Load an atlas from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// An ordered list of enabled block names, selecting a subset of an
/// atlas.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BlockPalette {
    pub blocks: Vec<String>,
}

impl BlockPalette {
    /// Create a palette from block names
    pub fn new(blocks: Vec<String>) -> Self {
        Self { blocks }
    }

    /// Load a palette from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// The ordered palette consulted during block assignment.
///
/// Immutable once built; declaration order is the documented tie-break
/// for equidistant colours.
#[derive(Clone, Debug)]
pub struct AtlasPalette {
    entries: Vec<BlockInfo>,
}

impl AtlasPalette {
    /// Build a palette directly from entries.
    pub fn new(entries: Vec<BlockInfo>) -> Result<Self> {
        if entries.is_empty() {
            return Err(BlockError::EmptyPalette);
        }
        Ok(Self { entries })
    }

    /// Build the palette from an atlas filtered by a block palette, in
    /// the block palette's order. Names missing from the atlas are
    /// skipped with a log warning.
    pub fn from_atlas(atlas: &Atlas, palette: &BlockPalette) -> Result<Self> {
        let mut entries = Vec::with_capacity(palette.blocks.len());
        for name in &palette.blocks {
            match atlas.blocks.iter().find(|b| &b.name == name) {
                Some(block) => entries.push(block.clone()),
                None => warn!(block = %name, "palette block not present in atlas"),
            }
        }
        Self::new(entries)
    }

    /// Palette entries in declaration order
    pub fn entries(&self) -> &[BlockInfo] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the named block
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|b| b.name == name)
    }

    /// The palette entry whose colour is closest to `colour` under the
    /// colour space's metric, ignoring entries named in `exclude`.
    ///
    /// Ties are broken by declaration order (first entry wins). Fails
    /// only when every entry is excluded.
    pub fn get_block(
        &self,
        colour: Rgba,
        colour_space: ColourSpace,
        exclude: &[String],
    ) -> Result<&BlockInfo> {
        let mut best: Option<(&BlockInfo, f32)> = None;
        for entry in &self.entries {
            if exclude.iter().any(|name| name == &entry.name) {
                continue;
            }
            let distance = colour_space.distance_sq(colour, entry.colour);
            // Strict comparison keeps the earliest declared entry on ties
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((entry, distance));
            }
        }
        best.map(|(entry, _)| entry)
            .ok_or(BlockError::PaletteExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_block_palette() -> AtlasPalette {
        AtlasPalette::new(vec![
            BlockInfo::new("white", Rgba::WHITE),
            BlockInfo::new("red", Rgba::new(1.0, 0.0, 0.0, 1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn nearest_block_wins() {
        let palette = two_block_palette();
        let almost_red = Rgba::new(0.9, 0.05, 0.05, 1.0);
        let block = palette
            .get_block(almost_red, ColourSpace::Rgb, &[])
            .unwrap();
        assert_eq!(block.name, "red");
    }

    #[test]
    fn excluded_blocks_are_never_returned() {
        let palette = two_block_palette();
        let block = palette
            .get_block(
                Rgba::new(1.0, 0.0, 0.0, 1.0),
                ColourSpace::Rgb,
                &["red".to_string()],
            )
            .unwrap();
        assert_eq!(block.name, "white");
    }

    #[test]
    fn full_exclusion_fails_deterministically() {
        let palette = two_block_palette();
        let exclude = vec!["white".to_string(), "red".to_string()];
        for _ in 0..3 {
            assert!(matches!(
                palette.get_block(Rgba::BLACK, ColourSpace::Rgb, &exclude),
                Err(BlockError::PaletteExhausted)
            ));
        }
    }

    #[test]
    fn ties_break_by_declaration_order() {
        let palette = AtlasPalette::new(vec![
            BlockInfo::new("first", Rgba::new(0.4, 0.4, 0.4, 1.0)),
            BlockInfo::new("second", Rgba::new(0.4, 0.4, 0.4, 1.0)),
        ])
        .unwrap();
        let block = palette
            .get_block(Rgba::new(0.5, 0.5, 0.5, 1.0), ColourSpace::Rgb, &[])
            .unwrap();
        assert_eq!(block.name, "first");
    }

    #[test]
    fn empty_palette_rejected_at_construction() {
        assert!(matches!(
            AtlasPalette::new(Vec::new()),
            Err(BlockError::EmptyPalette)
        ));
    }

    #[test]
    fn from_atlas_filters_and_orders() {
        let atlas = Atlas::new(vec![
            BlockInfo::new("stone", Rgba::new(0.5, 0.5, 0.5, 1.0)),
            BlockInfo::new("sand", Rgba::new(0.9, 0.85, 0.6, 1.0)),
            BlockInfo::new("grass", Rgba::new(0.3, 0.6, 0.3, 1.0)),
        ]);
        let palette = BlockPalette::new(vec![
            "grass".to_string(),
            "stone".to_string(),
            "missing".to_string(),
        ]);

        let atlas_palette = AtlasPalette::from_atlas(&atlas, &palette).unwrap();
        assert_eq!(atlas_palette.len(), 2);
        assert_eq!(atlas_palette.entries()[0].name, "grass");
        assert_eq!(atlas_palette.entries()[1].name, "stone");
    }

    #[test]
    fn block_info_equality_is_by_name() {
        let a = BlockInfo::new("stone", Rgba::WHITE);
        let b = BlockInfo::new("stone", Rgba::BLACK);
        assert_eq!(a, b);
    }
}
