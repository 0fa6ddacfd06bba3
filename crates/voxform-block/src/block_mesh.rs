//! Block mesh construction from a voxel mesh.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use voxform_core::{ColourSpace, VoxelPos};
use voxform_voxel::VoxelMesh;

use crate::assigner::BlockAssigner;
use crate::error::{BlockError, Result};
use crate::palette::{AtlasPalette, BlockInfo};

/// Block names excluded when a no-floating-blocks policy is active.
pub const FALLABLE_BLOCKS: &[&str] = &[
    "sand",
    "red_sand",
    "gravel",
    "anvil",
    "white_concrete_powder",
    "gray_concrete_powder",
    "black_concrete_powder",
    "red_concrete_powder",
];

/// How to treat blocks that fall under gravity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallableBehaviour {
    /// Assign fallable blocks like any other.
    #[default]
    DoNothing,
    /// Exclude fallable blocks from assignment.
    ExcludeFallable,
}

impl FallableBehaviour {
    /// The exclusion list implied by this behaviour.
    fn exclusions(self) -> Vec<String> {
        match self {
            Self::DoNothing => Vec::new(),
            Self::ExcludeFallable => FALLABLE_BLOCKS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Result of block assignment: the block mesh plus any non-fatal
/// warnings (voxels skipped because every candidate was excluded).
#[derive(Debug)]
pub struct BlockMeshReport {
    pub block_mesh: BlockMesh,
    pub warnings: Vec<String>,
}

/// Sparse mapping from voxel coordinate to an assigned palette block.
///
/// Carries a snapshot of the palette it was assigned against, so export
/// and rendering need no extra context.
#[derive(Debug)]
pub struct BlockMesh {
    blocks: HashMap<VoxelPos, u16>,
    palette: Vec<BlockInfo>,
}

impl BlockMesh {
    /// Assign a block to every occupied voxel of the voxel mesh.
    ///
    /// Voxels whose candidates are all excluded are dropped with a
    /// warning; a palette with nothing assignable at all is an error.
    pub fn from_voxel_mesh(
        voxel_mesh: &VoxelMesh,
        palette: &AtlasPalette,
        assigner: &mut dyn BlockAssigner,
        colour_space: ColourSpace,
        fallable: FallableBehaviour,
    ) -> Result<BlockMeshReport> {
        let exclude = fallable.exclusions();

        // An exclusion list covering the whole palette can never assign
        // anything; fail the stage rather than warn once per voxel.
        if palette
            .entries()
            .iter()
            .all(|b| exclude.iter().any(|name| name == &b.name))
        {
            return Err(BlockError::PaletteExhausted);
        }

        let mut blocks = HashMap::with_capacity(voxel_mesh.len());
        let mut skipped = 0usize;

        for (pos, voxel) in voxel_mesh.iter() {
            match assigner.assign_block(palette, voxel.colour, pos, colour_space, &exclude) {
                Ok(block) => {
                    // index_of cannot fail for a block the palette returned
                    if let Some(index) = palette.index_of(&block.name) {
                        blocks.insert(pos, index as u16);
                    }
                }
                Err(BlockError::PaletteExhausted) => skipped += 1,
                Err(e) => return Err(e),
            }
        }

        let mut warnings = Vec::new();
        if skipped > 0 {
            warnings.push(format!(
                "{skipped} voxel(s) had no assignable block and were skipped"
            ));
        }

        debug!(
            blocks = blocks.len(),
            skipped,
            palette = palette.len(),
            "assigned block mesh"
        );

        Ok(BlockMeshReport {
            block_mesh: Self {
                blocks,
                palette: palette.entries().to_vec(),
            },
            warnings,
        })
    }

    /// Number of assigned blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks were assigned
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The palette this mesh was assigned against
    pub fn palette(&self) -> &[BlockInfo] {
        &self.palette
    }

    /// The block assigned at the given position
    pub fn get(&self, pos: VoxelPos) -> Option<&BlockInfo> {
        self.blocks
            .get(&pos)
            .map(|&index| &self.palette[index as usize])
    }

    /// Iterate over assigned positions and their palette indices
    pub fn iter_indices(&self) -> impl Iterator<Item = (VoxelPos, u16)> + '_ {
        self.blocks.iter().map(|(pos, index)| (*pos, *index))
    }

    /// Iterate over assigned positions and their blocks
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, &BlockInfo)> {
        self.blocks
            .iter()
            .map(|(pos, &index)| (*pos, &self.palette[index as usize]))
    }

    /// Number of distinct blocks actually used
    pub fn distinct_blocks(&self) -> usize {
        let mut used: Vec<u16> = self.blocks.values().copied().collect();
        used.sort_unstable();
        used.dedup();
        used.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assigner::NearestMatchAssigner;
    use voxform_core::Rgba;
    use voxform_voxel::VoxelOverlapRule;

    fn red_voxel_mesh() -> VoxelMesh {
        let mut vm = VoxelMesh::new(0.25);
        for x in 0..3 {
            vm.add_voxel(
                VoxelPos::new(x, 0, 0),
                Rgba::new(1.0, 0.0, 0.0, 1.0),
                VoxelOverlapRule::First,
            );
        }
        vm
    }

    fn white_red_palette() -> AtlasPalette {
        AtlasPalette::new(vec![
            BlockInfo::new("white", Rgba::WHITE),
            BlockInfo::new("red", Rgba::new(1.0, 0.0, 0.0, 1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn red_voxels_resolve_to_red_block() {
        let vm = red_voxel_mesh();
        let palette = white_red_palette();
        let mut assigner = NearestMatchAssigner;

        let report = BlockMesh::from_voxel_mesh(
            &vm,
            &palette,
            &mut assigner,
            ColourSpace::Rgb,
            FallableBehaviour::DoNothing,
        )
        .unwrap();

        assert_eq!(report.block_mesh.len(), 3);
        assert!(report.warnings.is_empty());
        for (_, block) in report.block_mesh.iter() {
            assert_eq!(block.name, "red");
        }
        assert_eq!(report.block_mesh.distinct_blocks(), 1);
    }

    #[test]
    fn fully_excluded_palette_is_an_error() {
        let vm = red_voxel_mesh();
        let palette = AtlasPalette::new(vec![BlockInfo::new(
            "sand",
            Rgba::new(0.9, 0.85, 0.6, 1.0),
        )])
        .unwrap();
        let mut assigner = NearestMatchAssigner;

        let result = BlockMesh::from_voxel_mesh(
            &vm,
            &palette,
            &mut assigner,
            ColourSpace::Rgb,
            FallableBehaviour::ExcludeFallable,
        );
        assert!(matches!(result, Err(BlockError::PaletteExhausted)));
    }

    #[test]
    fn fallable_blocks_are_excluded_when_requested() {
        let vm = red_voxel_mesh();
        let palette = AtlasPalette::new(vec![
            BlockInfo::new("sand", Rgba::new(1.0, 0.0, 0.0, 1.0)),
            BlockInfo::new("stone", Rgba::new(0.5, 0.5, 0.5, 1.0)),
        ])
        .unwrap();
        let mut assigner = NearestMatchAssigner;

        let report = BlockMesh::from_voxel_mesh(
            &vm,
            &palette,
            &mut assigner,
            ColourSpace::Rgb,
            FallableBehaviour::ExcludeFallable,
        )
        .unwrap();

        // Sand matches the colour better but is excluded
        for (_, block) in report.block_mesh.iter() {
            assert_eq!(block.name, "stone");
        }
    }

    #[test]
    fn empty_voxel_mesh_gives_empty_block_mesh() {
        let vm = VoxelMesh::new(1.0);
        let palette = white_red_palette();
        let mut assigner = NearestMatchAssigner;

        let report = BlockMesh::from_voxel_mesh(
            &vm,
            &palette,
            &mut assigner,
            ColourSpace::Rgb,
            FallableBehaviour::DoNothing,
        )
        .unwrap();
        assert!(report.block_mesh.is_empty());
        assert!(report.warnings.is_empty());
    }
}
