//! Colour-to-block assignment strategies.

use rand::seq::SliceRandom;
use voxform_core::{ColourSpace, Rgba, VoxelPos};

use crate::error::Result;
use crate::palette::{AtlasPalette, BlockInfo};

/// Side length of the dither tile.
const DITHER_SIZE: i32 = 4;

/// Dither magnitude on the 0-255 colour scale (colour depth / 8).
const DITHER_THRESHOLD: f32 = 256.0 / 8.0;

/// 4x4x4 dither permutation of [0, 64), flattened at `x + 4y + 16z` so
/// that adjacent positions receive maximally separated levels.
const DITHER_MATRIX: [u8; 64] = [
    0, 16, 2, 18, 48, 32, 50, 34, //
    6, 22, 4, 20, 54, 38, 52, 36, //
    24, 40, 26, 42, 8, 56, 10, 58, //
    30, 46, 28, 44, 14, 62, 12, 60, //
    3, 19, 5, 21, 51, 35, 53, 37, //
    1, 17, 7, 23, 49, 33, 55, 39, //
    27, 43, 29, 45, 11, 59, 13, 61, //
    25, 41, 31, 47, 9, 57, 15, 63, //
];

/// The dither permutation and its position-indexed lookup.
#[derive(Clone, Debug)]
struct DitherKernel {
    matrix: [u8; 64],
}

impl DitherKernel {
    const fn new() -> Self {
        Self {
            matrix: DITHER_MATRIX,
        }
    }

    /// Replace the permutation with a uniformly random one.
    fn reshuffle(&mut self) {
        self.matrix.shuffle(&mut rand::thread_rng());
    }

    /// Signed dither fraction in [-0.5, 0.5) for the position's tile
    /// cell.
    fn offset_at(&self, pos: VoxelPos) -> f32 {
        let x = (pos.x % DITHER_SIZE).abs();
        let y = (pos.y % DITHER_SIZE).abs();
        let z = (pos.z % DITHER_SIZE).abs();
        let index = (x + DITHER_SIZE * y + DITHER_SIZE * DITHER_SIZE * z) as usize;
        f32::from(self.matrix[index]) / 64.0 - 0.5
    }

    /// Perturb every channel (alpha included) by the position's dither
    /// offset on the 0-255 scale, renormalized and clamped to [0, 1].
    fn perturb(&self, colour: Rgba, pos: VoxelPos) -> Rgba {
        let map = self.offset_at(pos) * DITHER_THRESHOLD;
        Rgba::new(
            (255.0 * colour.r + map) / 255.0,
            (255.0 * colour.g + map) / 255.0,
            (255.0 * colour.b + map) / 255.0,
            (255.0 * colour.a + map) / 255.0,
        )
        .clamped()
    }
}

/// Strategy for mapping a voxel's colour to a palette block.
pub trait BlockAssigner {
    /// Strategy identifier used by [`assigner_for`]
    fn id(&self) -> &'static str;

    /// Choose a block for the voxel at `pos` with the given colour.
    ///
    /// Fails only when every palette entry is excluded.
    fn assign_block<'p>(
        &mut self,
        palette: &'p AtlasPalette,
        colour: Rgba,
        pos: VoxelPos,
        colour_space: ColourSpace,
        exclude: &[String],
    ) -> Result<&'p BlockInfo>;
}

/// Look up an assigner strategy by identifier.
pub fn assigner_for(id: &str) -> Option<Box<dyn BlockAssigner>> {
    match id {
        "nearest" => Some(Box::new(NearestMatchAssigner)),
        "ordered-dithering" => Some(Box::<OrderedDitheringAssigner>::default()),
        "random-dithering" => Some(Box::<RandomDitheringAssigner>::default()),
        _ => None,
    }
}

/// Direct nearest-colour lookup; a pure function of its inputs.
pub struct NearestMatchAssigner;

impl BlockAssigner for NearestMatchAssigner {
    fn id(&self) -> &'static str {
        "nearest"
    }

    fn assign_block<'p>(
        &mut self,
        palette: &'p AtlasPalette,
        colour: Rgba,
        _pos: VoxelPos,
        colour_space: ColourSpace,
        exclude: &[String],
    ) -> Result<&'p BlockInfo> {
        palette.get_block(colour, colour_space, exclude)
    }
}

/// Ordered dithering with a fixed 4x4x4 tile pattern.
#[derive(Debug)]
pub struct OrderedDitheringAssigner {
    kernel: DitherKernel,
}

impl Default for OrderedDitheringAssigner {
    fn default() -> Self {
        Self {
            kernel: DitherKernel::new(),
        }
    }
}

impl BlockAssigner for OrderedDitheringAssigner {
    fn id(&self) -> &'static str {
        "ordered-dithering"
    }

    fn assign_block<'p>(
        &mut self,
        palette: &'p AtlasPalette,
        colour: Rgba,
        pos: VoxelPos,
        colour_space: ColourSpace,
        exclude: &[String],
    ) -> Result<&'p BlockInfo> {
        let perturbed = self.kernel.perturb(colour, pos);
        palette.get_block(perturbed, colour_space, exclude)
    }
}

/// Dithering with a permutation reshuffled before every assignment.
///
/// Because the permutation is re-randomized per call, the positional
/// lookup no longer forms a stable spatial pattern; the effect is a
/// uniform random perturbation of each voxel's colour. Output is
/// intentionally not deterministic across calls.
#[derive(Debug)]
pub struct RandomDitheringAssigner {
    kernel: DitherKernel,
}

impl Default for RandomDitheringAssigner {
    fn default() -> Self {
        Self {
            kernel: DitherKernel::new(),
        }
    }
}

impl BlockAssigner for RandomDitheringAssigner {
    fn id(&self) -> &'static str {
        "random-dithering"
    }

    fn assign_block<'p>(
        &mut self,
        palette: &'p AtlasPalette,
        colour: Rgba,
        pos: VoxelPos,
        colour_space: ColourSpace,
        exclude: &[String],
    ) -> Result<&'p BlockInfo> {
        self.kernel.reshuffle();
        let perturbed = self.kernel.perturb(colour, pos);
        palette.get_block(perturbed, colour_space, exclude)
    }
}
