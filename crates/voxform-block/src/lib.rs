//! Block palette quantization for voxform.
//!
//! An [`AtlasPalette`] is the ordered set of blocks available to the
//! assignment stage; a [`BlockAssigner`] strategy maps each voxel's
//! colour onto one of them, optionally dithering to spread quantization
//! error; the result is a [`BlockMesh`] ready for an [`Exporter`].

pub mod assigner;
pub mod block_mesh;
pub mod error;
pub mod export;
pub mod palette;

pub use assigner::{
    assigner_for, BlockAssigner, NearestMatchAssigner, OrderedDitheringAssigner,
    RandomDitheringAssigner,
};
pub use block_mesh::{BlockMesh, BlockMeshReport, FallableBehaviour, FALLABLE_BLOCKS};
pub use error::{BlockError, Result};
pub use export::{exporter_for, Exporter};
pub use palette::{Atlas, AtlasPalette, BlockInfo, BlockPalette};
