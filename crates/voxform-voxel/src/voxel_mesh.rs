//! Sparse voxel mesh container.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use voxform_core::{Rgba, VoxelPos};

/// Policy for resolving two triangles claiming the same voxel.
///
/// Both rules are deterministic: `First` keeps the colour of the first
/// committing triangle in the mesh's declared triangle order, `Average`
/// accumulates a running mean over every commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoxelOverlapRule {
    /// First write wins.
    First,
    /// Average every colour written to the voxel.
    #[default]
    Average,
}

/// A single voxel. Occupancy is implied by presence in the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voxel {
    /// Sampled surface colour
    pub colour: Rgba,
}

/// Sparse set of occupied voxels produced by voxelisation.
///
/// Keys are grid coordinates; the grid cell size in mesh units is
/// [`VoxelMesh::voxel_size`]. Created once by a voxeliser and handed off
/// read-only to block assignment.
#[derive(Debug)]
pub struct VoxelMesh {
    voxels: HashMap<VoxelPos, Voxel>,
    /// Commits per voxel, for the `Average` overlap rule.
    sample_counts: HashMap<VoxelPos, u32>,
    /// Per-voxel 26-neighbour occupancy bitmasks, when precomputed.
    neighbours: HashMap<VoxelPos, u32>,
    bounds: Option<(VoxelPos, VoxelPos)>,
    voxel_size: f32,
}

impl VoxelMesh {
    /// Create an empty voxel mesh with the given cell size
    pub fn new(voxel_size: f32) -> Self {
        Self {
            voxels: HashMap::new(),
            sample_counts: HashMap::new(),
            neighbours: HashMap::new(),
            bounds: None,
            voxel_size,
        }
    }

    /// Grid cell size in mesh units
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Number of occupied voxels
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether no voxels are occupied
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Whether the given position is occupied
    pub fn is_occupied(&self, pos: VoxelPos) -> bool {
        self.voxels.contains_key(&pos)
    }

    /// Get the voxel at the given position
    pub fn get(&self, pos: VoxelPos) -> Option<&Voxel> {
        self.voxels.get(&pos)
    }

    /// Iterate over all occupied voxels
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, &Voxel)> {
        self.voxels.iter().map(|(pos, voxel)| (*pos, voxel))
    }

    /// Inclusive integer bounds over occupied voxels
    pub fn bounds(&self) -> Option<(VoxelPos, VoxelPos)> {
        self.bounds
    }

    /// Commit a colour to a voxel under the given overlap rule.
    pub fn add_voxel(&mut self, pos: VoxelPos, colour: Rgba, rule: VoxelOverlapRule) {
        match rule {
            VoxelOverlapRule::First => {
                self.voxels.entry(pos).or_insert(Voxel { colour });
            }
            VoxelOverlapRule::Average => {
                let count = self.sample_counts.entry(pos).or_insert(0);
                *count += 1;
                let n = *count as f32;
                self.voxels
                    .entry(pos)
                    .and_modify(|v| v.colour = v.colour.lerp(colour, 1.0 / n))
                    .or_insert(Voxel { colour });
            }
        }
        self.expand_bounds(pos);
    }

    fn expand_bounds(&mut self, pos: VoxelPos) {
        self.bounds = Some(match self.bounds {
            None => (pos, pos),
            Some((min, max)) => (
                VoxelPos::new(min.x.min(pos.x), min.y.min(pos.y), min.z.min(pos.z)),
                VoxelPos::new(max.x.max(pos.x), max.y.max(pos.y), max.z.max(pos.z)),
            ),
        });
    }

    /// Precompute each voxel's 26-neighbour occupancy bitmask.
    ///
    /// Bit `i` corresponds to the `i`-th entry of
    /// [`VoxelPos::neighbours_26`], giving downstream shading a stable
    /// layout.
    pub fn calculate_neighbours(&mut self) {
        let mut neighbours = HashMap::with_capacity(self.voxels.len());
        for pos in self.voxels.keys() {
            let mut mask = 0u32;
            for (i, n) in pos.neighbours_26().enumerate() {
                if self.voxels.contains_key(&n) {
                    mask |= 1 << i;
                }
            }
            neighbours.insert(*pos, mask);
        }
        self.neighbours = neighbours;
    }

    /// Neighbour occupancy bitmask for the given voxel.
    ///
    /// Zero until [`calculate_neighbours`](Self::calculate_neighbours)
    /// has run.
    pub fn neighbour_mask(&self, pos: VoxelPos) -> u32 {
        self.neighbours.get(&pos).copied().unwrap_or(0)
    }

    /// Whether neighbour masks have been precomputed
    pub fn has_neighbour_masks(&self) -> bool {
        !self.neighbours.is_empty()
    }
}
