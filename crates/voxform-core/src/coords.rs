//! Voxel grid coordinates.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Position of a voxel in grid coordinates.
///
/// Equality and hashing are purely structural, so the type can key sparse
/// spatial maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    /// Create a new voxel position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Voxel containing the given grid-space point
    #[inline]
    pub fn from_grid_point(p: Vec3) -> Self {
        Self::new(
            p.x.floor() as i32,
            p.y.floor() as i32,
            p.z.floor() as i32,
        )
    }

    /// Offset this position by the given deltas
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Centre of this voxel in grid space
    #[inline]
    pub fn centre(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// The 26 positions surrounding this one.
    ///
    /// Ordering is fixed (z-major, then y, then x, centre skipped) so that
    /// neighbour occupancy bitmasks are stable across runs.
    pub fn neighbours_26(self) -> impl Iterator<Item = Self> {
        (0..27).filter(|&i| i != 13).map(move |i| {
            let dx = (i % 3) - 1;
            let dy = ((i / 3) % 3) - 1;
            let dz = (i / 9) - 1;
            self.offset(dx, dy, dz)
        })
    }
}

impl From<IVec3> for VoxelPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
