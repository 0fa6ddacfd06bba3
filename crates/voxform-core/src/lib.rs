//! Core types for the voxform pipeline.
//!
//! This crate provides the foundational types used throughout voxform:
//! - Colour types and colour-space distance metrics
//! - Voxel grid coordinates
//! - Math utilities (bounding boxes, triangle areas)

pub mod colour;
pub mod coords;
pub mod math;

pub use colour::{ColourSpace, Rgba};
pub use coords::VoxelPos;
pub use math::{triangle_area, Aabb};
