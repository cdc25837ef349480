pub mod vector;

use crate::spatial::{lut::OCTANT_OFFSET_REGION_LUT, math::vector::V3c};

///####################################################################################
/// Octant
///####################################################################################
pub(crate) fn offset_region(octant: u8) -> V3c<f32> {
    debug_assert!(octant < 8, "Invalid octant provided for spatial reference!");
    OCTANT_OFFSET_REGION_LUT[octant as usize]
}

/// Each Node is separated to 8 Octants based on their relative position inside the Nodes occupying space.
/// The hash function assigns an index for each octant, so every child Node can be indexed in a well defined manner
/// * `offset` - From range 0..size in each dimensions
/// * `size` - Size of the region to check for child octants
pub fn hash_region(offset: &V3c<f32>, size: f32) -> u8 {
    let half_size = size / 2.0;
    (offset.x >= half_size) as u8 * 4
        + (offset.y >= half_size) as u8 * 2
        + (offset.z >= half_size) as u8
}

/// Creates a bitmask for a single octant position in an 8bit bitmask
pub(crate) fn octant_bitmask(octant: u8) -> u8 {
    0x01 << octant
}
