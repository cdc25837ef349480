use crate::spatial::math::vector::V3c;

/// Offset of each octant inside its parent, in units of the child size.
/// Bit 2 of the octant selects +x, bit 1 selects +y, bit 0 selects +z
pub(crate) const OCTANT_OFFSET_REGION_LUT: [V3c<f32>; 8] = [
    V3c { x: 0., y: 0., z: 0. },
    V3c { x: 0., y: 0., z: 1. },
    V3c { x: 0., y: 1., z: 0. },
    V3c { x: 0., y: 1., z: 1. },
    V3c { x: 1., y: 0., z: 0. },
    V3c { x: 1., y: 0., z: 1. },
    V3c { x: 1., y: 1., z: 0. },
    V3c { x: 1., y: 1., z: 1. },
];

