use crate::octree::types::OctreeError;
use crate::spatial::{
    math::{hash_region, offset_region, vector::V3c},
    AABox,
};
use std::fmt::{Debug, Display, Formatter};

/// Encoded path codes up to this many bytes are stored inside the node,
/// longer ones keep their own heap allocation
pub const PATH_CODE_INLINE_CAPACITY: usize = 8;

/// The level is stored in the first byte of the code
pub const MAX_PATH_CODE_LEVEL: usize = u8::MAX as usize;

/// Number of bytes needed to store a path code of the given level:
/// one byte for the level itself, and 3 bits for each octant selector
pub fn bytes_required_for_level(level: usize) -> usize {
    1 + (3 * level).div_ceil(8)
}

/// Position and depth of a node inside the tree.
/// Stored as a byte sequence: the first byte is the level, followed by
/// the 3 bit octant selectors of each level packed most significant bit first.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PathCode {
    Inline([u8; PATH_CODE_INLINE_CAPACITY]),
    Heap(Box<[u8]>),
}

impl Default for PathCode {
    fn default() -> Self {
        Self::root()
    }
}

impl PathCode {
    /// The path code of the root node: zero octant selectors
    pub fn root() -> Self {
        PathCode::Inline([0; PATH_CODE_INLINE_CAPACITY])
    }

    /// Takes ownership of the given encoded buffer.
    /// Short codes are copied inline and the buffer is dropped, long codes keep the buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, OctreeError> {
        let Some(level) = bytes.first() else {
            return Err(OctreeError::EmptyPathCode);
        };
        let expected = bytes_required_for_level(*level as usize);
        if expected != bytes.len() {
            return Err(OctreeError::InvalidPathCode {
                expected,
                got: bytes.len(),
            });
        }
        Ok(Self::from_encoded(bytes))
    }

    /// Encodes the given sequence of octant selectors, the first one being the child of the root
    pub fn from_octants(octants: &[u8]) -> Result<Self, OctreeError> {
        if octants.len() > MAX_PATH_CODE_LEVEL {
            return Err(OctreeError::PathCodeTooDeep(octants.len()));
        }
        if let Some(invalid) = octants.iter().find(|octant| **octant >= 8) {
            return Err(OctreeError::InvalidOctant(*invalid));
        }
        let mut bytes = vec![0; bytes_required_for_level(octants.len())];
        bytes[0] = octants.len() as u8;
        for (depth, octant) in octants.iter().enumerate() {
            write_section(&mut bytes, depth, *octant);
        }
        Ok(Self::from_encoded(bytes))
    }

    /// The code of the node at the given level whose cube contains the given point of the unit cube.
    /// Points on an inner boundary belong to the upper octant
    pub fn containing_point(point: &V3c<f32>, level: usize) -> Result<Self, OctreeError> {
        if level > MAX_PATH_CODE_LEVEL {
            return Err(OctreeError::PathCodeTooDeep(level));
        }
        if !AABox::unit().contains_point(point) {
            return Err(OctreeError::InvalidPosition {
                x: point.x,
                y: point.y,
                z: point.z,
            });
        }
        let mut octants = Vec::with_capacity(level);
        let mut corner = V3c::unit(0.);
        let mut size = 1.;
        for _ in 0..level {
            let octant = hash_region(&(*point - corner), size);
            size /= 2.;
            corner += offset_region(octant) * size;
            octants.push(octant);
        }
        Self::from_octants(&octants)
    }

    fn from_encoded(mut bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes_required_for_level(bytes[0] as usize), bytes.len());
        // padding bits after the last section are kept zero, so equal paths compare equal
        let used_bits = 3 * bytes[0] as usize % 8;
        if 0 != used_bits {
            let last = bytes.len() - 1;
            bytes[last] &= 0xFF << (8 - used_bits);
        }
        if bytes.len() > PATH_CODE_INLINE_CAPACITY {
            PathCode::Heap(bytes.into_boxed_slice())
        } else {
            let mut buffer = [0; PATH_CODE_INLINE_CAPACITY];
            buffer[..bytes.len()].copy_from_slice(&bytes);
            PathCode::Inline(buffer)
        }
    }

    /// The encoded representation of the code
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PathCode::Inline(buffer) => &buffer[..bytes_required_for_level(buffer[0] as usize)],
            PathCode::Heap(bytes) => bytes,
        }
    }

    /// Number of octant selectors in the code, which is the depth of the node inside the tree
    pub fn level(&self) -> usize {
        self.as_bytes()[0] as usize
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, PathCode::Inline(_))
    }

    /// Number of bytes stored outside of the node for this code
    pub fn heap_usage(&self) -> usize {
        match self {
            PathCode::Inline(_) => 0,
            PathCode::Heap(bytes) => bytes.len(),
        }
    }

    /// The octant selector at the given depth, depth 0 being the child of the root
    pub fn octant_at(&self, depth: usize) -> u8 {
        debug_assert!(depth < self.level());
        read_section(self.as_bytes(), depth)
    }

    /// Decodes the sequence of octant selectors
    pub fn octants(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.level()).map(move |depth| self.octant_at(depth))
    }

    /// Creates the code one level deeper, selecting the given octant
    pub fn child(&self, octant: u8) -> PathCode {
        assert!(octant < 8, "Invalid octant: {octant}");
        let level = self.level();
        assert!(level < MAX_PATH_CODE_LEVEL, "Path code can not be deeper");
        let mut bytes = vec![0; bytes_required_for_level(level + 1)];
        let current = self.as_bytes();
        bytes[..current.len()].copy_from_slice(current);
        bytes[0] = (level + 1) as u8;
        write_section(&mut bytes, level, octant);
        Self::from_encoded(bytes)
    }

    /// The code one level higher, if there is any
    pub fn parent(&self) -> Option<PathCode> {
        let level = self.level();
        if 0 == level {
            return None;
        }
        let mut bytes = self.as_bytes()[..bytes_required_for_level(level - 1)].to_vec();
        bytes[0] = (level - 1) as u8;
        Some(Self::from_encoded(bytes))
    }

    /// True if this code is a strict prefix of the other
    pub fn is_ancestor_of(&self, other: &PathCode) -> bool {
        self.level() < other.level()
            && (0..self.level()).all(|depth| self.octant_at(depth) == other.octant_at(depth))
    }

    /// The corner of the represented cube inside the unit cube, closest to the origin
    pub fn first_vertex(&self) -> V3c<f32> {
        let mut vertex = V3c::unit(0.);
        let mut size = 1.;
        for octant in self.octants() {
            size /= 2.;
            vertex += offset_region(octant) * size;
        }
        vertex
    }

    /// Edge length of the represented cube inside the unit cube
    pub fn scale(&self) -> f32 {
        1. / (2_f32).powi(self.level() as i32)
    }
}

/// Reads the 3 bit value at the given depth; a section might be split between two bytes
fn read_section(bytes: &[u8], depth: usize) -> u8 {
    let bit_position = 3 * depth;
    let byte_index = 1 + bit_position / 8;
    let bit_offset = bit_position % 8;
    let window = ((bytes[byte_index] as u16) << 8)
        | bytes.get(byte_index + 1).copied().unwrap_or(0) as u16;
    ((window >> (13 - bit_offset)) & 0x07) as u8
}

fn write_section(bytes: &mut [u8], depth: usize, octant: u8) {
    debug_assert!(octant < 8);
    let bit_position = 3 * depth;
    let byte_index = 1 + bit_position / 8;
    let bit_offset = bit_position % 8;
    let shift = 13 - bit_offset;
    let mut window = ((bytes[byte_index] as u16) << 8)
        | bytes.get(byte_index + 1).copied().unwrap_or(0) as u16;
    window = (window & !(0x07 << shift)) | ((octant as u16) << shift);
    bytes[byte_index] = (window >> 8) as u8;
    if byte_index + 1 < bytes.len() {
        bytes[byte_index + 1] = (window & 0xFF) as u8;
    } else {
        debug_assert_eq!(0, window & 0xFF, "Section overflows the path code buffer");
    }
}

impl Display for PathCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.level())?;
        for octant in self.octants() {
            write!(f, "{octant}")?;
        }
        Ok(())
    }
}

impl Debug for PathCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathCode::Inline(_) => write!(f, "PathCode::Inline({self})"),
            PathCode::Heap(_) => write!(f, "PathCode::Heap({self})"),
        }
    }
}
