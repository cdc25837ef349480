use crate::object_pool::key_none_value;
use crate::octree::{
    path::PathCode,
    types::{NodeChildren, NodeChildrenArray, NodeColor, OwnerIndex, SourceId, VoxelNode},
    UNKNOWN_SOURCE_ID,
};
use crate::spatial::{
    math::{octant_bitmask, vector::V3c},
    AABox,
};
use std::{
    ops::{Index, IndexMut},
    time::Instant,
};

///####################################################################################
/// NodeColor
///####################################################################################
impl NodeColor {
    /// No color: the node is empty
    pub const NONE: NodeColor = NodeColor {
        r: 0,
        g: 0,
        b: 0,
        presence: 0,
    };

    /// A present color with the given components
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            presence: 1,
        }
    }

    pub fn with_red(mut self, r: u8) -> Self {
        self.r = r;
        self
    }

    pub fn with_green(mut self, g: u8) -> Self {
        self.g = g;
        self
    }

    pub fn with_blue(mut self, b: u8) -> Self {
        self.b = b;
        self
    }

    pub fn with_presence(mut self, presence: bool) -> Self {
        self.presence = presence as u8;
        self
    }

    pub fn is_colored(&self) -> bool {
        0 != self.presence
    }

    /// True if the RGB components match, regardless of presence
    pub fn same_rgb(&self, other: &NodeColor) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Parses colors in the form of 0xRRGGBBPP, where PP is the presence flag
impl From<u32> for NodeColor {
    fn from(value: u32) -> Self {
        let [r, g, b, presence] = value.to_be_bytes();
        NodeColor {
            r,
            g,
            b,
            presence: (0 != presence) as u8,
        }
    }
}

impl From<NodeColor> for u32 {
    fn from(color: NodeColor) -> Self {
        u32::from_be_bytes([color.r, color.g, color.b, color.presence])
    }
}

///####################################################################################
/// NodeChildren
///####################################################################################
impl<T> NodeChildren<T>
where
    T: Default + Copy + Eq,
{
    /// Creates a new default element, with the given empty_marker
    pub(crate) fn new(empty_marker: T) -> Self {
        Self {
            empty_marker,
            content: NodeChildrenArray::default(),
        }
    }

    /// Returns with true if empty
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self.content, NodeChildrenArray::NoChildren)
    }

    /// Provides a slice for iteration, if there are children to iterate on
    pub(crate) fn iter(&self) -> Option<std::slice::Iter<'_, T>> {
        match &self.content {
            NodeChildrenArray::Children(c) => Some(c.iter()),
            NodeChildrenArray::NoChildren => None,
        }
    }

    /// Erases content, if any
    pub(crate) fn clear(&mut self, child_index: usize) {
        debug_assert!(child_index < 8);
        if let NodeChildrenArray::Children(c) = &mut self.content {
            c[child_index] = self.empty_marker;
            if c.iter().all(|e| *e == self.empty_marker) {
                self.content = NodeChildrenArray::NoChildren;
            }
        }
    }
}

impl Default for NodeChildren<u32> {
    fn default() -> Self {
        Self::new(key_none_value())
    }
}

impl<T> Index<u32> for NodeChildren<T>
where
    T: Default + Copy,
{
    type Output = T;
    fn index(&self, index: u32) -> &T {
        match &self.content {
            NodeChildrenArray::Children(c) => &c[index as usize],
            NodeChildrenArray::NoChildren => &self.empty_marker,
        }
    }
}

impl<T> IndexMut<u32> for NodeChildren<T>
where
    T: Default + Copy,
{
    fn index_mut(&mut self, index: u32) -> &mut T {
        if let NodeChildrenArray::NoChildren = &mut self.content {
            self.content = NodeChildrenArray::Children([self.empty_marker; 8]);
        }
        match &mut self.content {
            NodeChildrenArray::Children(c) => &mut c[index as usize],
            NodeChildrenArray::NoChildren => unreachable!(),
        }
    }
}

///####################################################################################
/// VoxelNode
///####################################################################################
impl Default for VoxelNode {
    fn default() -> Self {
        Self::new(PathCode::root())
    }
}

impl VoxelNode {
    /// Creates a leaf node, taking ownership of the given path code
    pub fn new(path_code: PathCode) -> Self {
        let bounds = AABox::new(path_code.first_vertex(), path_code.scale());
        Self {
            path_code,
            child_count: 0,
            true_color: NodeColor::NONE,
            current_color: NodeColor::NONE,
            override_active: false,
            density: 0.,
            bounds,
            dirty: true,
            last_changed: Instant::now(),
            should_render: false,
            owner_index: OwnerIndex::NONE,
            source_id: UNKNOWN_SOURCE_ID,
        }
    }

    pub fn path_code(&self) -> &PathCode {
        &self.path_code
    }

    /// Depth of the node inside the tree, the root being at level 0
    pub fn level(&self) -> usize {
        self.path_code.level()
    }

    pub fn child_count(&self) -> u8 {
        self.child_count
    }

    pub fn is_leaf(&self) -> bool {
        0 == self.child_count
    }

    /// The color reported to consumers: the override color if active, otherwise the true color
    pub fn color(&self) -> NodeColor {
        self.current_color
    }

    pub fn true_color(&self) -> NodeColor {
        self.true_color
    }

    pub fn is_colored(&self) -> bool {
        self.true_color.is_colored()
    }

    pub fn is_override_active(&self) -> bool {
        self.override_active
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Bounds of the node inside the unit cube
    pub fn bounds(&self) -> &AABox {
        &self.bounds
    }

    pub fn corner(&self) -> V3c<f32> {
        self.bounds.corner
    }

    pub fn scale(&self) -> f32 {
        self.bounds.scale
    }

    /// Radius of the sphere enclosing the node
    pub fn enclosing_radius(&self) -> f32 {
        self.bounds.scale * 3_f32.sqrt() / 2.
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_changed(&self) -> Instant {
        self.last_changed
    }

    pub fn should_render(&self) -> bool {
        self.should_render
    }

    pub fn owner_index(&self) -> OwnerIndex {
        self.owner_index
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Updates the true color, and the displayed color if no override is active.
    /// Returns true if anything changed
    pub(crate) fn set_color(&mut self, color: NodeColor) -> bool {
        if self.true_color == color {
            return false;
        }
        self.true_color = color;
        if !self.override_active {
            self.current_color = color;
        }
        // If color set, assume leaf, re-averaging will update density if needed
        self.density = 1.;
        self.dirty = true;
        true
    }

    pub(crate) fn set_override_color(&mut self, r: u8, g: u8, b: u8) -> bool {
        let color = NodeColor::rgb(r, g, b);
        if self.override_active && self.current_color == color {
            return false;
        }
        self.override_active = true;
        self.current_color = color;
        self.dirty = true;
        true
    }

    pub(crate) fn set_override_active(&mut self, active: bool) -> bool {
        if self.override_active == active {
            return false;
        }
        if !active {
            self.current_color = self.true_color;
        }
        self.override_active = active;
        self.density = 1.;
        self.dirty = true;
        true
    }

    pub(crate) fn set_density(&mut self, density: f32) -> bool {
        let density = density.clamp(0., 1.);
        if self.density == density {
            return false;
        }
        self.density = density;
        self.dirty = true;
        true
    }

    pub(crate) fn set_should_render(&mut self, should_render: bool) -> bool {
        if self.should_render == should_render {
            return false;
        }
        self.should_render = should_render;
        self.dirty = true;
        true
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn set_source_id(&mut self, source_id: SourceId) {
        self.source_id = source_id;
    }
}

/// Bitmask of the occupied child slots
pub(crate) fn occupancy_bitmask(children: &NodeChildren<u32>) -> u8 {
    children
        .iter()
        .map(|keys| {
            keys.enumerate()
                .filter(|(_, key)| **key != key_none_value())
                .fold(0, |mask, (octant, _)| mask | octant_bitmask(octant as u8))
        })
        .unwrap_or(0)
}
