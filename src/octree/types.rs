use crate::object_pool::ObjectPool;
use crate::octree::{observer::NodeObservers, path::PathCode, stats::NodeStats};
use crate::spatial::AABox;
use std::{collections::HashSet, error::Error, sync::Arc, time::Instant};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// error types during usage or creation of the octree
#[derive(Debug)]
pub enum OctreeError {
    InvalidOctant(u8),
    EmptyPathCode,
    InvalidPathCode { expected: usize, got: usize },
    PathCodeTooDeep(usize),
    InvalidNodeKey(u32),
    SlotOccupied { octant: u8 },
    PathMismatch,
    InvalidPosition { x: f32, y: f32, z: f32 },
    OwnerIndexExhausted,
    InvalidStructure(Box<dyn Error>),
}

/// Color of a node: RGB components and a presence flag.
/// The presence flag is not an alpha value: 0 means the node has no color( is empty ), 1 means it's colored
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct NodeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub presence: u8,
}

/// Index of an external owning subsystem, resolved through an `OwnerRegistry`
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct OwnerIndex(pub u8);

/// Opaque identifier of whoever originated the last edit of a node
pub type SourceId = u16;
pub const UNKNOWN_SOURCE_ID: SourceId = 0;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(test, derive(Eq))]
pub(crate) enum NodeChildrenArray<T: Default> {
    #[default]
    NoChildren,
    Children([T; 8]),
}

#[derive(Debug, Copy, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub(crate) struct NodeChildren<T: Default> {
    /// The key value to signify "no child" at a given slot
    pub(crate) empty_marker: T,

    /// The contained child key values
    pub(crate) content: NodeChildrenArray<T>,
}

/// One cubic region of space inside the tree
pub struct VoxelNode {
    pub(crate) path_code: PathCode,
    pub(crate) child_count: u8,
    pub(crate) true_color: NodeColor,
    pub(crate) current_color: NodeColor,
    pub(crate) override_active: bool,
    pub(crate) density: f32,
    pub(crate) bounds: AABox,
    pub(crate) dirty: bool,
    pub(crate) last_changed: Instant,
    pub(crate) should_render: bool,
    pub(crate) owner_index: OwnerIndex,
    pub(crate) source_id: SourceId,
}

/// Tree wide policies, owned by the manager of the tree
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct OctreeSettings {
    /// Recalculate the color of a node from its children whenever its subtree changes
    pub should_reaverage: bool,

    /// Try to collapse identical leaves on the path of an edit
    pub auto_collapse: bool,

    /// Size of the unit cube of the tree in world units
    pub tree_scale: f32,

    /// Bias added to the level of a node before looking up its LOD boundary
    pub boundary_level_adjust: i32,
}

/// Sparse octree of `VoxelNode`s, stored in an arena. Every node is addressed by a stable key;
/// the children of a node are stored in a parallel array indexed by that same key.
pub struct Octree {
    pub settings: OctreeSettings,
    pub(crate) root_node: u32,
    pub(crate) nodes: ObjectPool<VoxelNode>,
    pub(crate) node_children: Vec<NodeChildren<u32>>,
    pub(crate) detached_nodes: HashSet<u32>,
    pub(crate) observers: NodeObservers,
    pub(crate) stats: Arc<NodeStats>,
}
