pub mod average;
pub mod convert;
pub mod lod;
pub mod node;
pub mod observer;
pub mod owner;
pub mod path;
pub mod stats;
pub mod types;
pub mod update;


pub use crate::spatial::{math::vector::V3c, AABox};
pub use observer::{NodeObserver, NodeObservers};
pub use owner::OwnerRegistry;
pub use path::PathCode;
pub use stats::NodeStats;
pub use types::{
    NodeColor, Octree, OctreeError, OctreeSettings, OwnerIndex, SourceId, VoxelNode,
    UNKNOWN_SOURCE_ID,
};

use crate::object_pool::{key_might_be_some, key_none_value, ObjectPool};
use crate::octree::{node::occupancy_bitmask, types::NodeChildren};
use std::{collections::HashSet, fmt::Display, sync::Arc, time::Instant};

impl Display for OctreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OctreeError::InvalidOctant(octant) => write!(f, "Invalid octant: {octant}"),
            OctreeError::EmptyPathCode => write!(f, "Path code has no level byte"),
            OctreeError::InvalidPathCode { expected, got } => write!(
                f,
                "Path code length mismatch: expected {expected} bytes, got {got}"
            ),
            OctreeError::PathCodeTooDeep(level) => write!(f, "Path code too deep: {level}"),
            OctreeError::InvalidNodeKey(key) => write!(f, "Invalid node key: {key}"),
            OctreeError::SlotOccupied { octant } => {
                write!(f, "Child slot {octant} is already occupied")
            }
            OctreeError::PathMismatch => {
                write!(f, "Node path code doesn't match its target position")
            }
            OctreeError::InvalidPosition { x, y, z } => {
                write!(f, "Position ({x},{y},{z}) is outside of the unit cube")
            }
            OctreeError::OwnerIndexExhausted => write!(f, "No more owner indices available"),
            OctreeError::InvalidStructure(err) => write!(f, "Invalid structure: {err}"),
        }
    }
}

impl std::error::Error for OctreeError {}

impl Default for OctreeSettings {
    fn default() -> Self {
        Self {
            should_reaverage: true,
            auto_collapse: false,
            tree_scale: 128.,
            boundary_level_adjust: 0,
        }
    }
}

impl OctreeSettings {
    pub fn with_should_reaverage(mut self, should_reaverage: bool) -> Self {
        self.should_reaverage = should_reaverage;
        self
    }

    pub fn with_auto_collapse(mut self, auto_collapse: bool) -> Self {
        self.auto_collapse = auto_collapse;
        self
    }

    pub fn with_tree_scale(mut self, tree_scale: f32) -> Self {
        self.tree_scale = tree_scale;
        self
    }

    pub fn with_boundary_level_adjust(mut self, boundary_level_adjust: i32) -> Self {
        self.boundary_level_adjust = boundary_level_adjust;
        self
    }
}

///####################################################################################
/// Octree
///####################################################################################
impl Default for Octree {
    fn default() -> Self {
        Self::new()
    }
}

impl Octree {
    /// creates an octree containing only a root node
    pub fn new() -> Self {
        Self::with_context(
            OctreeSettings::default(),
            NodeObservers::default(),
            Arc::new(NodeStats::default()),
        )
    }

    /// creates an octree with the given settings, observers and counters.
    /// The counters might be shared between trees.
    pub fn with_context(
        settings: OctreeSettings,
        observers: NodeObservers,
        stats: Arc<NodeStats>,
    ) -> Self {
        let mut tree = Self {
            settings,
            root_node: key_none_value(),
            nodes: ObjectPool::with_capacity(64),
            node_children: Vec::with_capacity(64),
            detached_nodes: HashSet::new(),
            observers,
            stats,
        };
        tree.root_node = tree.allocate_node(PathCode::root());
        tree
    }

    pub fn root(&self) -> u32 {
        self.root_node
    }

    /// Number of nodes stored in the tree, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.count()
    }

    /// The tree always contains at least its root node
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn stats(&self) -> &Arc<NodeStats> {
        &self.stats
    }

    pub fn observers(&self) -> &NodeObservers {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut NodeObservers {
        &mut self.observers
    }

    pub fn contains_node(&self, node_key: u32) -> bool {
        self.nodes.key_is_valid(node_key as usize)
    }

    /// Provides the node under the given key; the key must belong to a live node
    pub fn node(&self, node_key: u32) -> &VoxelNode {
        assert!(self.contains_node(node_key), "Invalid node key: {node_key}");
        self.nodes.get(node_key as usize)
    }

    pub fn get_node(&self, node_key: u32) -> Option<&VoxelNode> {
        self.contains_node(node_key)
            .then(|| self.nodes.get(node_key as usize))
    }

    pub(crate) fn node_mut(&mut self, node_key: u32) -> &mut VoxelNode {
        assert!(self.contains_node(node_key), "Invalid node key: {node_key}");
        self.nodes.get_mut(node_key as usize)
    }

    pub(crate) fn children_of(&self, node_key: u32) -> &NodeChildren<u32> {
        &self.node_children[node_key as usize]
    }

    /// The child in the given octant of the node, if any
    pub fn child_at_index(&self, node_key: u32, octant: u8) -> Option<u32> {
        debug_assert!(octant < 8, "Invalid octant: {octant}");
        let child_key = self.children_of(node_key)[octant as u32];
        key_might_be_some(child_key).then_some(child_key)
    }

    /// Keys of the existing children of the node, in octant order
    pub fn children(&self, node_key: u32) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..8u8).filter_map(move |octant| {
            self.child_at_index(node_key, octant)
                .map(|child_key| (octant, child_key))
        })
    }

    /// True if the node was detached from its parent and not yet re-attached or deleted
    pub fn is_detached(&self, node_key: u32) -> bool {
        self.detached_nodes.contains(&node_key)
    }

    /// Keys of every live node, detached ones included
    pub fn node_keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.nodes.reserved_keys().map(|key| key as u32)
    }

    /// Updates the change timestamp of the node and notifies the update observers
    pub fn mark_changed(&mut self, node_key: u32) {
        self.node_mut(node_key).last_changed = Instant::now();
        self.observers
            .notify_updated(node_key, self.nodes.get(node_key as usize));
    }

    fn allocate_node(&mut self, path_code: PathCode) -> u32 {
        self.stats.node_constructed(&path_code);
        let key = self.nodes.push(VoxelNode::new(path_code));
        if self.node_children.len() < self.nodes.len() {
            self.node_children
                .resize(self.nodes.len(), NodeChildren::default());
        }
        debug_assert!(self.node_children[key].is_empty());
        key as u32
    }

    /// Destroys the given node and every node below it. Delete observers are notified
    /// for each node before it is torn down, parents before their children.
    /// The parent of the node is not updated.
    fn deallocate_subtree(&mut self, node_key: u32) {
        let mut node_stack = vec![node_key];
        while let Some(current_key) = node_stack.pop() {
            let current_node = self.nodes.get(current_key as usize);
            self.observers.notify_deleted(current_key, current_node);
            self.stats
                .node_destroyed(&current_node.path_code, current_node.is_leaf());
            let children = std::mem::take(&mut self.node_children[current_key as usize]);
            if let Some(child_keys) = children.iter() {
                node_stack.extend(child_keys.rev().filter(|key| key_might_be_some(**key)));
            }
            self.nodes.free(current_key as usize);
        }
    }

    ///####################################################################################
    /// Structural mutation
    ///####################################################################################

    /// Creates a child in the given octant, if it doesn't exist yet. The new child inherits
    /// the owner of its parent. Returns with the key of the( possibly pre-existing ) child
    pub fn add_child_at_index(&mut self, node_key: u32, octant: u8) -> u32 {
        assert!(octant < 8, "Invalid octant: {octant}");
        if let Some(child_key) = self.child_at_index(node_key, octant) {
            return child_key;
        }

        // before adding a child, see if the node is currently a leaf
        if self.node(node_key).is_leaf() {
            self.stats.leaf_lost();
        }

        let child_path = self.node(node_key).path_code.child(octant);
        let owner_index = self.node(node_key).owner_index;
        let child_key = self.allocate_node(child_path);
        self.node_mut(child_key).owner_index = owner_index;
        self.node_children[node_key as usize][octant as u32] = child_key;

        let node = self.node_mut(node_key);
        node.child_count += 1;
        node.dirty = true;
        self.mark_changed(node_key);
        tracing::trace!("Added child {} at octant {} of node {}", child_key, octant, node_key);
        child_key
    }

    fn detach_child_at_index(&mut self, node_key: u32, octant: u8) -> Option<u32> {
        assert!(octant < 8, "Invalid octant: {octant}");
        let child_key = self.child_at_index(node_key, octant)?;
        self.node_children[node_key as usize].clear(octant as usize);
        let node = self.node_mut(node_key);
        node.child_count -= 1;
        node.dirty = true;
        let became_leaf = node.is_leaf();
        if became_leaf {
            self.stats.leaf_gained();
        }
        Some(child_key)
    }

    /// Detaches the child in the given octant without destroying it.
    /// The child stays in the tree as a detached subtree, until it is attached again
    /// with `attach_child_at_index` or destroyed with `delete_subtree`.
    pub fn remove_child_at_index(&mut self, node_key: u32, octant: u8) -> Option<u32> {
        let child_key = self.detach_child_at_index(node_key, octant)?;
        self.detached_nodes.insert(child_key);
        self.mark_changed(node_key);
        tracing::trace!("Removed child {} at octant {} of node {}", child_key, octant, node_key);
        Some(child_key)
    }

    /// Attaches a previously removed subtree to an empty slot.
    /// The path code of the subtree must match the target position
    pub fn attach_child_at_index(
        &mut self,
        node_key: u32,
        octant: u8,
        child_key: u32,
    ) -> Result<(), OctreeError> {
        if octant >= 8 {
            return Err(OctreeError::InvalidOctant(octant));
        }
        if !self.contains_node(node_key) || self.detached_nodes.contains(&node_key) {
            return Err(OctreeError::InvalidNodeKey(node_key));
        }
        if !self.detached_nodes.contains(&child_key) {
            return Err(OctreeError::InvalidNodeKey(child_key));
        }
        if self.child_at_index(node_key, octant).is_some() {
            return Err(OctreeError::SlotOccupied { octant });
        }
        if self.node(node_key).path_code.child(octant) != self.node(child_key).path_code {
            return Err(OctreeError::PathMismatch);
        }

        if self.node(node_key).is_leaf() {
            self.stats.leaf_lost();
        }
        self.detached_nodes.remove(&child_key);
        self.node_children[node_key as usize][octant as u32] = child_key;
        let node = self.node_mut(node_key);
        node.child_count += 1;
        node.dirty = true;
        self.mark_changed(node_key);
        Ok(())
    }

    /// Detaches and destroys the child in the given octant, along with its whole subtree
    pub fn delete_child_at_index(&mut self, node_key: u32, octant: u8) {
        if let Some(child_key) = self.detach_child_at_index(node_key, octant) {
            self.deallocate_subtree(child_key);
            self.mark_changed(node_key);
            tracing::trace!("Deleted child at octant {} of node {}", octant, node_key);
        }
    }

    /// Destroys the subtree in the given octant bottom-up: every node is deleted
    /// only after all of its children, through `delete_child_at_index`.
    pub fn safe_deep_delete_child_at_index(&mut self, node_key: u32, octant: u8) {
        let Some(child_key) = self.child_at_index(node_key, octant) else {
            return;
        };
        let has_subtree = !self.node(child_key).is_leaf();
        if has_subtree {
            for child_octant in 0..8 {
                self.safe_deep_delete_child_at_index(child_key, child_octant);
            }
        }
        self.delete_child_at_index(node_key, octant);
        self.node_mut(node_key).dirty = true;
        self.mark_changed(node_key);
        if has_subtree {
            tracing::debug!("Deep deleted subtree at octant {} of node {}", octant, node_key);
        }
    }

    /// Destroys a detached subtree
    pub fn delete_subtree(&mut self, node_key: u32) -> Result<(), OctreeError> {
        if !self.detached_nodes.remove(&node_key) {
            return Err(OctreeError::InvalidNodeKey(node_key));
        }
        self.deallocate_subtree(node_key);
        Ok(())
    }

    ///####################################################################################
    /// Addressing
    ///####################################################################################

    /// Provides the key of the node at the given path, if it exists
    pub fn node_at_path(&self, path: &PathCode) -> Option<u32> {
        path.octants().try_fold(self.root_node, |node_key, octant| {
            self.child_at_index(node_key, octant)
        })
    }

    /// Provides the key of the node at the given path, creating every missing node on the way
    pub fn get_or_create_at_path(&mut self, path: &PathCode) -> u32 {
        let octants: Vec<u8> = path.octants().collect();
        octants
            .into_iter()
            .fold(self.root_node, |node_key, octant| {
                self.add_child_at_index(node_key, octant)
            })
    }

    /// Keys of every node in the subtree, parents before their children, children in octant order
    pub fn subtree_keys(&self, node_key: u32) -> Vec<u32> {
        let mut keys = Vec::new();
        let mut node_stack = vec![node_key];
        while let Some(current_key) = node_stack.pop() {
            keys.push(current_key);
            if let Some(child_keys) = self.children_of(current_key).iter() {
                node_stack.extend(child_keys.rev().filter(|key| key_might_be_some(**key)));
            }
        }
        keys
    }

    /// Keys of the nodes on the way from the root to the given node, the node included
    pub(crate) fn node_stack_for(&self, path: &PathCode) -> Vec<u32> {
        let mut node_stack = vec![self.root_node];
        for octant in path.octants() {
            match self.child_at_index(*node_stack.last().unwrap_or(&self.root_node), octant) {
                Some(child_key) => node_stack.push(child_key),
                None => break,
            }
        }
        node_stack
    }

    /// Human readable description of the node
    pub fn debug_details(&self, node_key: u32) -> String {
        let node = self.node(node_key);
        format!(
            "Voxel at corner=({},{},{}) size={} isLeaf={} isColored={} ({},{},{},{}) isDirty={} shouldRender={} children={:08b} pathCode={}",
            node.bounds.corner.x,
            node.bounds.corner.y,
            node.bounds.corner.z,
            node.bounds.scale,
            node.is_leaf(),
            node.is_colored(),
            node.current_color.r,
            node.current_color.g,
            node.current_color.b,
            node.current_color.presence,
            node.dirty,
            node.should_render,
            occupancy_bitmask(self.children_of(node_key)),
            node.path_code,
        )
    }

    pub fn log_debug_details(&self, label: &str, node_key: u32) {
        tracing::debug!("{} - {}", label, self.debug_details(node_key));
    }
}

impl Drop for Octree {
    fn drop(&mut self) {
        let mut roots: Vec<u32> = self.detached_nodes.drain().collect();
        roots.push(self.root_node);
        for root in roots {
            self.deallocate_subtree(root);
        }
        tracing::debug!("Octree torn down, {} nodes still alive", self.stats.node_count());
    }
}
