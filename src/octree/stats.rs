use crate::octree::{
    path::PathCode,
    types::{NodeChildren, VoxelNode},
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Memory attributed to a single node inside the arena
const NODE_MEMORY_FOOTPRINT: u64 =
    (std::mem::size_of::<VoxelNode>() + std::mem::size_of::<NodeChildren<u32>>()) as u64;

/// Counters of live nodes. Updated by the tree on construction and destruction of nodes,
/// readable from any thread for diagnostics. Can be shared between trees.
#[derive(Debug, Default)]
pub struct NodeStats {
    node_count: AtomicU64,
    leaf_count: AtomicU64,
    node_memory_usage: AtomicU64,
    octcode_memory_usage: AtomicU64,
}

impl NodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Relaxed)
    }

    /// Number of live nodes without children
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count.load(Ordering::Relaxed)
    }

    /// Bytes used by the live nodes themselves
    pub fn node_memory_usage(&self) -> u64 {
        self.node_memory_usage.load(Ordering::Relaxed)
    }

    /// Bytes used by path codes stored outside of their nodes
    pub fn octcode_memory_usage(&self) -> u64 {
        self.octcode_memory_usage.load(Ordering::Relaxed)
    }

    /// Every node starts as a leaf
    pub(crate) fn node_constructed(&self, path_code: &PathCode) {
        self.node_count.fetch_add(1, Ordering::Relaxed);
        self.leaf_count.fetch_add(1, Ordering::Relaxed);
        self.node_memory_usage
            .fetch_add(NODE_MEMORY_FOOTPRINT, Ordering::Relaxed);
        self.octcode_memory_usage
            .fetch_add(path_code.heap_usage() as u64, Ordering::Relaxed);
    }

    pub(crate) fn node_destroyed(&self, path_code: &PathCode, was_leaf: bool) {
        self.node_count.fetch_sub(1, Ordering::Relaxed);
        if was_leaf {
            self.leaf_count.fetch_sub(1, Ordering::Relaxed);
        }
        self.node_memory_usage
            .fetch_sub(NODE_MEMORY_FOOTPRINT, Ordering::Relaxed);
        self.octcode_memory_usage
            .fetch_sub(path_code.heap_usage() as u64, Ordering::Relaxed);
    }

    /// A node without children received its first child
    pub(crate) fn leaf_lost(&self) {
        self.leaf_count.fetch_sub(1, Ordering::Relaxed);
    }

    /// A node lost its last child
    pub(crate) fn leaf_gained(&self) {
        self.leaf_count.fetch_add(1, Ordering::Relaxed);
    }
}
