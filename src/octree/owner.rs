use crate::octree::types::{OctreeError, OwnerIndex};
use bimap::BiHashMap;
use std::hash::Hash;

impl OwnerIndex {
    /// Signals that the node doesn't belong to any owner
    pub const NONE: OwnerIndex = OwnerIndex(0);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Bidirectional mapping between the owners of nodes and the small indices stored inside the nodes.
/// Many nodes share one owner, so each node only stores an `OwnerIndex` instead of a handle.
/// Indices are handed out in increasing order and stay stable for the lifetime of the registry.
#[derive(Debug, Clone)]
pub struct OwnerRegistry<O>
where
    O: Eq + Hash,
{
    owners: BiHashMap<O, OwnerIndex>,
    next_index: u8,
}

impl<O> Default for OwnerRegistry<O>
where
    O: Eq + Hash,
{
    fn default() -> Self {
        Self {
            owners: BiHashMap::new(),
            next_index: OwnerIndex::NONE.0 + 1,
        }
    }
}

impl<O> OwnerRegistry<O>
where
    O: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides the index of the given owner, assigning a new one if the owner was not seen before
    pub fn index_for(&mut self, owner: &O) -> Result<OwnerIndex, OctreeError> {
        if let Some(index) = self.owners.get_by_left(owner) {
            return Ok(*index);
        }
        if u8::MAX == self.next_index && self.owners.contains_right(&OwnerIndex(u8::MAX)) {
            tracing::warn!("Owner index space exhausted, can not register {:?}", owner);
            return Err(OctreeError::OwnerIndexExhausted);
        }
        let index = OwnerIndex(self.next_index);
        self.owners.insert(owner.clone(), index);
        self.next_index = self.next_index.saturating_add(1);
        tracing::debug!("Registered owner {:?} with index {}", owner, index.0);
        Ok(index)
    }

    /// The owner belonging to the given index, if any
    pub fn owner_for(&self, index: OwnerIndex) -> Option<&O> {
        self.owners.get_by_right(&index)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
