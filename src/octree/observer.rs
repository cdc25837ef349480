use crate::octree::types::VoxelNode;
use std::sync::Arc;

/// Listener of node changes inside an `Octree`.
/// Both callbacks are invoked synchronously, in the order of registration.
pub trait NodeObserver {
    /// Called whenever the node is marked as changed
    fn node_updated(&self, _node_key: u32, _node: &VoxelNode) {}

    /// Called right before the node is destroyed; the key might be reused afterwards
    fn node_deleted(&self, _node_key: u32, _node: &VoxelNode) {}
}

/// Registry of update and delete observers, owned by the tree
#[derive(Default, Clone)]
pub struct NodeObservers {
    update_hooks: Vec<Arc<dyn NodeObserver>>,
    delete_hooks: Vec<Arc<dyn NodeObserver>>,
}

/// Observers are identified by the address of their shared allocation
fn same_observer(a: &Arc<dyn NodeObserver>, b: &Arc<dyn NodeObserver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn remove_hook(hooks: &mut Vec<Arc<dyn NodeObserver>>, hook: &Arc<dyn NodeObserver>) -> bool {
    if let Some(index) = hooks.iter().position(|h| same_observer(h, hook)) {
        hooks.remove(index);
        true
    } else {
        false
    }
}

impl NodeObservers {
    pub fn add_update_hook(&mut self, hook: Arc<dyn NodeObserver>) {
        self.update_hooks.push(hook);
    }

    /// Removes the first registration of the given observer, returns true if it was registered
    pub fn remove_update_hook(&mut self, hook: &Arc<dyn NodeObserver>) -> bool {
        remove_hook(&mut self.update_hooks, hook)
    }

    pub fn add_delete_hook(&mut self, hook: Arc<dyn NodeObserver>) {
        self.delete_hooks.push(hook);
    }

    /// Removes the first registration of the given observer, returns true if it was registered
    pub fn remove_delete_hook(&mut self, hook: &Arc<dyn NodeObserver>) -> bool {
        remove_hook(&mut self.delete_hooks, hook)
    }

    pub fn update_hook_count(&self) -> usize {
        self.update_hooks.len()
    }

    pub fn delete_hook_count(&self) -> usize {
        self.delete_hooks.len()
    }

    pub(crate) fn notify_updated(&self, node_key: u32, node: &VoxelNode) {
        for hook in self.update_hooks.iter() {
            hook.node_updated(node_key, node);
        }
    }

    pub(crate) fn notify_deleted(&self, node_key: u32, node: &VoxelNode) {
        for hook in self.delete_hooks.iter() {
            hook.node_deleted(node_key, node);
        }
    }
}
