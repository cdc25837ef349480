use crate::octree::{
    types::{NodeColor, Octree, OctreeError, OwnerIndex, SourceId},
    OwnerRegistry, PathCode, V3c,
};
use rand::Rng;
use std::{fmt::Debug, hash::Hash};

impl Octree {
    /// Sets the true color of the node. The displayed color follows unless an override is active.
    /// Setting a color assumes the node is solid: its density becomes 1.
    pub fn set_color(&mut self, node_key: u32, color: NodeColor) {
        if self.node_mut(node_key).set_color(color) {
            self.mark_changed(node_key);
        }
    }

    /// Activates the override color of the node; the true color stays untouched
    pub fn set_override_color(&mut self, node_key: u32, r: u8, g: u8, b: u8) {
        if self.node_mut(node_key).set_override_color(r, g, b) {
            self.mark_changed(node_key);
        }
    }

    /// Switches the override color on or off. Switching it off restores the true color for display.
    pub fn set_override_active(&mut self, node_key: u32, active: bool) {
        if self.node_mut(node_key).set_override_active(active) {
            self.mark_changed(node_key);
        }
    }

    /// Sets a random true color, each component being at least the given brightness
    pub fn set_random_color(&mut self, node_key: u32, minimum_brightness: u8) {
        let mut rng = rand::thread_rng();
        let mut component = || rng.gen_range(minimum_brightness..=u8::MAX);
        let color = NodeColor::rgb(component(), component(), component());
        self.set_color(node_key, color);
    }

    pub fn set_density(&mut self, node_key: u32, density: f32) {
        if self.node_mut(node_key).set_density(density) {
            self.mark_changed(node_key);
        }
    }

    /// Caches the last render decision for the node; a change makes the node dirty
    pub fn set_should_render(&mut self, node_key: u32, should_render: bool) {
        if self.node_mut(node_key).set_should_render(should_render) {
            self.mark_changed(node_key);
        }
    }

    /// Acknowledges the changes of the node
    pub fn clear_dirty(&mut self, node_key: u32) {
        self.node_mut(node_key).clear_dirty();
    }

    pub fn set_source_id(&mut self, node_key: u32, source_id: SourceId) {
        self.node_mut(node_key).set_source_id(source_id);
    }

    pub fn set_owner_index(&mut self, node_key: u32, owner_index: OwnerIndex) {
        self.node_mut(node_key).owner_index = owner_index;
    }

    /// Assigns the node to the given owner, registering the owner if needed
    pub fn set_owner<O>(
        &mut self,
        node_key: u32,
        owners: &mut OwnerRegistry<O>,
        owner: &O,
    ) -> Result<(), OctreeError>
    where
        O: Eq + Hash + Clone + Debug,
    {
        let owner_index = owners.index_for(owner)?;
        self.set_owner_index(node_key, owner_index);
        Ok(())
    }

    /// The owner of the node, if it has any
    pub fn owner_of<'a, O>(&self, node_key: u32, owners: &'a OwnerRegistry<O>) -> Option<&'a O>
    where
        O: Eq + Hash + Clone + Debug,
    {
        owners.owner_for(self.node(node_key).owner_index())
    }

    /// Colors the node at the given path, creating it if needed, then lets every ancestor
    /// know that its subtree changed, bottom-up. Returns with the key of the colored node
    pub fn set_color_at_path(&mut self, path: &PathCode, color: NodeColor) -> u32 {
        let node_key = self.get_or_create_at_path(path);
        self.set_color(node_key, color);

        let node_stack = self.node_stack_for(path);
        debug_assert_eq!(Some(&node_key), node_stack.last());
        for ancestor_key in node_stack.iter().rev().skip(1) {
            self.handle_subtree_changed(*ancestor_key);
        }

        if self.settings.auto_collapse {
            for ancestor_key in node_stack.iter().rev().skip(1) {
                if !self.collapse_identical_leaves(*ancestor_key) {
                    break; // If any Nodes fail to collapse, their parents can not be collapsed either
                }
            }
        }
        node_key
    }

    /// Colors the node of the given level containing the point of the unit cube,
    /// like `set_color_at_path`. Returns with the key of the colored node
    pub fn set_color_at_point(
        &mut self,
        point: &V3c<f32>,
        level: usize,
        color: NodeColor,
    ) -> Result<u32, OctreeError> {
        let path = PathCode::containing_point(point, level)?;
        Ok(self.set_color_at_path(&path, color))
    }
}
