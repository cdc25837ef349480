use crate::octree::types::{NodeColor, Octree};

/// Averaged nodes are considered colored only above this density.
/// A value below 0.5 makes the world 'fatter' at a distance, as larger nodes get colored
/// from less data, which gives a sense that there is something out there to investigate.
/// Nearly empty regions are still dropped, so distant space doesn't fill up with fog.
pub const VISIBLE_ABOVE_DENSITY: f32 = 0.10;

impl Octree {
    /// Recalculates the color and density of the node from its children.
    /// Every existing child contributes its density, while only colored children contribute
    /// to the color; missing children count as empty space.
    pub fn set_color_from_average_of_children(&mut self, node_key: u32) {
        let mut color_sum = [0u32; 3];
        let mut colored_children = 0u32;
        let mut density = 0.0f32;
        for (_octant, child_key) in self.children(node_key) {
            let child = self.node(child_key);
            if child.is_colored() {
                // color averaging should always be based on true colors
                let color = child.true_color();
                color_sum[0] += color.r as u32;
                color_sum[1] += color.g as u32;
                color_sum[2] += color.b as u32;
                colored_children += 1;
            }
            density += child.density();
        }
        density /= 8.;

        let new_color = if density > VISIBLE_ABOVE_DENSITY && 0 < colored_children {
            NodeColor::rgb(
                (color_sum[0] / colored_children) as u8,
                (color_sum[1] / colored_children) as u8,
                (color_sum[2] / colored_children) as u8,
            )
        } else {
            NodeColor::NONE
        };

        self.set_color(node_key, new_color);
        self.set_density(node_key, density);
    }

    /// Replaces 8 identically colored leaf children with the node itself.
    /// Succeeds only if all 8 children exist, are leaves, are colored and share the same RGB value;
    /// the tree is left untouched otherwise. Returns true if the children were collapsed
    pub fn collapse_identical_leaves(&mut self, node_key: u32) -> bool {
        let mut shared_color: Option<NodeColor> = None;
        for octant in 0..8 {
            let Some(child_key) = self.child_at_index(node_key, octant) else {
                return false;
            };
            let child = self.node(child_key);
            if !child.is_leaf() || !child.is_colored() {
                return false;
            }
            match shared_color {
                None => shared_color = Some(child.true_color()),
                Some(color) if !color.same_rgb(&child.true_color()) => return false,
                Some(_) => {}
            }
        }
        let Some(shared_color) = shared_color else {
            return false;
        };

        for octant in 0..8 {
            self.delete_child_at_index(node_key, octant);
        }
        debug_assert!(self.node(node_key).is_leaf());
        self.set_color(
            node_key,
            NodeColor::rgb(shared_color.r, shared_color.g, shared_color.b),
        );
        self.set_density(node_key, 1.);
        tracing::debug!(
            "Collapsed identical leaves of node {} into {:?}",
            node_key,
            shared_color
        );
        true
    }

    /// Bookkeeping after the subtree below the node changed:
    /// re-averages the color if the tree is configured so, then marks the node changed
    pub fn handle_subtree_changed(&mut self, node_key: u32) {
        if self.settings.should_reaverage {
            self.set_color_from_average_of_children(node_key);
        }
        self.mark_changed(node_key);
    }

    /// Re-averages every internal node of the subtree, children before their parents
    pub fn reaverage_subtree(&mut self, node_key: u32) {
        let mut node_stack = vec![(node_key, false)];
        while let Some((current_key, children_done)) = node_stack.pop() {
            if self.node(current_key).is_leaf() {
                continue;
            }
            if children_done {
                self.set_color_from_average_of_children(current_key);
            } else {
                node_stack.push((current_key, true));
                node_stack.extend(self.children(current_key).map(|(_, key)| (key, false)));
            }
        }
    }
}
