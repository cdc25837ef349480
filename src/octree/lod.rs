use crate::octree::types::{Octree, OctreeSettings, VoxelNode};
use crate::spatial::{math::vector::V3c, AABox};

/// Relation of a box to the view frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumLocation {
    Inside,
    Outside,
    Intersect,
}

/// The camera and its view volume; boxes given to it are in world units
pub trait ViewFrustum {
    fn box_in_frustum(&self, bounds: &AABox) -> FrustumLocation;

    /// The point of the box farthest away from the camera
    fn furthest_point_from_camera(&self, bounds: &AABox) -> V3c<f32> {
        bounds.furthest_vertex_from(&self.position())
    }

    /// Position of the camera
    fn position(&self) -> V3c<f32>;
}

/// Provides the distance up to which nodes of a level are drawn.
/// The distance must not increase with the level, otherwise there would be gaps between levels.
pub trait LodPolicy {
    fn boundary_distance_for_render_level(&self, level: i32) -> f32;
}

impl<F> LodPolicy for F
where
    F: Fn(i32) -> f32,
{
    fn boundary_distance_for_render_level(&self, level: i32) -> f32 {
        self(level)
    }
}

/// Halves the render distance with each level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledLodPolicy {
    /// Render distance of the root level
    pub size_scale: f32,
}

impl Default for ScaledLodPolicy {
    fn default() -> Self {
        Self {
            size_scale: 50_000.,
        }
    }
}

impl LodPolicy for ScaledLodPolicy {
    fn boundary_distance_for_render_level(&self, level: i32) -> f32 {
        self.size_scale / 2_f32.powi(level)
    }
}

/// Decides whether nodes should be drawn for a given camera.
/// For every point of space, exactly one node on the way from the root to the leaf is drawn:
/// the coarsest one still detailed enough for its distance from the camera.
#[derive(Debug, Clone)]
pub struct LodEvaluator<P: LodPolicy> {
    /// Size of the unit cube of the tree in world units
    pub tree_scale: f32,
    pub boundary_level_adjust: i32,
    pub policy: P,
}

impl<P: LodPolicy> LodEvaluator<P> {
    pub fn new(policy: P, settings: &OctreeSettings) -> Self {
        Self {
            tree_scale: settings.tree_scale,
            boundary_level_adjust: settings.boundary_level_adjust,
            policy,
        }
    }

    /// Bounds of the node in world units
    pub fn world_bounds(&self, node: &VoxelNode) -> AABox {
        node.bounds().scaled(self.tree_scale)
    }

    /// Leaves are drawn when they are inside the boundary of the next level.
    /// Internal nodes are drawn when they are inside their own boundary, but outside the one of the
    /// next level: their children would be drawn otherwise.
    /// The farthest corner of the node is used for the distance, so every child of a node
    /// falls on the same side of the boundaries as the node itself.
    pub fn should_render(&self, node: &VoxelNode, frustum: &impl ViewFrustum) -> bool {
        if !node.is_colored() {
            return false;
        }
        let level = node.level() as i32 + self.boundary_level_adjust;
        let furthest_distance = self.furthest_distance_to_camera(node, frustum);
        let boundary = self.policy.boundary_distance_for_render_level(level);
        let child_boundary = self.policy.boundary_distance_for_render_level(level + 1);
        let in_boundary = furthest_distance <= boundary;
        let in_child_boundary = furthest_distance <= child_boundary;
        (node.is_leaf() && in_child_boundary) || (in_boundary && !in_child_boundary)
    }

    /// Distance from the camera to the farthest point of the node
    pub fn furthest_distance_to_camera(&self, node: &VoxelNode, frustum: &impl ViewFrustum) -> f32 {
        let furthest_point = frustum.furthest_point_from_camera(&self.world_bounds(node));
        frustum.position().distance(&furthest_point)
    }

    /// Distance from the camera to the center of the node
    pub fn distance_to_camera(&self, node: &VoxelNode, frustum: &impl ViewFrustum) -> f32 {
        frustum.position().distance(&self.world_bounds(node).center())
    }

    /// Distance from the given point in world units to the center of the node
    pub fn distance_to_point(&self, node: &VoxelNode, point: &V3c<f32>) -> f32 {
        self.distance_square_to_point(node, point).sqrt()
    }

    pub fn distance_square_to_point(&self, node: &VoxelNode, point: &V3c<f32>) -> f32 {
        point.distance_square(&self.world_bounds(node).center())
    }

    pub fn in_frustum(&self, node: &VoxelNode, frustum: &impl ViewFrustum) -> FrustumLocation {
        frustum.box_in_frustum(&self.world_bounds(node))
    }

    pub fn is_in_view(&self, node: &VoxelNode, frustum: &impl ViewFrustum) -> bool {
        FrustumLocation::Outside != self.in_frustum(node, frustum)
    }
}

impl Octree {
    /// Evaluates whether the node should be drawn, and caches the decision in the node.
    /// Returns with the decision
    pub fn update_should_render<P: LodPolicy>(
        &mut self,
        node_key: u32,
        evaluator: &LodEvaluator<P>,
        frustum: &impl ViewFrustum,
    ) -> bool {
        let should_render = evaluator.should_render(self.node(node_key), frustum);
        self.set_should_render(node_key, should_render);
        should_render
    }

    /// Updates the render decision of every node in the subtree. Nodes outside the view,
    /// and every node below them, are not drawn. Returns with the keys of the nodes to draw
    pub fn collect_renderable<P: LodPolicy>(
        &mut self,
        node_key: u32,
        evaluator: &LodEvaluator<P>,
        frustum: &impl ViewFrustum,
    ) -> Vec<u32> {
        let mut renderable = Vec::new();
        let mut node_stack = vec![node_key];
        while let Some(current_key) = node_stack.pop() {
            if !evaluator.is_in_view(self.node(current_key), frustum) {
                for hidden_key in self.subtree_keys(current_key) {
                    self.set_should_render(hidden_key, false);
                }
                continue;
            }
            if self.update_should_render(current_key, evaluator, frustum) {
                renderable.push(current_key);
            }
            node_stack.extend(self.children(current_key).map(|(_, key)| key));
        }
        renderable
    }
}
