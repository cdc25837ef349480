pub mod lut;
pub mod math;

use crate::spatial::math::{offset_region, vector::V3c};

pub(crate) const FLOAT_ERROR_TOLERANCE: f32 = 0.00001;

/// Axis aligned cube described by its minimum corner and uniform edge length
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AABox {
    pub corner: V3c<f32>,
    pub scale: f32,
}

impl AABox {
    pub fn new(corner: V3c<f32>, scale: f32) -> Self {
        Self { corner, scale }
    }

    /// The bounds of the whole tree in unit space
    pub fn unit() -> Self {
        Self::new(V3c::unit(0.), 1.)
    }

    /// Creates the bounding box of the child in the given octant
    pub fn child_bounds_for(&self, octant: u8) -> AABox {
        let child_scale = self.scale / 2.;
        AABox {
            corner: self.corner + offset_region(octant) * child_scale,
            scale: child_scale,
        }
    }

    /// Provides a copy of the box with its corner and scale multiplied by the given factor
    pub fn scaled(&self, factor: f32) -> AABox {
        AABox {
            corner: self.corner * factor,
            scale: self.scale * factor,
        }
    }

    pub fn center(&self) -> V3c<f32> {
        self.corner + V3c::unit(self.scale / 2.)
    }

    pub fn volume(&self) -> f32 {
        self.scale * self.scale * self.scale
    }

    /// The corner of the box in the direction of the given octant
    pub fn vertex(&self, octant: u8) -> V3c<f32> {
        self.corner + offset_region(octant) * self.scale
    }

    /// The corner of the box farthest away from the given point
    pub fn furthest_vertex_from(&self, point: &V3c<f32>) -> V3c<f32> {
        let center = self.center();
        let far_component = |point_component: f32, center_component: f32, min_component: f32| {
            if point_component < center_component {
                min_component + self.scale
            } else {
                min_component
            }
        };
        V3c::new(
            far_component(point.x, center.x, self.corner.x),
            far_component(point.y, center.y, self.corner.y),
            far_component(point.z, center.z, self.corner.z),
        )
    }

    /// True if the given point is inside the box, edges included
    pub fn contains_point(&self, point: &V3c<f32>) -> bool {
        (point.x >= self.corner.x - FLOAT_ERROR_TOLERANCE)
            && (point.x <= self.corner.x + self.scale + FLOAT_ERROR_TOLERANCE)
            && (point.y >= self.corner.y - FLOAT_ERROR_TOLERANCE)
            && (point.y <= self.corner.y + self.scale + FLOAT_ERROR_TOLERANCE)
            && (point.z >= self.corner.z - FLOAT_ERROR_TOLERANCE)
            && (point.z <= self.corner.z + self.scale + FLOAT_ERROR_TOLERANCE)
    }

    /// True if the other box is fully enclosed by this one
    pub fn contains_box(&self, other: &AABox) -> bool {
        self.contains_point(&other.corner) && self.contains_point(&other.vertex(7))
    }
}
