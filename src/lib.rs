//! Sparse octree of voxel nodes with compact path addressing, color averaging,
//! change notification and level of detail decisions.

pub mod object_pool;
pub mod octree;
pub mod spatial;
