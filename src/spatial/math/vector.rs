use num_traits::Float;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Default, Clone, Copy, Debug, Eq, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(C)]
pub struct V3c<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> V3c<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
    pub fn unit(scale: T) -> Self {
        Self {
            x: scale,
            y: scale,
            z: scale,
        }
    }
}

impl<T> AddAssign for V3c<T>
where
    T: Copy + Add<Output = T>,
{
    fn add_assign(&mut self, other: V3c<T>) {
        *self = *self + other;
    }
}

impl<T> V3c<T>
where
    T: Mul<Output = T> + Add<Output = T> + Sub<Output = T> + Copy,
{
    pub fn dot(&self, other: &V3c<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl<T: Float> V3c<T> {
    /// Squared euclidean distance between the two points
    pub fn distance_square(&self, other: &V3c<T>) -> T {
        let diff = *self - *other;
        diff.dot(&diff)
    }

    pub fn distance(&self, other: &V3c<T>) -> T {
        self.distance_square(other).sqrt()
    }
}

impl<T: Add<Output = T>> Add for V3c<T> {
    type Output = V3c<T>;

    fn add(self, other: V3c<T>) -> V3c<T> {
        V3c {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<T> Sub for V3c<T>
where
    T: Copy + Sub<Output = T>,
{
    type Output = V3c<T>;

    fn sub(self, other: V3c<T>) -> V3c<T> {
        V3c {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for V3c<T> {
    type Output = V3c<T>;

    fn mul(self, scalar: T) -> V3c<T> {
        V3c {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}
