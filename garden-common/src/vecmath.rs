use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A simple 2D vector struct.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2.
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Creates a zero vector.
    pub fn zero() -> Self {
        Vec2 { x: 0.0, y: 0.0 }
    }

    /// Calculates the squared length (magnitude) of the vector.
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Calculates the length (magnitude) of the vector.
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Calculates the squared distance to another vector (point).
    pub fn distance_squared(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculates the distance to another vector (point).
    pub fn distance(&self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

// Implement standard operators for convenience
impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

/// Wraps a value to the opposite boundary when it leaves the [min, max] range.
///
/// A value strictly below `min` is relocated to exactly `max`, and a value
/// strictly above `max` to exactly `min`. Values on the boundary itself pass
/// through unchanged. This is a teleport-style wraparound, not a reflection
/// and not a clamp.
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        return max;
    }
    if value > max {
        return min;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_passes_in_range_values_through() {
        assert_eq!(wrap(5.0, 0.0, 10.0), 5.0);
        assert_eq!(wrap(0.0, 0.0, 10.0), 0.0);
        assert_eq!(wrap(10.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn wrap_relocates_below_min_to_max() {
        assert_eq!(wrap(-0.001, 0.0, 10.0), 10.0);
        assert_eq!(wrap(-5.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn wrap_relocates_above_max_to_min() {
        assert_eq!(wrap(10.001, 0.0, 10.0), 0.0);
        assert_eq!(wrap(11.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn distance_between_points() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_squared(b), 25.0);
    }

    #[test]
    fn vector_operators() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(Vec2::zero().length(), 0.0);
    }
}
