//! Transform component and utilities for spatial positioning.

use glam::{Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Turn so that `forward()` points at `target`. No-op when the target is
    /// at (or extremely close to) the current position.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward.length_squared() > 0.0001 {
            self.rotation = Quat::from_rotation_arc(-Vec3::Z, forward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.look_at(Vec3::new(1.0, 2.0, 13.0));
        assert!((t.forward() - Vec3::Z).length() < 1e-5);

        t.look_at(Vec3::new(1.0, 12.0, 3.0));
        assert!((t.forward() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn look_at_same_point_keeps_rotation() {
        let mut t = Transform::from_position(Vec3::ZERO);
        t.look_at(Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }
}
