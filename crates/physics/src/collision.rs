//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (ground, walls)
    Environment = 1 << 0,
    /// Character root capsules that move the body while it is animated
    Character = 1 << 1,
    /// Bone colliders that weapons test against
    Hitbox = 1 << 2,
}

impl CollisionGroup {
    fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Create a collision group for environment.
    pub fn environment() -> InteractionGroups {
        InteractionGroups::new(Self::Environment.bits(), Group::ALL)
    }

    /// Create a collision group for character root bodies.
    pub fn character() -> InteractionGroups {
        InteractionGroups::new(
            Self::Character.bits(),
            Self::Environment.bits() | Self::Character.bits(),
        )
    }

    /// The hit-detection layer. Bones collide with the world and each other
    /// once they go limp, but never with the capsule that used to carry them.
    pub fn hitbox() -> InteractionGroups {
        InteractionGroups::new(
            Self::Hitbox.bits(),
            Self::Environment.bits() | Self::Hitbox.bits(),
        )
    }

    /// Query filter groups that only accept colliders on the hit-detection layer.
    pub fn hitbox_query() -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Self::Hitbox.bits())
    }
}

/// Component linking an ECS entity to its physics handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
}

impl PhysicsBody {
    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
        }
    }
}
