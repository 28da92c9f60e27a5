//! Ranged weapon that fires physical projectiles at whatever the camera looks at.

use crate::config::{ProjectileConfig, WeaponConfig};
use engine_core::{Transform, Vec3};
use physics::PhysicsWorld;

/// Everything needed to put a fresh projectile into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub ttl: f32,
}

impl ProjectileSpawn {
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }
}

/// Weapon instance with current state.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub muzzle: Transform,
    pub fire_rate: f32, // Shots per second
    pub aim_distance: f32,
    pub projectile: ProjectileConfig,

    // State
    pub fire_cooldown: f32,
    aim_point: Option<Vec3>,
}

impl Weapon {
    pub fn new(weapon: &WeaponConfig, projectile: ProjectileConfig) -> Self {
        Self {
            muzzle: Transform::default(),
            fire_rate: weapon.fire_rate,
            aim_distance: weapon.aim_distance,
            projectile,
            fire_cooldown: 0.0,
            aim_point: None,
        }
    }

    /// Update weapon state.
    pub fn update(&mut self, dt: f32) {
        if self.fire_cooldown > 0.0 {
            self.fire_cooldown -= dt;
        }
    }

    /// Point the muzzle at whatever the camera ray hits. Without a camera hit
    /// the weapon has nothing to aim at and will not fire.
    pub fn aim(&mut self, physics: &PhysicsWorld, camera: &Transform) -> Option<Vec3> {
        self.aim_point = physics
            .raycast(camera.position, camera.forward(), self.aim_distance)
            .map(|hit| hit.point);
        if let Some(point) = self.aim_point {
            self.muzzle.look_at(point);
        }
        self.aim_point
    }

    pub fn aim_point(&self) -> Option<Vec3> {
        self.aim_point
    }

    /// Check if weapon can fire.
    pub fn can_fire(&self) -> bool {
        self.fire_cooldown <= 0.0 && self.aim_point.is_some()
    }

    /// Fire the weapon, starting the cooldown.
    pub fn fire(&mut self) -> Option<ProjectileSpawn> {
        if !self.can_fire() {
            return None;
        }

        if self.fire_rate > 0.0 {
            self.fire_cooldown = 1.0 / self.fire_rate;
        }
        Some(ProjectileSpawn {
            origin: self.muzzle.position,
            direction: self.muzzle.forward(),
            speed: self.projectile.speed,
            damage: self.projectile.damage,
            ttl: self.projectile.ttl,
        })
    }
}
