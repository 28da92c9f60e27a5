//! Continuous hit detection for fast projectiles.
//!
//! Every fixed tick the projectile ray-casts along the segment it travelled
//! since the previous tick, so it cannot tunnel through thin bones at speed.

use crate::damageable::DamageOutcome;
use crate::hitbox::{DamageRouter, HitboxRegistry};
use engine_core::{Entity, Lifetime, Vec3};
use physics::{ColliderHandle, PhysicsWorld};

/// Segments at or below this length are not ray-cast.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-4;
/// Seconds a projectile lives when it never hits anything.
pub const DEFAULT_TTL: f32 = 4.0;

/// A hit on the hit-detection layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileHit {
    pub collider: ColliderHandle,
    pub point: Vec3,
    /// Label of the struck body part, if the collider resolved to a hitbox.
    pub body_part: Option<String>,
    pub owner: Option<Entity>,
    pub outcome: Option<DamageOutcome>,
}

/// Result of one detection tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileStatus {
    /// Still flying.
    InFlight,
    /// Struck something on the hit layer; the projectile is spent.
    Hit(ProjectileHit),
    /// Lived past its time-to-live without hitting anything.
    Expired,
}

impl ProjectileStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ProjectileStatus::InFlight)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectileHitDetector {
    damage: f32,
    lifetime: Lifetime,
    last_position: Vec3,
}

impl ProjectileHitDetector {
    pub fn new(spawn_position: Vec3, damage: f32, ttl: f32) -> Self {
        Self {
            damage,
            lifetime: Lifetime::new(ttl),
            last_position: spawn_position,
        }
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    pub fn elapsed(&self) -> f32 {
        self.lifetime.elapsed
    }

    /// Run one tick with the projectile now at `current_position` after the
    /// physics step.
    pub fn detect<R>(
        &mut self,
        current_position: Vec3,
        dt: f32,
        physics: &mut PhysicsWorld,
        hitboxes: &mut HitboxRegistry,
        router: &mut R,
    ) -> ProjectileStatus
    where
        R: DamageRouter + ?Sized,
    {
        let expired = self.lifetime.update(dt);

        let segment = current_position - self.last_position;
        let distance = segment.length();
        if !distance.is_finite() || distance <= MIN_SEGMENT_LENGTH {
            log::trace!("Projectile moved {} this tick, skipping ray", distance);
        } else if let Some(hit) =
            physics.raycast_hitboxes(self.last_position, segment / distance, distance)
        {
            self.last_position = current_position;
            return ProjectileStatus::Hit(self.strike(hit.collider, hit.point, physics, hitboxes, router));
        }

        self.last_position = current_position;
        if expired {
            ProjectileStatus::Expired
        } else {
            ProjectileStatus::InFlight
        }
    }

    fn strike<R>(
        &self,
        collider: ColliderHandle,
        point: Vec3,
        physics: &mut PhysicsWorld,
        hitboxes: &mut HitboxRegistry,
        router: &mut R,
    ) -> ProjectileHit
    where
        R: DamageRouter + ?Sized,
    {
        let Some(hitbox) = hitboxes.resolve(collider, physics) else {
            log::debug!("Projectile hit collider {:?} with no hitbox", collider);
            return ProjectileHit {
                collider,
                point,
                body_part: None,
                owner: None,
                outcome: None,
            };
        };

        let outcome = hitbox.receive_hit(self.damage, router, physics);
        log::debug!("Shot landed on {}", hitbox.label());
        ProjectileHit {
            collider,
            point,
            body_part: Some(hitbox.label().to_string()),
            owner: hitbox.owner(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_part::BodyPart;
    use crate::damageable::{Damageable, DamageableEntity};
    use crate::hitbox::BodyPartHitbox;
    use hecs::World;
    use physics::CollisionGroup;

    struct Range {
        physics: PhysicsWorld,
        world: World,
        hitboxes: HitboxRegistry,
        target: Entity,
        bare_collider: ColliderHandle,
    }

    /// A head-sized hitbox at z = -5 and an unregistered hit-layer ball at z = +5.
    fn range() -> Range {
        let mut physics = PhysicsWorld::new();
        let mut world = World::new();
        let mut hitboxes = HitboxRegistry::new();
        let target = world.spawn((DamageableEntity::new(100.0),));

        let head = physics.add_kinematic_body(Vec3::new(0.0, 0.0, -5.0));
        let head_collider = physics.add_sphere_collider(head, 0.5);
        physics.set_collision_groups(head_collider, CollisionGroup::hitbox());
        let part = BodyPart {
            label: "head".to_string(),
            multiplier: 2.0,
        };
        hitboxes.insert(head_collider, head, None, BodyPartHitbox::new("Head", part).bound(target));

        let bare = physics.add_kinematic_body(Vec3::new(0.0, 0.0, 5.0));
        let bare_collider = physics.add_sphere_collider(bare, 0.5);
        physics.set_collision_groups(bare_collider, CollisionGroup::hitbox());

        physics.update_query_pipeline();
        Range {
            physics,
            world,
            hitboxes,
            target,
            bare_collider,
        }
    }

    impl Range {
        fn tick(&mut self, detector: &mut ProjectileHitDetector, to: Vec3, dt: f32) -> ProjectileStatus {
            detector.detect(to, dt, &mut self.physics, &mut self.hitboxes, &mut self.world)
        }

        fn health(&self) -> f32 {
            self.world.get::<&DamageableEntity>(self.target).unwrap().health()
        }
    }

    #[test]
    fn segment_through_hitbox_applies_scaled_damage() {
        let mut range = range();
        let mut detector = ProjectileHitDetector::new(Vec3::ZERO, 30.0, DEFAULT_TTL);

        let status = range.tick(&mut detector, Vec3::new(0.0, 0.0, -10.0), 0.02);
        let ProjectileStatus::Hit(hit) = status else {
            panic!("expected a hit, got {:?}", status);
        };
        assert_eq!(hit.body_part.as_deref(), Some("head"));
        assert_eq!(hit.owner, Some(range.target));
        assert!((hit.point.z + 4.5).abs() < 1e-3);
        assert_eq!(range.health(), 40.0);
    }

    #[test]
    fn tiny_step_is_not_cast() {
        let mut range = range();
        // sitting right at the hitbox surface so any ray would register
        let start = Vec3::new(0.0, 0.0, -4.49995);
        let mut detector = ProjectileHitDetector::new(start, 30.0, DEFAULT_TTL);

        let to = start - Vec3::new(0.0, 0.0, 0.00005);
        assert_eq!(range.tick(&mut detector, to, 0.02), ProjectileStatus::InFlight);
        assert_eq!(detector.last_position(), to);
        assert_eq!(range.health(), 100.0);
    }

    #[test]
    fn hit_layer_without_hitbox_consumes_the_shot() {
        let mut range = range();
        let mut detector = ProjectileHitDetector::new(Vec3::ZERO, 30.0, DEFAULT_TTL);

        let status = range.tick(&mut detector, Vec3::new(0.0, 0.0, 10.0), 0.02);
        let ProjectileStatus::Hit(hit) = status else {
            panic!("expected a hit, got {:?}", status);
        };
        assert_eq!(hit.collider, range.bare_collider);
        assert_eq!(hit.body_part, None);
        assert_eq!(hit.outcome, None);
        assert_eq!(range.health(), 100.0);
    }

    #[test]
    fn ttl_expires_without_hits() {
        let mut range = range();
        let mut detector = ProjectileHitDetector::new(Vec3::new(0.0, 10.0, 0.0), 30.0, 4.0);
        let dt = 1.0 / 64.0;

        let mut position = detector.last_position();
        for tick in 1..256 {
            position.x += 0.5;
            let status = range.tick(&mut detector, position, dt);
            assert_eq!(status, ProjectileStatus::InFlight, "tick {}", tick);
        }
        position.x += 0.5;
        assert_eq!(range.tick(&mut detector, position, dt), ProjectileStatus::Expired);
        assert_eq!(range.health(), 100.0);
    }

    #[test]
    fn hit_on_final_tick_beats_expiry() {
        let mut range = range();
        let mut detector = ProjectileHitDetector::new(Vec3::ZERO, 10.0, 0.02);
        let status = range.tick(&mut detector, Vec3::new(0.0, 0.0, -10.0), 0.02);
        assert!(matches!(status, ProjectileStatus::Hit(_)));
    }

    #[test]
    fn other_layers_are_ignored() {
        let mut range = range();
        let wall = range.physics.add_kinematic_body(Vec3::new(0.0, 0.0, -2.0));
        let wall_collider = range.physics.add_sphere_collider(wall, 0.5);
        range
            .physics
            .set_collision_groups(wall_collider, CollisionGroup::environment());
        range.physics.update_query_pipeline();

        let mut detector = ProjectileHitDetector::new(Vec3::ZERO, 30.0, DEFAULT_TTL);
        let status = range.tick(&mut detector, Vec3::new(0.0, 0.0, -10.0), 0.02);
        let ProjectileStatus::Hit(hit) = status else {
            panic!("expected a hit, got {:?}", status);
        };
        assert_ne!(hit.collider, wall_collider);
        assert_eq!(range.health(), 40.0);
    }
}
