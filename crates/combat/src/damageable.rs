//! Health pools that turn lethal damage into a ragdoll.

use engine_core::{Health, Lifetime};
use physics::{PhysicsWorld, Ragdoll};

/// What a call to [`Damageable::apply_damage`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Health went down but the entity is still alive.
    Damaged { remaining: f32 },
    /// This hit was lethal.
    Killed,
    /// Already dead, nothing changed.
    Ignored,
    /// Negative or non-finite amount, nothing changed.
    Rejected,
}

impl DamageOutcome {
    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed)
    }
}

/// Anything weapons can hurt.
pub trait Damageable {
    fn apply_damage(&mut self, amount: f32, physics: &mut PhysicsWorld) -> DamageOutcome;

    fn health(&self) -> f32;

    fn max_health(&self) -> f32;

    fn is_alive(&self) -> bool;

    /// `health / max_health` in `[0, 1]`, for health bars.
    fn health_ratio(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 {
            return 0.0;
        }
        (self.health() / max).clamp(0.0, 1.0)
    }
}

/// A character with a health pool and, usually, a ragdoll to fall into.
#[derive(Debug)]
pub struct DamageableEntity {
    health: Health,
    alive: bool,
    ragdoll: Option<Ragdoll>,
    corpse_lifetime: Option<f32>,
    corpse: Option<Lifetime>,
}

impl DamageableEntity {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Health::new(max_health),
            alive: true,
            ragdoll: None,
            corpse_lifetime: None,
            corpse: None,
        }
    }

    pub fn with_ragdoll(mut self, ragdoll: Ragdoll) -> Self {
        self.ragdoll = Some(ragdoll);
        self
    }

    /// Seconds a corpse stays around before [`DamageableEntity::tick_corpse`] reports it.
    pub fn with_corpse_lifetime(mut self, seconds: f32) -> Self {
        self.corpse_lifetime = Some(seconds);
        self
    }

    pub fn ragdoll(&self) -> Option<&Ragdoll> {
        self.ragdoll.as_ref()
    }

    pub fn take_ragdoll(&mut self) -> Option<Ragdoll> {
        self.ragdoll.take()
    }

    /// Advance the corpse timer. True once a dead entity has outstayed its
    /// corpse lifetime; always false while alive or without a lifetime.
    pub fn tick_corpse(&mut self, dt: f32) -> bool {
        self.corpse.as_mut().is_some_and(|corpse| corpse.update(dt))
    }

    fn die(&mut self, physics: &mut PhysicsWorld) {
        self.alive = false;
        self.corpse = self.corpse_lifetime.map(Lifetime::new);

        match self.ragdoll.as_mut() {
            Some(ragdoll) => ragdoll.activate(physics, true),
            None => log::warn!("Entity died without a ragdoll, skipping physics handover"),
        }
    }
}

impl Damageable for DamageableEntity {
    fn apply_damage(&mut self, amount: f32, physics: &mut PhysicsWorld) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        if !amount.is_finite() || amount < 0.0 {
            log::warn!("Rejected damage amount {}", amount);
            return DamageOutcome::Rejected;
        }

        let remaining = self.health.take_damage(amount);
        if self.health.is_dead() {
            self.die(physics);
            log::info!("Entity killed by {:.1} damage", amount);
            return DamageOutcome::Killed;
        }

        DamageOutcome::Damaged { remaining }
    }

    fn health(&self) -> f32 {
        self.health.current
    }

    fn max_health(&self) -> f32 {
        self.health.max
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn health_ratio(&self) -> f32 {
        self.health.percentage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Vec3;
    use physics::{RigidBodyHandle, SkeletonDesc};

    fn ragdolled(physics: &mut PhysicsWorld, max_health: f32) -> (DamageableEntity, RigidBodyHandle) {
        let root = physics.add_character_body(Vec3::new(0.0, 0.9, 0.0));
        physics.add_capsule_collider(root, 0.6, 0.3);
        let mut ragdoll =
            Ragdoll::build(physics, Some(root), Vec3::ZERO, &SkeletonDesc::humanoid()).unwrap();
        ragdoll.activate(physics, false);
        (DamageableEntity::new(max_health).with_ragdoll(ragdoll), root)
    }

    #[test]
    fn damage_subtracts_until_death() {
        let mut physics = PhysicsWorld::new();
        let (mut entity, _) = ragdolled(&mut physics, 100.0);

        assert_eq!(
            entity.apply_damage(60.0, &mut physics),
            DamageOutcome::Damaged { remaining: 40.0 }
        );
        assert!(!entity.ragdoll().unwrap().is_active());

        assert_eq!(entity.apply_damage(40.0, &mut physics), DamageOutcome::Killed);
        assert_eq!(entity.health(), 0.0);
        assert!(!entity.is_alive());
        assert!(entity.ragdoll().unwrap().is_active());
    }

    #[test]
    fn overkill_clamps_to_zero() {
        let mut physics = PhysicsWorld::new();
        let mut entity = DamageableEntity::new(15.0);
        assert!(entity.apply_damage(40.0, &mut physics).is_kill());
        assert_eq!(entity.health(), 0.0);
        assert_eq!(entity.health_ratio(), 0.0);
    }

    #[test]
    fn dead_entities_ignore_all_damage() {
        let mut physics = PhysicsWorld::new();
        let (mut entity, root) = ragdolled(&mut physics, 10.0);
        physics.set_body_velocity(root, Vec3::new(0.0, 0.0, 2.0));
        entity.apply_damage(10.0, &mut physics);

        let ragdoll_states = entity.ragdoll().unwrap().bone_states(&physics);
        assert_eq!(entity.apply_damage(5.0, &mut physics), DamageOutcome::Ignored);
        assert_eq!(entity.apply_damage(-5.0, &mut physics), DamageOutcome::Ignored);
        assert_eq!(entity.health(), 0.0);
        assert!(!entity.is_alive());
        assert_eq!(entity.ragdoll().unwrap().bone_states(&physics), ragdoll_states);
    }

    #[test]
    fn negative_and_nan_damage_are_rejected() {
        let mut physics = PhysicsWorld::new();
        let mut entity = DamageableEntity::new(50.0);
        assert_eq!(entity.apply_damage(-10.0, &mut physics), DamageOutcome::Rejected);
        assert_eq!(entity.apply_damage(f32::NAN, &mut physics), DamageOutcome::Rejected);
        assert_eq!(entity.health(), 50.0);
    }

    #[test]
    fn death_without_ragdoll_still_kills() {
        let mut physics = PhysicsWorld::new();
        let mut entity = DamageableEntity::new(1.0);
        assert!(entity.apply_damage(1.0, &mut physics).is_kill());
        assert!(!entity.is_alive());
        assert!(entity.ragdoll().is_none());
    }

    #[test]
    fn corpse_timer_starts_at_death() {
        let mut physics = PhysicsWorld::new();
        let mut entity = DamageableEntity::new(1.0).with_corpse_lifetime(1.0);
        assert!(!entity.tick_corpse(5.0));

        entity.apply_damage(2.0, &mut physics);
        assert!(!entity.tick_corpse(0.5));
        assert!(entity.tick_corpse(0.5));
    }
}
