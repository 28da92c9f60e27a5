//! Scene driver tying physics, targets, projectiles and hitboxes together.
//!
//! The host calls [`CombatWorld::fixed_update`] once per physics tick and
//! [`CombatWorld::frame_update`] once per rendered frame, both from the same
//! thread.

use crate::body_part::BodyPartProfile;
use crate::config::CombatConfig;
use crate::damageable::{DamageOutcome, Damageable, DamageableEntity};
use crate::error::CombatError;
use crate::health_bar::HealthBar;
use crate::hitbox::{DamageRouter, HitboxRegistry};
use crate::projectile::{ProjectileHit, ProjectileHitDetector, ProjectileStatus};
use crate::rig;
use crate::weapon::ProjectileSpawn;
use engine_core::Vec3;
use hecs::{Entity, World};
use physics::{CollisionGroup, PhysicsBody, PhysicsWorld, Ragdoll, RagdollMode, RigidBodyHandle, SkeletonDesc};

/// Half height of the capsule that carries an animated target.
const ROOT_HALF_HEIGHT: f32 = 0.6;
const ROOT_RADIUS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u64);

#[derive(Debug)]
struct Projectile {
    id: ProjectileId,
    body: RigidBodyHandle,
    detector: ProjectileHitDetector,
}

/// What happened during one fixed tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub hits: Vec<(ProjectileId, ProjectileHit)>,
    pub expired: Vec<ProjectileId>,
    pub kills: Vec<Entity>,
}

pub struct CombatWorld {
    pub physics: PhysicsWorld,
    pub world: World,
    pub hitboxes: HitboxRegistry,
    config: CombatConfig,
    profile: BodyPartProfile,
    projectiles: Vec<Projectile>,
    next_projectile: u64,
}

impl CombatWorld {
    pub fn new(config: CombatConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        let rate = config.physics.fixed_rate_hz;
        if rate > 0.0 && rate <= engine_core::MAX_FIXED_RATE_HZ {
            physics.set_timestep((1.0 / rate) as f32);
        }
        Self {
            physics,
            world: World::new(),
            hitboxes: HitboxRegistry::new(),
            profile: config.profile(),
            config,
            projectiles: Vec::new(),
            next_projectile: 0,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Add an infinite floor at y = 0.
    pub fn add_ground(&mut self) {
        self.physics.add_ground_plane();
    }

    /// Spawn a standing target whose feet are at `position`.
    pub fn spawn_target(
        &mut self,
        position: Vec3,
        skeleton: &SkeletonDesc,
    ) -> Result<Entity, CombatError> {
        let root = self
            .physics
            .add_character_body(position + Vec3::Y * (ROOT_HALF_HEIGHT + ROOT_RADIUS));
        let root_collider = self
            .physics
            .add_capsule_collider(root, ROOT_HALF_HEIGHT, ROOT_RADIUS);
        self.physics
            .set_collision_groups(root_collider, CollisionGroup::character());

        let mut ragdoll = match Ragdoll::build(&mut self.physics, Some(root), position, skeleton) {
            Ok(ragdoll) => ragdoll,
            Err(err) => {
                self.physics.remove_body(root);
                return Err(err.into());
            }
        };

        let entity = self.world.reserve_entity();
        rig::configure(
            &mut self.physics,
            &mut self.hitboxes,
            &mut ragdoll,
            entity,
            &self.profile,
        );

        let target = &self.config.target;
        let mut damageable = DamageableEntity::new(target.max_health).with_ragdoll(ragdoll);
        if let Some(seconds) = target.corpse_lifetime {
            damageable = damageable.with_corpse_lifetime(seconds);
        }
        let bar = HealthBar::new(
            self.config.health_bar.hide_when_full,
            self.config.health_bar.hide_delay,
        );
        self.world.spawn_at(
            entity,
            (PhysicsBody::with_collider(root, root_collider), damageable, bar),
        );

        log::info!("Spawned target {:?} at {:?} with {} bones", entity, position, skeleton.bones.len());
        Ok(entity)
    }

    /// Put a projectile into the world. It starts moving on the next fixed tick.
    pub fn spawn_projectile(&mut self, spawn: ProjectileSpawn) -> ProjectileId {
        let body = self.physics.add_point_mass(
            spawn.origin,
            spawn.velocity(),
            self.config.projectile.gravity_scale,
        );
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        self.projectiles.push(Projectile {
            id,
            body,
            detector: ProjectileHitDetector::new(spawn.origin, spawn.damage, spawn.ttl),
        });
        id
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn projectile_position(&self, id: ProjectileId) -> Option<Vec3> {
        let projectile = self.projectiles.iter().find(|p| p.id == id)?;
        self.physics.body_translation(projectile.body)
    }

    /// Damage a target directly (melee, explosions, scripted hazards).
    pub fn apply_damage(&mut self, target: Entity, amount: f32) -> Option<DamageOutcome> {
        let outcome = self
            .world
            .damageable(target)
            .map(|damageable| damageable.apply_damage(amount, &mut self.physics))?;
        if matches!(outcome, DamageOutcome::Damaged { .. }) {
            self.show_hit(target);
        }
        Some(outcome)
    }

    fn show_hit(&mut self, target: Entity) {
        if let Ok(mut bar) = self.world.get::<&mut HealthBar>(target) {
            bar.on_hit();
        }
    }

    /// Step physics, then run hit detection for every projectile in flight.
    pub fn fixed_update(&mut self, dt: f32) -> TickReport {
        self.physics.set_timestep(dt);
        self.physics.step();

        let mut report = TickReport::default();
        let physics = &mut self.physics;
        let hitboxes = &mut self.hitboxes;
        let world = &mut self.world;

        let mut struck = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            let Some(position) = physics.body_translation(projectile.body) else {
                log::warn!("Projectile {:?} lost its body", projectile.id);
                return false;
            };

            match projectile.detector.detect(position, dt, physics, hitboxes, world) {
                ProjectileStatus::InFlight => return true,
                ProjectileStatus::Hit(hit) => {
                    match (hit.owner, hit.outcome) {
                        (Some(owner), Some(DamageOutcome::Killed)) => report.kills.push(owner),
                        (Some(owner), Some(DamageOutcome::Damaged { .. })) => struck.push(owner),
                        _ => {}
                    }
                    report.hits.push((projectile.id, hit));
                }
                ProjectileStatus::Expired => report.expired.push(projectile.id),
            }
            physics.remove_body(projectile.body);
            false
        });

        for owner in struck {
            self.show_hit(owner);
        }

        report
    }

    /// Refresh health bars and clear out corpses whose time is up. Returns the
    /// despawned targets.
    pub fn frame_update(&mut self, dt: f32) -> Vec<Entity> {
        let mut finished = Vec::new();
        for (entity, (damageable, bar)) in self
            .world
            .query_mut::<(&mut DamageableEntity, Option<&mut HealthBar>)>()
        {
            if let Some(bar) = bar {
                bar.observe(
                    damageable.health(),
                    damageable.max_health(),
                    damageable.is_alive(),
                    dt,
                );
            }
            if damageable.tick_corpse(dt) {
                finished.push(entity);
            }
        }

        for &entity in &finished {
            log::info!("Removing corpse {:?}", entity);
            self.despawn_target(entity);
        }
        finished
    }

    /// Remove a target and release its bones, hitboxes and root body.
    pub fn despawn_target(&mut self, target: Entity) -> bool {
        if let Ok(mut damageable) = self.world.remove_one::<DamageableEntity>(target) {
            if let Some(ragdoll) = damageable.take_ragdoll() {
                ragdoll.remove(&mut self.physics);
            }
        }
        if let Ok(root) = self.world.get::<&PhysicsBody>(target).map(|body| *body) {
            self.physics.remove_body(root.rigid_body);
        }
        self.hitboxes.remove_owner(target);
        self.world.despawn(target).is_ok()
    }

    pub fn health(&self, target: Entity) -> Option<f32> {
        self.world
            .get::<&DamageableEntity>(target)
            .ok()
            .map(|damageable| damageable.health())
    }

    pub fn is_alive(&self, target: Entity) -> bool {
        self.world
            .get::<&DamageableEntity>(target)
            .is_ok_and(|damageable| damageable.is_alive())
    }

    pub fn ragdoll_mode(&self, target: Entity) -> Option<RagdollMode> {
        let damageable = self.world.get::<&DamageableEntity>(target).ok()?;
        damageable.ragdoll().map(|ragdoll| ragdoll.mode())
    }

    pub fn health_bar(&self, target: Entity) -> Option<HealthBar> {
        self.world
            .get::<&HealthBar>(target)
            .ok()
            .map(|bar| (*bar).clone())
    }

    /// Hitbox collider of the bone called `bone` on `target`.
    pub fn bone_collider(&self, target: Entity, bone: &str) -> Option<physics::ColliderHandle> {
        self.hitboxes
            .iter()
            .find(|(_, hitbox)| hitbox.owner() == Some(target) && hitbox.bone() == bone)
            .map(|(collider, _)| collider)
    }

    /// World position of the bone called `bone` on `target`.
    pub fn bone_position(&self, target: Entity, bone: &str) -> Option<Vec3> {
        let collider = self.bone_collider(target, bone)?;
        let body = self.physics.collider_set.get(collider)?.parent()?;
        self.physics.body_translation(body)
    }
}
