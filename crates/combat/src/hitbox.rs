//! Bone-bound hit receivers and the lookup from struck colliders to them.

use crate::body_part::BodyPart;
use crate::damageable::{DamageOutcome, Damageable, DamageableEntity};
use hecs::{Entity, World};
use physics::{ColliderHandle, PhysicsWorld, RigidBodyHandle};
use std::collections::HashMap;

/// Resolves a hitbox owner to something that can take damage.
pub trait DamageRouter {
    fn damageable(&mut self, owner: Entity) -> Option<&mut dyn Damageable>;
}

impl DamageRouter for World {
    fn damageable(&mut self, owner: Entity) -> Option<&mut dyn Damageable> {
        self.query_one_mut::<&mut DamageableEntity>(owner)
            .ok()
            .map(|entity| entity as &mut dyn Damageable)
    }
}

/// Converts raw impact damage on one bone into scaled damage for its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartHitbox {
    bone: String,
    owner: Option<Entity>,
    part: BodyPart,
    last_damage: f32,
}

impl BodyPartHitbox {
    /// A hitbox that is not yet bound to an owner.
    pub fn new(bone: impl Into<String>, part: BodyPart) -> Self {
        Self {
            bone: bone.into(),
            owner: None,
            part,
            last_damage: 0.0,
        }
    }

    pub fn bound(mut self, owner: Entity) -> Self {
        self.bind(owner);
        self
    }

    pub fn bind(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }

    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn bone(&self) -> &str {
        &self.bone
    }

    pub fn label(&self) -> &str {
        &self.part.label
    }

    pub fn multiplier(&self) -> f32 {
        self.part.multiplier
    }

    /// Scaled damage from the most recent hit.
    pub fn last_damage(&self) -> f32 {
        self.last_damage
    }

    /// Scale `raw_damage` by this bone's multiplier and hand it to the owner.
    ///
    /// Returns `None` when there is nobody to forward to; that is logged and
    /// otherwise ignored.
    pub fn receive_hit<R>(
        &mut self,
        raw_damage: f32,
        router: &mut R,
        physics: &mut PhysicsWorld,
    ) -> Option<DamageOutcome>
    where
        R: DamageRouter + ?Sized,
    {
        self.last_damage = raw_damage * self.part.multiplier;
        log::debug!(
            "{} ({}): {} * {} = {}",
            self.bone,
            self.part.label,
            raw_damage,
            self.part.multiplier,
            self.last_damage
        );

        let Some(owner) = self.owner else {
            log::error!("Hitbox on bone `{}` has no owner; was the rig configured?", self.bone);
            return None;
        };
        let Some(target) = router.damageable(owner) else {
            log::warn!("Owner {:?} of bone `{}` is gone or not damageable", owner, self.bone);
            return None;
        };
        Some(target.apply_damage(self.last_damage, physics))
    }
}

#[derive(Debug, Clone)]
struct Slot {
    hitbox: BodyPartHitbox,
    body: RigidBodyHandle,
}

/// All hitboxes in a scene, keyed by bone collider.
///
/// A struck collider resolves to its own hitbox if it has one; otherwise the
/// search walks up through the collider's body and that body's ancestors.
#[derive(Debug, Default)]
pub struct HitboxRegistry {
    slots: HashMap<ColliderHandle, Slot>,
    by_body: HashMap<RigidBodyHandle, ColliderHandle>,
    parents: HashMap<RigidBodyHandle, RigidBodyHandle>,
}

impl HitboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `hitbox` to the bone whose collider is `collider` on `body`.
    pub fn insert(
        &mut self,
        collider: ColliderHandle,
        body: RigidBodyHandle,
        parent: Option<RigidBodyHandle>,
        hitbox: BodyPartHitbox,
    ) {
        self.by_body.insert(body, collider);
        if let Some(parent) = parent {
            self.parents.insert(body, parent);
        }
        self.slots.insert(collider, Slot { hitbox, body });
    }

    /// Record that `child` hangs off `parent` without carrying a hitbox itself
    /// (props, armour plates, extra collision bodies).
    pub fn link(&mut self, child: RigidBodyHandle, parent: RigidBodyHandle) {
        self.parents.insert(child, parent);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, collider: ColliderHandle) -> Option<&BodyPartHitbox> {
        self.slots.get(&collider).map(|slot| &slot.hitbox)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderHandle, &BodyPartHitbox)> {
        self.slots.iter().map(|(&collider, slot)| (collider, &slot.hitbox))
    }

    /// Find the hitbox responsible for a struck collider.
    pub fn resolve(
        &mut self,
        collider: ColliderHandle,
        physics: &PhysicsWorld,
    ) -> Option<&mut BodyPartHitbox> {
        let key = self.lookup(collider, physics)?;
        self.slots.get_mut(&key).map(|slot| &mut slot.hitbox)
    }

    fn lookup(&self, collider: ColliderHandle, physics: &PhysicsWorld) -> Option<ColliderHandle> {
        if self.slots.contains_key(&collider) {
            return Some(collider);
        }

        let mut body = physics.collider_set.get(collider)?.parent()?;
        // bounded so a bad link cannot spin forever
        for _ in 0..=self.parents.len() {
            if let Some(&key) = self.by_body.get(&body) {
                return Some(key);
            }
            body = *self.parents.get(&body)?;
        }
        None
    }

    /// Drop every hitbox bound to `owner`. Returns how many were removed.
    pub fn remove_owner(&mut self, owner: Entity) -> usize {
        let bodies: Vec<RigidBodyHandle> = self
            .slots
            .values()
            .filter(|slot| slot.hitbox.owner == Some(owner))
            .map(|slot| slot.body)
            .collect();

        self.slots.retain(|_, slot| slot.hitbox.owner != Some(owner));
        for body in &bodies {
            self.by_body.remove(body);
            self.parents.remove(body);
        }
        self.parents.retain(|_, parent| !bodies.contains(parent));
        bodies.len()
    }
}
