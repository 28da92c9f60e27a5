//! Turns a fresh ragdoll into a damageable rig.

use crate::body_part::BodyPartProfile;
use crate::hitbox::{BodyPartHitbox, HitboxRegistry};
use hecs::Entity;
use physics::{PhysicsWorld, Ragdoll};

/// Put every bone on the hit layer with CCD, attach a hitbox bound to `owner`
/// with the multiplier `profile` assigns to the bone, then drop the ragdoll
/// into its animated baseline.
pub fn configure(
    physics: &mut PhysicsWorld,
    hitboxes: &mut HitboxRegistry,
    ragdoll: &mut Ragdoll,
    owner: Entity,
    profile: &BodyPartProfile,
) {
    ragdoll.assign_hit_layer(physics);

    for bone in ragdoll.bones() {
        let part = profile.resolve(&bone.name);
        let parent = bone
            .parent
            .and_then(|i| ragdoll.bones().get(i))
            .map(|parent| parent.body);
        log::trace!("Bone `{}` -> {} x{}", bone.name, part.label, part.multiplier);
        hitboxes.insert(
            bone.collider,
            bone.body,
            parent,
            BodyPartHitbox::new(bone.name.clone(), part).bound(owner),
        );
    }

    ragdoll.activate(physics, false);
}
