//! Ragdoll state for jointed bodies.
//!
//! A ragdoll is either carried by animation (every bone kinematic, no gravity,
//! trigger-only colliders) or fully physics-driven (every bone dynamic, gravity
//! on, solid colliders). The root body that moved the character while it was
//! animated is parked when the bones take over.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::{Transform, Vec3};
use rapier3d::prelude::*;
use thiserror::Error;

/// Errors raised while building a ragdoll from a skeleton description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RagdollError {
    #[error("skeleton has no bones")]
    EmptySkeleton,
    #[error("bone `{bone}` references parent {parent}, which is not an earlier bone")]
    InvalidParent { bone: String, parent: usize },
    #[error("root body does not exist in the physics world")]
    MissingRoot,
}

/// Locomotion mode of the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RagdollMode {
    /// Driven by the skeletal animation, bones follow kinematically
    #[default]
    Animated,
    /// Fully physics-driven
    Ragdoll,
}

/// Collision shape of a single bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoneShape {
    Capsule { half_height: f32, radius: f32 },
    Ball { radius: f32 },
}

/// One bone of a skeleton description.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneDesc {
    pub name: String,
    /// Index of the parent bone; must refer to an earlier entry.
    pub parent: Option<usize>,
    /// Bone center relative to the skeleton origin.
    pub offset: Vec3,
    pub shape: BoneShape,
}

/// Skeletal hierarchy used to create ragdoll bodies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonDesc {
    pub bones: Vec<BoneDesc>,
}

impl SkeletonDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone and return the builder.
    pub fn bone(
        mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        offset: Vec3,
        shape: BoneShape,
    ) -> Self {
        self.bones.push(BoneDesc {
            name: name.into(),
            parent,
            offset,
            shape,
        });
        self
    }

    /// An eleven-bone humanoid standing on its origin, about 1.8 units tall.
    pub fn humanoid() -> Self {
        let limb = |half_height, radius| BoneShape::Capsule { half_height, radius };
        Self::new()
            .bone("Hips", None, Vec3::new(0.0, 1.0, 0.0), limb(0.08, 0.12))
            .bone("Spine", Some(0), Vec3::new(0.0, 1.3, 0.0), limb(0.15, 0.1))
            .bone("Head", Some(1), Vec3::new(0.0, 1.65, 0.0), BoneShape::Ball { radius: 0.12 })
            .bone("LeftUpperArm", Some(1), Vec3::new(-0.3, 1.4, 0.0), limb(0.12, 0.05))
            .bone("LeftForearm", Some(3), Vec3::new(-0.55, 1.4, 0.0), limb(0.12, 0.045))
            .bone("RightUpperArm", Some(1), Vec3::new(0.3, 1.4, 0.0), limb(0.12, 0.05))
            .bone("RightForearm", Some(5), Vec3::new(0.55, 1.4, 0.0), limb(0.12, 0.045))
            .bone("LeftThigh", Some(0), Vec3::new(-0.12, 0.7, 0.0), limb(0.15, 0.07))
            .bone("LeftShin", Some(7), Vec3::new(-0.12, 0.3, 0.0), limb(0.15, 0.06))
            .bone("RightThigh", Some(0), Vec3::new(0.12, 0.7, 0.0), limb(0.15, 0.07))
            .bone("RightShin", Some(9), Vec3::new(0.12, 0.3, 0.0), limb(0.15, 0.06))
    }

    /// Check that the description can be turned into bodies.
    pub fn validate(&self) -> Result<(), RagdollError> {
        if self.bones.is_empty() {
            return Err(RagdollError::EmptySkeleton);
        }
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= i {
                    return Err(RagdollError::InvalidParent {
                        bone: bone.name.clone(),
                        parent,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A rigid segment of a ragdoll.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Snapshot of the physics flags of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneState {
    pub transform: Transform,
    pub velocity: Vec3,
    pub kinematic: bool,
    pub gravity: bool,
    /// False while the collider is trigger-only.
    pub solid: bool,
    /// Continuous collision detection.
    pub continuous: bool,
    pub groups: InteractionGroups,
}

/// Snapshot of the root body that carries an animated character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootState {
    pub kinematic: bool,
    pub gravity: bool,
    pub detects_collisions: bool,
}

/// Bones of one character plus the state machine that toggles them.
#[derive(Debug)]
pub struct Ragdoll {
    bones: Vec<Bone>,
    joints: Vec<ImpulseJointHandle>,
    root: Option<RigidBodyHandle>,
    mode: RagdollMode,
    animation_enabled: bool,
}

impl Ragdoll {
    /// Wrap bones the host already created.
    pub fn from_bones(bones: Vec<Bone>, root: Option<RigidBodyHandle>) -> Self {
        Self {
            bones,
            joints: Vec::new(),
            root,
            mode: RagdollMode::Animated,
            animation_enabled: true,
        }
    }

    /// Create one dynamic body per bone at `origin + offset` and joint each bone
    /// to its parent. Bones start out as plain dynamic bodies; call
    /// [`Ragdoll::activate`] with `false` to establish the animated baseline.
    pub fn build(
        physics: &mut PhysicsWorld,
        root: Option<RigidBodyHandle>,
        origin: Vec3,
        skeleton: &SkeletonDesc,
    ) -> Result<Self, RagdollError> {
        skeleton.validate()?;
        if let Some(root) = root {
            if physics.rigid_body_set.get(root).is_none() {
                return Err(RagdollError::MissingRoot);
            }
        }

        let mut bones = Vec::with_capacity(skeleton.bones.len());
        for desc in &skeleton.bones {
            let body = physics.add_dynamic_body(origin + desc.offset);
            let collider = match desc.shape {
                BoneShape::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
                BoneShape::Ball { radius } => ColliderBuilder::ball(radius),
            }
            .friction(0.8)
            .restitution(0.1)
            .density(1.0)
            .build();
            let collider =
                physics
                    .collider_set
                    .insert_with_parent(collider, body, &mut physics.rigid_body_set);

            bones.push(Bone {
                name: desc.name.clone(),
                parent: desc.parent,
                body,
                collider,
            });
        }

        let mut ragdoll = Self::from_bones(bones, root);
        ragdoll.create_joints(physics, skeleton);
        log::debug!("Built ragdoll with {} bones", ragdoll.bones.len());
        Ok(ragdoll)
    }

    fn create_joints(&mut self, physics: &mut PhysicsWorld, skeleton: &SkeletonDesc) {
        for (i, desc) in skeleton.bones.iter().enumerate() {
            let Some(parent) = desc.parent else {
                continue;
            };
            let anchor = desc.offset - skeleton.bones[parent].offset;

            let joint = SphericalJointBuilder::new()
                .local_anchor1(point![anchor.x, anchor.y, anchor.z])
                .local_anchor2(point![0.0, 0.0, 0.0])
                .limits(JointAxis::AngX, [-0.8, 0.8])
                .limits(JointAxis::AngY, [-0.5, 0.5])
                .limits(JointAxis::AngZ, [-0.8, 0.8])
                .contacts_enabled(false)
                .build();

            let handle = physics.impulse_joint_set.insert(
                self.bones[parent].body,
                self.bones[i].body,
                joint,
                true,
            );
            self.joints.push(handle);
        }
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn root(&self) -> Option<RigidBodyHandle> {
        self.root
    }

    pub fn mode(&self) -> RagdollMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode == RagdollMode::Ragdoll
    }

    /// Whether the skeletal animation driver should be running.
    pub fn animation_enabled(&self) -> bool {
        self.animation_enabled
    }

    /// Put every bone on the hit-detection layer with continuous collision detection.
    pub fn assign_hit_layer(&self, physics: &mut PhysicsWorld) {
        for bone in &self.bones {
            if let Some(body) = physics.rigid_body_set.get_mut(bone.body) {
                body.enable_ccd(true);
            }
            physics.set_collision_groups(bone.collider, CollisionGroup::hitbox());
        }
    }

    /// Switch between animated (`false`) and physics-driven (`true`) locomotion.
    ///
    /// Only bones whose gravity flag differs from `state` are touched, so
    /// repeated calls with the same value leave every bone as it is. Bones that
    /// go limp inherit the root body's velocity.
    pub fn activate(&mut self, physics: &mut PhysicsWorld, state: bool) {
        let root_velocity = self.root.and_then(|root| physics.body_velocity(root));
        let seeded = match (state, root_velocity) {
            (true, Some(v)) => v,
            _ => Vec3::ZERO,
        };

        let mut switched = 0;
        for bone in &self.bones {
            let Some(collider) = physics.collider_set.get_mut(bone.collider) else {
                continue;
            };
            let Some(body) = physics.rigid_body_set.get_mut(bone.body) else {
                continue;
            };
            if (body.gravity_scale() > 0.0) == state {
                continue;
            }

            collider.set_sensor(!state);
            let body_type = if state {
                RigidBodyType::Dynamic
            } else {
                RigidBodyType::KinematicPositionBased
            };
            body.set_body_type(body_type, true);
            body.set_gravity_scale(if state { 1.0 } else { 0.0 }, true);
            body.set_linvel(vector![seeded.x, seeded.y, seeded.z], true);
            switched += 1;
        }

        self.animation_enabled = !state;

        if let Some(root) = self.root {
            let colliders = match physics.rigid_body_set.get_mut(root) {
                Some(body) => {
                    body.set_gravity_scale(if state { 0.0 } else { 1.0 }, true);
                    let body_type = if state {
                        RigidBodyType::KinematicPositionBased
                    } else {
                        RigidBodyType::Dynamic
                    };
                    body.set_body_type(body_type, true);
                    body.colliders().to_vec()
                }
                None => Vec::new(),
            };
            for handle in colliders {
                if let Some(collider) = physics.collider_set.get_mut(handle) {
                    collider.set_enabled(!state);
                }
            }
        }

        self.mode = if state {
            RagdollMode::Ragdoll
        } else {
            RagdollMode::Animated
        };
        log::trace!("Ragdoll set to {:?}, {} bones switched", self.mode, switched);
    }

    /// Physics flags of bone `index`, if its body and collider still exist.
    pub fn bone_state(&self, physics: &PhysicsWorld, index: usize) -> Option<BoneState> {
        let bone = self.bones.get(index)?;
        let body = physics.rigid_body_set.get(bone.body)?;
        let collider = physics.collider_set.get(bone.collider)?;
        let vel = body.linvel();
        Some(BoneState {
            transform: physics.get_body_transform(bone.body)?,
            velocity: Vec3::new(vel.x, vel.y, vel.z),
            kinematic: body.is_kinematic(),
            gravity: body.gravity_scale() > 0.0,
            solid: !collider.is_sensor(),
            continuous: body.is_ccd_enabled(),
            groups: collider.collision_groups(),
        })
    }

    pub fn bone_states(&self, physics: &PhysicsWorld) -> Vec<BoneState> {
        (0..self.bones.len())
            .filter_map(|i| self.bone_state(physics, i))
            .collect()
    }

    /// Flags of the root body, if there is one.
    pub fn root_state(&self, physics: &PhysicsWorld) -> Option<RootState> {
        let body = physics.rigid_body_set.get(self.root?)?;
        let detects_collisions = body
            .colliders()
            .iter()
            .filter_map(|&c| physics.collider_set.get(c))
            .any(|c| c.is_enabled());
        Some(RootState {
            kinematic: body.is_kinematic(),
            gravity: body.gravity_scale() > 0.0,
            detects_collisions,
        })
    }

    /// Release every bone body, collider and joint. The root body is left to
    /// whoever created it.
    pub fn remove(self, physics: &mut PhysicsWorld) {
        for bone in &self.bones {
            physics.remove_body(bone.body);
        }
        log::debug!("Released ragdoll with {} bones", self.bones.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (PhysicsWorld, Ragdoll, RigidBodyHandle) {
        let mut physics = PhysicsWorld::new();
        let root = physics.add_character_body(Vec3::new(0.0, 0.9, 0.0));
        physics.add_capsule_collider(root, 0.6, 0.3);
        let ragdoll = Ragdoll::build(&mut physics, Some(root), Vec3::ZERO, &SkeletonDesc::humanoid())
            .expect("humanoid skeleton is valid");
        (physics, ragdoll, root)
    }

    #[test]
    fn build_creates_bodies_and_joints() {
        let (physics, ragdoll, _) = rig();
        assert_eq!(ragdoll.bones().len(), 11);
        assert_eq!(ragdoll.joint_count(), 10);
        assert_eq!(physics.impulse_joint_set.len(), 10);
        assert_eq!(ragdoll.mode(), RagdollMode::Animated);
    }

    #[test]
    fn invalid_skeletons_are_rejected() {
        let mut physics = PhysicsWorld::new();
        let empty = Ragdoll::build(&mut physics, None, Vec3::ZERO, &SkeletonDesc::new());
        assert_eq!(empty.unwrap_err(), RagdollError::EmptySkeleton);

        let forward_ref = SkeletonDesc::new().bone("a", Some(0), Vec3::ZERO, BoneShape::Ball { radius: 0.1 });
        assert!(matches!(
            forward_ref.validate(),
            Err(RagdollError::InvalidParent { parent: 0, .. })
        ));
    }

    #[test]
    fn deactivate_makes_bones_kinematic_triggers() {
        let (mut physics, mut ragdoll, root) = rig();
        ragdoll.activate(&mut physics, false);

        for state in ragdoll.bone_states(&physics) {
            assert!(state.kinematic);
            assert!(!state.gravity);
            assert!(!state.solid);
        }
        assert!(ragdoll.animation_enabled());
        let root_state = ragdoll.root_state(&physics).unwrap();
        assert!(!root_state.kinematic);
        assert!(root_state.gravity);
        assert!(root_state.detects_collisions);
        assert!(physics.rigid_body_set.get(root).is_some());
    }

    #[test]
    fn activate_inherits_root_velocity() {
        let (mut physics, mut ragdoll, root) = rig();
        ragdoll.activate(&mut physics, false);
        physics.set_body_velocity(root, Vec3::new(3.0, 0.0, -1.0));

        ragdoll.activate(&mut physics, true);

        assert!(ragdoll.is_active());
        assert!(!ragdoll.animation_enabled());
        for state in ragdoll.bone_states(&physics) {
            assert!(!state.kinematic);
            assert!(state.gravity);
            assert!(state.solid);
            assert!((state.velocity - Vec3::new(3.0, 0.0, -1.0)).length() < 1e-5);
        }
        let root_state = ragdoll.root_state(&physics).unwrap();
        assert!(root_state.kinematic);
        assert!(!root_state.gravity);
        assert!(!root_state.detects_collisions);
    }

    #[test]
    fn activate_twice_matches_once() {
        let (mut physics, mut ragdoll, root) = rig();
        ragdoll.activate(&mut physics, false);
        physics.set_body_velocity(root, Vec3::X);
        ragdoll.activate(&mut physics, true);
        let once = ragdoll.bone_states(&physics);

        // a second call must not reseed from the (now parked) root
        physics.set_body_velocity(root, Vec3::ZERO);
        ragdoll.activate(&mut physics, true);
        assert_eq!(ragdoll.bone_states(&physics), once);
    }

    #[test]
    fn hit_layer_enables_ccd() {
        let (mut physics, ragdoll, _) = rig();
        ragdoll.assign_hit_layer(&mut physics);
        for state in ragdoll.bone_states(&physics) {
            assert!(state.continuous);
            assert_eq!(state.groups, CollisionGroup::hitbox());
        }
    }

    #[test]
    fn remove_releases_bones_only() {
        let (mut physics, ragdoll, root) = rig();
        let bodies_before = physics.rigid_body_set.len();
        ragdoll.remove(&mut physics);
        assert_eq!(physics.rigid_body_set.len(), bodies_before - 11);
        assert_eq!(physics.impulse_joint_set.len(), 0);
        assert!(physics.rigid_body_set.get(root).is_some());
    }
}
