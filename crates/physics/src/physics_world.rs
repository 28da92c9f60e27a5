//! Physics world management with Rapier3D.

use crate::collision::CollisionGroup;
use engine_core::{Transform, Vec3};
use rapier3d::prelude::*;

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Set the fixed integration step in seconds.
    pub fn set_timestep(&mut self, dt: f32) {
        if dt > 0.0 {
            self.integration_parameters.dt = dt;
        }
    }

    /// Step the physics simulation.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic rigid body and return its handle.
    pub fn add_dynamic_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add an upright dynamic body for a character root (rotations locked).
    pub fn add_character_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a collider-less dynamic body that only integrates velocity and gravity.
    pub fn add_point_mass(&mut self, position: Vec3, velocity: Vec3, gravity_scale: f32) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .linvel(vector![velocity.x, velocity.y, velocity.z])
            .gravity_scale(gravity_scale)
            .additional_mass(0.01)
            .can_sleep(false)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a kinematic rigid body.
    pub fn add_kinematic_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a sphere collider to a rigid body.
    pub fn add_sphere_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        radius: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius).build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a capsule collider (good for characters).
    pub fn add_capsule_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        half_height: f32,
        radius: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(half_height, radius).build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(CollisionGroup::environment())
            .build();
        self.collider_set.insert(collider)
    }

    /// Move a collider to different collision groups.
    pub fn set_collision_groups(&mut self, handle: ColliderHandle, groups: InteractionGroups) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_collision_groups(groups);
        }
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: glam::Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                scale: Vec3::ONE,
            }
        })
    }

    /// World-space position of a rigid body.
    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Linear velocity of a rigid body.
    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let vel = body.linvel();
            Vec3::new(vel.x, vel.y, vel.z)
        })
    }

    /// Overwrite the linear velocity of a rigid body.
    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_mass_integrates_velocity() {
        let mut world = PhysicsWorld::new();
        world.set_timestep(0.1);
        let body = world.add_point_mass(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.0);
        world.step();
        let pos = world.body_translation(body).unwrap();
        assert!((pos.x - 1.0).abs() < 1e-3);
        assert!(pos.y.abs() < 1e-4);
    }

    #[test]
    fn point_mass_falls_with_gravity() {
        let mut world = PhysicsWorld::new();
        let body = world.add_point_mass(Vec3::ZERO, Vec3::ZERO, 1.0);
        for _ in 0..10 {
            world.step();
        }
        assert!(world.body_velocity(body).unwrap().y < 0.0);
    }

    #[test]
    fn remove_body_drops_colliders() {
        let mut world = PhysicsWorld::new();
        let body = world.add_character_body(Vec3::Y);
        let collider = world.add_capsule_collider(body, 0.5, 0.3);
        world.remove_body(body);
        assert!(world.rigid_body_set.get(body).is_none());
        assert!(world.collider_set.get(collider).is_none());
    }
}
