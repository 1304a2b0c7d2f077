//! Physics simulation using `Rapier2D` for a top-down world.

use parking_lot::Mutex;
use rapier2d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for one frame of simulation (50Hz).
pub const PHYSICS_DT: f32 = 1.0 / 50.0;

/// Number of equal substeps a frame is divided into for stability.
pub const SUBSTEPS: u32 = 5;

/// Linear damping applied to every dynamic body, approximating floor
/// friction in a top-down view (~80% velocity retention per second).
pub const LINEAR_DAMPING: f32 = 0.22;

/// Angular damping applied to every dynamic body.
pub const ANGULAR_DAMPING: f32 = 0.22;

/// Error type for physics configuration.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("non-positive timestep: {0}")]
    InvalidTimestep(f32),
}

/// Collects collision-begin events emitted during a step.
///
/// Rapier reports both solid-solid contact starts and sensor overlap starts
/// as `CollisionEvent::Started`, once per new pair; a pair that separates
/// and re-touches yields a fresh event.
#[derive(Default)]
struct BeginEventCollector {
    begun: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl EventHandler for BeginEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, _) = event {
            self.begun.lock().push((a, b));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world containing all `Rapier2D` components.
///
/// Gravity is zero throughout: this is a top-down game, and all slowdown
/// comes from per-body damping and contact friction.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
    events: BeginEventCollector,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new zero-gravity physics world stepping at the substep rate.
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT / SUBSTEPS as f32,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::ZERO,
            frame: 0,
            events: BeginEventCollector::default(),
        }
    }

    /// Reconfigures the integration timestep.
    pub fn set_timestep(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        self.integration_parameters.dt = dt;
        Ok(())
    }

    /// Returns the configured integration timestep.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Advances the simulation by one substep.
    ///
    /// Returns the collider pairs whose overlap began during this step, in
    /// the order the narrow phase reported them: solid-solid contact starts
    /// and sensor overlap starts alike. Sensors never produce a physical
    /// response; solid pairs are resolved as inelastic Coulomb contacts.
    pub fn step(&mut self) -> Vec<(ColliderHandle, ColliderHandle)> {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &self.events,
        );
        self.frame += 1;
        std::mem::take(&mut *self.events.begun.lock())
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Adds a collider without a parent (static geometry).
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Adds an impulse joint between two bodies.
    pub fn add_impulse_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
    ) -> ImpulseJointHandle {
        self.impulse_joint_set.insert(body1, body2, joint, true)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Removes a collider. Returns false if it was already gone, so removal
    /// is safe to repeat.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> bool {
        self.collider_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            )
            .is_some()
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Gets a mutable reference to a rigid body.
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Computes a deterministic hash of the current physics state, used to
    /// verify that two builds of the same layout are indistinguishable.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);

            let rot = body.rotation().angle();
            hash_f32(rot, &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);

            let angvel = body.angvel();
            hash_f32(angvel, &mut hasher);
        }

        hasher.finish()
    }

    /// Returns the current simulation step count.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}
