//! Thin wrapper around the rapier rigid-body engine.
//!
//! # Architecture
//!
//! Every sub-step runs:
//!
//! 1. Integrate bodies and detect contacts (rapier pipeline)
//! 2. Buffer begin/end notifications in an [`EventCollector`]
//! 3. Hand the buffered notifications back to the caller for routing
//!
//! Bodies get their mass and moment of inertia explicitly; every collider has
//! zero density so the engine never derives mass from geometry. Static
//! geometry is inserted as parent-less colliders, which act as the static
//! anchor.

pub mod collider;
pub mod contact;
pub mod events;

use glam::DVec2;
use rapier2d_f64::parry::query as parry_query;
use rapier2d_f64::prelude::{
    ActiveEvents, CCDSolver, CoefficientCombineRule, ColliderBuilder, ColliderHandle, ColliderSet,
    DefaultBroadPhase, ImpulseJointSet, IntegrationParameters, IslandManager, Isometry,
    MassProperties, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point, Real,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};

use self::collider::{to_point, CollisionTag, CollisionTags, Material, PreparedShape};
use self::contact::{ContactDetail, RawCollision};
use self::events::EventCollector;

/// Configuration for the wrapped engine.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Downward gravitational acceleration. Default: 9.8.
    pub gravity: f64,
    /// Fixed sub-step size in seconds. Default: 0.01.
    pub basic_timestep: f64,
    /// Interaction-group bits per collision tag.
    pub tags: CollisionTags,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            basic_timestep: 0.01,
            tags: CollisionTags::default(),
        }
    }
}

#[inline]
fn to_vector(v: DVec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

#[inline]
fn from_vector(v: &Vector<Real>) -> DVec2 {
    DVec2::new(v.x, v.y)
}

/// Owns the engine state: body and collider sets plus the stepping pipeline.
pub struct PhysicsEngine {
    tags: CollisionTags,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    events: EventCollector,
}

impl PhysicsEngine {
    /// Create an empty simulation space.
    pub fn new(config: &PhysicsConfig) -> Self {
        let params = IntegrationParameters {
            dt: config.basic_timestep,
            ..Default::default()
        };
        Self {
            tags: config.tags,
            gravity: Vector::new(0.0, -config.gravity),
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            events: EventCollector::new(),
        }
    }

    pub fn tags(&self) -> &CollisionTags {
        &self.tags
    }

    /// Downward gravity magnitude.
    pub fn gravity(&self) -> f64 {
        -self.gravity.y
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.gravity = Vector::new(0.0, -gravity);
        for (_, body) in self.bodies.iter_mut() {
            body.wake_up(true);
        }
    }

    /// Insert a dynamic body at `position` with explicit mass and moment.
    pub fn create_body(&mut self, position: DVec2, mass: f64, moment: f64) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .additional_mass_properties(MassProperties::new(Point::origin(), mass, moment))
            .build();
        let handle = self.bodies.insert(body);
        if let Some(b) = self.bodies.get_mut(handle) {
            b.recompute_mass_properties_from_colliders(&self.colliders);
        }
        handle
    }

    /// Attach a prepared shape to `parent`, or to the static anchor when `parent` is `None`.
    pub fn attach(
        &mut self,
        prepared: PreparedShape,
        material: Material,
        tag: CollisionTag,
        parent: Option<RigidBodyHandle>,
    ) -> ColliderHandle {
        let sensor = matches!(tag, CollisionTag::Sensor | CollisionTag::Blocked);
        let collider = ColliderBuilder::new(prepared.shape)
            .position(prepared.offset)
            .density(0.0)
            .restitution(material.elasticity)
            .friction(material.friction)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .friction_combine_rule(CoefficientCombineRule::Multiply)
            .sensor(sensor)
            .collision_groups(self.tags.interaction_groups(tag))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        match parent {
            Some(body) => {
                let handle = self
                    .colliders
                    .insert_with_parent(collider, body, &mut self.bodies);
                // Additional mass only reaches the effective mass on recompute.
                if let Some(b) = self.bodies.get_mut(body) {
                    b.recompute_mass_properties_from_colliders(&self.colliders);
                }
                handle
            }
            None => self.colliders.insert(collider),
        }
    }

    /// Advance the simulation by `dt` and return the notifications it produced.
    pub fn step(&mut self, dt: f64) -> Vec<RawCollision> {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.events,
        );
        self.events.drain()
    }

    /// Shape pairs currently in physical contact.
    pub fn touching_pairs(&self) -> Vec<(ColliderHandle, ColliderHandle, ContactDetail)> {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .map(|pair| (pair.collider1, pair.collider2, ContactDetail::from_pair(pair)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Body state
    // -----------------------------------------------------------------------

    pub fn body_position(&self, body: RigidBodyHandle) -> Option<DVec2> {
        self.bodies.get(body).map(|b| from_vector(b.translation()))
    }

    pub fn body_angle(&self, body: RigidBodyHandle) -> Option<f64> {
        self.bodies.get(body).map(|b| b.rotation().angle())
    }

    pub fn body_velocity(&self, body: RigidBodyHandle) -> Option<DVec2> {
        self.bodies.get(body).map(|b| from_vector(b.linvel()))
    }

    pub fn body_angular_velocity(&self, body: RigidBodyHandle) -> Option<f64> {
        self.bodies.get(body).map(|b| b.angvel())
    }

    pub fn set_body_pose(&mut self, body: RigidBodyHandle, position: DVec2, angle: f64) -> bool {
        match self.bodies.get_mut(body) {
            Some(b) => {
                b.set_position(Isometry::new(to_vector(position), angle), true);
                true
            }
            None => false,
        }
    }

    pub fn set_body_velocity(&mut self, body: RigidBodyHandle, velocity: DVec2) -> bool {
        match self.bodies.get_mut(body) {
            Some(b) => {
                b.set_linvel(to_vector(velocity), true);
                true
            }
            None => false,
        }
    }

    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: DVec2, point: DVec2) -> bool {
        match self.bodies.get_mut(body) {
            Some(b) => {
                b.apply_impulse_at_point(to_vector(impulse), to_point(point), true);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Collider queries
    // -----------------------------------------------------------------------

    pub fn set_material(&mut self, collider: ColliderHandle, material: Material) {
        if let Some(c) = self.colliders.get_mut(collider) {
            c.set_restitution(material.elasticity);
            c.set_friction(material.friction);
        }
    }

    pub fn contains_point(&self, collider: ColliderHandle, point: DVec2) -> bool {
        self.colliders
            .get(collider)
            .is_some_and(|c| c.shape().contains_point(c.position(), &to_point(point)))
    }

    /// Distance from `point` to the shape boundary, negative inside.
    pub fn distance_to_point(&self, collider: ColliderHandle, point: DVec2) -> Option<f64> {
        self.colliders
            .get(collider)
            .map(|c| c.shape().distance_to_point(c.position(), &to_point(point), false))
    }

    /// True if the two colliders currently overlap.
    pub fn colliders_intersect(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        match (self.colliders.get(a), self.colliders.get(b)) {
            (Some(ca), Some(cb)) => {
                parry_query::intersection_test(ca.position(), ca.shape(), cb.position(), cb.shape())
                    .unwrap_or_else(|err| {
                        tracing::warn!("unsupported shape pair in overlap test: {:?}", err);
                        false
                    })
            }
            _ => false,
        }
    }

    /// True if a probe shape placed at `position` overlaps any collider the
    /// `probe` tag interacts with. The probe is never inserted.
    pub fn probe_overlaps(
        &self,
        probe: &PreparedShape,
        position: DVec2,
        tag: CollisionTag,
    ) -> bool {
        let pose = Isometry::new(to_vector(position), 0.0) * probe.offset;
        let filter = self.tags.filter(tag);
        self.colliders.iter().any(|(_, c)| {
            if c.collision_groups().memberships.bits() & filter == 0 {
                return false;
            }
            parry_query::intersection_test(&pose, &*probe.shape, c.position(), c.shape())
                .unwrap_or_else(|err| {
                    tracing::warn!("unsupported shape pair in placement probe: {:?}", err);
                    false
                })
        })
    }
}
