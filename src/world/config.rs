use glam::DVec2;

use crate::objects::Defaults;
use crate::physics::collider::CollisionTags;
use crate::physics::PhysicsConfig;

/// Construction parameters of a [`World`](super::World).
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Width and height of the play area.
    pub dims: DVec2,
    /// Downward gravitational acceleration.
    pub gravity: f64,
    /// Which boundary walls to build: left, bottom, right, top.
    pub closed_ends: [bool; 4],
    /// Fixed sub-step size in seconds.
    pub basic_timestep: f64,
    pub defaults: Defaults,
    pub tags: CollisionTags,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dims: DVec2::new(600.0, 600.0),
            gravity: 200.0,
            closed_ends: [true; 4],
            basic_timestep: 0.01,
            defaults: Defaults::default(),
            tags: CollisionTags::default(),
        }
    }
}

impl WorldConfig {
    pub fn new(dims: DVec2, gravity: f64) -> Self {
        Self {
            dims,
            gravity,
            ..Default::default()
        }
    }

    pub fn with_closed_ends(mut self, closed_ends: [bool; 4]) -> Self {
        self.closed_ends = closed_ends;
        self
    }

    pub fn with_basic_timestep(mut self, basic_timestep: f64) -> Self {
        self.basic_timestep = basic_timestep;
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub(crate) fn physics(&self) -> PhysicsConfig {
        PhysicsConfig {
            gravity: self.gravity,
            basic_timestep: self.basic_timestep,
            tags: self.tags,
        }
    }
}
