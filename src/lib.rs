//! Puzzle World
//!
//! A 2D puzzle-physics environment built on rapier: named rigid objects,
//! sensor goals, composite shapes and dwell-time win conditions.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **geometry** - Pure math: extrusion, outlines, mass properties
//! 2. **physics** - rapier wrapper (bodies, shapes, collision tags, queries)
//! 3. **objects** - Typed shape objects and their builders
//! 4. **conditions** - Goal-condition state machines
//! 5. **world** - Object registry, step loop and collision routing
//! 6. **scene** - Plain-data scene export and import

pub mod color;
pub mod conditions;
pub mod error;
pub mod geometry;
pub mod objects;
pub mod physics;
pub mod scene;
pub mod world;

// Re-export commonly used types
pub use color::{ColorDesc, Rgba};

pub use conditions::{ConditionType, GoalCondition};

pub use error::{Result, WorldError};

pub use geometry::{find_outline, segments_to_polygons};

pub use objects::{
    Defaults, ObjectMut, ObjectParams, ObjectRef, ObjectType, ShapeKind, ShapeObject,
};

pub use physics::collider::{CollisionTag, CollisionTags};
pub use physics::contact::{ContactDetail, ContactPoint};

pub use scene::{BlockDesc, ConditionDesc, DefaultsDesc, ObjectDesc, SceneDesc};

pub use world::{
    filter_collision_events, CollisionEvent, CollisionPhase, ContactSpan, World, WorldConfig,
};

// Re-export glam for convenience
pub use glam;
