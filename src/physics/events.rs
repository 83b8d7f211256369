//! Collects engine collision notifications during a sub-step.

use std::sync::{Mutex, PoisonError};

use rapier2d_f64::prelude::{
    ColliderSet, CollisionEvent, ContactPair, EventHandler, Real, RigidBodySet,
};

use super::contact::{ContactDetail, RawCollision};

/// Buffers begin/end notifications so they can be routed after the engine
/// step returns, when the scene may be borrowed again.
#[derive(Default)]
pub struct EventCollector {
    queue: Mutex<Vec<RawCollision>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notification received since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<RawCollision> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let detail = contact_pair
            .map(ContactDetail::from_pair)
            .unwrap_or_default();
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RawCollision {
                collider1: event.collider1(),
                collider2: event.collider2(),
                started: event.started(),
                detail,
            });
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
