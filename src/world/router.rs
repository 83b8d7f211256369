//! Routing of engine collision notifications to named objects.

use rapier2d_f64::prelude::ColliderHandle;

use super::{CollisionEvent, CollisionPhase, Registry, World};
use crate::objects::ObjectRef;
use crate::physics::collider::CollisionTag;
use crate::physics::contact::{ContactDetail, RawCollision};

/// A notification resolved to the objects involved.
enum Route {
    /// Two solid (or placed and solid) objects.
    Solid { first: String, second: String },
    /// A solid object and the sensor region it overlaps.
    Goal { object: String, goal: String },
}

#[derive(Clone, Copy)]
enum Solve {
    Pre,
    Post,
}

impl World {
    /// Run one engine sub-step and route everything it produced.
    pub(super) fn substep(&mut self, dt: f64) {
        if self.listeners.solid_pre.is_some() {
            self.fire_solve(Solve::Pre);
        }
        for raw in self.engine.step(dt) {
            self.route(raw);
        }
        if self.listeners.solid_post.is_some() {
            self.fire_solve(Solve::Post);
        }
    }

    fn classify(&self, c1: ColliderHandle, c2: ColliderHandle) -> Option<Route> {
        let a = self.owners.get(&c1)?;
        let b = self.owners.get(&c2)?;
        if a.registry != Registry::Object || b.registry != Registry::Object || a.name == b.name {
            return None;
        }
        use CollisionTag::*;
        match (a.tag, b.tag) {
            (Solid, Solid) | (Solid, Placed) | (Placed, Solid) => Some(Route::Solid {
                first: a.name.clone(),
                second: b.name.clone(),
            }),
            (Solid | Placed, Sensor) => Some(Route::Goal {
                object: a.name.clone(),
                goal: b.name.clone(),
            }),
            (Sensor, Solid | Placed) => Some(Route::Goal {
                object: b.name.clone(),
                goal: a.name.clone(),
            }),
            _ => None,
        }
    }

    pub(super) fn route(&mut self, raw: RawCollision) {
        let phase = if raw.started {
            CollisionPhase::Begin
        } else {
            CollisionPhase::End
        };
        match self.classify(raw.collider1, raw.collider2) {
            Some(Route::Solid { first, second }) => {
                self.route_solid(&first, &second, phase, raw.detail)
            }
            Some(Route::Goal { object, goal }) => self.route_goal(&object, &goal, phase),
            None => {}
        }
    }

    fn route_solid(
        &mut self,
        first: &str,
        second: &str,
        phase: CollisionPhase,
        mut detail: ContactDetail,
    ) {
        let (Some(a), Some(b)) = (self.objects.get(first), self.objects.get(second)) else {
            return;
        };
        tracing::trace!(first, second, %phase, time = self.time, "solid collision");

        if !(a.is_static() && b.is_static()) {
            detail.restitution = a.elasticity() * b.elasticity();
            self.log.push(CollisionEvent {
                first: first.to_string(),
                second: second.to_string(),
                phase,
                time: self.time,
                detail,
            });
        }

        let listener = match phase {
            CollisionPhase::Begin => self.listeners.solid_begin.as_mut(),
            CollisionPhase::End => self.listeners.solid_end.as_mut(),
        };
        if let Some(f) = listener {
            f(ObjectRef::new(a, &self.engine), ObjectRef::new(b, &self.engine));
        }

        if let Some(condition) = self.goal.as_mut() {
            match phase {
                CollisionPhase::Begin => condition.touch_begin(first, second, self.time),
                CollisionPhase::End => condition.touch_end(first, second),
            }
        }
    }

    fn route_goal(&mut self, object: &str, goal: &str, phase: CollisionPhase) {
        let (Some(o), Some(g)) = (self.objects.get(object), self.objects.get(goal)) else {
            return;
        };
        tracing::trace!(object, goal, %phase, time = self.time, "goal overlap");

        let o_ref = ObjectRef::new(o, &self.engine);
        let g_ref = ObjectRef::new(g, &self.engine);
        let still_inside = phase == CollisionPhase::End
            && o_ref.position().is_ok_and(|p| g_ref.point_in(p));

        let listener = match phase {
            CollisionPhase::Begin => self.listeners.goal_begin.as_mut(),
            CollisionPhase::End => self.listeners.goal_end.as_mut(),
        };
        if let Some(f) = listener {
            f(o_ref, g_ref);
        }

        if let Some(condition) = self.goal.as_mut() {
            match phase {
                CollisionPhase::Begin => condition.goal_begin(object, goal, self.time),
                CollisionPhase::End => condition.goal_end(object, goal, still_inside),
            }
        }
    }

    /// Fire the pre- or post-solve listener for every touching solid pair.
    fn fire_solve(&mut self, solve: Solve) {
        for (c1, c2, _) in self.engine.touching_pairs() {
            let Some(Route::Solid { first, second }) = self.classify(c1, c2) else {
                continue;
            };
            let (Some(a), Some(b)) = (self.objects.get(&first), self.objects.get(&second)) else {
                continue;
            };
            let listener = match solve {
                Solve::Pre => self.listeners.solid_pre.as_mut(),
                Solve::Post => self.listeners.solid_post.as_mut(),
            };
            if let Some(f) = listener {
                f(ObjectRef::new(a, &self.engine), ObjectRef::new(b, &self.engine));
            }
        }
    }
}
