//! The simulation world: named objects, boundary walls, goal conditions and
//! the fixed sub-step loop.
//!
//! # Architecture
//!
//! Every call to [`World::step`] runs:
//!
//! 1. Advance the clock by the requested `dt`
//! 2. Split `dt` into whole base timesteps plus a remainder
//! 3. For each sub-step: fire pre-solve listeners, step the engine, route the
//!    buffered begin/end notifications, fire post-solve listeners
//! 4. After each sub-step, check the goal condition and fire the win listener
//!
//! Routing happens after the engine returns, so listeners never observe the
//! engine mid-step.

pub mod config;
pub mod events;
mod router;

use std::collections::{BTreeMap, HashMap};

use glam::DVec2;
use rapier2d_f64::prelude::ColliderHandle;

use crate::color::Rgba;
use crate::conditions::GoalCondition;
use crate::error::{Result, WorldError};
use crate::geometry::box_vertices;
use crate::objects::{
    composite, region, simple, Assembly, ObjectMut, ObjectParams, ObjectRef, ShapeObject,
};
use crate::physics::collider::{CollisionTag, ShapeSpec};
use crate::physics::PhysicsEngine;

pub use config::WorldConfig;
pub use events::{
    filter_collision_events, CollisionEvent, CollisionPhase, ContactSpan, DEFAULT_SLOP_TIME,
};

/// Remainders shorter than this fraction of a base timestep are not simulated.
const REMAINDER_THRESHOLD: f64 = 0.01;

/// Callback receiving the two objects of a routed collision.
pub type PairListener = Box<dyn FnMut(ObjectRef<'_>, ObjectRef<'_>)>;
/// Callback receiving the simulation clock whenever the goal condition is won.
pub type WinListener = Box<dyn FnMut(f64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registry {
    Object,
    Blocker,
}

/// Which named object owns an engine collider, and in what role.
#[derive(Debug, Clone)]
struct Owner {
    name: String,
    registry: Registry,
    tag: CollisionTag,
}

#[derive(Default)]
struct Listeners {
    solid_begin: Option<PairListener>,
    solid_pre: Option<PairListener>,
    solid_post: Option<PairListener>,
    solid_end: Option<PairListener>,
    goal_begin: Option<PairListener>,
    goal_end: Option<PairListener>,
    win: Option<WinListener>,
}

/// A 2-D scene of named objects driven by the wrapped engine.
pub struct World {
    config: WorldConfig,
    engine: PhysicsEngine,
    objects: BTreeMap<String, ShapeObject>,
    blockers: BTreeMap<String, ShapeObject>,
    owners: HashMap<ColliderHandle, Owner>,
    listeners: Listeners,
    goal: Option<GoalCondition>,
    log: Vec<CollisionEvent>,
    time: f64,
    won: bool,
}

fn missing(what: &str, name: &str) -> WorldError {
    WorldError::InvalidOperation(format!("no {what} named `{name}`"))
}

impl World {
    /// Create a world and build the boundary walls marked closed in `config`.
    pub fn new(config: WorldConfig) -> Result<Self> {
        if !(config.basic_timestep.is_finite() && config.basic_timestep > 0.0) {
            return Err(WorldError::InvalidOperation(format!(
                "basic timestep must be positive, got {}",
                config.basic_timestep
            )));
        }
        let engine = PhysicsEngine::new(&config.physics());
        let (w, h) = (config.dims.x, config.dims.y);
        let closed = config.closed_ends;
        let mut world = Self {
            config,
            engine,
            objects: BTreeMap::new(),
            blockers: BTreeMap::new(),
            owners: HashMap::new(),
            listeners: Listeners::default(),
            goal: None,
            log: Vec::new(),
            time: 0.0,
            won: false,
        };

        let walls = [
            ("_LeftWall", [-1.0, -1.0, 1.0, h + 1.0]),
            ("_BottomWall", [-1.0, -1.0, w + 1.0, 1.0]),
            ("_RightWall", [w - 1.0, -1.0, w + 1.0, h + 1.0]),
            ("_TopWall", [-1.0, h - 1.0, w + 1.0, h + 1.0]),
        ];
        for (closed, (name, bounds)) in closed.into_iter().zip(walls) {
            if closed {
                world.add_box(name, bounds, ObjectParams::fixed())?;
            }
        }
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn dims(&self) -> DVec2 {
        self.config.dims
    }

    /// Simulation clock: the sum of every `dt` passed to [`step`](Self::step).
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn gravity(&self) -> f64 {
        self.engine.gravity()
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.config.gravity = gravity;
        self.engine.set_gravity(gravity);
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    fn register(
        &mut self,
        name: &str,
        registry: Registry,
        assembly: Assembly,
    ) -> Result<ObjectRef<'_>> {
        let taken = match registry {
            Registry::Object => self.objects.contains_key(name),
            Registry::Blocker => self.blockers.contains_key(name),
        };
        if taken {
            return Err(WorldError::NameCollision(format!(
                "name `{name}` is already taken"
            )));
        }

        let object = assembly.build(&mut self.engine, name)?;
        let sensor = object.sensor();
        for collider in object.colliders() {
            let tag = if Some(collider) == sensor {
                CollisionTag::Sensor
            } else {
                object.tag()
            };
            self.owners.insert(
                collider,
                Owner {
                    name: name.to_string(),
                    registry,
                    tag,
                },
            );
        }
        tracing::debug!(
            object = name,
            kind = %object.object_type(),
            is_static = object.is_static(),
            mass = object.mass(),
            "registered object"
        );

        let map = match registry {
            Registry::Object => &mut self.objects,
            Registry::Blocker => &mut self.blockers,
        };
        map.insert(name.to_string(), object);
        let object = &map[name];
        Ok(ObjectRef::new(object, &self.engine))
    }

    pub fn add_ball(
        &mut self,
        name: &str,
        position: DVec2,
        radius: f64,
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = simple::ball(position, radius, params)?;
        self.register(name, Registry::Object, assembly)
    }

    /// Convex polygon from its vertices.
    pub fn add_poly(
        &mut self,
        name: &str,
        vertices: &[DVec2],
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = simple::poly(vertices, params, CollisionTag::Solid)?;
        self.register(name, Registry::Object, assembly)
    }

    /// Rectangle from bounds `[left, bottom, right, top]`.
    pub fn add_box(
        &mut self,
        name: &str,
        bounds: [f64; 4],
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        self.add_poly(name, &box_vertices(bounds), params)
    }

    /// Capsule between `p1` and `p2`, `width` across.
    pub fn add_segment(
        &mut self,
        name: &str,
        p1: DVec2,
        p2: DVec2,
        width: f64,
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = simple::segment(p1, p2, width, params)?;
        self.register(name, Registry::Object, assembly)
    }

    /// Thick polyline with a sensing interior. The wall color comes from
    /// `params`; the interior defaults to the goal color.
    pub fn add_container(
        &mut self,
        name: &str,
        points: &[DVec2],
        width: f64,
        params: ObjectParams,
        inner_color: Option<Rgba>,
    ) -> Result<ObjectRef<'_>> {
        let inner = inner_color.unwrap_or(self.config.defaults.goal_color);
        let params = params.resolve(&self.config.defaults)?;
        let assembly = composite::container(points, width, params, inner)?;
        self.register(name, Registry::Object, assembly)
    }

    pub fn add_compound(
        &mut self,
        name: &str,
        polys: &[Vec<DVec2>],
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = composite::compound(polys, params, CollisionTag::Solid)?;
        self.register(name, Registry::Object, assembly)
    }

    /// Static goal region from convex polygon vertices.
    pub fn add_goal(
        &mut self,
        name: &str,
        vertices: &[DVec2],
        color: Option<Rgba>,
    ) -> Result<ObjectRef<'_>> {
        let color = color.unwrap_or(self.config.defaults.goal_color);
        let params = ObjectParams::fixed().color(color).resolve(&self.config.defaults)?;
        let assembly = region::goal(vertices, params)?;
        self.register(name, Registry::Object, assembly)
    }

    pub fn add_box_goal(
        &mut self,
        name: &str,
        bounds: [f64; 4],
        color: Option<Rgba>,
    ) -> Result<ObjectRef<'_>> {
        self.add_goal(name, &box_vertices(bounds), color)
    }

    /// Polygon added after scene setup, tagged as placed.
    pub fn add_placed_poly(
        &mut self,
        name: &str,
        vertices: &[DVec2],
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = simple::poly(vertices, params, CollisionTag::Placed)?;
        self.register(name, Registry::Object, assembly)
    }

    pub fn add_placed_compound(
        &mut self,
        name: &str,
        polys: &[Vec<DVec2>],
        params: ObjectParams,
    ) -> Result<ObjectRef<'_>> {
        let params = params.resolve(&self.config.defaults)?;
        let assembly = composite::compound(polys, params, CollisionTag::Placed)?;
        self.register(name, Registry::Object, assembly)
    }

    /// Rectangular placement blocker. Blockers live in their own namespace.
    pub fn add_block(
        &mut self,
        name: &str,
        bounds: [f64; 4],
        color: Option<Rgba>,
    ) -> Result<ObjectRef<'_>> {
        self.add_poly_block(name, &box_vertices(bounds), color)
    }

    pub fn add_poly_block(
        &mut self,
        name: &str,
        vertices: &[DVec2],
        color: Option<Rgba>,
    ) -> Result<ObjectRef<'_>> {
        let color = color.unwrap_or(self.config.defaults.color);
        let params = ObjectParams::fixed().color(color).resolve(&self.config.defaults)?;
        let assembly = region::blocker(vertices, params)?;
        self.register(name, Registry::Blocker, assembly)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn object(&self, name: &str) -> Result<ObjectRef<'_>> {
        self.objects
            .get(name)
            .map(|o| ObjectRef::new(o, &self.engine))
            .ok_or_else(|| missing("object", name))
    }

    pub fn object_mut(&mut self, name: &str) -> Result<ObjectMut<'_>> {
        match self.objects.get_mut(name) {
            Some(o) => Ok(ObjectMut::new(o, &mut self.engine)),
            None => Err(missing("object", name)),
        }
    }

    pub fn blocker(&self, name: &str) -> Result<ObjectRef<'_>> {
        self.blockers
            .get(name)
            .map(|o| ObjectRef::new(o, &self.engine))
            .ok_or_else(|| missing("blocker", name))
    }

    /// Every registered object, ordered by name.
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.objects.values().map(|o| ObjectRef::new(o, &self.engine))
    }

    pub fn blockers(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.blockers.values().map(|o| ObjectRef::new(o, &self.engine))
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn dynamic_objects(&self) -> Vec<ObjectRef<'_>> {
        self.objects().filter(|o| !o.is_static()).collect()
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance the simulation by exactly `dt` seconds of clock time.
    pub fn step(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "ignoring non-positive step");
            return;
        }
        self.time += dt;

        let bts = self.config.basic_timestep;
        let full = (dt / bts).floor() as usize;
        let remainder = dt - full as f64 * bts;
        for _ in 0..full {
            self.substep(bts);
            self.check_win();
        }
        if remainder / bts > REMAINDER_THRESHOLD {
            self.substep(remainder);
            self.check_win();
        } else if full == 0 {
            self.check_win();
        }
    }

    fn check_win(&mut self) {
        let won = self.is_won();
        if won && !self.won {
            tracing::info!(time = self.time, "goal condition satisfied");
        }
        self.won = won;
        if won {
            if let Some(f) = self.listeners.win.as_mut() {
                f(self.time);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Goal conditions
    // -----------------------------------------------------------------------

    /// Replace the active goal condition.
    pub fn attach_goal_condition(&mut self, condition: GoalCondition) {
        tracing::debug!(
            kind = %condition.condition_type(),
            goal = condition.goal_name(),
            duration = condition.duration(),
            "attached goal condition"
        );
        self.goal = Some(condition);
        self.won = false;
    }

    pub fn attach_any_in_goal(&mut self, goal: &str, duration: f64, exclusions: Vec<String>) {
        self.attach_goal_condition(GoalCondition::any_in_goal(goal, duration, exclusions));
    }

    pub fn attach_specific_in_goal(&mut self, goal: &str, object: &str, duration: f64) {
        self.attach_goal_condition(GoalCondition::specific_in_goal(goal, object, duration));
    }

    pub fn attach_many_in_goal(&mut self, goal: &str, objects: Vec<String>, duration: f64) {
        self.attach_goal_condition(GoalCondition::many_in_goal(goal, objects, duration));
    }

    pub fn attach_any_touch(&mut self, object: &str, duration: f64) {
        self.attach_goal_condition(GoalCondition::any_touch(object, duration));
    }

    pub fn attach_specific_touch(&mut self, first: &str, second: &str, duration: f64) {
        self.attach_goal_condition(GoalCondition::specific_touch(first, second, duration));
    }

    pub fn goal_condition(&self) -> Option<&GoalCondition> {
        self.goal.as_ref()
    }

    /// Seconds until the goal condition is won, `None` if nothing qualifies
    /// or no condition is attached.
    pub fn remaining_time(&self) -> Option<f64> {
        self.goal.as_ref().and_then(|g| g.remaining_time(self.time))
    }

    pub fn is_won(&self) -> bool {
        self.goal.as_ref().is_some_and(|g| g.is_won(self.time))
    }

    /// Distance from `point` to the goal region, zero inside. For a
    /// specific-touch condition this is the difference between the two
    /// objects' distances from the origin.
    pub fn distance_to_goal(&self, point: DVec2) -> Result<f64> {
        let condition = self.goal.as_ref().ok_or_else(|| {
            WorldError::InvalidOperation("no goal condition attached".into())
        })?;
        match condition {
            GoalCondition::SpecificTouch(c) => {
                let a = self.object(&c.first)?.distance_from_point(DVec2::ZERO);
                let b = self.object(&c.second)?.distance_from_point(DVec2::ZERO);
                Ok((a - b).abs())
            }
            _ => Ok(self
                .object(condition.goal_name())?
                .distance_from_point(point)
                .max(0.0)),
        }
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn set_solid_collision_begin(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.solid_begin = Some(Box::new(f));
    }

    pub fn set_solid_collision_pre(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.solid_pre = Some(Box::new(f));
    }

    pub fn set_solid_collision_post(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.solid_post = Some(Box::new(f));
    }

    pub fn set_solid_collision_end(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.solid_end = Some(Box::new(f));
    }

    /// Called with (object, goal) when a solid starts overlapping a sensor.
    pub fn set_goal_collision_begin(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.goal_begin = Some(Box::new(f));
    }

    pub fn set_goal_collision_end(
        &mut self,
        f: impl FnMut(ObjectRef<'_>, ObjectRef<'_>) + 'static,
    ) {
        self.listeners.goal_end = Some(Box::new(f));
    }

    /// Called after every sub-step that ends with the goal condition won.
    pub fn set_win_callback(&mut self, f: impl FnMut(f64) + 'static) {
        self.listeners.win = Some(Box::new(f));
    }

    pub fn clear_callbacks(&mut self) {
        self.listeners = Listeners::default();
    }

    // -----------------------------------------------------------------------
    // Collision log
    // -----------------------------------------------------------------------

    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.log
    }

    pub fn reset_collisions(&mut self) {
        self.log.clear();
    }

    // -----------------------------------------------------------------------
    // Placement probes
    // -----------------------------------------------------------------------

    /// True if a polygon with `vertices` relative to `position` would overlap
    /// a solid, placed or blocker shape. Goal regions never block.
    pub fn check_collision(&self, position: DVec2, vertices: &[DVec2]) -> Result<bool> {
        let probe = ShapeSpec::ConvexPolygon(vertices.to_vec()).prepare()?;
        Ok(self
            .engine
            .probe_overlaps(&probe, position, CollisionTag::Checker))
    }

    pub fn check_collision_circle(&self, position: DVec2, radius: f64) -> Result<bool> {
        let probe = ShapeSpec::Circle {
            center: DVec2::ZERO,
            radius,
        }
        .prepare()?;
        Ok(self
            .engine
            .probe_overlaps(&probe, position, CollisionTag::Checker))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::f64::consts::PI;
    use std::rc::Rc;

    use super::*;
    use crate::physics::contact::{ContactDetail, RawCollision};

    fn open_world(gravity: f64) -> World {
        World::new(
            WorldConfig::new(DVec2::new(100.0, 100.0), gravity).with_closed_ends([false; 4]),
        )
        .unwrap()
    }

    fn ball_world() -> World {
        let mut world = World::new(WorldConfig::new(DVec2::new(100.0, 100.0), 10.0)).unwrap();
        world
            .add_ball("b", DVec2::new(50.0, 90.0), 5.0, ObjectParams::new())
            .unwrap();
        world.add_box_goal("g", [40.0, 0.0, 60.0, 10.0], None).unwrap();
        world
    }

    /// Inelastic ball dropped onto a static floor.
    fn landing_world() -> World {
        let mut world = open_world(10.0);
        world
            .add_box("floor", [30.0, 5.0, 70.0, 10.0], ObjectParams::fixed())
            .unwrap();
        world
            .add_ball("b", DVec2::new(50.0, 20.0), 2.0, ObjectParams::new().elasticity(0.0))
            .unwrap();
        world
    }

    fn step_until_won(world: &mut World, max_steps: usize) -> bool {
        for _ in 0..max_steps {
            world.step(0.1);
            if world.is_won() {
                return true;
            }
        }
        false
    }

    fn cup_points() -> Vec<DVec2> {
        vec![
            DVec2::new(30.0, 40.0),
            DVec2::new(30.0, 10.0),
            DVec2::new(70.0, 10.0),
            DVec2::new(70.0, 40.0),
        ]
    }

    #[test]
    fn test_walls_follow_closed_ends() {
        let world = World::new(
            WorldConfig::new(DVec2::new(100.0, 50.0), 10.0)
                .with_closed_ends([true, false, true, false]),
        )
        .unwrap();
        let names: Vec<&str> = world.object_names().collect();
        assert_eq!(names, vec!["_LeftWall", "_RightWall"]);

        let right = world.object("_RightWall").unwrap();
        assert!(right.is_static());
        assert_eq!(right.bounding_box().unwrap(), [99.0, -1.0, 101.0, 51.0]);
    }

    #[test]
    fn test_name_collisions() {
        let mut world = open_world(10.0);
        world
            .add_ball("b", DVec2::new(10.0, 10.0), 1.0, ObjectParams::new())
            .unwrap();
        let err = world.add_box("b", [0.0, 0.0, 1.0, 1.0], ObjectParams::new());
        assert!(matches!(err, Err(WorldError::NameCollision(_))));
        assert!(
            world.add_block("b", [0.0, 0.0, 1.0, 1.0], None).is_ok(),
            "blockers have their own namespace"
        );
        assert!(world.blocker("b").is_ok());
    }

    #[test]
    fn test_failed_construction_registers_nothing() {
        let mut world = open_world(10.0);
        let err = world.add_poly("p", &[DVec2::ZERO, DVec2::X], ObjectParams::new());
        assert!(matches!(err, Err(WorldError::InvalidGeometry(_))));
        assert!(world.object("p").is_err());
        assert_eq!(world.object_names().count(), 0);
        assert!(world.add_box("p", [0.0, 0.0, 1.0, 1.0], ObjectParams::new()).is_ok());
    }

    #[test]
    fn test_staticness_is_determined_by_density() {
        let mut world = open_world(10.0);
        world
            .add_ball("fixed", DVec2::new(10.0, 10.0), 2.0, ObjectParams::fixed())
            .unwrap();
        world
            .add_ball("free", DVec2::new(30.0, 10.0), 2.0, ObjectParams::new())
            .unwrap();

        let fixed = world.object("fixed").unwrap();
        assert!(fixed.is_static());
        assert_eq!(fixed.mass(), 0.0);
        assert!(matches!(fixed.position(), Err(WorldError::InvalidOperation(_))));
        assert!(matches!(fixed.velocity(), Err(WorldError::InvalidOperation(_))));
        assert!(matches!(fixed.rotation(), Err(WorldError::InvalidOperation(_))));
        assert!(world
            .object_mut("fixed")
            .unwrap()
            .set_velocity(DVec2::X)
            .is_err());

        let free = world.object("free").unwrap();
        assert!(!free.is_static());
        assert!(free.mass() > 0.0);
        assert_eq!(world.dynamic_objects().len(), 1);
    }

    #[test]
    fn test_initial_velocity_applies_to_dynamic_objects() {
        let mut world = open_world(0.0);
        world
            .add_ball(
                "b",
                DVec2::new(50.0, 50.0),
                1.0,
                ObjectParams::new().velocity(DVec2::new(3.0, 0.0)),
            )
            .unwrap();
        let v = world.object("b").unwrap().velocity().unwrap();
        assert!((v - DVec2::new(3.0, 0.0)).length() < 1e-12);
        world.step(1.0);
        let p = world.object("b").unwrap().position().unwrap();
        assert!((p.x - 53.0).abs() < 0.1, "ball coasts: {:?}", p);
    }

    #[test]
    fn test_step_accumulates_requested_time() {
        let mut world = open_world(10.0);
        world.step(0.015);
        world.step(0.1);
        assert!((world.time() - 0.115).abs() < 1e-12);
        world.step(0.0);
        world.step(-1.0);
        assert!((world.time() - 0.115).abs() < 1e-12, "non-positive steps are ignored");
    }

    #[test]
    fn test_placement_probes() {
        let mut world = open_world(10.0);
        world
            .add_box("floor", [0.0, 0.0, 100.0, 10.0], ObjectParams::fixed())
            .unwrap();
        world.add_block("nope", [50.0, 50.0, 60.0, 60.0], None).unwrap();
        world.add_box_goal("g", [20.0, 50.0, 30.0, 60.0], None).unwrap();

        assert!(world.check_collision_circle(DVec2::new(5.0, 5.0), 1.0).unwrap());
        assert!(world.check_collision_circle(DVec2::new(55.0, 55.0), 1.0).unwrap());
        assert!(
            !world.check_collision_circle(DVec2::new(25.0, 55.0), 1.0).unwrap(),
            "goals do not block placement"
        );
        let square = box_vertices([-1.0, -1.0, 1.0, 1.0]);
        assert!(!world.check_collision(DVec2::new(70.0, 70.0), &square).unwrap());
        assert!(world.check_collision(DVec2::new(50.0, 10.5), &square).unwrap());
        assert!(world.check_collision(DVec2::ZERO, &square[..2]).is_err());
    }

    #[test]
    fn test_kick_requires_point_inside() {
        let mut world = open_world(0.0);
        world
            .add_ball("b", DVec2::new(50.0, 50.0), 1.0, ObjectParams::new())
            .unwrap();
        let mut b = world.object_mut("b").unwrap();
        let outside = b.kick(DVec2::new(1.0, 0.0), DVec2::new(60.0, 50.0));
        assert!(matches!(outside, Err(WorldError::InvalidOperation(_))));
        b.kick(DVec2::new(1.0, 0.0), DVec2::new(50.0, 50.0)).unwrap();
        let v = b.view().velocity().unwrap();
        assert!(v.x > 0.0, "impulse through the center moves the ball: {:?}", v);
    }

    #[test]
    fn test_distance_to_goal() {
        let mut world = ball_world();
        assert!(world.distance_to_goal(DVec2::new(50.0, 50.0)).is_err());
        world.attach_specific_in_goal("g", "b", 1.0);
        let d = world.distance_to_goal(DVec2::new(50.0, 20.0)).unwrap();
        assert!((d - 10.0).abs() < 1e-9, "d = {}", d);
        assert_eq!(world.distance_to_goal(DVec2::new(50.0, 5.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_ball_falls_into_goal() {
        let mut world = ball_world();
        world.attach_specific_in_goal("g", "b", 1.0);

        let wins = Rc::new(Cell::new(0usize));
        let counter = wins.clone();
        world.set_win_callback(move |_| counter.set(counter.get() + 1));

        let entered = Rc::new(Cell::new(false));
        let flag = entered.clone();
        world.set_goal_collision_begin(move |obj, goal| {
            if obj.name() == "b" && goal.name() == "g" {
                flag.set(true);
            }
        });

        let mut won_at = None;
        for _ in 0..100 {
            world.step(0.1);
            if wins.get() > 0 {
                won_at = Some(world.time());
                break;
            }
        }
        let won_at = won_at.expect("ball should settle in the goal and win");
        assert!(entered.get(), "goal listener saw the ball enter");
        assert!(won_at > 4.0, "ball needs ~4 s to fall and 1 s to dwell: {}", won_at);
        assert!(world.is_won());
        assert_eq!(world.remaining_time(), Some(0.0));

        let landed = world.collision_events().iter().any(|e| {
            e.phase == CollisionPhase::Begin
                && [e.first.as_str(), e.second.as_str()].contains(&"b")
                && [e.first.as_str(), e.second.as_str()].contains(&"_BottomWall")
                && e.time <= won_at
        });
        assert!(landed, "log: {:?}", world.collision_events());

        let before = wins.get();
        world.step(0.1);
        assert_eq!(wins.get() - before, 10, "win fires once per sub-step while won");
    }

    #[test]
    fn test_solid_listeners_and_log() {
        let mut world = ball_world();
        let begins = Rc::new(Cell::new(0usize));
        let pres = Rc::new(Cell::new(0usize));
        let (b, p) = (begins.clone(), pres.clone());
        world.set_solid_collision_begin(move |_, _| b.set(b.get() + 1));
        world.set_solid_collision_pre(move |_, _| p.set(p.get() + 1));

        for _ in 0..60 {
            world.step(0.1);
        }
        assert!(begins.get() >= 1, "ball hit the floor");
        assert!(pres.get() > begins.get(), "pre-solve fires every sub-step in contact");

        let event = world
            .collision_events()
            .iter()
            .find(|e| e.phase == CollisionPhase::Begin)
            .expect("a begin event");
        assert!((event.detail.restitution - 0.25).abs() < 1e-12);
        assert!(
            world
                .collision_events()
                .iter()
                .all(|e| e.first != "g" && e.second != "g"),
            "sensor overlaps are not logged"
        );

        world.reset_collisions();
        assert!(world.collision_events().is_empty());
    }

    #[test]
    fn test_set_gravity() {
        let mut world = open_world(10.0);
        assert_eq!(world.gravity(), 10.0);
        world.set_gravity(-3.0);
        assert_eq!(world.gravity(), -3.0);
        assert_eq!(world.config().gravity, -3.0);
    }

    #[test]
    fn test_kick_before_first_step() {
        let mut world = open_world(0.0);
        world
            .add_ball("b", DVec2::new(50.0, 50.0), 1.0, ObjectParams::new())
            .unwrap();
        let mut b = world.object_mut("b").unwrap();
        b.kick(DVec2::new(PI, 0.0), DVec2::new(50.0, 50.0)).unwrap();
        let v = b.view().velocity().unwrap();
        assert!((v.x - 1.0).abs() < 1e-9, "v = J / m with m = pi: {:?}", v);
        assert!(v.y.abs() < 1e-9);
    }

    #[test]
    fn test_kick_on_container_wall() {
        let mut world = open_world(0.0);
        world
            .add_container("cup", &cup_points(), 2.0, ObjectParams::new(), None)
            .unwrap();
        let mut cup = world.object_mut("cup").unwrap();
        cup.kick(DVec2::new(1.0, 0.0), DVec2::new(29.5, 25.0))
            .expect("point on the left wall");
        cup.kick(DVec2::new(1.0, 0.0), DVec2::new(50.0, 25.0))
            .expect("point in the interior");
        assert!(matches!(
            cup.kick(DVec2::new(1.0, 0.0), DVec2::new(5.0, 5.0)),
            Err(WorldError::InvalidOperation(_))
        ));
        let v = cup.view().velocity().unwrap();
        assert!(v.x > 0.0, "both kicks pushed the cup: {:?}", v);
    }

    #[test]
    fn test_concave_poly_registers_nothing() {
        let mut world = open_world(0.0);
        let chevron = [
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 3.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(5.0, 10.0),
        ];
        let err = world.add_poly("chev", &chevron, ObjectParams::new());
        assert!(matches!(err, Err(WorldError::InvalidGeometry(_))));
        assert!(world.object("chev").is_err());
        assert!(
            !world.check_collision_circle(DVec2::new(5.0, 1.0), 0.5).unwrap(),
            "no hull left behind in the notch"
        );
    }

    #[test]
    fn test_goal_end_ignored_while_inside() {
        let mut world = open_world(0.0);
        world
            .add_ball("b", DVec2::new(50.0, 50.0), 2.0, ObjectParams::new())
            .unwrap();
        world.add_box_goal("g", [40.0, 40.0, 60.0, 60.0], None).unwrap();
        world.attach_specific_in_goal("g", "b", 1.0);

        world.step(0.01);
        assert!(world.remaining_time().is_some(), "overlap at start counts as entry");

        let ball = world.object("b").unwrap().colliders().next().unwrap();
        let goal = world.object("g").unwrap().colliders().next().unwrap();
        world.route(RawCollision {
            collider1: goal,
            collider2: ball,
            started: false,
            detail: ContactDetail::default(),
        });
        assert!(
            world.remaining_time().is_some(),
            "separation reported while the ball is still inside is ignored"
        );

        world
            .object_mut("b")
            .unwrap()
            .set_position(DVec2::new(10.0, 10.0))
            .unwrap();
        world.step(0.01);
        assert_eq!(world.remaining_time(), None, "leaving the goal clears the timer");
    }

    #[test]
    fn test_touch_conditions_won_by_contact() {
        let mut world = landing_world();
        world.attach_any_touch("floor", 0.5);
        assert!(step_until_won(&mut world, 50), "ball resting on the floor");

        let mut world = landing_world();
        world.attach_specific_touch("b", "floor", 0.5);
        assert!(step_until_won(&mut world, 50), "pair order does not matter");

        let mut world = landing_world();
        world
            .add_box("shelf", [80.0, 80.0, 90.0, 85.0], ObjectParams::fixed())
            .unwrap();
        world.attach_specific_touch("b", "shelf", 0.5);
        assert!(!step_until_won(&mut world, 50), "ball never touches the shelf");
        assert_eq!(world.remaining_time(), None);
    }

    #[test]
    fn test_placed_objects_route_and_ignore_blockers() {
        let mut world = open_world(10.0);
        world
            .add_box("floor", [0.0, 0.0, 100.0, 5.0], ObjectParams::fixed())
            .unwrap();
        world.add_block("nope", [0.0, 20.0, 100.0, 30.0], None).unwrap();
        world
            .add_placed_poly("tool", &box_vertices([45.0, 40.0, 55.0, 50.0]), ObjectParams::new())
            .unwrap();

        let pairs = Rc::new(RefCell::new(Vec::new()));
        let sink = pairs.clone();
        world.set_solid_collision_begin(move |a, b| {
            sink.borrow_mut().push((a.name().to_string(), b.name().to_string()));
        });
        let goal_hits = Rc::new(Cell::new(0usize));
        let hits = goal_hits.clone();
        world.set_goal_collision_begin(move |_, _| hits.set(hits.get() + 1));

        for _ in 0..40 {
            world.step(0.1);
        }

        let y = world.object("tool").unwrap().position().unwrap().y;
        assert!(y < 20.0, "placed box fell through the blocker: y = {}", y);
        assert!(
            pairs
                .borrow()
                .iter()
                .any(|(a, b)| (a == "tool" && b == "floor") || (a == "floor" && b == "tool")),
            "placed-solid contact is routed: {:?}",
            pairs.borrow()
        );
        assert!(world
            .collision_events()
            .iter()
            .any(|e| e.first == "tool" || e.second == "tool"));
        assert_eq!(goal_hits.get(), 0, "blockers never route");
    }

    #[test]
    fn test_container_interior_and_sensor() {
        let mut world = open_world(10.0);
        world
            .add_container("cup", &cup_points(), 2.0, ObjectParams::fixed(), None)
            .unwrap();
        {
            let cup = world.object("cup").unwrap();
            assert!(cup.point_in(DVec2::new(50.0, 25.0)), "interior");
            assert!(!cup.point_in(DVec2::new(50.0, 60.0)), "above the rim");
            assert!(!cup.point_in(DVec2::new(10.0, 25.0)), "beside the cup");
        }
        world
            .add_ball("b", DVec2::new(50.0, 60.0), 3.0, ObjectParams::new())
            .unwrap();

        let entered = Rc::new(RefCell::new(Vec::new()));
        let sink = entered.clone();
        world.set_goal_collision_begin(move |obj, goal| {
            sink.borrow_mut().push((obj.name().to_string(), goal.name().to_string()));
        });
        world.attach_any_in_goal("cup", 0.5, Vec::new());

        assert!(step_until_won(&mut world, 50), "ball settles inside the cup");
        assert_eq!(
            entered.borrow().first(),
            Some(&("b".to_string(), "cup".to_string()))
        );
        let p = world.object("b").unwrap().position().unwrap();
        assert!(world.object("cup").unwrap().point_in(p), "ball rests at {:?}", p);
    }
}
