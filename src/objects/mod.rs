//! Named scene objects and their collision geometry.
//!
//! Each builder turns user geometry into an [`Assembly`]: mass properties plus
//! engine-independent shape descriptions. [`Assembly::build`] validates every
//! shape before it creates a body, so a failed construction leaves the engine
//! untouched.

pub mod composite;
pub mod params;
pub mod region;
pub mod simple;

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use rapier2d_f64::prelude::{ColliderHandle, RigidBodyHandle};

use crate::color::Rgba;
use crate::error::{Result, WorldError};
use crate::geometry::{bounds, transform};
use crate::physics::collider::{CollisionTag, Material, ShapeSpec};
use crate::physics::PhysicsEngine;

pub use params::{BodyParams, Defaults, ObjectParams};

/// Object variants, as named in scene descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Ball,
    Poly,
    Segment,
    Container,
    Compound,
    Goal,
    Blocker,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Ball => "Ball",
            ObjectType::Poly => "Poly",
            ObjectType::Segment => "Segment",
            ObjectType::Container => "Container",
            ObjectType::Compound => "Compound",
            ObjectType::Goal => "Goal",
            ObjectType::Blocker => "Blocker",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ball" => Ok(ObjectType::Ball),
            "Poly" => Ok(ObjectType::Poly),
            "Segment" => Ok(ObjectType::Segment),
            "Container" => Ok(ObjectType::Container),
            "Compound" => Ok(ObjectType::Compound),
            "Goal" => Ok(ObjectType::Goal),
            "Blocker" => Ok(ObjectType::Blocker),
            other => Err(WorldError::UnknownVariant(other.to_string())),
        }
    }
}

/// Width-extruded polyline with an interior sensor.
#[derive(Debug, Clone)]
pub struct ContainerShape {
    /// Polyline points in the body frame.
    pub points: Vec<DVec2>,
    /// Half of the wall width.
    pub radius: f64,
    /// Extruded wall quads in the body frame.
    pub polys: Vec<Vec<DVec2>>,
    pub outline: Option<Vec<DVec2>>,
    pub inner_color: Rgba,
    pub outer_color: Rgba,
}

/// Several convex polygons sharing one body.
#[derive(Debug, Clone)]
pub struct CompoundShape {
    /// Sub-polygons in the body frame.
    pub polys: Vec<Vec<DVec2>>,
    pub outline: Option<Vec<DVec2>>,
}

/// Geometry of an object in its body frame. Static objects have no body, so
/// their geometry is stored in world coordinates.
#[derive(Debug, Clone)]
pub enum ShapeKind {
    Ball { center: DVec2, radius: f64 },
    Poly { vertices: Vec<DVec2> },
    Segment { a: DVec2, b: DVec2, radius: f64 },
    Container(ContainerShape),
    Compound(CompoundShape),
    Goal { vertices: Vec<DVec2> },
    Blocker { vertices: Vec<DVec2> },
}

impl ShapeKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ShapeKind::Ball { .. } => ObjectType::Ball,
            ShapeKind::Poly { .. } => ObjectType::Poly,
            ShapeKind::Segment { .. } => ObjectType::Segment,
            ShapeKind::Container(_) => ObjectType::Container,
            ShapeKind::Compound(_) => ObjectType::Compound,
            ShapeKind::Goal { .. } => ObjectType::Goal,
            ShapeKind::Blocker { .. } => ObjectType::Blocker,
        }
    }
}

/// A named object registered with the engine.
#[derive(Debug, Clone)]
pub struct ShapeObject {
    name: String,
    kind: ShapeKind,
    color: Rgba,
    density: f64,
    material: Material,
    tag: CollisionTag,
    area: f64,
    mass: f64,
    moment: f64,
    body: Option<RigidBodyHandle>,
    shapes: Vec<ColliderHandle>,
    sensor: Option<ColliderHandle>,
}

impl ShapeObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn elasticity(&self) -> f64 {
        self.material.elasticity
    }

    pub fn friction(&self) -> f64 {
        self.material.friction
    }

    /// Collision tag of the object's main shapes.
    pub fn tag(&self) -> CollisionTag {
        self.tag
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Zero for static objects.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Moment of inertia about the body origin. Zero for static objects.
    pub fn moment(&self) -> f64 {
        self.moment
    }

    pub fn is_static(&self) -> bool {
        self.body.is_none()
    }

    /// Every engine collider owned by the object, sensor last.
    pub fn colliders(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.shapes.iter().copied().chain(self.sensor)
    }

    pub(crate) fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    pub(crate) fn sensor(&self) -> Option<ColliderHandle> {
        self.sensor
    }

    fn static_error(&self, what: &str) -> WorldError {
        WorldError::InvalidOperation(format!("cannot {what} static object `{}`", self.name))
    }

    fn kind_error(&self, what: &str) -> WorldError {
        WorldError::InvalidOperation(format!(
            "{} `{}` has no {what}",
            self.object_type(),
            self.name
        ))
    }
}

/// Everything needed to register one object with the engine.
pub(crate) struct Assembly {
    pub kind: ShapeKind,
    pub params: BodyParams,
    pub tag: CollisionTag,
    pub area: f64,
    pub mass: f64,
    pub moment: f64,
    /// Body position in world space (ignored when static).
    pub origin: DVec2,
    pub solids: Vec<ShapeSpec>,
    pub sensor: Option<ShapeSpec>,
}

impl Assembly {
    /// Validate every shape, then create the body (if any) and attach shapes.
    pub fn build(self, engine: &mut PhysicsEngine, name: &str) -> Result<ShapeObject> {
        let solids = self
            .solids
            .iter()
            .map(ShapeSpec::prepare)
            .collect::<Result<Vec<_>>>()?;
        let sensor = self.sensor.as_ref().map(ShapeSpec::prepare).transpose()?;

        let body = if self.mass == 0.0 {
            None
        } else {
            Some(engine.create_body(self.origin, self.mass, self.moment))
        };
        if let (Some(body), Some(v)) = (body, self.params.velocity) {
            engine.set_body_velocity(body, v);
        }

        let material = self.params.material;
        let tag = self.tag;
        let shapes = solids
            .into_iter()
            .map(|s| engine.attach(s, material, tag, body))
            .collect();
        let sensor = sensor.map(|s| engine.attach(s, material, CollisionTag::Sensor, body));

        Ok(ShapeObject {
            name: name.to_string(),
            kind: self.kind,
            color: self.params.color,
            density: self.params.density,
            material,
            tag,
            area: self.area,
            mass: self.mass,
            moment: self.moment,
            body,
            shapes,
            sensor,
        })
    }
}

/// Read access to an object together with the engine that simulates it.
#[derive(Clone, Copy)]
pub struct ObjectRef<'w> {
    object: &'w ShapeObject,
    engine: &'w PhysicsEngine,
}

impl<'w> std::ops::Deref for ObjectRef<'w> {
    type Target = ShapeObject;

    fn deref(&self) -> &ShapeObject {
        self.object
    }
}

impl<'w> ObjectRef<'w> {
    pub(crate) fn new(object: &'w ShapeObject, engine: &'w PhysicsEngine) -> Self {
        Self { object, engine }
    }

    pub fn object(&self) -> &'w ShapeObject {
        self.object
    }

    /// Body position and angle, identity for static objects.
    fn pose(&self) -> (DVec2, f64) {
        match self.object.body {
            Some(b) => (
                self.engine.body_position(b).unwrap_or(DVec2::ZERO),
                self.engine.body_angle(b).unwrap_or(0.0),
            ),
            None => (DVec2::ZERO, 0.0),
        }
    }

    fn to_world(&self, local: &[DVec2]) -> Vec<DVec2> {
        let (pos, angle) = self.pose();
        local.iter().map(|&p| transform(p, pos, angle)).collect()
    }

    fn body_or_err(&self, what: &str) -> Result<RigidBodyHandle> {
        self.object.body.ok_or_else(|| self.object.static_error(what))
    }

    pub fn position(&self) -> Result<DVec2> {
        let body = self.body_or_err("read the position of")?;
        self.engine
            .body_position(body)
            .ok_or_else(|| self.object.static_error("read the position of"))
    }

    pub fn velocity(&self) -> Result<DVec2> {
        let body = self.body_or_err("read the velocity of")?;
        self.engine
            .body_velocity(body)
            .ok_or_else(|| self.object.static_error("read the velocity of"))
    }

    pub fn rotation(&self) -> Result<f64> {
        let body = self.body_or_err("read the rotation of")?;
        self.engine
            .body_angle(body)
            .ok_or_else(|| self.object.static_error("read the rotation of"))
    }

    pub fn angular_velocity(&self) -> Result<f64> {
        let body = self.body_or_err("read the angular velocity of")?;
        self.engine
            .body_angular_velocity(body)
            .ok_or_else(|| self.object.static_error("read the angular velocity of"))
    }

    /// World-space vertices of a polygonal object.
    pub fn vertices(&self) -> Result<Vec<DVec2>> {
        match &self.object.kind {
            ShapeKind::Poly { vertices }
            | ShapeKind::Goal { vertices }
            | ShapeKind::Blocker { vertices } => Ok(self.to_world(vertices)),
            _ => Err(self.object.kind_error("vertices")),
        }
    }

    /// World-space center and radius of a ball.
    pub fn circle(&self) -> Result<(DVec2, f64)> {
        match &self.object.kind {
            ShapeKind::Ball { center, radius } => {
                let (pos, angle) = self.pose();
                Ok((transform(*center, pos, angle), *radius))
            }
            _ => Err(self.object.kind_error("circle")),
        }
    }

    /// World-space polyline: segment endpoints or container path.
    pub fn points(&self) -> Result<Vec<DVec2>> {
        match &self.object.kind {
            ShapeKind::Segment { a, b, .. } => Ok(self.to_world(&[*a, *b])),
            ShapeKind::Container(c) => Ok(self.to_world(&c.points)),
            _ => Err(self.object.kind_error("polyline")),
        }
    }

    /// Half-width of a segment or container wall.
    pub fn half_width(&self) -> Result<f64> {
        match &self.object.kind {
            ShapeKind::Segment { radius, .. } => Ok(*radius),
            ShapeKind::Container(c) => Ok(c.radius),
            _ => Err(self.object.kind_error("width")),
        }
    }

    /// World-space convex pieces of the object.
    pub fn polys(&self) -> Result<Vec<Vec<DVec2>>> {
        match &self.object.kind {
            ShapeKind::Container(c) => Ok(c.polys.iter().map(|p| self.to_world(p)).collect()),
            ShapeKind::Compound(c) => Ok(c.polys.iter().map(|p| self.to_world(p)).collect()),
            ShapeKind::Poly { .. } | ShapeKind::Goal { .. } | ShapeKind::Blocker { .. } => {
                Ok(vec![self.vertices()?])
            }
            _ => Err(self.object.kind_error("polygons")),
        }
    }

    /// World-space boundary loop. The cached outline is transformed, never recomputed.
    pub fn outline(&self) -> Result<Vec<DVec2>> {
        let cached = match &self.object.kind {
            ShapeKind::Container(c) => &c.outline,
            ShapeKind::Compound(c) => &c.outline,
            ShapeKind::Poly { .. } | ShapeKind::Goal { .. } | ShapeKind::Blocker { .. } => {
                return self.vertices()
            }
            _ => return Err(self.object.kind_error("outline")),
        };
        cached.as_ref().map(|o| self.to_world(o)).ok_or_else(|| {
            WorldError::DegenerateOutline(format!(
                "outline of `{}` could not be closed",
                self.object.name
            ))
        })
    }

    /// Axis-aligned bounds `[left, bottom, right, top]` in world space.
    pub fn bounding_box(&self) -> Result<[f64; 4]> {
        let (points, pad) = match &self.object.kind {
            ShapeKind::Ball { .. } => {
                let (c, r) = self.circle()?;
                (vec![c], r)
            }
            ShapeKind::Segment { radius, .. } => (self.points()?, *radius),
            _ => (self.polys()?.concat(), 0.0),
        };
        let [l, b, r, t] = bounds(&points).ok_or_else(|| self.object.kind_error("extent"))?;
        Ok([l - pad, b - pad, r + pad, t + pad])
    }

    /// True if `point` lies inside the object. Containers test their interior sensor.
    pub fn point_in(&self, point: DVec2) -> bool {
        match (&self.object.kind, self.object.sensor) {
            (ShapeKind::Container(_), Some(sensor)) => self.engine.contains_point(sensor, point),
            _ => self.solid_contains(point),
        }
    }

    /// True if `point` lies inside any solid shape, ignoring the interior sensor.
    fn solid_contains(&self, point: DVec2) -> bool {
        self.object
            .shapes
            .iter()
            .any(|&c| self.engine.contains_point(c, point))
    }

    /// Signed distance from `point` to the nearest solid shape, negative inside.
    pub fn distance_from_point(&self, point: DVec2) -> f64 {
        self.object
            .shapes
            .iter()
            .filter_map(|&c| self.engine.distance_to_point(c, point))
            .fold(f64::INFINITY, f64::min)
    }

    /// True if any shape of this object overlaps any shape of `other`.
    pub fn touches(&self, other: &ShapeObject) -> bool {
        self.object.shapes.iter().any(|&a| {
            other
                .shapes
                .iter()
                .any(|&b| self.engine.colliders_intersect(a, b))
        })
    }
}

/// Mutable access to an object for kinematic and material changes.
pub struct ObjectMut<'w> {
    object: &'w mut ShapeObject,
    engine: &'w mut PhysicsEngine,
}

impl<'w> ObjectMut<'w> {
    pub(crate) fn new(object: &'w mut ShapeObject, engine: &'w mut PhysicsEngine) -> Self {
        Self { object, engine }
    }

    pub fn view(&self) -> ObjectRef<'_> {
        ObjectRef::new(self.object, self.engine)
    }

    fn body_or_err(&self, what: &str) -> Result<RigidBodyHandle> {
        self.object.body.ok_or_else(|| self.object.static_error(what))
    }

    pub fn set_position(&mut self, position: DVec2) -> Result<()> {
        let body = self.body_or_err("move")?;
        let angle = self.engine.body_angle(body).unwrap_or(0.0);
        self.engine.set_body_pose(body, position, angle);
        Ok(())
    }

    pub fn set_rotation(&mut self, angle: f64) -> Result<()> {
        let body = self.body_or_err("rotate")?;
        let position = self.engine.body_position(body).unwrap_or(DVec2::ZERO);
        self.engine.set_body_pose(body, position, angle);
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: DVec2) -> Result<()> {
        let body = self.body_or_err("set the velocity of")?;
        self.engine.set_body_velocity(body, velocity);
        Ok(())
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.object.material.friction = friction;
        self.apply_material();
    }

    pub fn set_elasticity(&mut self, elasticity: f64) {
        self.object.material.elasticity = elasticity;
        self.apply_material();
    }

    fn apply_material(&mut self) {
        let material = self.object.material;
        for c in self.object.colliders().collect::<Vec<_>>() {
            self.engine.set_material(c, material);
        }
    }

    /// Apply `impulse` at world point `point`, which must lie inside the
    /// object. For containers both the walls and the interior count.
    pub fn kick(&mut self, impulse: DVec2, point: DVec2) -> Result<()> {
        self.body_or_err("kick")?;
        let view = self.view();
        if !(view.point_in(point) || view.solid_contains(point)) {
            return Err(WorldError::InvalidOperation(format!(
                "kick point ({}, {}) is outside `{}`",
                point.x, point.y, self.object.name
            )));
        }
        self.kick_unchecked(impulse, point)
    }

    /// Apply `impulse` at `point` without checking that the point is inside.
    pub fn kick_unchecked(&mut self, impulse: DVec2, point: DVec2) -> Result<()> {
        let body = self.body_or_err("kick")?;
        self.engine.apply_impulse(body, impulse, point);
        Ok(())
    }
}
