//! Collision tags, materials and shape descriptions handed to the engine.

use glam::DVec2;
use rapier2d_f64::prelude::{Group, InteractionGroups, Isometry, Point, Real, SharedShape};

use crate::error::{Result, WorldError};
use crate::geometry::{area_for_poly, is_convex, validate_vertices};

/// Role of a collision shape in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionTag {
    /// Ordinary rigid geometry.
    Solid,
    /// Solids added after scene setup; collide exactly like solids.
    Placed,
    /// Goal regions and container interiors. Never produce a contact response.
    Sensor,
    /// Placement blockers. Only seen by placement probes.
    Blocked,
    /// Transient placement probes.
    Checker,
}

/// Interaction-group bit assigned to each [`CollisionTag`].
///
/// Part of each world's configuration, so several worlds can use different
/// assignments side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionTags {
    pub solid: u32,
    pub placed: u32,
    pub sensor: u32,
    pub blocked: u32,
    pub checker: u32,
}

impl Default for CollisionTags {
    fn default() -> Self {
        Self {
            solid: 1 << 0,
            placed: 1 << 1,
            sensor: 1 << 2,
            blocked: 1 << 3,
            checker: 1 << 4,
        }
    }
}

impl CollisionTags {
    /// Membership bit of `tag`.
    pub fn bits(&self, tag: CollisionTag) -> u32 {
        match tag {
            CollisionTag::Solid => self.solid,
            CollisionTag::Placed => self.placed,
            CollisionTag::Sensor => self.sensor,
            CollisionTag::Blocked => self.blocked,
            CollisionTag::Checker => self.checker,
        }
    }

    /// Bits of the tags that `tag` interacts with.
    pub fn filter(&self, tag: CollisionTag) -> u32 {
        match tag {
            CollisionTag::Solid | CollisionTag::Placed => self.solid | self.placed | self.sensor,
            CollisionTag::Sensor => self.solid | self.placed,
            CollisionTag::Blocked => self.checker,
            CollisionTag::Checker => self.solid | self.placed | self.blocked,
        }
    }

    pub fn interaction_groups(&self, tag: CollisionTag) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.bits(tag)),
            Group::from_bits_truncate(self.filter(tag)),
        )
    }

    /// Reverse lookup from a membership bit set.
    pub fn tag_of(&self, bits: u32) -> Option<CollisionTag> {
        [
            CollisionTag::Solid,
            CollisionTag::Placed,
            CollisionTag::Sensor,
            CollisionTag::Blocked,
            CollisionTag::Checker,
        ]
        .into_iter()
        .find(|&t| self.bits(t) == bits)
    }
}

/// Surface parameters of a collision shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub elasticity: f64,
    pub friction: f64,
}

/// Engine-independent description of one collision shape, in the frame of
/// its body (or in world space when static).
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeSpec {
    Circle { center: DVec2, radius: f64 },
    /// Caller-supplied polygon; concave input is rejected.
    ConvexPolygon(Vec<DVec2>),
    /// Generated geometry, collided as the convex hull of its vertices.
    Hull(Vec<DVec2>),
    Capsule { a: DVec2, b: DVec2, radius: f64 },
}

/// A validated engine shape with its offset in the parent frame.
#[derive(Clone)]
pub struct PreparedShape {
    pub shape: SharedShape,
    pub offset: Isometry<Real>,
}

#[inline]
pub(crate) fn to_point(v: DVec2) -> Point<Real> {
    Point::new(v.x, v.y)
}

fn hull(verts: &[DVec2]) -> Result<PreparedShape> {
    validate_vertices(verts, 3, "convex polygon")?;
    if area_for_poly(verts) <= f64::EPSILON {
        return Err(WorldError::InvalidGeometry(
            "convex polygon has zero area".into(),
        ));
    }
    let points: Vec<Point<Real>> = verts.iter().map(|&v| to_point(v)).collect();
    let shape = SharedShape::convex_hull(&points).ok_or_else(|| {
        WorldError::InvalidGeometry(format!(
            "{} vertices do not span a convex polygon",
            verts.len()
        ))
    })?;
    Ok(PreparedShape {
        shape,
        offset: Isometry::identity(),
    })
}

impl ShapeSpec {
    /// Convert into an engine shape, rejecting degenerate geometry.
    pub fn prepare(&self) -> Result<PreparedShape> {
        match self {
            ShapeSpec::Circle { center, radius } => {
                if !(radius.is_finite() && *radius > 0.0) || !center.is_finite() {
                    return Err(WorldError::InvalidGeometry(format!(
                        "circle radius must be positive, got {radius}"
                    )));
                }
                Ok(PreparedShape {
                    shape: SharedShape::ball(*radius),
                    offset: Isometry::translation(center.x, center.y),
                })
            }
            ShapeSpec::ConvexPolygon(verts) => {
                let prepared = hull(verts)?;
                if !is_convex(verts) {
                    return Err(WorldError::InvalidGeometry(format!(
                        "polygon with {} vertices is not convex",
                        verts.len()
                    )));
                }
                Ok(prepared)
            }
            ShapeSpec::Hull(verts) => hull(verts),
            ShapeSpec::Capsule { a, b, radius } => {
                if !(radius.is_finite() && *radius > 0.0) || !a.is_finite() || !b.is_finite() {
                    return Err(WorldError::InvalidGeometry(format!(
                        "segment half-width must be positive, got {radius}"
                    )));
                }
                Ok(PreparedShape {
                    shape: SharedShape::capsule(to_point(*a), to_point(*b), *radius),
                    offset: Isometry::identity(),
                })
            }
        }
    }
}
