//! Static sensor regions: goals and placement blockers.

use glam::DVec2;

use super::{Assembly, BodyParams, ShapeKind};
use crate::error::Result;
use crate::geometry::{area_for_poly, validate_convex};
use crate::physics::collider::{CollisionTag, ShapeSpec};

fn region(vertices: &[DVec2], params: BodyParams, blocker: bool) -> Result<Assembly> {
    validate_convex(vertices, if blocker { "blocker" } else { "goal" })?;
    let vertices = vertices.to_vec();
    let (kind, tag) = if blocker {
        (
            ShapeKind::Blocker {
                vertices: vertices.clone(),
            },
            CollisionTag::Blocked,
        )
    } else {
        (
            ShapeKind::Goal {
                vertices: vertices.clone(),
            },
            CollisionTag::Sensor,
        )
    };
    Ok(Assembly {
        kind,
        params: BodyParams {
            density: 0.0,
            velocity: None,
            ..params
        },
        tag,
        area: area_for_poly(&vertices),
        mass: 0.0,
        moment: 0.0,
        origin: DVec2::ZERO,
        solids: vec![ShapeSpec::ConvexPolygon(vertices)],
        sensor: None,
    })
}

/// A goal region that reports overlaps but never pushes back.
pub(crate) fn goal(vertices: &[DVec2], params: BodyParams) -> Result<Assembly> {
    region(vertices, params, false)
}

/// A region where new objects may not be placed.
pub(crate) fn blocker(vertices: &[DVec2], params: BodyParams) -> Result<Assembly> {
    region(vertices, params, true)
}
