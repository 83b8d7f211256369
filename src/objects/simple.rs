//! Single-shape objects: balls, convex polygons and segments.

use std::f64::consts::PI;

use glam::DVec2;

use super::{Assembly, BodyParams, ShapeKind};
use crate::error::{Result, WorldError};
use crate::geometry::{
    area_for_poly, area_for_segment, centroid_for_poly, moment_for_circle, moment_for_poly,
    moment_for_segment, validate_convex,
};
use crate::physics::collider::{CollisionTag, ShapeSpec};

pub(crate) fn ball(position: DVec2, radius: f64, params: BodyParams) -> Result<Assembly> {
    if !(radius.is_finite() && radius > 0.0) || !position.is_finite() {
        return Err(WorldError::InvalidGeometry(format!(
            "ball radius must be positive, got {radius}"
        )));
    }
    let area = PI * radius * radius;
    let mass = params.density * area;
    let center = if mass == 0.0 { position } else { DVec2::ZERO };
    Ok(Assembly {
        kind: ShapeKind::Ball { center, radius },
        params,
        tag: CollisionTag::Solid,
        area,
        mass,
        moment: moment_for_circle(mass, radius),
        origin: position,
        solids: vec![ShapeSpec::Circle { center, radius }],
        sensor: None,
    })
}

/// A convex polygon; dynamic polygons are re-centered on their area centroid.
pub(crate) fn poly(vertices: &[DVec2], params: BodyParams, tag: CollisionTag) -> Result<Assembly> {
    validate_convex(vertices, "polygon")?;
    let area = area_for_poly(vertices);
    let mass = params.density * area;
    let centroid = centroid_for_poly(vertices);
    let local: Vec<DVec2> = if mass == 0.0 {
        vertices.to_vec()
    } else {
        vertices.iter().map(|&v| v - centroid).collect()
    };
    let moment = if mass == 0.0 {
        0.0
    } else {
        moment_for_poly(mass, &local, DVec2::ZERO)
    };
    Ok(Assembly {
        kind: ShapeKind::Poly {
            vertices: local.clone(),
        },
        params,
        tag,
        area,
        mass,
        moment,
        origin: centroid,
        solids: vec![ShapeSpec::ConvexPolygon(local)],
        sensor: None,
    })
}

/// A capsule of half-width `width / 2`; dynamic segments sit at their midpoint.
pub(crate) fn segment(p1: DVec2, p2: DVec2, width: f64, params: BodyParams) -> Result<Assembly> {
    if !(width.is_finite() && width > 0.0) {
        return Err(WorldError::InvalidGeometry(format!(
            "segment width must be positive, got {width}"
        )));
    }
    let radius = width / 2.0;
    let area = area_for_segment(p1, p2, radius);
    let mass = params.density * area;
    let mid = (p1 + p2) * 0.5;
    let (a, b) = if mass == 0.0 {
        (p1, p2)
    } else {
        (p1 - mid, p2 - mid)
    };
    Ok(Assembly {
        kind: ShapeKind::Segment { a, b, radius },
        params,
        tag: CollisionTag::Solid,
        area,
        mass,
        moment: moment_for_segment(mass, a, b),
        origin: mid,
        solids: vec![ShapeSpec::Capsule { a, b, radius }],
        sensor: None,
    })
}
