//! Pure 2D geometry used to build collision shapes and mass properties.
//!
//! Nothing in here touches the physics engine:
//!
//! 1. **basic** - rotation, winding tests, polygon area/centroid/moments
//! 2. **extrude** - width-extruded polylines as chains of convex quads
//! 3. **outline** - boundary loop of an edge-adjacent polygon tiling
//! 4. **mass** - combined mass properties of composite bodies

pub mod extrude;
pub mod mass;
pub mod outline;

use std::f64::consts::TAU;

use glam::DVec2;

use crate::error::{Result, WorldError};

pub use extrude::segments_to_polygons;
pub use mass::{combine_polygons, CompositeMass, PolyMass};
pub use outline::{find_outline, OUTLINE_TOLERANCE};

/// Rotate a point about the origin by `angle` radians.
pub fn rotate(p: DVec2, angle: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    DVec2::new(p.x * c - p.y * s, p.x * s + p.y * c)
}

/// Rotate then translate a local point into world space.
#[inline]
pub fn transform(p: DVec2, position: DVec2, angle: f64) -> DVec2 {
    rotate(p, angle) + position
}

/// True if `test` lies strictly to the left of the directed line `start -> end`.
pub fn is_left(start: DVec2, end: DVec2, test: DVec2) -> bool {
    (end - start).perp_dot(test - start) > 0.0
}

/// Winding check on a closed vertex loop.
///
/// Returns false as soon as any consecutive triple turns left, so a convex
/// loop wound clockwise (y up) validates and its reverse does not.
pub fn poly_validate(verts: &[DVec2]) -> bool {
    let n = verts.len();
    (0..n).all(|i| {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let c = verts[(i + 2) % n];
        (b - a).perp_dot(c - b) <= 0.0
    })
}

/// Cross products smaller than this fraction of the edge lengths count as straight.
const STRAIGHT_TOLERANCE: f64 = 1e-12;

/// True if the closed loop is a simple convex polygon in either winding.
/// Collinear vertices are allowed; folds back along an edge are not.
pub fn is_convex(verts: &[DVec2]) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0;
    let mut turning = 0.0;
    for i in 0..n {
        let e1 = verts[(i + 1) % n] - verts[i];
        let e2 = verts[(i + 2) % n] - verts[(i + 1) % n];
        let cross = e1.perp_dot(e2);
        if cross.abs() <= STRAIGHT_TOLERANCE * e1.length() * e2.length() {
            if e1.dot(e2) < 0.0 {
                return false;
            }
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
        turning += cross.atan2(e1.dot(e2));
    }
    // a star polygon turns the same way everywhere but winds more than once
    (turning.abs() - TAU).abs() < 1e-6
}

/// Reject vertex loops that are not convex.
pub fn validate_convex(verts: &[DVec2], what: &str) -> Result<()> {
    validate_vertices(verts, 3, what)?;
    if !is_convex(verts) {
        return Err(WorldError::InvalidGeometry(format!(
            "{what} is not convex; split it into convex parts"
        )));
    }
    Ok(())
}

/// Signed shoelace sum over a closed loop (twice the signed area).
fn cross_sum(verts: &[DVec2]) -> f64 {
    let n = verts.len();
    (0..n)
        .map(|i| verts[i].perp_dot(verts[(i + 1) % n]))
        .sum()
}

/// Unsigned area of a simple polygon.
pub fn area_for_poly(verts: &[DVec2]) -> f64 {
    (cross_sum(verts) / 2.0).abs()
}

/// Area centroid of a simple polygon.
///
/// Degenerate (zero-area) input falls back to the vertex mean.
pub fn centroid_for_poly(verts: &[DVec2]) -> DVec2 {
    let n = verts.len();
    let mut sum = DVec2::ZERO;
    let mut tsum = 0.0;
    for i in 0..n {
        let v1 = verts[i];
        let v2 = verts[(i + 1) % n];
        let cross = v1.perp_dot(v2);
        tsum += cross;
        sum += (v1 + v2) * cross;
    }
    if tsum.abs() <= f64::EPSILON {
        return vertex_mean(verts);
    }
    sum / (3.0 * tsum)
}

/// Arithmetic mean of the vertices.
pub fn vertex_mean(verts: &[DVec2]) -> DVec2 {
    if verts.is_empty() {
        return DVec2::ZERO;
    }
    verts.iter().copied().sum::<DVec2>() / verts.len() as f64
}

/// Translate a polygon so its area centroid sits at the origin.
pub fn recenter_poly(verts: &[DVec2]) -> Vec<DVec2> {
    let c = centroid_for_poly(verts);
    verts.iter().map(|&v| v - c).collect()
}

/// Moment of inertia of a solid polygon of mass `m` about the origin, after
/// shifting every vertex by `offset`.
pub fn moment_for_poly(m: f64, verts: &[DVec2], offset: DVec2) -> f64 {
    let n = verts.len();
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    for i in 0..n {
        let v1 = verts[i] + offset;
        let v2 = verts[(i + 1) % n] + offset;
        let a = v2.perp_dot(v1);
        let b = v1.dot(v1) + v1.dot(v2) + v2.dot(v2);
        sum1 += a * b;
        sum2 += a;
    }
    if sum2.abs() <= f64::EPSILON {
        return 0.0;
    }
    m * sum1 / (6.0 * sum2)
}

/// Moment of inertia of a solid disc about its center.
pub fn moment_for_circle(m: f64, radius: f64) -> f64 {
    m * radius * radius / 2.0
}

/// Area of a capsule of half-width `radius` around `a -> b`.
pub fn area_for_segment(a: DVec2, b: DVec2, radius: f64) -> f64 {
    radius * (std::f64::consts::PI * radius + 2.0 * a.distance(b))
}

/// Moment of inertia of a thin rod `a -> b` about the origin.
pub fn moment_for_segment(m: f64, a: DVec2, b: DVec2) -> f64 {
    let mid = (a + b) * 0.5;
    m * (a.distance_squared(b) / 12.0 + mid.length_squared())
}

/// Axis-aligned bounds `[left, bottom, right, top]` of a point set.
pub fn bounds(points: &[DVec2]) -> Option<[f64; 4]> {
    let first = points.first()?;
    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min = min.min(*p);
        max = max.max(*p);
    }
    Some([min.x, min.y, max.x, max.y])
}

/// Reject empty, short or non-finite vertex lists.
pub fn validate_vertices(verts: &[DVec2], min_len: usize, what: &str) -> Result<()> {
    if verts.len() < min_len {
        return Err(WorldError::InvalidGeometry(format!(
            "{what} needs at least {min_len} points, got {}",
            verts.len()
        )));
    }
    if verts.iter().any(|v| !v.is_finite()) {
        return Err(WorldError::InvalidGeometry(format!(
            "{what} has non-finite coordinates"
        )));
    }
    Ok(())
}

/// Rectangle `[left, bottom, right, top]` as the vertex loop `(l,b) (l,t) (r,t) (r,b)`.
pub fn box_vertices(bounds: [f64; 4]) -> Vec<DVec2> {
    let [l, b, r, t] = bounds;
    vec![
        DVec2::new(l, b),
        DVec2::new(l, t),
        DVec2::new(r, t),
        DVec2::new(r, b),
    ]
}
