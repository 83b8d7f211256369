//! Width-extruded polylines as chains of convex quadrilaterals.
//!
//! The engine only collides convex polygons with each other reliably, so a
//! thick polyline (container walls, ramps) is split into one quad per edge.
//! Adjacent quads share their joint edge exactly, which lets
//! [`find_outline`](super::find_outline) stitch the chain back together.

use std::f64::consts::{FRAC_PI_4, TAU};

use glam::DVec2;

use super::{is_left, validate_vertices};
use crate::error::{Result, WorldError};

/// Minimum number of polyline points accepted by [`segments_to_polygons`].
pub const MIN_POLYLINE_POINTS: usize = 4;

/// Offset pair for an end cap, picked by which axis-centered quarter the edge
/// direction falls in. Boundary angles resolve to the first matching sector.
fn cap_offsets(angle: f64, p: DVec2, r: f64) -> (DVec2, DVec2) {
    if (-3.0 * FRAC_PI_4..=-FRAC_PI_4).contains(&angle) {
        // down
        (DVec2::new(p.x - r, p.y), DVec2::new(p.x + r, p.y))
    } else if (FRAC_PI_4..=3.0 * FRAC_PI_4).contains(&angle) {
        // up
        (DVec2::new(p.x + r, p.y), DVec2::new(p.x - r, p.y))
    } else if (-FRAC_PI_4..=FRAC_PI_4).contains(&angle) {
        // right
        (DVec2::new(p.x, p.y - r), DVec2::new(p.x, p.y + r))
    } else {
        // left
        (DVec2::new(p.x, p.y + r), DVec2::new(p.x, p.y - r))
    }
}

#[inline]
fn heading(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Split a polyline of half-width `r` into convex quads, one per edge.
///
/// Interior joints are offset along the signs of the angle bisector's
/// components, so every joint point sits `r` away on both axes rather than on
/// the true mitre line. Each quad is emitted as `[prev1, prev2, next3, next4]`
/// and the next quad starts from the previous quad's far edge.
pub fn segments_to_polygons(points: &[DVec2], r: f64) -> Result<Vec<[DVec2; 4]>> {
    validate_vertices(points, MIN_POLYLINE_POINTS, "extruded polyline")?;
    if !(r.is_finite() && r > 0.0) {
        return Err(WorldError::InvalidGeometry(format!(
            "extrusion half-width must be positive, got {r}"
        )));
    }

    let n = points.len();
    let (mut prev1, mut prev2) = cap_offsets(heading(points[1] - points[0]), points[0], r);
    let mut quads = Vec::with_capacity(n - 1);

    for i in 1..n - 1 {
        let p = points[i];
        let ang_m = heading(points[i - 1] - p);
        let ang_p = heading(points[i + 1] - p);
        // `%` truncates toward zero, so the joint angle keeps the sign of the difference
        let ang_i = (ang_m - ang_p) % TAU;
        let mut ang_n = (ang_p + ang_i / 2.0) % TAU;
        if ang_n < 0.0 {
            ang_n += TAU;
        }

        let (sin, cos) = ang_n.sin_cos();
        let diff = DVec2::new(
            if cos >= 0.0 { r } else { -r },
            if sin >= 0.0 { r } else { -r },
        );
        let mut next3 = p + diff;
        let mut next4 = p - diff;
        if is_left(prev2, next3, next4) {
            std::mem::swap(&mut next3, &mut next4);
        }

        quads.push([prev1, prev2, next3, next4]);
        prev1 = next4;
        prev2 = next3;
    }

    let (next3, next4) = cap_offsets(heading(points[n - 2] - points[n - 1]), points[n - 1], r);
    quads.push([prev1, prev2, next3, next4]);

    Ok(quads)
}
