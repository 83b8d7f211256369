//! Boundary extraction for sets of edge-adjacent convex polygons.

use glam::DVec2;

use crate::error::{Result, WorldError};

/// Per-coordinate tolerance used when matching edge endpoints.
pub const OUTLINE_TOLERANCE: f64 = 1e-5;

#[inline]
fn approx_eq(a: DVec2, b: DVec2, tol: f64) -> bool {
    (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
}

/// Orders an edge's endpoints lower x first, then lower y.
fn ordered(p1: DVec2, p2: DVec2) -> (DVec2, DVec2) {
    if p1.x < p2.x || (p1.x == p2.x && p1.y < p2.y) {
        (p1, p2)
    } else {
        (p2, p1)
    }
}

fn same_edge(a: &(DVec2, DVec2), b: &(DVec2, DVec2), tol: f64) -> bool {
    (approx_eq(a.0, b.0, tol) && approx_eq(a.1, b.1, tol))
        || (approx_eq(a.0, b.1, tol) && approx_eq(a.1, b.0, tol))
}

/// Outer boundary loop of a polygon tiling.
///
/// Edges that appear in exactly one polygon are boundary edges; edges shared
/// by two polygons are interior and dropped. The boundary edges are then
/// chained end to end starting from the first one found. The returned loop is
/// implicitly closed (the last point connects back to the first) and has one
/// point per boundary edge.
pub fn find_outline(polygons: &[Vec<DVec2>]) -> Result<Vec<DVec2>> {
    find_outline_with_tolerance(polygons, OUTLINE_TOLERANCE)
}

/// [`find_outline`] with an explicit endpoint tolerance.
pub fn find_outline_with_tolerance(polygons: &[Vec<DVec2>], tol: f64) -> Result<Vec<DVec2>> {
    let edges: Vec<(DVec2, DVec2)> = polygons
        .iter()
        .flat_map(|poly| {
            let n = poly.len();
            (0..n).map(move |i| ordered(poly[i], poly[(i + 1) % n]))
        })
        .collect();

    let mut unique: Vec<(DVec2, DVec2)> = edges
        .iter()
        .enumerate()
        .filter(|(i, e)| {
            !edges
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && same_edge(e, other, tol))
        })
        .map(|(_, e)| *e)
        .collect();

    if unique.is_empty() {
        return Err(WorldError::DegenerateOutline(
            "no boundary edges in polygon set".into(),
        ));
    }

    let (start, mut current) = unique.remove(0);
    let mut outline = vec![start, current];

    while unique.len() > 1 {
        let next = unique.iter().enumerate().find_map(|(i, e)| {
            if approx_eq(current, e.0, tol) {
                Some((i, e.1))
            } else if approx_eq(current, e.1, tol) {
                Some((i, e.0))
            } else {
                None
            }
        });
        match next {
            Some((i, p)) => {
                outline.push(p);
                current = p;
                unique.remove(i);
            }
            None => {
                return Err(WorldError::DegenerateOutline(format!(
                    "no boundary edge continues from ({}, {}), {} edges left",
                    current.x,
                    current.y,
                    unique.len()
                )))
            }
        }
    }

    Ok(outline)
}
