//! Mass properties of composite bodies built from convex sub-polygons.

use glam::DVec2;

use super::{area_for_poly, centroid_for_poly, moment_for_poly, vertex_mean};

/// Area and centroid of one sub-polygon, plus its vertices re-centered on
/// that centroid.
#[derive(Debug, Clone)]
pub struct PolyMass {
    pub area: f64,
    pub centroid: DVec2,
    pub centered: Vec<DVec2>,
}

impl PolyMass {
    pub fn new(verts: &[DVec2]) -> Self {
        let centroid = centroid_for_poly(verts);
        Self {
            area: area_for_poly(verts),
            centroid,
            centered: verts.iter().map(|&v| v - centroid).collect(),
        }
    }

    /// Moment about this polygon's own centroid for uniform `density`.
    pub fn centroidal_moment(&self, density: f64) -> f64 {
        moment_for_poly(density * self.area, &self.centered, DVec2::ZERO)
    }
}

/// Combined properties of a rigid body made of several polygons.
#[derive(Debug, Clone)]
pub struct CompositeMass {
    pub area: f64,
    pub mass: f64,
    /// Area-weighted centroid of all parts.
    pub centroid: DVec2,
    /// Moment of inertia about `centroid`.
    pub moment: f64,
    /// Each part's centroid relative to `centroid`.
    pub offsets: Vec<DVec2>,
    /// Each part's vertices relative to `centroid`.
    pub local_polys: Vec<Vec<DVec2>>,
}

/// Aggregate a set of polygons into one body of uniform `density`.
///
/// Every part contributes its own centroidal moment shifted to the combined
/// centroid by the parallel-axis term `m_i * d_i^2`.
pub fn combine_polygons(polys: &[Vec<DVec2>], density: f64) -> CompositeMass {
    let parts: Vec<PolyMass> = polys.iter().map(|p| PolyMass::new(p)).collect();
    let area: f64 = parts.iter().map(|p| p.area).sum();

    let centroid = if area > 0.0 {
        parts
            .iter()
            .map(|p| p.centroid * p.area)
            .sum::<DVec2>()
            / area
    } else {
        vertex_mean(&parts.iter().map(|p| p.centroid).collect::<Vec<_>>())
    };

    let offsets: Vec<DVec2> = parts.iter().map(|p| p.centroid - centroid).collect();
    let moment = parts
        .iter()
        .zip(&offsets)
        .map(|(p, d)| p.centroidal_moment(density) + density * p.area * d.length_squared())
        .sum();
    let local_polys = parts
        .iter()
        .zip(&offsets)
        .map(|(p, d)| p.centered.iter().map(|&v| v + *d).collect())
        .collect();

    CompositeMass {
        area,
        mass: area * density,
        centroid,
        moment,
        offsets,
        local_polys,
    }
}
