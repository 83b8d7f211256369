//! Multi-shape objects: containers and compounds.

use std::f64::consts::PI;

use glam::DVec2;

use super::{Assembly, BodyParams, CompoundShape, ContainerShape, ShapeKind};
use crate::color::Rgba;
use crate::error::{Result, WorldError};
use crate::geometry::{
    centroid_for_poly, combine_polygons, find_outline, moment_for_segment, poly_validate,
    segments_to_polygons, validate_convex, validate_vertices,
};
use crate::physics::collider::{CollisionTag, ShapeSpec};

/// Outline of `polys`, or `None` with a warning when the tiling does not close.
fn cached_outline(name_hint: &str, polys: &[Vec<DVec2>]) -> Option<Vec<DVec2>> {
    match find_outline(polys) {
        Ok(outline) => Some(outline),
        Err(err) => {
            tracing::warn!("{} outline unavailable: {}", name_hint, err);
            None
        }
    }
}

/// A thick open polyline whose walls are extruded quads and whose interior
/// is a sensor.
pub(crate) fn container(
    points: &[DVec2],
    width: f64,
    params: BodyParams,
    inner_color: Rgba,
) -> Result<Assembly> {
    validate_vertices(points, 4, "container")?;
    if !(width.is_finite() && width > 0.0) {
        return Err(WorldError::InvalidGeometry(format!(
            "container width must be positive, got {width}"
        )));
    }
    let r = width / 2.0;
    let loc = centroid_for_poly(points);
    let local: Vec<DVec2> = if params.density == 0.0 {
        points.to_vec()
    } else {
        points.iter().map(|&p| p - loc).collect()
    };

    let mut area = PI * r * r;
    let mut moment = 0.0;
    for w in local.windows(2) {
        let wall = 2.0 * r * w[0].distance(w[1]);
        area += wall;
        moment += moment_for_segment(wall * params.density, w[0], w[1]);
    }
    let mass = params.density * area;

    let polys: Vec<Vec<DVec2>> = segments_to_polygons(&local, r)?
        .into_iter()
        .map(|q| q.to_vec())
        .collect();

    let mut interior = local.clone();
    if !poly_validate(&interior) {
        interior.reverse();
    }

    let outline = cached_outline("container", &polys);
    Ok(Assembly {
        kind: ShapeKind::Container(ContainerShape {
            points: local,
            radius: r,
            polys: polys.clone(),
            outline,
            inner_color,
            outer_color: params.color,
        }),
        params,
        tag: CollisionTag::Solid,
        area,
        mass,
        moment: if mass == 0.0 { 0.0 } else { moment },
        origin: loc,
        solids: polys.into_iter().map(ShapeSpec::Hull).collect(),
        sensor: Some(ShapeSpec::Hull(interior)),
    })
}

/// Several convex polygons on one body, or independent static shapes when
/// the density is zero.
pub(crate) fn compound(
    polys: &[Vec<DVec2>],
    params: BodyParams,
    tag: CollisionTag,
) -> Result<Assembly> {
    if polys.is_empty() {
        return Err(WorldError::InvalidGeometry(
            "compound needs at least one polygon".into(),
        ));
    }
    for p in polys {
        validate_convex(p, "compound part")?;
    }

    let combined = combine_polygons(polys, params.density);
    let (local, moment) = if combined.mass == 0.0 {
        (polys.to_vec(), 0.0)
    } else {
        (combined.local_polys.clone(), combined.moment)
    };

    let outline = cached_outline("compound", &local);
    Ok(Assembly {
        kind: ShapeKind::Compound(CompoundShape {
            polys: local.clone(),
            outline,
        }),
        params,
        tag,
        area: combined.area,
        mass: combined.mass,
        moment,
        origin: combined.centroid,
        solids: local.into_iter().map(ShapeSpec::ConvexPolygon).collect(),
        sensor: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{area_for_poly, box_vertices, PolyMass};
    use crate::physics::collider::Material;

    fn params(density: f64) -> BodyParams {
        BodyParams {
            color: Rgba::BLACK,
            density,
            material: Material {
                elasticity: 0.5,
                friction: 0.5,
            },
            velocity: None,
        }
    }

    fn cup() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 10.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
        ]
    }

    #[test]
    fn test_container_geometry() {
        let a = container(&cup(), 2.0, params(1.0), Rgba::GREEN).unwrap();
        let ShapeKind::Container(c) = &a.kind else {
            panic!("expected container");
        };
        assert_eq!(c.polys.len(), 3);
        assert_eq!(c.outline.as_ref().map(Vec::len), Some(8));
        assert!((a.area - (PI + 2.0 * 30.0)).abs() < 1e-9, "area = {}", a.area);
        assert!((a.mass - a.area).abs() < 1e-12);
        assert!(a.moment > 0.0);
        assert!(a.sensor.is_some());
        // recentered on the polygon centroid of the path
        assert!((a.origin - centroid_for_poly(&cup())).length() < 1e-12);
        assert!((c.points[1] - (cup()[1] - a.origin)).length() < 1e-12);
    }

    #[test]
    fn test_static_container_stays_in_place() {
        let a = container(&cup(), 2.0, params(0.0), Rgba::GREEN).unwrap();
        assert_eq!(a.mass, 0.0);
        assert_eq!(a.moment, 0.0);
        let ShapeKind::Container(c) = &a.kind else {
            panic!("expected container");
        };
        assert_eq!(c.points, cup());
    }

    #[test]
    fn test_compound_mass_is_additive() {
        let parts = vec![
            box_vertices([0.0, 0.0, 1.0, 1.0]),
            box_vertices([1.0, 0.0, 2.0, 1.0]),
            box_vertices([0.0, 1.0, 1.0, 2.0]),
        ];
        let rho = 1.5;
        let a = compound(&parts, params(rho), CollisionTag::Solid).unwrap();
        let total: f64 = parts.iter().map(|p| area_for_poly(p)).sum();
        assert!((a.mass - rho * total).abs() < 1e-9);

        let expected: f64 = parts
            .iter()
            .map(|p| {
                let m = PolyMass::new(p);
                let d = m.centroid - a.origin;
                m.centroidal_moment(rho) + rho * m.area * d.length_squared()
            })
            .sum();
        assert!((a.moment - expected).abs() < 1e-9);

        let ShapeKind::Compound(c) = &a.kind else {
            panic!("expected compound");
        };
        assert_eq!(c.outline.as_ref().map(Vec::len), Some(8), "L tiling has eight boundary edges");
    }

    #[test]
    fn test_static_compound() {
        let parts = vec![box_vertices([0.0, 0.0, 1.0, 1.0])];
        let a = compound(&parts, params(0.0), CollisionTag::Placed).unwrap();
        assert_eq!(a.mass, 0.0);
        assert_eq!(a.tag, CollisionTag::Placed);
        let ShapeKind::Compound(c) = &a.kind else {
            panic!("expected compound");
        };
        assert_eq!(c.polys, parts);
    }

    #[test]
    fn test_disjoint_compound_has_no_outline() {
        let parts = vec![
            box_vertices([0.0, 0.0, 1.0, 1.0]),
            box_vertices([3.0, 0.0, 4.0, 1.0]),
        ];
        let a = compound(&parts, params(1.0), CollisionTag::Solid).unwrap();
        let ShapeKind::Compound(c) = &a.kind else {
            panic!("expected compound");
        };
        assert!(c.outline.is_none());
    }

    #[test]
    fn test_concave_compound_part_rejected() {
        let parts = vec![
            box_vertices([0.0, 0.0, 1.0, 1.0]),
            vec![
                DVec2::new(1.0, 0.0),
                DVec2::new(2.0, 0.5),
                DVec2::new(3.0, 0.0),
                DVec2::new(2.0, 2.0),
            ],
        ];
        assert!(matches!(
            compound(&parts, params(1.0), CollisionTag::Solid),
            Err(WorldError::InvalidGeometry(_))
        ));
    }
}
