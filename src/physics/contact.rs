//! Contact data extracted from engine collision pairs.

use glam::DVec2;
use rapier2d_f64::prelude::{ColliderHandle, ContactPair};

/// A single contact point between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub position: DVec2,
    /// Contact normal (from the first shape to the second).
    pub normal: DVec2,
    /// Signed separation. Negative when penetrating.
    pub distance: f64,
}

/// Contact geometry of one colliding pair at the time of an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetail {
    pub points: Vec<ContactPoint>,
    /// Restitution in effect for the pair.
    pub restitution: f64,
}

impl ContactDetail {
    /// Collect the solver contacts of every manifold in `pair`.
    ///
    /// Restitution is left at zero; the caller knows both materials.
    pub fn from_pair(pair: &ContactPair) -> Self {
        let points = pair
            .manifolds
            .iter()
            .flat_map(|m| {
                let normal = DVec2::new(m.data.normal.x, m.data.normal.y);
                m.data.solver_contacts.iter().map(move |c| ContactPoint {
                    position: DVec2::new(c.point.x, c.point.y),
                    normal,
                    distance: c.dist,
                })
            })
            .collect();
        Self {
            points,
            restitution: 0.0,
        }
    }

    /// Same contact seen from the other shape.
    pub fn flipped(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| ContactPoint {
                    normal: -p.normal,
                    ..*p
                })
                .collect(),
            restitution: self.restitution,
        }
    }
}

/// A begin or end notification for one shape pair, before routing.
#[derive(Debug, Clone)]
pub struct RawCollision {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub started: bool,
    pub detail: ContactDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flipped_negates_normals() {
        let detail = ContactDetail {
            points: vec![ContactPoint {
                position: DVec2::new(1.0, 2.0),
                normal: DVec2::new(0.0, 1.0),
                distance: -0.1,
            }],
            restitution: 0.25,
        };
        let f = detail.flipped();
        assert_eq!(f.points[0].normal, DVec2::new(0.0, -1.0));
        assert_eq!(f.points[0].position, detail.points[0].position);
        assert_eq!(f.restitution, 0.25);
        assert_eq!(f.flipped(), detail);
    }
}
