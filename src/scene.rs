//! Plain-data scene descriptions for saving and rebuilding worlds.
//!
//! [`SceneDesc`] mirrors the nested key/value layout used by scene files:
//! every object carries a `type` string plus the fields of that type. String
//! tags are checked when a world is rebuilt, not when the description is
//! parsed, so a description can be inspected even if it names unknown types.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::{ColorDesc, Rgba};
use crate::conditions::{ConditionType, GoalCondition};
use crate::error::{Result, WorldError};
use crate::objects::{Defaults, ObjectParams, ObjectType, ShapeKind};
use crate::physics::collider::{CollisionTag, CollisionTags};
use crate::world::{World, WorldConfig};

type Point = [f64; 2];

fn to_vec2(p: Point) -> DVec2 {
    DVec2::new(p[0], p[1])
}

fn to_point(v: DVec2) -> Point {
    [v.x, v.y]
}

fn to_vec2s(points: &[Point]) -> Vec<DVec2> {
    points.iter().copied().map(to_vec2).collect()
}

fn to_points(vs: &[DVec2]) -> Vec<Point> {
    vs.iter().copied().map(to_point).collect()
}

fn required<T>(value: Option<T>, kind: &str, name: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        WorldError::InvalidGeometry(format!("{kind} `{name}` is missing `{field}`"))
    })
}

/// World-wide defaults as written in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsDesc {
    pub density: f64,
    pub elasticity: f64,
    pub friction: f64,
    pub color: ColorDesc,
    pub bk_color: ColorDesc,
    pub goal_color: ColorDesc,
}

impl Default for DefaultsDesc {
    fn default() -> Self {
        Defaults::default().into()
    }
}

impl From<Defaults> for DefaultsDesc {
    fn from(d: Defaults) -> Self {
        Self {
            density: d.density,
            elasticity: d.elasticity,
            friction: d.friction,
            color: d.color.into(),
            bk_color: d.background.into(),
            goal_color: d.goal_color.into(),
        }
    }
}

impl DefaultsDesc {
    pub fn resolve(&self) -> Result<Defaults> {
        Ok(Defaults {
            density: self.density,
            elasticity: self.elasticity,
            friction: self.friction,
            color: self.color.resolve()?,
            goal_color: self.goal_color.resolve()?,
            background: self.bk_color.resolve()?,
        })
    }
}

/// One object: a `type` tag plus the fields that type needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDesc {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDesc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Point>,
    /// Added after scene setup (Poly and Compound only).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub placed: bool,
    /// Poly and Goal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Point>>,
    /// Ball.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2: Option<Point>,
    /// Segment and Container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_color: Option<ColorDesc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_color: Option<ColorDesc>,
    /// Compound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polys: Option<Vec<Vec<Point>>>,
}

/// A placement blocker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDesc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDesc>,
    pub vertices: Vec<Point>,
}

/// The goal condition: a `type` tag plus the names it refers to.
///
/// For `SpecificTouch`, `goal` holds the first object and `obj` the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDesc {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objlist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<String>>,
    pub duration: f64,
}

/// A complete scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    pub dims: Point,
    /// Base timestep.
    pub bts: f64,
    pub gravity: f64,
    #[serde(default)]
    pub defaults: DefaultsDesc,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectDesc>,
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockDesc>,
    /// Reserved for joints; always empty.
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
    #[serde(default)]
    pub gcond: Option<ConditionDesc>,
}

fn color_of(desc: &Option<ColorDesc>) -> Result<Option<Rgba>> {
    desc.as_ref().map(ColorDesc::resolve).transpose()
}

impl ObjectDesc {
    fn params(&self) -> Result<ObjectParams> {
        Ok(ObjectParams {
            color: color_of(&self.color)?,
            density: self.density,
            elasticity: self.elasticity,
            friction: self.friction,
            velocity: self.velocity.map(to_vec2),
        })
    }

    /// Add the described object to `world` under `name`.
    pub fn build(&self, world: &mut World, name: &str) -> Result<()> {
        let kind: ObjectType = self.kind.parse()?;
        let what = kind.as_str();
        let params = self.params()?;
        if self.placed && !matches!(kind, ObjectType::Poly | ObjectType::Compound) {
            return Err(WorldError::InvalidOperation(format!(
                "{what} `{name}` cannot be placed; only Poly and Compound can"
            )));
        }
        match kind {
            ObjectType::Poly => {
                let vertices = required(self.vertices.as_deref(), what, name, "vertices")?;
                let vertices = to_vec2s(vertices);
                if self.placed {
                    world.add_placed_poly(name, &vertices, params)?;
                } else {
                    world.add_poly(name, &vertices, params)?;
                }
            }
            ObjectType::Ball => {
                let position = required(self.position, what, name, "position")?;
                let radius = required(self.radius, what, name, "radius")?;
                world.add_ball(name, to_vec2(position), radius, params)?;
            }
            ObjectType::Segment => {
                let p1 = required(self.p1, what, name, "p1")?;
                let p2 = required(self.p2, what, name, "p2")?;
                let width = required(self.width, what, name, "width")?;
                world.add_segment(name, to_vec2(p1), to_vec2(p2), width, params)?;
            }
            ObjectType::Container => {
                let points = required(self.points.as_deref(), what, name, "points")?;
                let width = required(self.width, what, name, "width")?;
                let params = match color_of(&self.outer_color)? {
                    Some(outer) => params.color(outer),
                    None => params,
                };
                let inner = color_of(&self.inner_color)?;
                world.add_container(name, &to_vec2s(points), width, params, inner)?;
            }
            ObjectType::Compound => {
                let polys = required(self.polys.as_deref(), what, name, "polys")?;
                let polys: Vec<Vec<DVec2>> = polys.iter().map(|p| to_vec2s(p)).collect();
                if self.placed {
                    world.add_placed_compound(name, &polys, params)?;
                } else {
                    world.add_compound(name, &polys, params)?;
                }
            }
            ObjectType::Goal => {
                let vertices = required(self.vertices.as_deref(), what, name, "vertices")?;
                world.add_goal(name, &to_vec2s(vertices), params.color)?;
            }
            ObjectType::Blocker => {
                return Err(WorldError::UnknownVariant(format!(
                    "`{name}`: blockers belong in `blocks`, not `objects`"
                )))
            }
        }
        Ok(())
    }
}

impl ConditionDesc {
    fn name(&self, field: &str, value: &Option<String>) -> Result<String> {
        required(value.clone(), "goal condition", &self.kind, field)
    }

    pub fn to_condition(&self) -> Result<GoalCondition> {
        let kind: ConditionType = self.kind.parse()?;
        let d = self.duration;
        Ok(match kind {
            ConditionType::AnyInGoal => GoalCondition::any_in_goal(
                self.name("goal", &self.goal)?,
                d,
                self.exclusions.clone().unwrap_or_default(),
            ),
            ConditionType::SpecificInGoal => GoalCondition::specific_in_goal(
                self.name("goal", &self.goal)?,
                self.name("obj", &self.obj)?,
                d,
            ),
            ConditionType::ManyInGoal => GoalCondition::many_in_goal(
                self.name("goal", &self.goal)?,
                required(self.objlist.clone(), "goal condition", &self.kind, "objlist")?,
                d,
            ),
            ConditionType::AnyTouch => GoalCondition::any_touch(self.name("goal", &self.goal)?, d),
            ConditionType::SpecificTouch => GoalCondition::specific_touch(
                self.name("goal", &self.goal)?,
                self.name("obj", &self.obj)?,
                d,
            ),
        })
    }

    pub fn from_condition(condition: &GoalCondition) -> Self {
        let mut desc = ConditionDesc {
            kind: condition.condition_type().as_str().to_string(),
            goal: Some(condition.goal_name().to_string()),
            obj: None,
            objlist: None,
            exclusions: None,
            duration: condition.duration(),
        };
        match condition {
            GoalCondition::AnyInGoal(c) => desc.exclusions = Some(c.exclusions.clone()),
            GoalCondition::SpecificInGoal(c) => desc.obj = Some(c.object.clone()),
            GoalCondition::ManyInGoal(c) => desc.objlist = Some(c.objects.clone()),
            GoalCondition::AnyTouch(_) => {}
            GoalCondition::SpecificTouch(c) => desc.obj = Some(c.second.clone()),
        }
        desc
    }
}

impl World {
    /// Export every object, blocker and the goal condition.
    pub fn to_scene(&self) -> Result<SceneDesc> {
        let mut objects = BTreeMap::new();
        for o in self.objects() {
            let mut desc = ObjectDesc {
                kind: o.object_type().as_str().to_string(),
                color: Some(o.color().into()),
                density: Some(o.density()),
                elasticity: Some(o.elasticity()),
                friction: Some(o.friction()),
                velocity: if o.is_static() {
                    None
                } else {
                    Some(to_point(o.velocity()?))
                },
                placed: o.tag() == CollisionTag::Placed,
                ..Default::default()
            };
            match o.kind() {
                ShapeKind::Poly { .. } | ShapeKind::Goal { .. } => {
                    desc.vertices = Some(to_points(&o.vertices()?));
                }
                ShapeKind::Ball { .. } => {
                    let (center, radius) = o.circle()?;
                    desc.position = Some(to_point(center));
                    desc.radius = Some(radius);
                }
                ShapeKind::Segment { radius, .. } => {
                    let points = o.points()?;
                    desc.p1 = Some(to_point(points[0]));
                    desc.p2 = Some(to_point(points[1]));
                    desc.width = Some(radius * 2.0);
                }
                ShapeKind::Container(c) => {
                    desc.points = Some(to_points(&o.points()?));
                    desc.width = Some(c.radius * 2.0);
                    desc.inner_color = Some(c.inner_color.into());
                    desc.outer_color = Some(c.outer_color.into());
                }
                ShapeKind::Compound(_) => {
                    desc.polys = Some(o.polys()?.iter().map(|p| to_points(p)).collect());
                }
                ShapeKind::Blocker { .. } => {
                    return Err(WorldError::InvalidOperation(format!(
                        "blocker `{}` registered as an object",
                        o.name()
                    )))
                }
            }
            objects.insert(o.name().to_string(), desc);
        }

        let mut blocks = BTreeMap::new();
        for b in self.blockers() {
            blocks.insert(
                b.name().to_string(),
                BlockDesc {
                    color: Some(b.color().into()),
                    vertices: to_points(&b.vertices()?),
                },
            );
        }

        let config = self.config();
        Ok(SceneDesc {
            dims: to_point(config.dims),
            bts: config.basic_timestep,
            gravity: self.gravity(),
            defaults: config.defaults.clone().into(),
            objects,
            blocks,
            constraints: BTreeMap::new(),
            gcond: self.goal_condition().map(ConditionDesc::from_condition),
        })
    }

    /// Rebuild a world from a scene. No boundary walls are added: walls of
    /// the exported world are already part of `scene.objects`.
    pub fn from_scene(scene: &SceneDesc) -> Result<World> {
        let config = WorldConfig {
            dims: to_vec2(scene.dims),
            gravity: scene.gravity,
            closed_ends: [false; 4],
            basic_timestep: scene.bts,
            defaults: scene.defaults.resolve()?,
            tags: CollisionTags::default(),
        };
        let mut world = World::new(config)?;
        for (name, desc) in &scene.objects {
            desc.build(&mut world, name)?;
        }
        for (name, block) in &scene.blocks {
            let color = color_of(&block.color)?;
            world.add_poly_block(name, &to_vec2s(&block.vertices), color)?;
        }
        if let Some(gcond) = &scene.gcond {
            world.attach_goal_condition(gcond.to_condition()?);
        }
        Ok(world)
    }

    /// Independent copy of the current scene (clock and log start fresh).
    pub fn copy(&self) -> Result<World> {
        World::from_scene(&self.to_scene()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::box_vertices;

    fn sample_world() -> World {
        let mut world = World::new(WorldConfig::new(DVec2::new(200.0, 150.0), 50.0)).unwrap();
        world
            .add_ball("ball", DVec2::new(30.0, 100.0), 4.0, ObjectParams::new().color(Rgba::RED))
            .unwrap();
        world
            .add_poly(
                "tri",
                &[DVec2::new(60.0, 60.0), DVec2::new(70.0, 60.0), DVec2::new(65.0, 70.0)],
                ObjectParams::new().density(2.0),
            )
            .unwrap();
        world
            .add_segment(
                "ramp",
                DVec2::new(10.0, 40.0),
                DVec2::new(80.0, 20.0),
                2.0,
                ObjectParams::fixed(),
            )
            .unwrap();
        world
            .add_container(
                "cup",
                &[
                    DVec2::new(120.0, 60.0),
                    DVec2::new(120.0, 40.0),
                    DVec2::new(150.0, 40.0),
                    DVec2::new(150.0, 60.0),
                ],
                2.0,
                ObjectParams::new().color(Rgba::BLUE),
                None,
            )
            .unwrap();
        world
            .add_compound(
                "ell",
                &[
                    box_vertices([90.0, 90.0, 95.0, 95.0]),
                    box_vertices([95.0, 90.0, 100.0, 95.0]),
                    box_vertices([90.0, 95.0, 95.0, 100.0]),
                ],
                ObjectParams::new(),
            )
            .unwrap();
        world.add_box_goal("goal", [160.0, 0.0, 190.0, 20.0], None).unwrap();
        world.add_block("noplace", [0.0, 120.0, 50.0, 140.0], Some(Rgba::GREY)).unwrap();
        world.attach_specific_in_goal("goal", "ball", 2.0);
        world
    }

    #[test]
    fn test_round_trip_preserves_objects() {
        let world = sample_world();
        let scene = world.to_scene().unwrap();
        assert!(scene.constraints.is_empty());
        let copy = World::from_scene(&scene).unwrap();

        let names: Vec<&str> = world.object_names().collect();
        let copied: Vec<&str> = copy.object_names().collect();
        assert_eq!(names, copied, "walls come back as ordinary objects");

        for o in world.objects() {
            let c = copy.object(o.name()).unwrap();
            assert_eq!(o.object_type(), c.object_type(), "type of {}", o.name());
            assert_eq!(o.is_static(), c.is_static(), "staticness of {}", o.name());
            assert_eq!(o.color(), c.color(), "color of {}", o.name());
            let (a, b) = (o.bounding_box().unwrap(), c.bounding_box().unwrap());
            for i in 0..4 {
                assert!((a[i] - b[i]).abs() < 1e-9, "{}: {:?} vs {:?}", o.name(), a, b);
            }
            assert!((o.mass() - c.mass()).abs() < 1e-9, "mass of {}", o.name());
        }

        assert!(copy.blocker("noplace").is_ok());
        assert_eq!(copy.blocker("noplace").unwrap().color(), Rgba::GREY);
        assert_eq!(copy.goal_condition(), world.goal_condition());
        assert_eq!(copy.gravity(), 50.0);
    }

    #[test]
    fn test_reimport_keeps_ends_open() {
        let mut scene = sample_world().to_scene().unwrap();
        scene.objects.retain(|name, _| !name.starts_with('_'));
        let world = World::from_scene(&scene).unwrap();
        assert!(world.object_names().all(|n| !n.starts_with('_')));
    }

    #[test]
    fn test_copy_is_independent() {
        let world = sample_world();
        let mut copy = world.copy().unwrap();
        copy.step(0.5);
        let original = world.object("ball").unwrap().position().unwrap();
        let moved = copy.object("ball").unwrap().position().unwrap();
        assert_eq!(original, DVec2::new(30.0, 100.0));
        assert!(moved.y < original.y, "copy simulates on its own");
        assert_eq!(world.time(), 0.0);
    }

    #[test]
    fn test_load_json_scene() {
        let json = r#"{
            "dims": [100, 100],
            "bts": 0.01,
            "gravity": 10,
            "defaults": {"density": 1, "elasticity": 0.5, "friction": 0.5,
                         "color": "black", "bk_color": "white", "goal_color": "green"},
            "objects": {
                "b": {"type": "Ball", "position": [50, 90], "radius": 5, "color": "red"},
                "g": {"type": "Goal", "vertices": [[40, 0], [40, 10], [60, 10], [60, 0]]},
                "floor": {"type": "Poly", "density": 0,
                          "vertices": [[0, 0], [0, 1], [100, 1], [100, 0]]}
            },
            "blocks": {"x": {"color": [1, 2, 3], "vertices": [[0, 50], [0, 60], [10, 60], [10, 50]]}},
            "constraints": {},
            "gcond": {"type": "SpecificInGoal", "goal": "g", "obj": "b", "duration": 1}
        }"#;
        let scene: SceneDesc = serde_json::from_str(json).unwrap();
        let world = World::from_scene(&scene).unwrap();
        assert_eq!(world.object("b").unwrap().color(), Rgba::RED);
        assert!(world.object("floor").unwrap().is_static());
        assert_eq!(world.blocker("x").unwrap().color(), Rgba([1, 2, 3, 255]));
        assert!(matches!(
            world.goal_condition(),
            Some(GoalCondition::SpecificInGoal(c)) if c.object == "b" && c.duration == 1.0
        ));

        let text = serde_json::to_string(&world.to_scene().unwrap()).unwrap();
        let again: SceneDesc = serde_json::from_str(&text).unwrap();
        assert_eq!(again.objects.len(), 3);
        assert_eq!(again.objects["b"].kind, "Ball");
        assert_eq!(again.gcond.as_ref().map(|g| g.kind.as_str()), Some("SpecificInGoal"));
    }

    #[test]
    fn test_bad_descriptions() {
        let mut scene = SceneDesc {
            dims: [100.0, 100.0],
            bts: 0.01,
            gravity: 10.0,
            defaults: DefaultsDesc::default(),
            objects: BTreeMap::new(),
            blocks: BTreeMap::new(),
            constraints: BTreeMap::new(),
            gcond: None,
        };
        scene.objects.insert(
            "x".into(),
            ObjectDesc {
                kind: "Spring".into(),
                ..Default::default()
            },
        );
        assert!(matches!(World::from_scene(&scene), Err(WorldError::UnknownVariant(_))));

        scene.objects.insert(
            "x".into(),
            ObjectDesc {
                kind: "Ball".into(),
                position: Some([1.0, 1.0]),
                ..Default::default()
            },
        );
        assert!(matches!(World::from_scene(&scene), Err(WorldError::InvalidGeometry(_))));

        scene.objects.clear();
        scene.gcond = Some(ConditionDesc {
            kind: "Somewhere".into(),
            goal: Some("g".into()),
            obj: None,
            objlist: None,
            exclusions: None,
            duration: 1.0,
        });
        assert!(matches!(World::from_scene(&scene), Err(WorldError::UnknownVariant(_))));
    }

    #[test]
    fn test_specific_touch_export() {
        let cond = GoalCondition::specific_touch("a", "b", 3.0);
        let desc = ConditionDesc::from_condition(&cond);
        assert_eq!(desc.goal.as_deref(), Some("a"));
        assert_eq!(desc.obj.as_deref(), Some("b"));
        assert_eq!(desc.to_condition().unwrap(), cond);
    }

    #[test]
    fn test_placed_tag_survives_round_trip() {
        let mut world = sample_world();
        world
            .add_placed_poly(
                "tool",
                &box_vertices([10.0, 80.0, 20.0, 90.0]),
                ObjectParams::new(),
            )
            .unwrap();
        world
            .add_placed_compound(
                "hook",
                &[
                    box_vertices([40.0, 80.0, 45.0, 85.0]),
                    box_vertices([45.0, 80.0, 50.0, 85.0]),
                ],
                ObjectParams::new(),
            )
            .unwrap();

        let scene = world.to_scene().unwrap();
        assert!(scene.objects["tool"].placed);
        assert!(scene.objects["hook"].placed);
        assert!(!scene.objects["tri"].placed);

        let text = serde_json::to_string(&scene).unwrap();
        assert_eq!(text.matches("\"placed\"").count(), 2, "only placed objects carry the flag");
        let reloaded: SceneDesc = serde_json::from_str(&text).unwrap();
        let copy = World::from_scene(&reloaded).unwrap();
        assert_eq!(copy.object("tool").unwrap().tag(), CollisionTag::Placed);
        assert_eq!(copy.object("hook").unwrap().tag(), CollisionTag::Placed);
        assert_eq!(copy.object("tri").unwrap().tag(), CollisionTag::Solid);
    }

    #[test]
    fn test_only_polygons_can_be_placed() {
        let mut scene = SceneDesc {
            dims: [100.0, 100.0],
            bts: 0.01,
            gravity: 10.0,
            defaults: DefaultsDesc::default(),
            objects: BTreeMap::new(),
            blocks: BTreeMap::new(),
            constraints: BTreeMap::new(),
            gcond: None,
        };
        scene.objects.insert(
            "b".into(),
            ObjectDesc {
                kind: "Ball".into(),
                position: Some([50.0, 50.0]),
                radius: Some(2.0),
                placed: true,
                ..Default::default()
            },
        );
        assert!(matches!(World::from_scene(&scene), Err(WorldError::InvalidOperation(_))));

        scene.objects.insert(
            "b".into(),
            ObjectDesc {
                kind: "Poly".into(),
                vertices: Some(vec![[0.0, 0.0], [5.0, 3.0], [10.0, 0.0], [5.0, 10.0]]),
                ..Default::default()
            },
        );
        assert!(
            matches!(World::from_scene(&scene), Err(WorldError::InvalidGeometry(_))),
            "concave polygons are rejected"
        );
    }
}
