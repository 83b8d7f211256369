//! Dwell-time win conditions.
//!
//! A [`GoalCondition`] is fed goal-overlap and contact signals by the world's
//! collision router and answers, for a given simulation clock, how long the
//! qualifying situation still has to hold. It is won once that remaining time
//! reaches exactly zero, and drops back to "not qualifying" as soon as the
//! situation breaks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WorldError};

/// The five condition variants, as named in scene descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    AnyInGoal,
    SpecificInGoal,
    ManyInGoal,
    AnyTouch,
    SpecificTouch,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::AnyInGoal => "AnyInGoal",
            ConditionType::SpecificInGoal => "SpecificInGoal",
            ConditionType::ManyInGoal => "ManyInGoal",
            ConditionType::AnyTouch => "AnyTouch",
            ConditionType::SpecificTouch => "SpecificTouch",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AnyInGoal" => Ok(ConditionType::AnyInGoal),
            "SpecificInGoal" => Ok(ConditionType::SpecificInGoal),
            "ManyInGoal" => Ok(ConditionType::ManyInGoal),
            "AnyTouch" => Ok(ConditionType::AnyTouch),
            "SpecificTouch" => Ok(ConditionType::SpecificTouch),
            other => Err(WorldError::UnknownVariant(format!("goal condition {other}"))),
        }
    }
}

/// Remaining dwell time for a timer started at `entry`, floored at zero.
fn remaining(duration: f64, entry: Option<f64>, now: f64) -> Option<f64> {
    entry.map(|t| (duration - (now - t)).max(0.0))
}

fn same_pair(a: &str, b: &str, x: &str, y: &str) -> bool {
    (a == x && b == y) || (a == y && b == x)
}

/// Any non-excluded object stays inside `goal` for `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyInGoal {
    pub goal: String,
    pub exclusions: Vec<String>,
    pub duration: f64,
    entries: BTreeMap<String, f64>,
}

/// One named object stays inside `goal` for `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificInGoal {
    pub goal: String,
    pub object: String,
    pub duration: f64,
    entry: Option<f64>,
}

/// At least one of `objects` is continuously inside `goal` for `duration`
/// seconds. The timer belongs to the group, not to any single member.
#[derive(Debug, Clone, PartialEq)]
pub struct ManyInGoal {
    pub goal: String,
    pub objects: Vec<String>,
    pub duration: f64,
    inside: BTreeSet<String>,
    entry: Option<f64>,
}

/// Anything touches `object` for `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyTouch {
    pub object: String,
    pub duration: f64,
    entry: Option<f64>,
}

/// The unordered pair `{first, second}` stays in contact for `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificTouch {
    pub first: String,
    pub second: String,
    pub duration: f64,
    entry: Option<f64>,
}

/// The active win condition of a world.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalCondition {
    AnyInGoal(AnyInGoal),
    SpecificInGoal(SpecificInGoal),
    ManyInGoal(ManyInGoal),
    AnyTouch(AnyTouch),
    SpecificTouch(SpecificTouch),
}

impl GoalCondition {
    pub fn any_in_goal(goal: impl Into<String>, duration: f64, exclusions: Vec<String>) -> Self {
        GoalCondition::AnyInGoal(AnyInGoal {
            goal: goal.into(),
            exclusions,
            duration,
            entries: BTreeMap::new(),
        })
    }

    pub fn specific_in_goal(
        goal: impl Into<String>,
        object: impl Into<String>,
        duration: f64,
    ) -> Self {
        GoalCondition::SpecificInGoal(SpecificInGoal {
            goal: goal.into(),
            object: object.into(),
            duration,
            entry: None,
        })
    }

    pub fn many_in_goal(goal: impl Into<String>, objects: Vec<String>, duration: f64) -> Self {
        GoalCondition::ManyInGoal(ManyInGoal {
            goal: goal.into(),
            objects,
            duration,
            inside: BTreeSet::new(),
            entry: None,
        })
    }

    pub fn any_touch(object: impl Into<String>, duration: f64) -> Self {
        GoalCondition::AnyTouch(AnyTouch {
            object: object.into(),
            duration,
            entry: None,
        })
    }

    pub fn specific_touch(
        first: impl Into<String>,
        second: impl Into<String>,
        duration: f64,
    ) -> Self {
        GoalCondition::SpecificTouch(SpecificTouch {
            first: first.into(),
            second: second.into(),
            duration,
            entry: None,
        })
    }

    pub fn condition_type(&self) -> ConditionType {
        match self {
            GoalCondition::AnyInGoal(_) => ConditionType::AnyInGoal,
            GoalCondition::SpecificInGoal(_) => ConditionType::SpecificInGoal,
            GoalCondition::ManyInGoal(_) => ConditionType::ManyInGoal,
            GoalCondition::AnyTouch(_) => ConditionType::AnyTouch,
            GoalCondition::SpecificTouch(_) => ConditionType::SpecificTouch,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            GoalCondition::AnyInGoal(c) => c.duration,
            GoalCondition::SpecificInGoal(c) => c.duration,
            GoalCondition::ManyInGoal(c) => c.duration,
            GoalCondition::AnyTouch(c) => c.duration,
            GoalCondition::SpecificTouch(c) => c.duration,
        }
    }

    /// Name of the goal region, or of the touched object for touch conditions.
    pub fn goal_name(&self) -> &str {
        match self {
            GoalCondition::AnyInGoal(c) => &c.goal,
            GoalCondition::SpecificInGoal(c) => &c.goal,
            GoalCondition::ManyInGoal(c) => &c.goal,
            GoalCondition::AnyTouch(c) => &c.object,
            GoalCondition::SpecificTouch(c) => &c.first,
        }
    }

    /// `object` started overlapping the sensor region `goal`.
    pub fn goal_begin(&mut self, object: &str, goal: &str, now: f64) {
        match self {
            GoalCondition::AnyInGoal(c) => {
                if goal == c.goal
                    && !c.entries.contains_key(object)
                    && !c.exclusions.iter().any(|e| e == object)
                {
                    c.entries.insert(object.to_string(), now);
                }
            }
            GoalCondition::SpecificInGoal(c) => {
                if goal == c.goal && object == c.object && c.entry.is_none() {
                    c.entry = Some(now);
                }
            }
            GoalCondition::ManyInGoal(c) => {
                if goal == c.goal
                    && c.objects.iter().any(|o| o == object)
                    && c.inside.insert(object.to_string())
                    && c.inside.len() == 1
                {
                    c.entry = Some(now);
                }
            }
            GoalCondition::AnyTouch(_) | GoalCondition::SpecificTouch(_) => {}
        }
    }

    /// `object` stopped overlapping `goal`. `still_inside` is the result of a
    /// point-in-region test at the object's position; single-object
    /// conditions ignore the end while it is true.
    pub fn goal_end(&mut self, object: &str, goal: &str, still_inside: bool) {
        match self {
            GoalCondition::AnyInGoal(c) => {
                if goal == c.goal && !still_inside {
                    c.entries.remove(object);
                }
            }
            GoalCondition::SpecificInGoal(c) => {
                if goal == c.goal && object == c.object && !still_inside {
                    c.entry = None;
                }
            }
            GoalCondition::ManyInGoal(c) => {
                if goal == c.goal && c.inside.remove(object) && c.inside.is_empty() {
                    c.entry = None;
                }
            }
            GoalCondition::AnyTouch(_) | GoalCondition::SpecificTouch(_) => {}
        }
    }

    /// Two solid objects came into contact.
    pub fn touch_begin(&mut self, a: &str, b: &str, now: f64) {
        match self {
            GoalCondition::AnyTouch(c) => {
                if a == c.object || b == c.object {
                    c.entry = Some(now);
                }
            }
            GoalCondition::SpecificTouch(c) => {
                if same_pair(a, b, &c.first, &c.second) {
                    c.entry = Some(now);
                }
            }
            _ => {}
        }
    }

    /// Two solid objects separated.
    pub fn touch_end(&mut self, a: &str, b: &str) {
        match self {
            GoalCondition::AnyTouch(c) => {
                if a == c.object || b == c.object {
                    c.entry = None;
                }
            }
            GoalCondition::SpecificTouch(c) => {
                if same_pair(a, b, &c.first, &c.second) {
                    c.entry = None;
                }
            }
            _ => {}
        }
    }

    /// Seconds the qualifying situation still has to hold at clock `now`, or
    /// `None` when nothing currently qualifies.
    pub fn remaining_time(&self, now: f64) -> Option<f64> {
        match self {
            GoalCondition::AnyInGoal(c) => {
                let earliest = c.entries.values().copied().reduce(f64::min);
                remaining(c.duration, earliest, now)
            }
            GoalCondition::SpecificInGoal(c) => remaining(c.duration, c.entry, now),
            GoalCondition::ManyInGoal(c) => remaining(c.duration, c.entry, now),
            GoalCondition::AnyTouch(c) => remaining(c.duration, c.entry, now),
            GoalCondition::SpecificTouch(c) => remaining(c.duration, c.entry, now),
        }
    }

    pub fn is_won(&self, now: f64) -> bool {
        self.remaining_time(now) == Some(0.0)
    }

    /// Names of the objects currently counted as inside the goal.
    pub fn tracked(&self) -> Vec<&str> {
        match self {
            GoalCondition::AnyInGoal(c) => c.entries.keys().map(String::as_str).collect(),
            GoalCondition::ManyInGoal(c) => c.inside.iter().map(String::as_str).collect(),
            GoalCondition::SpecificInGoal(c) if c.entry.is_some() => vec![c.object.as_str()],
            _ => Vec::new(),
        }
    }
}
