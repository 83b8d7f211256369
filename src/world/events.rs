//! The collision log and its post-processing into contact spans.

use std::collections::BTreeMap;
use std::fmt;

use crate::physics::contact::ContactDetail;

/// Default gap, in seconds, below which a separation followed by a new
/// contact of the same pair counts as one continuous contact.
pub const DEFAULT_SLOP_TIME: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    Begin,
    End,
}

impl fmt::Display for CollisionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPhase::Begin => f.write_str("begin"),
            CollisionPhase::End => f.write_str("end"),
        }
    }
}

/// One entry of the world's collision log.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub first: String,
    pub second: String,
    pub phase: CollisionPhase,
    /// Simulation clock when the event was routed.
    pub time: f64,
    pub detail: ContactDetail,
}

/// A contact between two objects merged from begin/end log entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSpan {
    /// Lexicographically smaller name of the pair.
    pub first: String,
    pub second: String,
    /// `None` when the log holds an end without a matching begin.
    pub begin: Option<f64>,
    /// `None` while the pair is still in contact at the end of the log.
    pub end: Option<f64>,
    /// Contact at the last separation, or at the first touch when still open.
    pub detail: ContactDetail,
}

/// Merge a collision log into contact spans.
///
/// Pairs are normalized so the smaller name comes first, flipping contact
/// normals to match. A separation followed by a new contact within
/// `slop_time` seconds is joined into one span. Spans are sorted by begin
/// time, missing begins first.
pub fn filter_collision_events(events: &[CollisionEvent], slop_time: f64) -> Vec<ContactSpan> {
    type Pair = (String, String);
    let mut begins: BTreeMap<Pair, (f64, ContactDetail)> = BTreeMap::new();
    let mut lasts: BTreeMap<Pair, (f64, ContactDetail)> = BTreeMap::new();
    let mut spans = Vec::new();

    for ev in events {
        let (key, detail) = if ev.second < ev.first {
            ((ev.second.clone(), ev.first.clone()), ev.detail.flipped())
        } else {
            ((ev.first.clone(), ev.second.clone()), ev.detail.clone())
        };
        match ev.phase {
            CollisionPhase::Begin => match lasts.remove(&key) {
                Some((last, last_detail)) if ev.time - last > slop_time => {
                    spans.push(ContactSpan {
                        first: key.0.clone(),
                        second: key.1.clone(),
                        begin: begins.get(&key).map(|(t, _)| *t),
                        end: Some(last),
                        detail: last_detail,
                    });
                    begins.insert(key, (ev.time, detail));
                }
                // short gap: keep the earlier begin
                Some(_) => {}
                None => {
                    begins.insert(key, (ev.time, detail));
                }
            },
            CollisionPhase::End => {
                lasts.insert(key, (ev.time, detail));
            }
        }
    }

    for (key, (end, detail)) in lasts {
        let begin = begins.remove(&key).map(|(t, _)| t);
        spans.push(ContactSpan {
            first: key.0,
            second: key.1,
            begin,
            end: Some(end),
            detail,
        });
    }
    for (key, (begin, detail)) in begins {
        spans.push(ContactSpan {
            first: key.0,
            second: key.1,
            begin: Some(begin),
            end: None,
            detail,
        });
    }

    spans.sort_by(|a, b| match (a.begin, b.begin) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    });
    spans
}
