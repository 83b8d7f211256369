//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Errors raised by scene construction, geometry helpers and object accessors.
///
/// The step loop itself never produces these; they surface only at the call
/// that received bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// A name is already registered in the object or blocker registry.
    #[error("name `{0}` is already registered")]
    NameCollision(String),
    /// Vertex counts, widths or coordinates are unusable.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Kinematic access on a static object, unknown names, or bad arguments.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Outline chaining could not close a loop.
    #[error("degenerate outline: {0}")]
    DegenerateOutline(String),
    /// Unrecognized shape, condition or color name in a scene description.
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, WorldError>;
