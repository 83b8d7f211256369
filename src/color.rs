//! RGBA colors and the small named palette used by scene files.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const GREEN: Rgba = Rgba([0, 255, 0, 255]);
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);
    pub const BLUE: Rgba = Rgba([0, 0, 255, 255]);
    pub const GREY: Rgba = Rgba([127, 127, 127, 255]);
    pub const LIGHT_GREY: Rgba = Rgba([191, 191, 191, 255]);
    /// Fully transparent.
    pub const NONE: Rgba = Rgba([0, 0, 0, 0]);

    /// Look up a palette color by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            "green" => Ok(Self::GREEN),
            "red" => Ok(Self::RED),
            "blue" => Ok(Self::BLUE),
            "grey" | "gray" => Ok(Self::GREY),
            "lightgrey" | "lightgray" => Ok(Self::LIGHT_GREY),
            "none" => Ok(Self::NONE),
            _ => Err(WorldError::UnknownVariant(format!("color {name}"))),
        }
    }

    /// Build from a component list. Three components get an opaque alpha.
    pub fn from_components(c: &[u8]) -> Result<Self> {
        match *c {
            [r, g, b] => Ok(Self([r, g, b, 255])),
            [r, g, b, a] => Ok(Self([r, g, b, a])),
            _ => Err(WorldError::InvalidOperation(format!(
                "color needs 3 or 4 components, got {}",
                c.len()
            ))),
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A color as written in a scene file: a palette name or raw components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDesc {
    Named(String),
    Components(Vec<u8>),
}

impl ColorDesc {
    pub fn resolve(&self) -> Result<Rgba> {
        match self {
            ColorDesc::Named(name) => Rgba::from_name(name),
            ColorDesc::Components(c) => Rgba::from_components(c),
        }
    }
}

impl From<Rgba> for ColorDesc {
    fn from(c: Rgba) -> Self {
        ColorDesc::Components(c.0.to_vec())
    }
}
