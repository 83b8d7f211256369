//! Per-object parameters and the world-wide defaults they fall back to.

use glam::DVec2;

use crate::color::Rgba;
use crate::error::{Result, WorldError};
use crate::physics::collider::Material;

/// Values applied when an object leaves a parameter unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    /// Default: 1.0.
    pub density: f64,
    /// Default: 0.5.
    pub elasticity: f64,
    /// Default: 0.5.
    pub friction: f64,
    /// Default: black.
    pub color: Rgba,
    /// Color of goals and container interiors. Default: green.
    pub goal_color: Rgba,
    /// Scene background. Default: white.
    pub background: Rgba,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            density: 1.0,
            elasticity: 0.5,
            friction: 0.5,
            color: Rgba::BLACK,
            goal_color: Rgba::GREEN,
            background: Rgba::WHITE,
        }
    }
}

/// Optional overrides for a new object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectParams {
    pub color: Option<Rgba>,
    pub density: Option<f64>,
    pub elasticity: Option<f64>,
    pub friction: Option<f64>,
    /// Initial linear velocity, ignored for static objects.
    pub velocity: Option<DVec2>,
}

impl ObjectParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero density: the object will be static.
    pub fn fixed() -> Self {
        Self::new().density(0.0)
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn elasticity(mut self, elasticity: f64) -> Self {
        self.elasticity = Some(elasticity);
        self
    }

    pub fn friction(mut self, friction: f64) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Fill unset fields from `defaults` and validate the result.
    pub fn resolve(&self, defaults: &Defaults) -> Result<BodyParams> {
        let params = BodyParams {
            color: self.color.unwrap_or(defaults.color),
            density: self.density.unwrap_or(defaults.density),
            material: Material {
                elasticity: self.elasticity.unwrap_or(defaults.elasticity),
                friction: self.friction.unwrap_or(defaults.friction),
            },
            velocity: self.velocity,
        };
        if !(params.density.is_finite() && params.density >= 0.0) {
            return Err(WorldError::InvalidGeometry(format!(
                "density must be finite and non-negative, got {}",
                params.density
            )));
        }
        if !params.material.elasticity.is_finite() || !params.material.friction.is_finite() {
            return Err(WorldError::InvalidOperation(
                "elasticity and friction must be finite".into(),
            ));
        }
        Ok(params)
    }
}

/// Fully resolved parameters used by the shape builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    pub color: Rgba,
    pub density: f64,
    pub material: Material,
    pub velocity: Option<DVec2>,
}
