//! Tunable simulation and render parameters.
//!
//! Every knob the visualizer exposes lives in [`Params`], a single flat
//! record created at startup and shared (by `&mut`) between the control-input
//! adapter, the slider panel and the preset store. Writers never hold raw
//! references to individual fields; they go through [`ParamKey`], which pairs
//! each parameter with its display name and control range. That keeps the
//! OSC remap, the sliders and the preset file format all driven by one table.
//!
//! # Example
//!
//! ```
//! use emberfield::params::{ParamKey, Params};
//!
//! let mut params = Params::default();
//! params.set_normalized(ParamKey::Force, 0.5);
//! assert_eq!(params.force, 0.0); // midpoint of [-1000, 1000]
//! ```

use glam::Vec2;

use crate::visuals::ParticleShape;

/// Identifies one tunable parameter.
///
/// The variant order is the registration order of the original control
/// surface and therefore also the field order of preset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    /// Particles spawned per second.
    BornRate,
    /// Lifetime assigned to newly spawned particles, in seconds.
    LifeTime,
    /// Trail persistence in `[0, 1]`; 1 keeps the full previous frame.
    History,
    /// Emitter radius in pixels.
    ERad,
    /// Initial velocity magnitude bound.
    VelRad,
    /// Velocity rotation rate in degrees per second.
    Rotate,
    /// Tangential force inside the emitter disk.
    Spinning,
    /// Radial force inside the emitter disk (positive pushes outward).
    Force,
    /// Velocity damping factor per update.
    Friction,
    /// Fill toggle (rounded to a bool at draw time).
    Fill,
    /// Outline width in pixels.
    LineWidth,
    /// Pulsating-size toggle (rounded to a bool at draw time).
    Pulsate,
    /// Shape selector (rounded: 0 = circle, 1 = rectangle).
    Shape,
    /// Particle radius / half-extent in pixels.
    Size,
    RedChannel,
    GreenChannel,
    BlueChannel,
}

impl ParamKey {
    /// All keys, in registration (and preset file) order.
    pub const ALL: [ParamKey; 17] = [
        ParamKey::BornRate,
        ParamKey::LifeTime,
        ParamKey::History,
        ParamKey::ERad,
        ParamKey::VelRad,
        ParamKey::Rotate,
        ParamKey::Spinning,
        ParamKey::Force,
        ParamKey::Friction,
        ParamKey::Fill,
        ParamKey::LineWidth,
        ParamKey::Pulsate,
        ParamKey::Shape,
        ParamKey::Size,
        ParamKey::RedChannel,
        ParamKey::GreenChannel,
        ParamKey::BlueChannel,
    ];

    /// The wire/slider name of this parameter.
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::BornRate => "bornRate",
            ParamKey::LifeTime => "lifeTime",
            ParamKey::History => "history",
            ParamKey::ERad => "eRad",
            ParamKey::VelRad => "velRad",
            ParamKey::Rotate => "rotate",
            ParamKey::Spinning => "spinning",
            ParamKey::Force => "force",
            ParamKey::Friction => "friction",
            ParamKey::Fill => "fill",
            ParamKey::LineWidth => "lineWidth",
            ParamKey::Pulsate => "pulsate",
            ParamKey::Shape => "shape",
            ParamKey::Size => "size",
            ParamKey::RedChannel => "redChannel",
            ParamKey::GreenChannel => "greenChannel",
            ParamKey::BlueChannel => "blueChannel",
        }
    }

    /// The `[min, max]` control range used for normalized remapping.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamKey::BornRate => (0.0, 700.0),
            ParamKey::LifeTime => (0.0, 5.0),
            ParamKey::History => (0.0, 1.0),
            ParamKey::ERad => (0.0, 800.0),
            ParamKey::VelRad => (0.0, 400.0),
            ParamKey::Rotate => (-500.0, 500.0),
            ParamKey::Spinning => (-1000.0, 1000.0),
            ParamKey::Force => (-1000.0, 1000.0),
            ParamKey::Friction => (0.0, 0.1),
            ParamKey::Fill => (0.0, 1.0),
            ParamKey::LineWidth => (1.0, 8.0),
            ParamKey::Pulsate => (0.0, 1.0),
            ParamKey::Shape => (0.0, 1.0),
            ParamKey::Size => (2.0, 50.0),
            ParamKey::RedChannel => (0.0, 255.0),
            ParamKey::GreenChannel => (0.0, 255.0),
            ParamKey::BlueChannel => (0.0, 255.0),
        }
    }

    /// Look up a key by its wire name.
    pub fn from_name(name: &str) -> Option<ParamKey> {
        ParamKey::ALL.iter().copied().find(|k| k.name() == name)
    }
}

/// The shared parameter record.
///
/// `shape`, `fill` and `pulsate` are stored as floats because the control
/// surface writes floats; they are rounded into their discrete meaning at the
/// point of use ([`Params::shape_kind`] and friends).
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Emitter center in window pixels. Set once at startup, not part of the
    /// keyed registry.
    pub emitter_center: Vec2,
    pub born_rate: f32,
    pub life_time: f32,
    pub history: f32,
    pub emitter_radius: f32,
    pub velocity_radius: f32,
    pub rotate: f32,
    pub spinning: f32,
    pub force: f32,
    pub friction: f32,
    pub fill: f32,
    pub line_width: f32,
    pub pulsate: f32,
    pub shape: f32,
    pub size: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            emitter_center: Vec2::ZERO,
            born_rate: 300.0,
            life_time: 2.0,
            history: 0.9,
            emitter_radius: 300.0,
            velocity_radius: 0.0,
            rotate: 0.0,
            spinning: 0.0,
            force: 0.0,
            friction: 0.05,
            fill: 0.0,
            line_width: 2.0,
            pulsate: 0.0,
            shape: 0.0,
            size: 5.0,
            red: 255.0,
            green: 0.0,
            blue: 255.0,
        }
    }
}

impl Params {
    /// Read a parameter through the registry.
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::BornRate => self.born_rate,
            ParamKey::LifeTime => self.life_time,
            ParamKey::History => self.history,
            ParamKey::ERad => self.emitter_radius,
            ParamKey::VelRad => self.velocity_radius,
            ParamKey::Rotate => self.rotate,
            ParamKey::Spinning => self.spinning,
            ParamKey::Force => self.force,
            ParamKey::Friction => self.friction,
            ParamKey::Fill => self.fill,
            ParamKey::LineWidth => self.line_width,
            ParamKey::Pulsate => self.pulsate,
            ParamKey::Shape => self.shape,
            ParamKey::Size => self.size,
            ParamKey::RedChannel => self.red,
            ParamKey::GreenChannel => self.green,
            ParamKey::BlueChannel => self.blue,
        }
    }

    /// Write a parameter through the registry.
    pub fn set(&mut self, key: ParamKey, value: f32) {
        match key {
            ParamKey::BornRate => self.born_rate = value,
            ParamKey::LifeTime => self.life_time = value,
            ParamKey::History => self.history = value,
            ParamKey::ERad => self.emitter_radius = value,
            ParamKey::VelRad => self.velocity_radius = value,
            ParamKey::Rotate => self.rotate = value,
            ParamKey::Spinning => self.spinning = value,
            ParamKey::Force => self.force = value,
            ParamKey::Friction => self.friction = value,
            ParamKey::Fill => self.fill = value,
            ParamKey::LineWidth => self.line_width = value,
            ParamKey::Pulsate => self.pulsate = value,
            ParamKey::Shape => self.shape = value,
            ParamKey::Size => self.size = value,
            ParamKey::RedChannel => self.red = value,
            ParamKey::GreenChannel => self.green = value,
            ParamKey::BlueChannel => self.blue = value,
        }
    }

    /// Write a parameter from a normalized `[0, 1]` control value.
    ///
    /// The value is remapped into the key's configured range; inputs outside
    /// `[0, 1]` are clamped, so writes can never leave the range.
    pub fn set_normalized(&mut self, key: ParamKey, normalized: f32) {
        let t = normalized.clamp(0.0, 1.0);
        let (min, max) = key.range();
        self.set(key, min + t * (max - min));
    }

    /// The discrete shape selected by the `shape` slider.
    pub fn shape_kind(&self) -> ParticleShape {
        ParticleShape::from_control(self.shape)
    }

    /// Whether filled drawing is enabled.
    pub fn fill_enabled(&self) -> bool {
        self.fill.round() >= 1.0
    }

    /// Whether the pulsating-size effect is enabled.
    pub fn pulsate_enabled(&self) -> bool {
        self.pulsate.round() >= 1.0
    }

    /// Base color as normalized RGB.
    pub fn base_color(&self) -> glam::Vec3 {
        glam::Vec3::new(self.red / 255.0, self.green / 255.0, self.blue / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_key() {
        let mut params = Params::default();
        for key in ParamKey::ALL {
            params.set(key, 0.25);
            assert_eq!(params.get(key), 0.25, "{}", key.name());
        }
    }

    #[test]
    fn test_normalized_remap_midpoint_and_extremes() {
        let mut params = Params::default();
        params.set_normalized(ParamKey::Force, 0.5);
        assert_eq!(params.force, 0.0);
        params.set_normalized(ParamKey::Force, 1.0);
        assert_eq!(params.force, 1000.0);
        params.set_normalized(ParamKey::Force, 0.0);
        assert_eq!(params.force, -1000.0);
    }

    #[test]
    fn test_normalized_input_is_clamped() {
        let mut params = Params::default();
        params.set_normalized(ParamKey::Friction, 2.0);
        assert_eq!(params.friction, 0.1);
        params.set_normalized(ParamKey::Friction, -1.0);
        assert_eq!(params.friction, 0.0);
    }

    #[test]
    fn test_name_lookup_round_trips() {
        for key in ParamKey::ALL {
            assert_eq!(ParamKey::from_name(key.name()), Some(key));
        }
        assert_eq!(ParamKey::from_name("notAParam"), None);
    }

    #[test]
    fn test_discrete_accessors_round() {
        let mut params = Params::default();
        params.shape = 0.4;
        assert_eq!(params.shape_kind(), ParticleShape::Circle);
        params.shape = 0.6;
        assert_eq!(params.shape_kind(), ParticleShape::Rect);
        params.fill = 0.49;
        assert!(!params.fill_enabled());
        params.fill = 0.51;
        assert!(params.fill_enabled());
    }
}
