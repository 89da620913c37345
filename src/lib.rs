//! # emberfield
//!
//! An interactive, OSC-controllable particle visualizer with persistent
//! motion trails, built for live performance.
//!
//! Particles spawn inside a circular emitter, move under simple forces
//! (radial attraction or repulsion, tangential spin, friction, angular
//! drift), age out, and are composited into an offscreen buffer that is only
//! partially faded each frame, which is what draws the trails. Every
//! parameter can be changed live, either from the on-screen slider panel or
//! over UDP with OSC-style messages (`/<paramName>/x <float in [0,1]>`).
//!
//! ## Structure
//!
//! | Module | Role |
//! |--------|------|
//! | [`params`] | Shared parameter store and the key/range registry |
//! | [`particle`] | A single particle: spawn, Euler integration, death |
//! | [`population`] | Cull, fractional-rate spawning, per-tick updates |
//! | [`control`] | OSC input drained once per tick |
//! | [`gpu`] | Trail compositing and instanced particle rendering |
//! | [`interface`] | egui slider panel (feature `egui`, on by default) |
//! | [`presets`] | Numbered preset files, flat float lists |
//! | [`app`] | winit application: events, key bindings, the tick |
//!
//! ## Running
//!
//! ```ignore
//! use emberfield::app::App;
//!
//! fn main() {
//!     App::run().unwrap();
//! }
//! ```
//!
//! Enter toggles the panel, Space captures the frame to `screen<N>.png`,
//! digits load presets and shifted digits save them. The OSC listener binds
//! UDP port 7000.

pub mod app;
pub mod capture;
pub mod control;
pub mod error;
pub mod gpu;
#[cfg(feature = "egui")]
pub mod interface;
pub mod params;
pub mod particle;
pub mod population;
pub mod presets;
pub mod time;
pub mod visuals;

pub use glam::Vec2;

pub use app::App;
pub use params::{ParamKey, Params};
pub use particle::Particle;
pub use population::Population;
pub use visuals::ParticleShape;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::app::App;
    pub use crate::control::{ControlInput, OSC_PORT};
    pub use crate::params::{ParamKey, Params};
    pub use crate::particle::Particle;
    pub use crate::population::Population;
    pub use crate::time::FrameClock;
    pub use crate::visuals::ParticleShape;
    pub use glam::Vec2;
}
