//! Orrery Scene
//!
//! The animated subsystems of the portfolio hero and the scene that runs
//! them together:
//!
//! - **Particle Field**: bouncing 2D particles joined by distance-faded lines
//! - **Orbit Engine**: time-parametric planets circling a sun
//! - **Meteor Shower**: points falling through a cube and respawning on top
//! - **Laptop Rig**: a model that follows the pointer and floats
//! - **Scene**: one scheduler in draw order, plus the page glitch and skill
//!   rotation cycles
//!
//! # Example
//!
//! ```rust
//! use orrery_core::{RecordingContext, Size};
//! use orrery_scene::{Scene, SceneConfig};
//!
//! let mut scene = Scene::build(&SceneConfig::default(), 42).unwrap();
//! let mut surface = RecordingContext::new(Size::new(1280.0, 720.0));
//!
//! scene.frame(0.0, Some(&mut surface));
//! assert_eq!(scene.stats().particles, 100);
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod field;
pub mod meteor;
pub mod orbit;
pub mod rig;
pub mod scene;

#[cfg(test)]
mod tests;

pub use config::{
    BodySpec, CycleConfig, FieldConfig, MeteorConfig, OrbitConfig, PhaseMode, RigConfig,
    SceneConfig, TypewriterSettings,
};
pub use error::{Result, SceneError};
pub use field::{Connection, Particle, ParticleField};
pub use meteor::{Meteor, MeteorShower};
pub use orbit::{layout, OrbitBody, OrbitSystem};
pub use rig::LaptopRig;
pub use scene::{Scene, SceneStats};
