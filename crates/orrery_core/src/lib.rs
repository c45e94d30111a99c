//! Orrery Core
//!
//! Foundational primitives shared by the Orrery animation crates:
//!
//! - **Geometry**: 2D points and sizes for the canvas surface, 3D vectors and
//!   column-major matrices for scene transforms
//! - **Paint**: colors, gradients, brushes and blend modes
//! - **Draw Context**: the render surface every subsystem draws onto, plus a
//!   recording implementation for headless runs and tests
//! - **Random Sources**: injectable randomness so simulations are reproducible
//!
//! # Example
//!
//! ```rust
//! use orrery_core::{DrawContext, Point, RandomSource, RecordingContext, SceneRng, Size};
//!
//! let mut rng = SceneRng::seeded(42);
//! let mut ctx = RecordingContext::new(Size::new(640.0, 480.0));
//!
//! let x = rng.range(0.0, 640.0);
//! ctx.fill_circle(Point::new(x, 240.0), 2.0, orrery_core::Color::WHITE.into());
//! assert_eq!(ctx.commands().len(), 1);
//! ```

pub mod color;
pub mod draw;
pub mod geometry;
pub mod random;

pub use color::{BlendMode, Brush, Color, Gradient, GradientStop, GradientStops};
pub use draw::{
    Camera, CameraProjection, DrawCommand, DrawContext, DrawContextExt, FontWeight, LineCap,
    MaterialId, MeshId, MeshInstance, Path, PathCommand, RecordingContext, Stroke, TextStyle,
    Transform,
};
pub use geometry::{Affine2D, Mat4, Point, Size, Vec2, Vec3};
pub use random::{RandomSource, SceneRng, SequenceRng};
