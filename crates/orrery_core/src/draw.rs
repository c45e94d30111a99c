//! Draw Context - the render surface
//!
//! The `DrawContext` trait is the only thing animation subsystems know about
//! the surface they paint on. A subsystem issues 2D canvas operations (paths,
//! circles, text) or 3D scene operations (camera, mesh transforms) and never
//! reads anything back except the viewport size.
//!
//! `RecordingContext` records commands for deferred execution. The CLI and
//! the test suites run every subsystem against it.
//!
//! # Example
//!
//! ```
//! use orrery_core::{Color, DrawContext, Point, RecordingContext, Size};
//!
//! let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
//! ctx.clear();
//! ctx.fill_circle(Point::new(10.0, 20.0), 4.0, Color::WHITE.into());
//! assert_eq!(ctx.commands().len(), 2);
//! ```

use crate::color::{BlendMode, Brush, Color};
use crate::geometry::{Affine2D, Mat4, Point, Size, Vec3};

// ─────────────────────────────────────────────────────────────────────────────
// Transform Types
// ─────────────────────────────────────────────────────────────────────────────

/// Unified transform that can represent 2D or 3D transformations
#[derive(Clone, Debug, PartialEq)]
pub enum Transform {
    /// 2D affine transformation
    Affine2D(Affine2D),
    /// 3D matrix transformation
    Mat4(Mat4),
}

impl Transform {
    /// Create a 2D translation
    pub fn translate(x: f32, y: f32) -> Self {
        Transform::Affine2D(Affine2D::translation(x, y))
    }

    /// Create a 2D scale around the origin (0, 0)
    pub fn scale(sx: f32, sy: f32) -> Self {
        Transform::Affine2D(Affine2D::scale(sx, sy))
    }

    /// Create identity transform
    pub fn identity() -> Self {
        Transform::Affine2D(Affine2D::IDENTITY)
    }

    pub fn is_2d(&self) -> bool {
        matches!(self, Transform::Affine2D(_))
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Transform::Mat4(_))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl From<Affine2D> for Transform {
    fn from(t: Affine2D) -> Self {
        Transform::Affine2D(t)
    }
}

impl From<Mat4> for Transform {
    fn from(t: Mat4) -> Self {
        Transform::Mat4(t)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stroke Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Stroke style configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Line width
    pub width: f32,
    /// Line cap style
    pub cap: LineCap,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
        }
    }
}

impl Stroke {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Font weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Text style configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels
    pub size: f32,
    pub weight: FontWeight,
    pub color: Color,
    /// Glow radius in pixels (0 disables the glow)
    pub glow: f32,
    pub glow_color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 14.0,
            weight: FontWeight::Regular,
            color: Color::BLACK,
            glow: 0.0,
            glow_color: Color::TRANSPARENT,
        }
    }
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_glow(mut self, radius: f32, color: Color) -> Self {
        self.glow = radius;
        self.glow_color = color;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Path Types
// ─────────────────────────────────────────────────────────────────────────────

/// Path command for building vector paths
#[derive(Clone, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
}

/// A polyline path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
        self
    }

    /// A single segment from `from` to `to`
    pub fn line(from: Point, to: Point) -> Self {
        Self::new().move_to(from.x, from.y).line_to(to.x, to.y)
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 3D Types
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a mesh owned by the host renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u64);

/// Handle to a material owned by the host renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

/// Mesh instance for instanced rendering
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshInstance {
    pub transform: Mat4,
    pub material: Option<MaterialId>,
}

/// Camera projection
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraProjection {
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

/// Scene camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: CameraProjection,
}

impl Camera {
    pub fn perspective(position: Vec3, target: Vec3, fov_y: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
            projection: CameraProjection::Perspective {
                fov_y,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 1000.0,
            },
        }
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        let CameraProjection::Perspective { aspect: a, .. } = &mut self.projection;
        *a = aspect;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw Context Trait
// ─────────────────────────────────────────────────────────────────────────────

/// The render surface
///
/// - Transform, opacity and blend-mode stacks
/// - 2D drawing operations (paths, circles, text)
/// - 3D scene operations (camera, meshes)
pub trait DrawContext {
    // ─────────────────────────────────────────────────────────────────────────
    // State Stack
    // ─────────────────────────────────────────────────────────────────────────

    /// Push a transform onto the stack
    fn push_transform(&mut self, transform: Transform);

    /// Pop the top transform from the stack
    fn pop_transform(&mut self);

    /// Get the transform on top of the stack
    fn current_transform(&self) -> Transform;

    /// Push an opacity value (multiplied with parent)
    fn push_opacity(&mut self, opacity: f32);

    fn pop_opacity(&mut self);

    fn push_blend_mode(&mut self, mode: BlendMode);

    fn pop_blend_mode(&mut self);

    // ─────────────────────────────────────────────────────────────────────────
    // 2D Drawing Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Clear the whole surface and reset the state stacks
    fn clear(&mut self);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, brush: Brush);

    fn fill_circle(&mut self, center: Point, radius: f32, brush: Brush);

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle);

    // ─────────────────────────────────────────────────────────────────────────
    // 3D Operations
    // ─────────────────────────────────────────────────────────────────────────

    fn set_camera(&mut self, camera: &Camera);

    fn draw_mesh(&mut self, mesh: MeshId, material: MaterialId, transform: Mat4);

    fn draw_mesh_instanced(&mut self, mesh: MeshId, instances: &[MeshInstance]);

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    fn viewport_size(&self) -> Size;

    fn current_opacity(&self) -> f32;

    fn current_blend_mode(&self) -> BlendMode;
}

/// Convenience methods taking `Into<Brush>`
pub trait DrawContextExt: DrawContext {
    fn line<B: Into<Brush>>(&mut self, from: Point, to: Point, stroke: &Stroke, brush: B) {
        self.stroke_path(&Path::line(from, to), stroke, brush.into());
    }
}

impl<T: DrawContext + ?Sized> DrawContextExt for T {}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// A draw command that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    // State
    PushTransform(Transform),
    PopTransform,
    PushOpacity(f32),
    PopOpacity,
    PushBlendMode(BlendMode),
    PopBlendMode,

    // 2D Drawing
    Clear,
    StrokePath {
        path: Path,
        stroke: Stroke,
        brush: Brush,
    },
    FillCircle {
        center: Point,
        radius: f32,
        brush: Brush,
    },
    DrawText {
        text: String,
        origin: Point,
        style: TextStyle,
    },

    // 3D
    SetCamera(Camera),
    DrawMesh {
        mesh: MeshId,
        material: MaterialId,
        transform: Mat4,
    },
    DrawMeshInstanced {
        mesh: MeshId,
        instances: Vec<MeshInstance>,
    },
}

/// A draw context that records commands for later execution
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    transform_stack: Vec<Transform>,
    opacity_stack: Vec<f32>,
    blend_mode_stack: Vec<BlendMode>,
    viewport: Size,
}

impl RecordingContext {
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            transform_stack: vec![Transform::identity()],
            opacity_stack: vec![1.0],
            blend_mode_stack: vec![BlendMode::Normal],
            viewport,
        }
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Resynchronize the surface size after a viewport resize
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    fn reset_stacks(&mut self) {
        self.transform_stack = vec![Transform::identity()];
        self.opacity_stack = vec![1.0];
        self.blend_mode_stack = vec![BlendMode::Normal];
    }
}

impl DrawContext for RecordingContext {
    fn push_transform(&mut self, transform: Transform) {
        self.commands
            .push(DrawCommand::PushTransform(transform.clone()));
        self.transform_stack.push(transform);
    }

    fn pop_transform(&mut self) {
        self.commands.push(DrawCommand::PopTransform);
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        } else {
            tracing::warn!("pop_transform called with no matching push");
        }
    }

    fn current_transform(&self) -> Transform {
        self.transform_stack.last().cloned().unwrap_or_default()
    }

    fn push_opacity(&mut self, opacity: f32) {
        let current = self.current_opacity();
        self.commands.push(DrawCommand::PushOpacity(opacity));
        self.opacity_stack.push(current * opacity);
    }

    fn pop_opacity(&mut self) {
        self.commands.push(DrawCommand::PopOpacity);
        if self.opacity_stack.len() > 1 {
            self.opacity_stack.pop();
        } else {
            tracing::warn!("pop_opacity called with no matching push");
        }
    }

    fn push_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::PushBlendMode(mode));
        self.blend_mode_stack.push(mode);
    }

    fn pop_blend_mode(&mut self) {
        self.commands.push(DrawCommand::PopBlendMode);
        if self.blend_mode_stack.len() > 1 {
            self.blend_mode_stack.pop();
        } else {
            tracing::warn!("pop_blend_mode called with no matching push");
        }
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.reset_stacks();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, brush: Brush) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
            brush,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, brush: Brush) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            brush,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            origin,
            style: style.clone(),
        });
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.commands.push(DrawCommand::SetCamera(*camera));
    }

    fn draw_mesh(&mut self, mesh: MeshId, material: MaterialId, transform: Mat4) {
        self.commands.push(DrawCommand::DrawMesh {
            mesh,
            material,
            transform,
        });
    }

    fn draw_mesh_instanced(&mut self, mesh: MeshId, instances: &[MeshInstance]) {
        self.commands.push(DrawCommand::DrawMeshInstanced {
            mesh,
            instances: instances.to_vec(),
        });
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn current_opacity(&self) -> f32 {
        self.opacity_stack.last().copied().unwrap_or(1.0)
    }

    fn current_blend_mode(&self) -> BlendMode {
        self.blend_mode_stack.last().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_context() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));

        ctx.push_transform(Transform::translate(10.0, 20.0));
        ctx.fill_circle(Point::new(0.0, 0.0), 5.0, Color::WHITE.into());
        ctx.draw_text("Hello", Point::new(10.0, 30.0), &TextStyle::default());
        ctx.pop_transform();

        assert_eq!(ctx.commands().len(), 4);
    }

    #[test]
    fn test_clear_discards_previous_frame() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
        ctx.push_opacity(0.5);
        ctx.fill_circle(Point::new(1.0, 1.0), 1.0, Color::WHITE.into());

        ctx.clear();

        assert_eq!(ctx.commands(), &[DrawCommand::Clear]);
        assert_eq!(ctx.current_opacity(), 1.0);
    }

    #[test]
    fn test_line_path() {
        let path = Path::line(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Point::new(1.0, 2.0)),
                PathCommand::LineTo(Point::new(3.0, 4.0)),
            ]
        );
    }

    #[test]
    fn test_transform_stack() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));

        assert!(ctx.current_transform().is_2d());

        ctx.push_transform(Mat4::rotation_z(0.5).into());
        assert!(ctx.current_transform().is_3d());
        ctx.pop_transform();

        // Should not panic when popping past the root
        ctx.pop_transform();
        assert!(ctx.current_transform().is_2d());
    }

    #[test]
    fn test_opacity_stack() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));

        assert_eq!(ctx.current_opacity(), 1.0);

        ctx.push_opacity(0.5);
        assert_eq!(ctx.current_opacity(), 0.5);

        ctx.push_opacity(0.5);
        assert_eq!(ctx.current_opacity(), 0.25);

        ctx.pop_opacity();
        assert_eq!(ctx.current_opacity(), 0.5);
    }

    #[test]
    fn test_blend_mode_stack() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
        ctx.push_blend_mode(BlendMode::Screen);
        assert_eq!(ctx.current_blend_mode(), BlendMode::Screen);
        ctx.pop_blend_mode();
        assert_eq!(ctx.current_blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_draw_context_ext() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));

        ctx.line(
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            &Stroke::new(2.0).with_cap(LineCap::Round),
            Color::BLACK,
        );

        assert_eq!(ctx.commands().len(), 1);
        match &ctx.commands()[0] {
            DrawCommand::StrokePath { stroke, brush, .. } => {
                assert_eq!(stroke.cap, LineCap::Round);
                assert_eq!(*brush, Brush::Solid(Color::BLACK));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_viewport_resync() {
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
        ctx.set_viewport(Size::new(1024.0, 768.0));
        assert_eq!(ctx.viewport_size(), Size::new(1024.0, 768.0));
    }

    #[test]
    fn test_camera_aspect() {
        let camera = Camera::perspective(Vec3::new(0.0, 5.0, 8.0), Vec3::ZERO, 1.0).with_aspect(2.0);
        let CameraProjection::Perspective { aspect, .. } = camera.projection;
        assert_eq!(aspect, 2.0);
    }
}
