//! Pointer-driven laptop model
//!
//! The model turns to follow the pointer and floats gently up and down:
//!
//! ```text
//! yaw   = pointer.x · world.width  / yaw_divisor
//! pitch = pointer.y · world.height / pitch_divisor
//! y     = sin(t · float_speed) · float_amplitude
//! ```
//!
//! `pointer` is in normalized device coordinates (`[-1, 1]`, +Y up) and
//! `world` is the size of the view in scene units at the model's depth.

use crate::assets::{self, BOX_MESH, PLANE_MESH};
use crate::config::RigConfig;
use orrery_animation::{FrameTask, FrameTime};
use orrery_core::{
    Camera, Color, DrawContext, MaterialId, Mat4, MeshId, Point, Size, Vec2, Vec3,
};

struct Part {
    mesh: MeshId,
    material: MaterialId,
    transform: Mat4,
}

fn box_part(material: MaterialId, at: Vec3, tilt: f32, size: Vec3) -> Part {
    part(BOX_MESH, material, at, tilt, size)
}

fn plane_part(material: MaterialId, at: Vec3, tilt: f32, width: f32, height: f32) -> Part {
    part(PLANE_MESH, material, at, tilt, Vec3::new(width, height, 1.0))
}

fn part(mesh: MeshId, material: MaterialId, at: Vec3, tilt: f32, size: Vec3) -> Part {
    Part {
        mesh,
        material,
        transform: Mat4::from_translation(at)
            .mul(&Mat4::rotation_x(tilt))
            .mul(&Mat4::scale(size.x, size.y, size.z)),
    }
}

fn laptop_parts() -> Vec<Part> {
    vec![
        box_part(
            assets::LAPTOP_BODY_MATERIAL,
            Vec3::new(0.0, -0.5, 0.0),
            0.0,
            Vec3::new(3.0, 0.2, 2.0),
        ),
        box_part(
            assets::LAPTOP_SCREEN_MATERIAL,
            Vec3::new(0.0, 0.5, -0.9),
            -0.1,
            Vec3::new(2.8, 1.8, 0.1),
        ),
        plane_part(
            assets::SCREEN_GLOW_MATERIAL,
            Vec3::new(0.0, 0.5, -0.85),
            -0.1,
            2.6,
            1.6,
        ),
        plane_part(
            assets::HOLOGRAM_MATERIAL,
            Vec3::new(0.0, 1.5, -0.5),
            0.0,
            1.0,
            1.0,
        ),
        box_part(
            assets::TABLE_MATERIAL,
            Vec3::new(0.0, -1.2, 0.0),
            0.0,
            Vec3::new(5.0, 0.2, 3.0),
        ),
    ]
}

/// The laptop rig subsystem
pub struct LaptopRig {
    config: RigConfig,
    parts: Vec<Part>,
    pointer: Vec2,
    world: Size,
    pitch: f32,
    yaw: f32,
    float_y: f32,
    camera: Camera,
}

impl LaptopRig {
    pub fn new(config: RigConfig) -> Self {
        let camera = Camera::perspective(
            Vec3::new(0.0, 0.0, config.camera_distance),
            Vec3::ZERO,
            config.camera_fov.to_radians(),
        );
        let mut rig = Self {
            config,
            parts: laptop_parts(),
            pointer: Vec2::ZERO,
            world: Size::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            float_y: 0.0,
            camera,
        };
        rig.world = rig.world_size(1.0);
        rig
    }

    /// Visible scene size at the model's depth for a given aspect ratio
    pub fn world_size(&self, aspect: f32) -> Size {
        let half_fov = self.config.camera_fov.to_radians() / 2.0;
        let height = 2.0 * self.config.camera_distance * half_fov.tan();
        Size::new(height * aspect, height)
    }

    /// Set the pointer in normalized device coordinates
    ///
    /// Values are clamped to `[-1, 1]`; non-finite input is ignored.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        if !(pointer.x.is_finite() && pointer.y.is_finite()) {
            tracing::warn!("LaptopRig: ignoring non-finite pointer");
            return;
        }
        self.pointer = Vec2::new(pointer.x.clamp(-1.0, 1.0), pointer.y.clamp(-1.0, 1.0));
    }

    /// Set the pointer from a pixel position on a surface of `viewport` size
    pub fn set_pointer_px(&mut self, position: Point, viewport: Size) {
        if viewport.is_empty() {
            return;
        }
        self.set_pointer(Vec2::new(
            position.x / viewport.width * 2.0 - 1.0,
            1.0 - position.y / viewport.height * 2.0,
        ));
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn step(&mut self, t: f32) {
        self.yaw = self.pointer.x * self.world.width / self.config.yaw_divisor;
        self.pitch = self.pointer.y * self.world.height / self.config.pitch_divisor;
        self.float_y = (t * self.config.float_speed).sin() * self.config.float_amplitude;
    }

    /// (pitch, yaw) in radians
    pub fn rotation(&self) -> (f32, f32) {
        (self.pitch, self.yaw)
    }

    pub fn float_offset(&self) -> f32 {
        self.float_y
    }

    /// Model transform: float, then pitch, then yaw
    pub fn transform(&self) -> Mat4 {
        Mat4::translation(0.0, self.float_y, 0.0)
            .mul(&Mat4::rotation_x(self.pitch))
            .mul(&Mat4::rotation_y(self.yaw))
    }

    pub fn palette(&self) -> Vec<(MaterialId, Color)> {
        vec![
            (assets::LAPTOP_BODY_MATERIAL, Color::from_hex(0x1a1a1a)),
            (assets::LAPTOP_SCREEN_MATERIAL, Color::from_hex(0x000000)),
            (
                assets::SCREEN_GLOW_MATERIAL,
                Color::from_hex(0x00ff88).with_alpha(0.8),
            ),
            (
                assets::HOLOGRAM_MATERIAL,
                Color::from_hex(0xff0080).with_alpha(0.6),
            ),
            (assets::TABLE_MATERIAL, Color::from_hex(0x2a2a2a)),
        ]
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        let model = self.transform();
        ctx.set_camera(&self.camera);
        for part in &self.parts {
            ctx.draw_mesh(part.mesh, part.material, model.mul(&part.transform));
        }
    }
}

impl FrameTask for LaptopRig {
    fn name(&self) -> &str {
        "laptop-rig"
    }

    fn update(&mut self, time: &FrameTime) {
        self.step(time.elapsed as f32);
    }

    fn render(&self, ctx: &mut dyn DrawContext) {
        LaptopRig::render(self, ctx);
    }

    fn resize(&mut self, viewport: Size) {
        if viewport.is_empty() {
            return;
        }
        let aspect = viewport.width / viewport.height;
        self.world = self.world_size(aspect);
        self.camera = self.camera.with_aspect(aspect);
    }
}
