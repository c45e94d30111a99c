//! Orbit engine
//!
//! Technology "planets" circle a central sun on fixed rings. A body's position
//! is a pure function of elapsed time:
//!
//! ```text
//! θ = t · angular_speed + phase
//! position = (radius · cos θ, base_height + amplitude · sin(frequency · θ), radius · sin θ)
//! ```
//!
//! Nothing is integrated, so positions never drift no matter how many frames
//! run or how irregular their timing is. The whole group additionally spins
//! slowly about Y; that rotation composes with each body's own orbit.

use crate::assets::{self, RING_MESH, SPHERE_MESH};
use crate::config::{color_or_white, BodySpec, OrbitConfig, PhaseMode};
use orrery_animation::{FrameTask, FrameTime};
use orrery_core::{Camera, Color, DrawContext, MaterialId, Mat4, Size, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// A body placed on its orbit
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitBody {
    pub label: String,
    pub color: Color,
    pub radius: f32,
    /// Radians per second
    pub angular_speed: f32,
    /// Angle at `t = 0`
    pub phase: f32,
    pub base_height: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
}

impl OrbitBody {
    /// Orbital angle at time `t`
    pub fn angle(&self, t: f32) -> f32 {
        t * self.angular_speed + self.phase
    }

    /// Vertical offset for a given orbital angle
    pub fn bob(&self, angle: f32) -> f32 {
        self.base_height + self.bob_amplitude * (self.bob_frequency * angle).sin()
    }

    /// Position in the group frame at time `t`
    pub fn position(&self, t: f32) -> Vec3 {
        let theta = self.angle(t);
        Vec3::new(
            self.radius * theta.cos(),
            self.bob(theta),
            self.radius * theta.sin(),
        )
    }
}

/// Assign each body its angular speed and phase
///
/// Bodies sharing a radius (exact match) form one orbit. The body at index
/// `i` within its orbit gets `base_speed + i * speed_step`, so bodies on a
/// shared orbit always separate over time. Orbits keep the order in which
/// their radius first appears.
pub fn layout(
    specs: &[BodySpec],
    phase_mode: PhaseMode,
    bob_amplitude: f32,
    bob_frequency: f32,
) -> Vec<OrbitBody> {
    let radii = ring_radii(specs);
    let ring_sizes: Vec<usize> = radii
        .iter()
        .map(|r| specs.iter().filter(|s| s.radius == *r).count())
        .collect();
    let mut ring_cursor = vec![0usize; radii.len()];

    specs
        .iter()
        .map(|spec| {
            let ring = radii
                .iter()
                .position(|r| *r == spec.radius)
                .unwrap_or_default();
            let index = ring_cursor[ring];
            ring_cursor[ring] += 1;

            let phase = match phase_mode {
                PhaseMode::Aligned => 0.0,
                PhaseMode::Spread => index as f32 * TAU / ring_sizes[ring] as f32,
            };

            OrbitBody {
                label: spec.label.clone(),
                color: color_or_white(&spec.color),
                radius: spec.radius,
                angular_speed: spec.base_speed + index as f32 * spec.speed_step,
                phase,
                base_height: spec.base_height,
                bob_amplitude,
                bob_frequency,
            }
        })
        .collect()
}

/// Distinct orbit radii in order of first appearance
fn ring_radii(specs: &[BodySpec]) -> Vec<f32> {
    let mut radii: Vec<f32> = Vec::new();
    for spec in specs {
        if !radii.contains(&spec.radius) {
            radii.push(spec.radius);
        }
    }
    radii
}

/// The orbit subsystem: sun, rings and planets under a spinning group frame
pub struct OrbitSystem {
    bodies: Vec<OrbitBody>,
    rings: Vec<f32>,
    /// Group-frame positions from the last step
    positions: Vec<Vec3>,
    group_spin: f32,
    group_angle: f32,
    planet_radius: f32,
    sun_radius: f32,
    sun_color: Color,
    camera: Camera,
}

impl OrbitSystem {
    pub fn new(config: &OrbitConfig) -> Self {
        let bodies = layout(
            &config.bodies,
            config.phase,
            config.bob_amplitude,
            config.bob_frequency,
        );
        let positions = bodies.iter().map(|b| b.position(0.0)).collect();

        tracing::debug!(
            "OrbitSystem: {} bodies on {} rings",
            bodies.len(),
            ring_radii(&config.bodies).len()
        );

        Self {
            rings: ring_radii(&config.bodies),
            bodies,
            positions,
            group_spin: config.group_spin,
            group_angle: 0.0,
            planet_radius: config.planet_radius,
            sun_radius: config.sun_radius,
            sun_color: color_or_white(&config.sun_color),
            camera: Camera::perspective(
                config.camera_position(),
                Vec3::ZERO,
                config.camera_fov.to_radians(),
            ),
        }
    }

    /// Recompute every position for elapsed time `t`
    pub fn step(&mut self, t: f32) -> &[Vec3] {
        self.group_angle = t * self.group_spin;
        for (slot, body) in self.positions.iter_mut().zip(&self.bodies) {
            *slot = body.position(t);
        }
        &self.positions
    }

    /// Group-frame positions at `t` without touching the cache
    pub fn positions_at(&self, t: f32) -> Vec<Vec3> {
        self.bodies.iter().map(|b| b.position(t)).collect()
    }

    /// Group-frame positions from the last step
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// The spinning group frame
    pub fn group_transform(&self) -> Mat4 {
        Mat4::rotation_y(self.group_angle)
    }

    /// Positions from the last step with the group spin applied
    pub fn world_positions(&self) -> Vec<Vec3> {
        let group = self.group_transform();
        self.positions
            .iter()
            .map(|p| group.transform_point(*p))
            .collect()
    }

    pub fn bodies(&self) -> &[OrbitBody] {
        &self.bodies
    }

    pub fn rings(&self) -> &[f32] {
        &self.rings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Materials the host must register before the first frame
    pub fn palette(&self) -> Vec<(MaterialId, Color)> {
        let mut palette = vec![
            (assets::SUN_MATERIAL, self.sun_color),
            (assets::RING_MATERIAL, Color::WHITE.with_alpha(0.1)),
        ];
        palette.extend(
            self.bodies
                .iter()
                .enumerate()
                .map(|(i, b)| (assets::planet_material(i), b.color)),
        );
        palette
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        let group = self.group_transform();
        ctx.set_camera(&self.camera);

        let sun_radius = self.sun_radius;
        ctx.draw_mesh(
            SPHERE_MESH,
            assets::SUN_MATERIAL,
            group.mul(&Mat4::scale(sun_radius, sun_radius, sun_radius)),
        );

        // Ring meshes lie in XY; tip them into the orbital plane
        let tilt = group.mul(&Mat4::rotation_x(FRAC_PI_2));
        for radius in &self.rings {
            ctx.draw_mesh(
                RING_MESH,
                assets::RING_MATERIAL,
                tilt.mul(&Mat4::scale(*radius, *radius, 1.0)),
            );
        }

        let r = self.planet_radius;
        for (i, position) in self.positions.iter().enumerate() {
            let local = Mat4::from_translation(*position).mul(&Mat4::scale(r, r, r));
            ctx.draw_mesh(SPHERE_MESH, assets::planet_material(i), group.mul(&local));
        }
    }
}

impl FrameTask for OrbitSystem {
    fn name(&self) -> &str {
        "orbit"
    }

    fn update(&mut self, time: &FrameTime) {
        self.step(time.elapsed as f32);
    }

    fn render(&self, ctx: &mut dyn DrawContext) {
        OrbitSystem::render(self, ctx);
    }

    fn resize(&mut self, viewport: Size) {
        if !viewport.is_empty() {
            self.camera = self.camera.with_aspect(viewport.width / viewport.height);
        }
    }
}
