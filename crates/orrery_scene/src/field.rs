//! Particle field
//!
//! A 2D "neural network" background: particles drift at a constant per-frame
//! velocity, bounce off the viewport edges and pulse through a cyclic life
//! phase. Every pair of particles closer than the connection distance is
//! joined by a gradient line whose opacity falls off with distance.
//!
//! Motion is frame-count based: each `step` advances every particle by its
//! velocity once, regardless of how much wall-clock time has passed.
//!
//! The connection scan checks all unordered pairs, O(n²) per frame. This is
//! intended at the default scale (about 100 particles) and logs a warning
//! above `pair_scan_warn_count`. No spatial index prunes pairs.

use crate::config::{color_or_white, FieldConfig};
use orrery_animation::{FrameTask, FrameTime};
use orrery_core::{
    BlendMode, Brush, Color, DrawContext, DrawContextExt, Gradient, GradientStop, LineCap, Point,
    RandomSource, SceneRng, Size, Stroke, Vec2,
};
use std::f32::consts::PI;

/// Life values at or above this wrap to zero
///
/// Sits just below 1 so that `1 / increment` accumulated f32 increments
/// always wrap on the final step.
const LIFE_WRAP: f32 = 1.0 - 1e-4;

/// Pairs closer than this are treated as coincident and not connected
const MIN_CONNECTION_DISTANCE: f32 = 1e-6;

/// A single particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Point,
    /// Pixels per frame
    pub velocity: Vec2,
    /// Cyclic phase in [0, 1)
    pub life: f32,
}

impl Particle {
    pub fn new(position: Point, velocity: Vec2, life: f32) -> Self {
        Self {
            position,
            velocity,
            life,
        }
    }

    /// Advance one frame inside `bounds`
    ///
    /// A particle moving out past an edge has that velocity component
    /// inverted (scaled by `restitution`) and its overshoot mirrored back
    /// inside, so the position never leaves `[0, width] × [0, height]`.
    pub fn step(&mut self, bounds: Size, life_increment: f32, restitution: f32) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;

        bounce_axis(
            &mut self.position.x,
            &mut self.velocity.x,
            bounds.width,
            restitution,
        );
        bounce_axis(
            &mut self.position.y,
            &mut self.velocity.y,
            bounds.height,
            restitution,
        );

        self.life += life_increment;
        if self.life >= LIFE_WRAP {
            self.life = 0.0;
        }
    }

    /// Pulse factor in [0, 1], peaking mid-life
    fn pulse(&self) -> f32 {
        (self.life * PI).sin().abs()
    }

    pub fn alpha(&self) -> f32 {
        self.pulse() * 0.8 + 0.2
    }

    pub fn radius(&self) -> f32 {
        self.pulse() * 2.0 + 1.0
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.x.is_finite()
            && self.velocity.y.is_finite()
            && self.life.is_finite()
    }
}

fn bounce_axis(position: &mut f32, velocity: &mut f32, extent: f32, restitution: f32) {
    if (*position <= 0.0 && *velocity < 0.0) || (*position >= extent && *velocity > 0.0) {
        *velocity = -*velocity * restitution;
    }

    if *position < 0.0 {
        *position = -*position;
    } else if *position > extent {
        *position = 2.0 * extent - *position;
    }

    // Overshoot larger than the extent still mirrors outside
    *position = position.clamp(0.0, extent);
}

/// A line between two particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    /// `(1 - distance / threshold) * line_alpha`
    pub alpha: f32,
}

/// The particle field subsystem
pub struct ParticleField<R: RandomSource = SceneRng> {
    config: FieldConfig,
    color: Color,
    particles: Vec<Particle>,
    /// `None` until the field has a surface to live on
    bounds: Option<Size>,
    rng: R,
}

impl<R: RandomSource> ParticleField<R> {
    /// Create an unmounted field; it stays empty until `resize`
    pub fn new(config: FieldConfig, rng: R) -> Self {
        Self {
            color: color_or_white(&config.color),
            config,
            particles: Vec::new(),
            bounds: None,
            rng,
        }
    }

    /// Replace every particle with `count` freshly sampled ones
    ///
    /// Positions are uniform over the bounds, velocity components uniform in
    /// `[-magnitude, magnitude)` and life uniform in `[0, 1)`. An empty size
    /// unmounts the field.
    pub fn initialize(&mut self, count: usize, bounds: Size) {
        self.particles.clear();

        if bounds.is_empty() || !bounds.width.is_finite() || !bounds.height.is_finite() {
            tracing::debug!(
                "ParticleField: unmounted ({}x{} surface)",
                bounds.width,
                bounds.height
            );
            self.bounds = None;
            return;
        }

        if count > self.config.pair_scan_warn_count {
            tracing::warn!(
                "ParticleField: {} particles means {} pair checks per frame",
                count,
                count * (count - 1) / 2
            );
        }

        self.bounds = Some(bounds);
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = self.sample(bounds);
            self.particles.push(particle);
        }

        tracing::debug!(
            "ParticleField: initialized {} particles in {}x{}",
            count,
            bounds.width,
            bounds.height
        );
    }

    /// Resynchronize with a new viewport, discarding all particles
    pub fn resize(&mut self, bounds: Size) {
        self.initialize(self.config.count, bounds);
    }

    /// Mount with an explicit particle set
    pub fn set_particles(&mut self, bounds: Size, particles: Vec<Particle>) {
        self.bounds = Some(bounds);
        self.particles = particles;
    }

    fn sample(&mut self, bounds: Size) -> Particle {
        let magnitude = self.config.velocity_magnitude;
        let x = self.rng.next_f32() * bounds.width;
        let y = self.rng.next_f32() * bounds.height;
        let vx = (self.rng.next_f32() * 2.0 - 1.0) * magnitude;
        let vy = (self.rng.next_f32() * 2.0 - 1.0) * magnitude;
        let life = self.rng.next_f32();
        Particle::new(Point::new(x, y), Vec2::new(vx, vy), life)
    }

    /// Advance every particle one frame; no-op while unmounted
    pub fn step(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };

        let life_increment = self.config.life_increment;
        let restitution = self.config.restitution;

        for i in 0..self.particles.len() {
            self.particles[i].step(bounds, life_increment, restitution);

            if !self.particles[i].is_finite() {
                tracing::warn!("ParticleField: particle {} became non-finite, resampling", i);
                let replacement = self.sample(bounds);
                self.particles[i] = replacement;
            }
        }
    }

    /// Visit every connected pair, in index order
    pub fn for_each_connection(&self, mut f: impl FnMut(Connection)) {
        let threshold = self.config.connection_distance;
        let line_alpha = self.config.line_alpha;

        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                let distance = a.position.distance_to(b.position);
                if !distance.is_finite() || distance <= MIN_CONNECTION_DISTANCE {
                    continue;
                }
                if distance < threshold {
                    f(Connection {
                        a: i,
                        b: j,
                        distance,
                        alpha: (1.0 - distance / threshold) * line_alpha,
                    });
                }
            }
        }
    }

    pub fn connections(&self) -> Vec<Connection> {
        let mut connections = Vec::new();
        self.for_each_connection(|c| connections.push(c));
        connections
    }

    /// Draw glowing particles, then the connection lines
    pub fn render(&self, ctx: &mut dyn DrawContext) {
        if self.bounds.is_none() {
            return;
        }

        ctx.push_blend_mode(BlendMode::Screen);

        for particle in &self.particles {
            let alpha = particle.alpha();
            let radius = particle.radius();
            let center = particle.position;

            if self.config.glow_radius > 0.0 {
                let glow_radius = radius + self.config.glow_radius;
                let glow = Gradient::radial(
                    center,
                    glow_radius,
                    self.color.with_alpha(alpha * 0.5),
                    self.color.with_alpha(0.0),
                );
                ctx.fill_circle(center, glow_radius, glow.into());
            }

            ctx.fill_circle(center, radius, Brush::Solid(self.color.with_alpha(alpha)));
        }

        self.for_each_connection(|c| {
            let from = self.particles[c.a].position;
            let to = self.particles[c.b].position;
            let gradient = Gradient::linear_with_stops(
                from,
                to,
                [
                    GradientStop::new(0.0, Color::rgba8(0, 255, 136, c.alpha)),
                    GradientStop::new(0.5, Color::rgba8(0, 200, 255, c.alpha * 0.8)),
                    GradientStop::new(1.0, Color::rgba8(255, 0, 128, c.alpha * 0.6)),
                ],
            );
            ctx.line(
                from,
                to,
                &Stroke::new(c.alpha * 2.0).with_cap(LineCap::Round),
                gradient,
            );
        });

        ctx.pop_blend_mode();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Option<Size> {
        self.bounds
    }

    pub fn is_mounted(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }
}

impl<R: RandomSource + Send + 'static> FrameTask for ParticleField<R> {
    fn name(&self) -> &str {
        "particle-field"
    }

    fn update(&mut self, _time: &FrameTime) {
        self.step();
    }

    fn render(&self, ctx: &mut dyn DrawContext) {
        ParticleField::render(self, ctx);
    }

    fn resize(&mut self, viewport: Size) {
        ParticleField::resize(self, viewport);
    }
}
