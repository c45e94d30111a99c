//! Meteor shower
//!
//! Points falling through a cube. Each frame a meteor moves by its velocity;
//! one that drops below the floor is moved back to the ceiling at a fresh
//! random X/Z. Its velocity is left exactly as it was, so a respawned meteor
//! keeps falling at its original rate.
//!
//! Fall speed is sampled from `[min_fall, max_fall)` with `min_fall > 0`, so
//! every meteor has a strictly negative Y velocity and none can stall.

use crate::assets::{METEOR_MATERIAL, POINT_MESH};
use crate::config::{color_or_white, MeteorConfig};
use orrery_animation::{FrameTask, FrameTime};
use orrery_core::{
    Color, DrawContext, MaterialId, Mat4, MeshInstance, RandomSource, SceneRng, Transform, Vec3,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meteor {
    pub position: Vec3,
    /// Units per frame
    pub velocity: Vec3,
}

/// The meteor subsystem
pub struct MeteorShower<R: RandomSource = SceneRng> {
    config: MeteorConfig,
    color: Color,
    meteors: Vec<Meteor>,
    rng: R,
    respawns: u64,
}

impl<R: RandomSource> MeteorShower<R> {
    /// Create a shower populated with `config.count` meteors
    pub fn new(config: MeteorConfig, rng: R) -> Self {
        let count = config.count;
        let mut shower = Self {
            color: color_or_white(&config.color),
            config,
            meteors: Vec::new(),
            rng,
            respawns: 0,
        };
        shower.initialize(count);
        shower
    }

    /// Replace every meteor with `count` freshly sampled ones
    pub fn initialize(&mut self, count: usize) {
        self.meteors.clear();
        self.meteors.reserve(count);
        for _ in 0..count {
            let meteor = self.sample();
            self.meteors.push(meteor);
        }
        self.respawns = 0;
        tracing::debug!("MeteorShower: initialized {} meteors", count);
    }

    /// Mount with an explicit meteor set
    pub fn set_meteors(&mut self, meteors: Vec<Meteor>) {
        self.meteors = meteors;
    }

    fn sample(&mut self) -> Meteor {
        let h = self.config.half_extent;
        let position = Vec3::new(
            self.rng.range(-h, h),
            self.rng.range(-h, h),
            self.rng.range(-h, h),
        );
        let velocity = Vec3::new(
            self.rng.next_f32() * self.config.max_drift,
            -self.rng.range(self.config.min_fall, self.config.max_fall),
            self.rng.next_f32() * self.config.max_drift,
        );
        Meteor { position, velocity }
    }

    /// Advance every meteor one frame
    pub fn step(&mut self) {
        let h = self.config.half_extent;

        for i in 0..self.meteors.len() {
            let meteor = &mut self.meteors[i];
            meteor.position += meteor.velocity;

            if !meteor.position.is_finite() || !meteor.velocity.is_finite() {
                tracing::warn!("MeteorShower: meteor {} became non-finite, resampling", i);
                let replacement = self.sample();
                self.meteors[i] = replacement;
                continue;
            }

            if meteor.position.y < -h {
                let x = self.rng.range(-h, h);
                let z = self.rng.range(-h, h);
                self.meteors[i].position = Vec3::new(x, h, z);
                self.respawns += 1;
            }
        }
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    /// Total respawns since the last `initialize`
    pub fn respawns(&self) -> u64 {
        self.respawns
    }

    /// The fixed tilt applied to the whole shower
    pub fn group_transform(&self) -> Mat4 {
        Mat4::rotation_z(self.config.tilt)
    }

    pub fn palette(&self) -> Vec<(MaterialId, Color)> {
        vec![(METEOR_MATERIAL, self.color)]
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        if self.meteors.is_empty() {
            return;
        }

        let s = self.config.point_size;
        let instances: Vec<MeshInstance> = self
            .meteors
            .iter()
            .map(|m| MeshInstance {
                transform: Mat4::from_translation(m.position).mul(&Mat4::scale(s, s, s)),
                material: Some(METEOR_MATERIAL),
            })
            .collect();

        ctx.push_transform(Transform::Mat4(self.group_transform()));
        ctx.draw_mesh_instanced(POINT_MESH, &instances);
        ctx.pop_transform();
    }
}

impl<R: RandomSource + Send + 'static> FrameTask for MeteorShower<R> {
    fn name(&self) -> &str {
        "meteors"
    }

    fn update(&mut self, _time: &FrameTime) {
        self.step();
    }

    fn render(&self, ctx: &mut dyn DrawContext) {
        MeteorShower::render(self, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{DrawCommand, RecordingContext, SequenceRng, Size};

    #[test]
    fn test_initialize_in_cube_and_falling() {
        let shower = MeteorShower::new(MeteorConfig::default(), SceneRng::seeded(11));
        assert_eq!(shower.meteors().len(), 500);

        for m in shower.meteors() {
            for v in [m.position.x, m.position.y, m.position.z] {
                assert!((-1.0..=1.0).contains(&v));
            }
            assert!(m.velocity.y < 0.0);
            assert!(m.velocity.y >= -0.05);
            assert!((0.0..0.01).contains(&m.velocity.x));
            assert!((0.0..0.01).contains(&m.velocity.z));
        }
    }

    #[test]
    fn test_step_moves_by_velocity() {
        let mut shower = MeteorShower::new(
            MeteorConfig {
                count: 0,
                ..MeteorConfig::default()
            },
            SequenceRng::constant(0.5),
        );
        shower.set_meteors(vec![Meteor {
            position: Vec3::new(0.0, 0.5, 0.0),
            velocity: Vec3::new(0.005, -0.25, 0.0),
        }]);

        shower.step();
        assert_eq!(shower.meteors()[0].position, Vec3::new(0.005, 0.25, 0.0));
        assert_eq!(shower.respawns(), 0);
    }

    #[test]
    fn test_respawn_keeps_velocity() {
        let mut shower = MeteorShower::new(
            MeteorConfig {
                count: 0,
                ..MeteorConfig::default()
            },
            SequenceRng::constant(0.75),
        );
        let velocity = Vec3::new(0.004, -0.05, 0.002);
        shower.set_meteors(vec![Meteor {
            position: Vec3::new(0.1, -0.99, 0.1),
            velocity,
        }]);

        shower.step();

        let m = shower.meteors()[0];
        assert_eq!(m.position, Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(m.velocity, velocity);
        assert_eq!(shower.respawns(), 1);
    }

    #[test]
    fn test_meteor_exactly_on_floor_stays() {
        let mut shower = MeteorShower::new(
            MeteorConfig {
                count: 0,
                ..MeteorConfig::default()
            },
            SequenceRng::constant(0.5),
        );
        shower.set_meteors(vec![Meteor {
            position: Vec3::new(0.0, -0.5, 0.0),
            velocity: Vec3::new(0.0, -0.5, 0.0),
        }]);
        shower.step();
        assert_eq!(shower.meteors()[0].position.y, -1.0);
    }

    #[test]
    fn test_long_run_stays_in_volume() {
        let mut shower = MeteorShower::new(MeteorConfig::default(), SceneRng::seeded(5));
        for _ in 0..1000 {
            shower.step();
        }
        for m in shower.meteors() {
            assert!((-1.0..=1.0).contains(&m.position.y));
        }
        assert!(shower.respawns() > 0);
    }

    #[test]
    fn test_render_instanced_under_tilt() {
        let shower = MeteorShower::new(
            MeteorConfig {
                count: 3,
                ..MeteorConfig::default()
            },
            SceneRng::seeded(1),
        );
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        shower.render(&mut ctx);

        let commands = ctx.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            DrawCommand::PushTransform(Transform::Mat4(Mat4::rotation_z(
                std::f32::consts::FRAC_PI_4
            )))
        );
        match &commands[1] {
            DrawCommand::DrawMeshInstanced { mesh, instances } => {
                assert_eq!(*mesh, POINT_MESH);
                assert_eq!(instances.len(), 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(commands[2], DrawCommand::PopTransform);
    }
}
