//! Scene assembly
//!
//! `Scene` wires every subsystem into one `FrameScheduler` in draw order
//! (particle field, orbits, meteors, laptop rig, typewriter) and owns the
//! page-level cycles that sit on top of them: the periodic page glitch and
//! the rotating skill line that appears once the hero text has been typed.

use crate::config::SceneConfig;
use crate::error::Result;
use crate::field::ParticleField;
use crate::meteor::MeteorShower;
use crate::orbit::OrbitSystem;
use crate::rig::LaptopRig;
use orrery_animation::{
    FrameScheduler, FrameTime, GlitchPulse, Rotator, TaskRegistration, TypeWriter,
};
use orrery_core::{
    Color, DrawContext, FontWeight, MaterialId, Point, SceneRng, Size, TextStyle, Vec2,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A point-in-time summary of the running scene
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SceneStats {
    pub frame: u64,
    pub elapsed_ms: f64,
    pub particles: usize,
    pub connections: usize,
    pub meteors: usize,
    pub meteor_respawns: u64,
    pub bodies: usize,
    pub typed: String,
    pub intro_complete: bool,
    pub page_glitch: bool,
    pub skill: Option<String>,
}

/// Every subsystem registered on one scheduler
pub struct Scene {
    scheduler: FrameScheduler,
    field: TaskRegistration,
    orbit: TaskRegistration,
    meteors: TaskRegistration,
    rig: TaskRegistration,
    typewriter: TaskRegistration,
    intro_done: Arc<AtomicBool>,
    glitch: GlitchPulse,
    skill_rotator: Rotator,
    skills: Vec<String>,
    last_frame: Option<FrameTime>,
}

impl Scene {
    /// Validate `config` and build a scene whose randomness derives from `seed`
    pub fn build(config: &SceneConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let scheduler = FrameScheduler::new();
        let rng = |k: u64| SceneRng::seeded(seed.wrapping_add(k));

        let intro_done = Arc::new(AtomicBool::new(false));
        let done = Arc::clone(&intro_done);

        let settings = &config.typewriter;
        let style = TextStyle::new(settings.font_size)
            .with_weight(FontWeight::Bold)
            .with_color(Color::from_hex(0x34d399));
        let writer = TypeWriter::new(&settings.text, settings.timing(), rng(4))
            .at(settings.origin())
            .with_style(style)
            .on_complete(move || done.store(true, Ordering::SeqCst));

        let field = scheduler.register(ParticleField::new(config.field.clone(), rng(0)));
        let orbit = scheduler.register(OrbitSystem::new(&config.orbit));
        let meteors = scheduler.register(MeteorShower::new(config.meteors.clone(), rng(2)));
        let rig = scheduler.register(LaptopRig::new(config.rig.clone()));
        let typewriter = scheduler.register(writer);

        tracing::info!(
            "Scene: built {} tasks (seed {})",
            scheduler.task_count(),
            seed
        );

        Ok(Self {
            scheduler,
            field,
            orbit,
            meteors,
            rig,
            typewriter,
            intro_done,
            glitch: config.cycles.glitch(),
            skill_rotator: config.cycles.skill_rotator(),
            skills: config.cycles.skills.clone(),
            last_frame: None,
        })
    }

    /// Run one frame at `now` seconds; skipped when there is no surface
    pub fn frame(&mut self, now: f64, surface: Option<&mut dyn DrawContext>) -> Option<FrameTime> {
        let time = self.scheduler.frame(now, surface)?;
        self.last_frame = Some(time);
        Some(time)
    }

    pub fn resize(&self, viewport: Size) {
        self.scheduler.resize(viewport);
    }

    /// Pointer in normalized device coordinates
    pub fn set_pointer(&self, pointer: Vec2) {
        self.scheduler
            .with_task(self.rig.id(), |rig: &mut LaptopRig| rig.set_pointer(pointer));
    }

    /// Pointer as a pixel position on the current surface
    pub fn set_pointer_px(&self, position: Point) {
        let Some(viewport) = self.scheduler.viewport() else {
            return;
        };
        self.scheduler.with_task(self.rig.id(), |rig: &mut LaptopRig| {
            rig.set_pointer_px(position, viewport)
        });
    }

    /// Stop the hero text without firing its completion
    pub fn cancel_intro(&self) {
        self.scheduler
            .with_task(self.typewriter.id(), |w: &mut TypeWriter| w.cancel());
    }

    pub fn intro_complete(&self) -> bool {
        self.intro_done.load(Ordering::SeqCst)
    }

    pub fn page_glitch_active(&self, now_ms: f64) -> bool {
        self.glitch.active(now_ms)
    }

    /// The skill line at `now_ms`, hidden until the intro has completed
    pub fn current_skill(&self, now_ms: f64) -> Option<&str> {
        if !self.intro_complete() {
            return None;
        }
        self.skills
            .get(self.skill_rotator.index(now_ms))
            .map(String::as_str)
    }

    /// Every material any subsystem draws with
    pub fn palette(&self) -> Vec<(MaterialId, Color)> {
        let mut palette = Vec::new();
        if let Some(p) = self
            .scheduler
            .with_task(self.orbit.id(), |o: &mut OrbitSystem| o.palette())
        {
            palette.extend(p);
        }
        if let Some(p) = self
            .scheduler
            .with_task(self.meteors.id(), |m: &mut MeteorShower| m.palette())
        {
            palette.extend(p);
        }
        if let Some(p) = self
            .scheduler
            .with_task(self.rig.id(), |r: &mut LaptopRig| r.palette())
        {
            palette.extend(p);
        }
        palette
    }

    pub fn stats(&self) -> SceneStats {
        let time = self.last_frame.unwrap_or_default();
        let now_ms = time.elapsed_ms();

        let (particles, connections) = self
            .scheduler
            .with_task(self.field.id(), |f: &mut ParticleField| {
                let mut connections = 0;
                f.for_each_connection(|_| connections += 1);
                (f.particles().len(), connections)
            })
            .unwrap_or_default();
        let (meteors, meteor_respawns) = self
            .scheduler
            .with_task(self.meteors.id(), |m: &mut MeteorShower| {
                (m.meteors().len(), m.respawns())
            })
            .unwrap_or_default();
        let bodies = self
            .scheduler
            .with_task(self.orbit.id(), |o: &mut OrbitSystem| o.bodies().len())
            .unwrap_or_default();
        let typed = self
            .scheduler
            .with_task(self.typewriter.id(), |w: &mut TypeWriter| w.displayed())
            .unwrap_or_default();

        SceneStats {
            frame: time.frame,
            elapsed_ms: now_ms,
            particles,
            connections,
            meteors,
            meteor_respawns,
            bodies,
            typed,
            intro_complete: self.intro_complete(),
            page_glitch: self.page_glitch_active(now_ms),
            skill: self.current_skill(now_ms).map(str::to_string),
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("tasks", &self.scheduler.task_names())
            .field("intro_complete", &self.intro_complete())
            .field("last_frame", &self.last_frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{DrawCommand, RecordingContext};

    fn scene() -> Scene {
        Scene::build(&SceneConfig::default(), 7).unwrap()
    }

    #[test]
    fn test_build_registers_in_draw_order() {
        let scene = scene();
        assert_eq!(
            scene.scheduler().task_names(),
            vec!["particle-field", "orbit", "meteors", "laptop-rig", "typewriter"]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SceneConfig::default();
        config.field.connection_distance = -1.0;
        assert!(Scene::build(&config, 0).is_err());
    }

    #[test]
    fn test_frame_without_surface_is_skipped() {
        let mut scene = scene();
        assert!(scene.frame(0.0, None).is_none());
        assert_eq!(scene.stats().frame, 0);
        assert_eq!(scene.stats().particles, 0);
    }

    #[test]
    fn test_first_frame_mounts_field() {
        let mut scene = scene();
        let mut surface = RecordingContext::new(Size::new(800.0, 600.0));
        scene.frame(0.0, Some(&mut surface));

        let stats = scene.stats();
        assert_eq!(stats.particles, 100);
        assert_eq!(stats.meteors, 500);
        assert_eq!(stats.bodies, 12);
        assert_eq!(surface.commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn test_skill_hidden_until_intro_completes() {
        let mut scene = scene();
        let mut surface = RecordingContext::new(Size::new(800.0, 600.0));

        scene.frame(0.0, Some(&mut surface));
        assert_eq!(scene.current_skill(0.0), None);

        // "John Doe" is 8 characters at no more than 200 ms each.
        scene.frame(2.0, Some(&mut surface));
        let stats = scene.stats();
        assert!(stats.intro_complete);
        assert_eq!(stats.typed, "John Doe");
        assert_eq!(scene.current_skill(0.0), Some("Full Stack Developer"));
        assert_eq!(scene.current_skill(3000.0), Some("UI/UX Designer"));
    }

    #[test]
    fn test_cancelled_intro_never_shows_skills() {
        let mut scene = scene();
        let mut surface = RecordingContext::new(Size::new(800.0, 600.0));
        scene.frame(0.0, Some(&mut surface));
        scene.cancel_intro();
        scene.frame(5.0, Some(&mut surface));

        assert!(!scene.intro_complete());
        assert_eq!(scene.stats().skill, None);
    }

    #[test]
    fn test_page_glitch_window() {
        let scene = scene();
        assert!(!scene.page_glitch_active(100.0));
        assert!(scene.page_glitch_active(7100.0));
        assert!(!scene.page_glitch_active(7300.0));
    }

    #[test]
    fn test_pointer_reaches_rig() {
        let scene = scene();
        scene.set_pointer(Vec2::new(0.5, -0.5));
        let pointer = scene
            .scheduler()
            .with_task(scene.rig.id(), |r: &mut LaptopRig| r.pointer());
        assert_eq!(pointer, Some(Vec2::new(0.5, -0.5)));
    }

    #[test]
    fn test_palette_covers_drawn_materials() {
        let scene = scene();
        // sun, ring, 12 planets, meteor, 5 laptop parts
        assert_eq!(scene.palette().len(), 2 + 12 + 1 + 5);
    }

    #[test]
    fn test_same_seed_same_stats() {
        let mut a = scene();
        let mut b = scene();
        let mut sa = RecordingContext::new(Size::new(640.0, 480.0));
        let mut sb = RecordingContext::new(Size::new(640.0, 480.0));
        for i in 0..30 {
            let now = i as f64 / 60.0;
            a.frame(now, Some(&mut sa));
            b.frame(now, Some(&mut sb));
        }
        assert_eq!(a.stats(), b.stats());
        assert_eq!(sa.commands(), sb.commands());
    }
}
