//! Scenario tests spanning several subsystems

use crate::config::{FieldConfig, MeteorConfig, OrbitConfig, PhaseMode, SceneConfig};
use crate::field::{Particle, ParticleField};
use crate::meteor::{Meteor, MeteorShower};
use crate::orbit::OrbitSystem;
use crate::scene::Scene;
use orrery_animation::{FrameScheduler, TypeWriter, TypeWriterConfig, TypeWriterState};
use orrery_core::{
    DrawCommand, Point, RecordingContext, SceneRng, SequenceRng, Size, Vec2, Vec3,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_two_particles_bounce_off_opposite_edges() {
    let bounds = Size::new(100.0, 100.0);
    let mut field = ParticleField::new(FieldConfig::default(), SceneRng::seeded(1));
    field.set_particles(
        bounds,
        vec![
            Particle::new(Point::new(0.0, 50.0), Vec2::new(-1.0, 0.0), 0.0),
            Particle::new(Point::new(99.0, 50.0), Vec2::new(1.0, 0.0), 0.0),
        ],
    );

    field.step();

    let [a, b] = [field.particles()[0], field.particles()[1]];
    assert_eq!(a.velocity.x, 1.0);
    assert_eq!(b.velocity.x, -1.0);
    for p in [a, b] {
        assert!((0.0..=100.0).contains(&p.position.x));
        assert!((0.0..=100.0).contains(&p.position.y));
    }

    // A at x=1 and B at x=100 are 99 apart, inside the 120 px threshold
    let connections = field.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!((connections[0].a, connections[0].b), (0, 1));
    assert!((connections[0].distance - 99.0).abs() < 1e-4);
    assert!((connections[0].alpha - (1.0 - 99.0 / 120.0) * 0.6).abs() < 1e-6);
}

#[test]
fn test_life_wraps_after_one_hundred_steps() {
    let bounds = Size::new(100.0, 100.0);
    let mut field = ParticleField::new(FieldConfig::default(), SceneRng::seeded(1));
    field.set_particles(
        bounds,
        vec![Particle::new(Point::new(50.0, 50.0), Vec2::ZERO, 0.0)],
    );

    for _ in 0..99 {
        field.step();
    }
    assert!(field.particles()[0].life > 0.9);

    field.step();
    assert_eq!(field.particles()[0].life, 0.0);
}

#[test]
fn test_coincident_particles_draw_no_line() {
    let bounds = Size::new(100.0, 100.0);
    let mut field = ParticleField::new(FieldConfig::default(), SceneRng::seeded(1));
    field.set_particles(
        bounds,
        vec![
            Particle::new(Point::new(10.0, 10.0), Vec2::ZERO, 0.5),
            Particle::new(Point::new(10.0, 10.0), Vec2::ZERO, 0.5),
            Particle::new(Point::new(40.0, 10.0), Vec2::ZERO, 0.5),
        ],
    );

    let connections = field.connections();
    assert_eq!(connections.len(), 2);
    assert!(connections.iter().all(|c| c.distance > 0.0));
    assert!(connections.iter().all(|c| c.alpha.is_finite()));
}

#[test]
fn test_orbit_bodies_diverge_on_shared_ring() {
    let config = OrbitConfig {
        phase: PhaseMode::Aligned,
        ..OrbitConfig::default()
    };
    let mut orbit = OrbitSystem::new(&config);

    let start = orbit.step(0.0).to_vec();
    let first_ring = orbit.bodies()[0].radius;
    let shared: Vec<usize> = orbit
        .bodies()
        .iter()
        .enumerate()
        .filter(|(_, b)| b.radius == first_ring)
        .map(|(i, _)| i)
        .collect();
    assert!(shared.len() > 1);

    // All bodies on a ring start together when phases are aligned
    for &i in &shared {
        assert!((start[i].x - first_ring).abs() < 1e-5);
        assert!(start[i].z.abs() < 1e-5);
    }

    let later = orbit.step(10.0).to_vec();
    assert!((later[shared[0]] - later[shared[1]]).length() > 0.1);
}

#[test]
fn test_meteor_respawn_regression() {
    let mut shower = MeteorShower::new(
        MeteorConfig {
            count: 0,
            ..MeteorConfig::default()
        },
        SequenceRng::new(vec![0.25, 0.75]),
    );
    let velocity = Vec3::new(0.001, -0.03, 0.002);
    shower.set_meteors(vec![Meteor {
        position: Vec3::new(0.0, -0.98, 0.0),
        velocity,
    }]);

    shower.step();
    let respawned = shower.meteors()[0];
    assert_eq!(respawned.position, Vec3::new(-0.5, 1.0, 0.5));
    assert_eq!(respawned.velocity, velocity);

    shower.step();
    assert_eq!(shower.meteors()[0].velocity, velocity);
    assert!(shower.meteors()[0].position.y < 1.0);
}

#[test]
fn test_typewriter_ticks_then_completes_once() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let mut writer = TypeWriter::new(
        "orrery",
        TypeWriterConfig::default(),
        SequenceRng::constant(0.9),
    )
    .on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for n in 1..=5 {
        assert!(writer.fire());
        assert_eq!(writer.revealed(), n);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
    assert!(writer.fire());
    assert_eq!(writer.displayed(), "orrery");
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    assert!(!writer.fire());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_typewriter_cancel_mid_reveal() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let mut writer = TypeWriter::new(
        "orrery",
        TypeWriterConfig::default(),
        SequenceRng::constant(0.9),
    )
    .on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    writer.fire();
    writer.fire();
    writer.cancel();

    assert_eq!(writer.state(), TypeWriterState::Cancelled);
    assert!(!writer.fire());
    assert_eq!(writer.advance(60_000.0), 0);
    assert_eq!(writer.displayed(), "or");
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_dropped_registration_stops_rendering() {
    let scheduler = FrameScheduler::new();
    let field = scheduler.register(ParticleField::new(FieldConfig::default(), SceneRng::seeded(3)));
    let orbit = scheduler.register(OrbitSystem::new(&OrbitConfig::default()));

    let mut surface = RecordingContext::new(Size::new(320.0, 240.0));
    scheduler.frame(0.0, Some(&mut surface));
    let with_both = surface.commands().len();

    drop(field);
    scheduler.frame(0.016, Some(&mut surface));
    assert!(surface.commands().len() < with_both);
    assert_eq!(scheduler.task_count(), 1);
    assert!(orbit.is_active());

    orbit.cancel();
    scheduler.frame(0.032, Some(&mut surface));
    assert_eq!(surface.commands(), &[DrawCommand::Clear]);
}

#[test]
fn test_scene_survives_missing_surface() {
    let mut scene = Scene::build(&SceneConfig::default(), 9).unwrap();
    let mut surface = RecordingContext::new(Size::new(640.0, 480.0));

    scene.frame(0.0, Some(&mut surface));
    let before = scene.stats();

    for i in 1..10 {
        assert!(scene.frame(i as f64, None).is_none());
    }
    assert_eq!(scene.stats(), before);

    assert!(scene.frame(10.0, Some(&mut surface)).is_some());
    assert_eq!(scene.stats().frame, 1);
}
