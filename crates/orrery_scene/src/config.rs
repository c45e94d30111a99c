//! Scene configuration
//!
//! Every tunable of the scene lives here, read once at startup from a TOML
//! file (or taken from the defaults). Missing sections and fields fall back
//! to their defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [field]
//! count = 60
//! connection_distance = 100.0
//!
//! [meteors]
//! count = 200
//! ```

use crate::error::{Result, SceneError};
use orrery_animation::{GlitchPulse, Rotator, TypeWriterConfig};
use orrery_core::{Color, Point, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete scene configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub field: FieldConfig,
    pub orbit: OrbitConfig,
    pub meteors: MeteorConfig,
    pub rig: RigConfig,
    pub typewriter: TypewriterSettings,
    pub cycles: CycleConfig,
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading scene config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject non-finite and out-of-range values
    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        self.orbit.validate()?;
        self.meteors.validate()?;
        self.rig.validate()?;
        self.typewriter.validate()?;
        self.cycles.validate()?;
        Ok(())
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

fn positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(field, format!("expected a positive number, got {value}")))
    }
}

fn positive_ms(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(field, format!("expected a positive duration, got {value}")))
    }
}

fn non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(field, format!("expected a non-negative number, got {value}")))
    }
}

fn unit_interval(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SceneError::invalid(field, format!("expected a value in [0, 1], got {value}")))
    }
}

fn finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::invalid(field, "expected a finite number"))
    }
}

fn hex_color(field: &str, value: &str) -> Result<Color> {
    Color::parse_hex(value)
        .ok_or_else(|| SceneError::invalid(field, format!("expected #rrggbb, got {value:?}")))
}

/// Parse a color that has already been validated, falling back to white
pub(crate) fn color_or_white(value: &str) -> Color {
    Color::parse_hex(value).unwrap_or(Color::WHITE)
}

// =============================================================================
// [field] - 2D particle background
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles
    pub count: usize,
    /// Pixel distance below which two particles are connected
    pub connection_distance: f32,
    /// Opacity of a connection between coincident endpoints
    pub line_alpha: f32,
    /// Life phase added every frame
    pub life_increment: f32,
    /// Initial velocity components are uniform in [-magnitude, magnitude)
    pub velocity_magnitude: f32,
    /// Fraction of speed kept after an edge bounce
    pub restitution: f32,
    pub color: String,
    /// Glow radius around each particle, in pixels
    pub glow_radius: f32,
    /// Particle count above which the all-pairs scan logs a warning
    pub pair_scan_warn_count: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 100,
            connection_distance: 120.0,
            line_alpha: 0.6,
            life_increment: 0.01,
            velocity_magnitude: 0.5,
            restitution: 1.0,
            color: "#00ff88".to_string(),
            glow_radius: 10.0,
            pair_scan_warn_count: 500,
        }
    }
}

impl FieldConfig {
    fn validate(&self) -> Result<()> {
        positive("field.connection_distance", self.connection_distance)?;
        unit_interval("field.line_alpha", self.line_alpha)?;
        positive("field.life_increment", self.life_increment)?;
        if self.life_increment >= 1.0 {
            return Err(SceneError::invalid(
                "field.life_increment",
                "must be below 1 so the life phase can cycle",
            ));
        }
        non_negative("field.velocity_magnitude", self.velocity_magnitude)?;
        if !(self.restitution > 0.0 && self.restitution <= 1.0) {
            return Err(SceneError::invalid(
                "field.restitution",
                format!("expected a value in (0, 1], got {}", self.restitution),
            ));
        }
        hex_color("field.color", &self.color)?;
        non_negative("field.glow_radius", self.glow_radius)?;
        Ok(())
    }
}

// =============================================================================
// [orbit] - orbiting technology planets
// =============================================================================

/// How bodies sharing an orbit are spread at `t = 0`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMode {
    /// Every body starts at phase 0
    Aligned,
    /// Bodies on the same orbit are evenly spaced around it
    #[default]
    Spread,
}

/// One orbiting body before layout
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BodySpec {
    pub label: String,
    pub color: String,
    pub radius: f32,
    /// Angular speed of the first body on this orbit, in rad/s
    pub base_speed: f32,
    /// Extra angular speed per body index on the same orbit
    #[serde(default = "default_speed_step")]
    pub speed_step: f32,
    /// Height the vertical bob oscillates around
    #[serde(default)]
    pub base_height: f32,
}

fn default_speed_step() -> f32 {
    0.1
}

impl BodySpec {
    pub fn new(label: &str, color: &str, radius: f32, base_speed: f32) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            radius,
            base_speed,
            speed_step: default_speed_step(),
            base_height: 0.0,
        }
    }

    pub fn with_speed_step(mut self, step: f32) -> Self {
        self.speed_step = step;
        self
    }
}

fn default_bodies() -> Vec<BodySpec> {
    let inner = [("React", "#61dafb"), ("Vue", "#4fc08d"), ("Angular", "#dd0031")];
    let middle = [
        ("Node.js", "#68a063"),
        ("Python", "#3776ab"),
        ("TypeScript", "#3178c6"),
        ("Go", "#00add8"),
    ];
    let outer = [
        ("Docker", "#2496ed"),
        ("AWS", "#ff9900"),
        ("MongoDB", "#47a248"),
        ("PostgreSQL", "#336791"),
        ("Redis", "#dc382d"),
    ];

    let mut bodies = Vec::with_capacity(inner.len() + middle.len() + outer.len());
    bodies.extend(inner.iter().map(|(l, c)| BodySpec::new(l, c, 2.5, 0.8)));
    bodies.extend(middle.iter().map(|(l, c)| BodySpec::new(l, c, 4.0, 0.5)));
    bodies.extend(
        outer
            .iter()
            .map(|(l, c)| BodySpec::new(l, c, 5.5, 0.3).with_speed_step(0.05)),
    );
    bodies
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub bodies: Vec<BodySpec>,
    pub phase: PhaseMode,
    /// Spin of the whole group about Y, in rad/s
    pub group_spin: f32,
    pub bob_amplitude: f32,
    /// Bob cycles per orbital radian
    pub bob_frequency: f32,
    pub planet_radius: f32,
    pub sun_radius: f32,
    pub sun_color: String,
    pub camera_position: [f32; 3],
    /// Vertical field of view in degrees
    pub camera_fov: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            bodies: default_bodies(),
            phase: PhaseMode::Spread,
            group_spin: 0.1,
            bob_amplitude: 0.5,
            bob_frequency: 2.0,
            planet_radius: 0.4,
            sun_radius: 0.8,
            sun_color: "#ffd700".to_string(),
            camera_position: [0.0, 5.0, 8.0],
            camera_fov: 60.0,
        }
    }
}

impl OrbitConfig {
    fn validate(&self) -> Result<()> {
        for (i, body) in self.bodies.iter().enumerate() {
            let field = |name: &str| format!("orbit.bodies[{i}].{name}");
            positive(&field("radius"), body.radius)?;
            finite(&field("base_speed"), body.base_speed)?;
            finite(&field("speed_step"), body.speed_step)?;
            finite(&field("base_height"), body.base_height)?;
            hex_color(&field("color"), &body.color)?;
        }
        finite("orbit.group_spin", self.group_spin)?;
        non_negative("orbit.bob_amplitude", self.bob_amplitude)?;
        finite("orbit.bob_frequency", self.bob_frequency)?;
        positive("orbit.planet_radius", self.planet_radius)?;
        positive("orbit.sun_radius", self.sun_radius)?;
        hex_color("orbit.sun_color", &self.sun_color)?;
        for value in self.camera_position {
            finite("orbit.camera_position", value)?;
        }
        if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return Err(SceneError::invalid(
                "orbit.camera_fov",
                format!("expected degrees in (0, 180), got {}", self.camera_fov),
            ));
        }
        Ok(())
    }

    pub fn camera_position(&self) -> Vec3 {
        let [x, y, z] = self.camera_position;
        Vec3::new(x, y, z)
    }
}

// =============================================================================
// [meteors] - falling points
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeteorConfig {
    pub count: usize,
    /// Meteors live in the cube [-half_extent, half_extent]^3
    pub half_extent: f32,
    /// Fastest fall per frame
    pub max_fall: f32,
    /// Slowest fall per frame; keeps every meteor moving down
    pub min_fall: f32,
    /// Largest sideways drift per frame along X and Z
    pub max_drift: f32,
    /// Z rotation of the whole shower, in radians
    pub tilt: f32,
    pub color: String,
    pub point_size: f32,
}

impl Default for MeteorConfig {
    fn default() -> Self {
        Self {
            count: 500,
            half_extent: 1.0,
            max_fall: 0.05,
            min_fall: 0.001,
            max_drift: 0.01,
            tilt: std::f32::consts::FRAC_PI_4,
            color: "#f272c8".to_string(),
            point_size: 0.02,
        }
    }
}

impl MeteorConfig {
    fn validate(&self) -> Result<()> {
        positive("meteors.half_extent", self.half_extent)?;
        positive("meteors.min_fall", self.min_fall)?;
        positive("meteors.max_fall", self.max_fall)?;
        if self.min_fall > self.max_fall {
            return Err(SceneError::invalid(
                "meteors.min_fall",
                "must not exceed meteors.max_fall",
            ));
        }
        non_negative("meteors.max_drift", self.max_drift)?;
        finite("meteors.tilt", self.tilt)?;
        hex_color("meteors.color", &self.color)?;
        positive("meteors.point_size", self.point_size)?;
        Ok(())
    }
}

// =============================================================================
// [rig] - pointer-driven laptop model
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RigConfig {
    /// Distance from the camera to the model
    pub camera_distance: f32,
    /// Vertical field of view in degrees
    pub camera_fov: f32,
    /// Yaw = pointer.x * world width / yaw_divisor
    pub yaw_divisor: f32,
    /// Pitch = pointer.y * world height / pitch_divisor
    pub pitch_divisor: f32,
    /// Angular frequency of the float, in rad/s
    pub float_speed: f32,
    pub float_amplitude: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            camera_distance: 5.0,
            camera_fov: 75.0,
            yaw_divisor: 10.0,
            pitch_divisor: 20.0,
            float_speed: 0.8,
            float_amplitude: 0.2,
        }
    }
}

impl RigConfig {
    fn validate(&self) -> Result<()> {
        positive("rig.camera_distance", self.camera_distance)?;
        if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return Err(SceneError::invalid(
                "rig.camera_fov",
                format!("expected degrees in (0, 180), got {}", self.camera_fov),
            ));
        }
        positive("rig.yaw_divisor", self.yaw_divisor)?;
        positive("rig.pitch_divisor", self.pitch_divisor)?;
        finite("rig.float_speed", self.float_speed)?;
        non_negative("rig.float_amplitude", self.float_amplitude)?;
        Ok(())
    }
}

// =============================================================================
// [typewriter] - hero name reveal
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypewriterSettings {
    pub text: String,
    pub delay_ms: f64,
    pub jitter_ms: f64,
    pub glitch_probability: f32,
    pub glitch_duration_ms: f64,
    pub cursor_blink_ms: f64,
    /// Text origin on the surface, in pixels
    pub origin: [f32; 2],
    pub font_size: f32,
}

impl Default for TypewriterSettings {
    fn default() -> Self {
        Self {
            text: "John Doe".to_string(),
            delay_ms: 150.0,
            jitter_ms: 50.0,
            glitch_probability: 0.1,
            glitch_duration_ms: 100.0,
            cursor_blink_ms: 500.0,
            origin: [48.0, 160.0],
            font_size: 64.0,
        }
    }
}

impl TypewriterSettings {
    fn validate(&self) -> Result<()> {
        positive_ms("typewriter.delay_ms", self.delay_ms)?;
        if !(self.jitter_ms.is_finite() && self.jitter_ms >= 0.0) {
            return Err(SceneError::invalid(
                "typewriter.jitter_ms",
                format!("expected a non-negative duration, got {}", self.jitter_ms),
            ));
        }
        unit_interval("typewriter.glitch_probability", self.glitch_probability)?;
        positive_ms("typewriter.glitch_duration_ms", self.glitch_duration_ms)?;
        positive_ms("typewriter.cursor_blink_ms", self.cursor_blink_ms)?;
        finite("typewriter.origin", self.origin[0])?;
        finite("typewriter.origin", self.origin[1])?;
        positive("typewriter.font_size", self.font_size)?;
        Ok(())
    }

    pub fn timing(&self) -> TypeWriterConfig {
        TypeWriterConfig {
            delay_ms: self.delay_ms,
            jitter_ms: self.jitter_ms,
            glitch_probability: self.glitch_probability,
            glitch_duration_ms: self.glitch_duration_ms,
            cursor_blink_ms: self.cursor_blink_ms,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin[0], self.origin[1])
    }
}

// =============================================================================
// [cycles] - page-level timers
// =============================================================================

fn default_skills() -> Vec<String> {
    [
        "Full Stack Developer",
        "UI/UX Designer",
        "Problem Solver",
        "Tech Enthusiast",
        "Code Wizard",
        "Digital Architect",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CycleConfig {
    pub glitch_interval_ms: f64,
    pub glitch_duration_ms: f64,
    pub skill_period_ms: f64,
    pub skills: Vec<String>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            glitch_interval_ms: 7000.0,
            glitch_duration_ms: 300.0,
            skill_period_ms: 3000.0,
            skills: default_skills(),
        }
    }
}

impl CycleConfig {
    fn validate(&self) -> Result<()> {
        positive_ms("cycles.glitch_interval_ms", self.glitch_interval_ms)?;
        positive_ms("cycles.glitch_duration_ms", self.glitch_duration_ms)?;
        if self.glitch_duration_ms > self.glitch_interval_ms {
            return Err(SceneError::invalid(
                "cycles.glitch_duration_ms",
                "must not exceed cycles.glitch_interval_ms",
            ));
        }
        positive_ms("cycles.skill_period_ms", self.skill_period_ms)?;
        Ok(())
    }

    pub fn glitch(&self) -> GlitchPulse {
        GlitchPulse::new(self.glitch_interval_ms, self.glitch_duration_ms)
    }

    pub fn skill_rotator(&self) -> Rotator {
        Rotator::new(self.skill_period_ms, self.skills.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.field.count, 100);
        assert_eq!(config.orbit.bodies.len(), 12);
        assert_eq!(config.meteors.count, 500);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config = SceneConfig::from_toml_str(
            r##"
            [field]
            count = 2
            connection_distance = 50.0

            [orbit]
            phase = "aligned"
            bodies = [{ label = "Rust", color = "#dea584", radius = 3.0, base_speed = 0.4 }]
            "##,
        )
        .unwrap();

        assert_eq!(config.field.count, 2);
        assert_eq!(config.field.line_alpha, 0.6);
        assert_eq!(config.orbit.phase, PhaseMode::Aligned);
        assert_eq!(config.orbit.bodies[0].speed_step, 0.1);
        assert_eq!(config.orbit.bodies[0].color, "#dea584");
        assert_eq!(config.meteors, MeteorConfig::default());
    }

    #[test]
    fn test_hero_typewriter_timing() {
        let settings = TypewriterSettings::default();
        assert_eq!(settings.text, "John Doe");

        let timing = settings.timing();
        assert_eq!(timing.delay_ms, 150.0);
        assert_eq!(timing.jitter_ms, 50.0);
        assert_ne!(timing, TypeWriterConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = SceneConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = SceneConfig::from_toml_str("[field]\nrestitution = 1.5").unwrap_err();
        assert!(matches!(err, SceneError::Invalid { ref field, .. } if field == "field.restitution"));

        let err = SceneConfig::from_toml_str("[meteors]\nmin_fall = 0.1\nmax_fall = 0.05").unwrap_err();
        assert!(matches!(err, SceneError::Invalid { ref field, .. } if field == "meteors.min_fall"));

        let err = SceneConfig::from_toml_str("[orbit]\nsun_color = \"gold\"").unwrap_err();
        assert!(matches!(err, SceneError::Invalid { ref field, .. } if field == "orbit.sun_color"));
    }

    #[test]
    fn test_parse_error() {
        let err = SceneConfig::from_toml_str("[field\ncount = 1").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SceneConfig::load(Path::new("/nonexistent/orrery.toml")).unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
