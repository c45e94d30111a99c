//! Per-frame draw reports

use orrery_animation::FrameTime;
use orrery_core::DrawCommand;
use orrery_scene::SceneStats;
use serde::Serialize;

/// Draw calls recorded for one frame, by kind
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DrawCounts {
    pub total: usize,
    pub circles: usize,
    pub lines: usize,
    pub texts: usize,
    pub meshes: usize,
    /// Instances across all instanced mesh draws
    pub instances: usize,
}

impl DrawCounts {
    pub fn tally(commands: &[DrawCommand]) -> Self {
        let mut counts = Self {
            total: commands.len(),
            ..Self::default()
        };
        for command in commands {
            match command {
                DrawCommand::FillCircle { .. } => counts.circles += 1,
                DrawCommand::StrokePath { .. } => counts.lines += 1,
                DrawCommand::DrawText { .. } => counts.texts += 1,
                DrawCommand::DrawMesh { .. } => counts.meshes += 1,
                DrawCommand::DrawMeshInstanced { instances, .. } => {
                    counts.meshes += 1;
                    counts.instances += instances.len();
                }
                _ => {}
            }
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub elapsed_ms: f64,
    pub draws: DrawCounts,
    pub scene: SceneStats,
}

impl FrameReport {
    pub fn new(time: FrameTime, commands: &[DrawCommand], scene: SceneStats) -> Self {
        Self {
            frame: time.frame,
            elapsed_ms: time.elapsed_ms(),
            draws: DrawCounts::tally(commands),
            scene,
        }
    }

    /// One human-readable line
    pub fn summary(&self) -> String {
        let mut line = format!(
            "frame {:>5} {:>9.1} ms | {:>4} draws ({} circles, {} lines, {} meshes, {} instances) | {} links | \"{}\"",
            self.frame,
            self.elapsed_ms,
            self.draws.total,
            self.draws.circles,
            self.draws.lines,
            self.draws.meshes,
            self.draws.instances,
            self.scene.connections,
            self.scene.typed,
        );
        if let Some(skill) = &self.scene.skill {
            line.push_str(&format!(" | {}", skill));
        }
        if self.scene.page_glitch {
            line.push_str(" | glitch");
        }
        line
    }
}
