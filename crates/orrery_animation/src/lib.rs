//! Orrery Animation System
//!
//! Host-facing frame loop and the time-driven pieces that sit on top of it.
//!
//! # Features
//!
//! - **Frame Scheduler**: registration guards with teardown on drop, update
//!   then render in declared order, no-op frames while the surface is missing
//! - **Typewriter**: jittered character reveal with glitch flashes and a
//!   completion callback that fires exactly once
//! - **Cycles**: stateless blink, pulse and rotation timers

pub mod cycle;
pub mod scheduler;
pub mod typewriter;

pub use cycle::{Blink, GlitchPulse, Rotator};
pub use scheduler::{
    FrameScheduler, FrameTask, FrameTime, SchedulerHandle, TaskId, TaskRegistration,
};
pub use typewriter::{TypeWriter, TypeWriterConfig, TypeWriterState};
