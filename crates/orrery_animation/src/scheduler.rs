//! Frame scheduler
//!
//! Drives every registered animation task once per display refresh.
//! Tasks are registered through `FrameScheduler::register`, which hands back a
//! `TaskRegistration` guard. Dropping the guard (or calling `cancel()`) removes
//! the task, after which it is never updated or rendered again.
//!
//! A frame runs in two phases: every task updates in declared order, then
//! every task renders in declared order. No task observes a partially
//! updated frame.
//!
//! ```
//! use orrery_animation::{FrameScheduler, FrameTask, FrameTime};
//! use orrery_core::{DrawContext, RecordingContext, Size};
//!
//! struct Counter(u32);
//!
//! impl FrameTask for Counter {
//!     fn name(&self) -> &str {
//!         "counter"
//!     }
//!     fn update(&mut self, _time: &FrameTime) {
//!         self.0 += 1;
//!     }
//!     fn render(&self, _ctx: &mut dyn DrawContext) {}
//! }
//!
//! let scheduler = FrameScheduler::new();
//! let registration = scheduler.register(Counter(0));
//!
//! let mut surface = RecordingContext::new(Size::new(320.0, 240.0));
//! scheduler.frame(0.016, Some(&mut surface));
//!
//! let ticks = scheduler.with_task(registration.id(), |c: &mut Counter| c.0);
//! assert_eq!(ticks, Some(1));
//! ```

use orrery_core::{DrawContext, Size};
use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

new_key_type! {
    /// Handle to a registered frame task
    pub struct TaskId;
}

/// Timing information handed to every task's update
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the host loop started
    pub elapsed: f64,
    /// Seconds since the previous rendered frame (0 on the first frame)
    pub delta: f64,
    /// Number of rendered frames before this one
    pub frame: u64,
}

impl FrameTime {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed * 1000.0
    }
}

/// A unit of per-frame work owned by the scheduler
pub trait FrameTask: Send {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Advance state for this frame
    fn update(&mut self, time: &FrameTime);

    /// Issue draw calls for the state produced by `update`
    fn render(&self, ctx: &mut dyn DrawContext);

    /// The surface changed size
    fn resize(&mut self, _viewport: Size) {}
}

trait AnyTask: FrameTask {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: FrameTask + 'static> AnyTask for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Internal state of the frame scheduler
struct SchedulerInner {
    tasks: SlotMap<TaskId, Box<dyn AnyTask>>,
    /// Declared order; updates and renders walk this list
    order: Vec<TaskId>,
    viewport: Option<Size>,
    last_frame: Option<f64>,
    frame: u64,
}

impl SchedulerInner {
    fn remove(&mut self, id: TaskId) -> bool {
        match self.tasks.remove(id) {
            Some(task) => {
                self.order.retain(|t| *t != id);
                tracing::debug!("FrameScheduler: removed task '{}'", task.name());
                true
            }
            None => false,
        }
    }

    fn resize(&mut self, viewport: Size) {
        self.viewport = Some(viewport);
        for id in &self.order {
            if let Some(task) = self.tasks.get_mut(*id) {
                task.resize(viewport);
            }
        }
    }

    fn with_task<T, F, R>(&mut self, id: TaskId, f: F) -> Option<R>
    where
        T: FrameTask + 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.tasks
            .get_mut(id)
            .and_then(|task| task.as_any_mut().downcast_mut::<T>())
            .map(f)
    }
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The scheduler that owns and drives all frame tasks
///
/// The host invokes `frame()` once per display refresh. The scheduler does not
/// own a timer or thread; scheduling is entirely the host's concern.
///
/// Task callbacks run while the scheduler is locked. A task must not call back
/// into the scheduler or its handles from `update` or `render`.
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                tasks: SlotMap::with_key(),
                order: Vec::new(),
                viewport: None,
                last_frame: None,
                frame: 0,
            })),
        }
    }

    /// Get a weak handle to this scheduler
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register a task at the end of the declared order
    ///
    /// If the surface size is already known the task is resized before it
    /// sees its first frame.
    pub fn register<T: FrameTask + 'static>(&self, mut task: T) -> TaskRegistration {
        let mut inner = lock(&self.inner);
        if let Some(viewport) = inner.viewport {
            task.resize(viewport);
        }
        tracing::debug!(
            "FrameScheduler: registered task '{}' at position {}",
            task.name(),
            inner.order.len()
        );
        let id = inner.tasks.insert(Box::new(task));
        inner.order.push(id);
        TaskRegistration {
            id,
            handle: self.handle(),
        }
    }

    /// Remove a task immediately
    pub fn unregister(&self, id: TaskId) -> bool {
        lock(&self.inner).remove(id)
    }

    /// Run one frame
    ///
    /// Without a surface the frame is skipped entirely: nothing updates and
    /// nothing is drawn. The first frame that has a surface resumes normally.
    /// A surface whose size differs from the last known viewport is treated
    /// as a resize before the frame runs.
    ///
    /// Returns the frame timing if the frame ran.
    pub fn frame(&self, now: f64, surface: Option<&mut dyn DrawContext>) -> Option<FrameTime> {
        let Some(ctx) = surface else {
            tracing::trace!("FrameScheduler: no surface, skipping frame");
            return None;
        };

        let mut inner = lock(&self.inner);

        let viewport = ctx.viewport_size();
        if inner.viewport != Some(viewport) {
            tracing::debug!(
                "FrameScheduler: surface is {}x{}, resizing tasks",
                viewport.width,
                viewport.height
            );
            inner.resize(viewport);
        }

        let time = FrameTime {
            elapsed: now,
            delta: inner.last_frame.map_or(0.0, |last| (now - last).max(0.0)),
            frame: inner.frame,
        };
        inner.last_frame = Some(now);
        inner.frame += 1;

        ctx.clear();

        let SchedulerInner { tasks, order, .. } = &mut *inner;

        for id in order.iter() {
            if let Some(task) = tasks.get_mut(*id) {
                task.update(&time);
            }
        }

        for id in order.iter() {
            if let Some(task) = tasks.get(*id) {
                task.render(ctx);
            }
        }

        tracing::trace!("FrameScheduler: frame {} ran {} tasks", time.frame, order.len());
        Some(time)
    }

    /// Forward a surface resize to every task
    pub fn resize(&self, viewport: Size) {
        tracing::debug!(
            "FrameScheduler: resize to {}x{}",
            viewport.width,
            viewport.height
        );
        lock(&self.inner).resize(viewport);
    }

    /// Typed access to a registered task
    ///
    /// Returns `None` if the task is gone or is not a `T`.
    pub fn with_task<T, F, R>(&self, id: TaskId, f: F) -> Option<R>
    where
        T: FrameTask + 'static,
        F: FnOnce(&mut T) -> R,
    {
        lock(&self.inner).with_task(id, f)
    }

    pub fn task_count(&self) -> usize {
        lock(&self.inner).tasks.len()
    }

    /// Task names in declared order
    pub fn task_names(&self) -> Vec<String> {
        let inner = lock(&self.inner);
        inner
            .order
            .iter()
            .filter_map(|id| inner.tasks.get(*id))
            .map(|task| task.name().to_string())
            .collect()
    }

    /// Number of frames that have run
    pub fn frame_count(&self) -> u64 {
        lock(&self.inner).frame
    }

    pub fn viewport(&self) -> Option<Size> {
        lock(&self.inner).viewport
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the frame scheduler
///
/// It won't keep the scheduler alive. Every operation no-ops once the
/// scheduler has been dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Remove a task
    pub fn remove(&self, id: TaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).remove(id))
            .unwrap_or(false)
    }

    /// Check if a task is still registered
    pub fn contains(&self, id: TaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).tasks.contains_key(id))
            .unwrap_or(false)
    }

    pub fn with_task<T, F, R>(&self, id: TaskId, f: F) -> Option<R>
    where
        T: FrameTask + 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.inner
            .upgrade()
            .and_then(|inner| lock(&inner).with_task(id, f))
    }
}

/// Registration guard for a frame task
///
/// The task stays registered for as long as this guard lives.
pub struct TaskRegistration {
    id: TaskId,
    handle: SchedulerHandle,
}

impl TaskRegistration {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Check if the task is still registered
    pub fn is_active(&self) -> bool {
        self.handle.contains(self.id)
    }

    /// Tear the task down now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TaskRegistration {
    fn drop(&mut self) {
        self.handle.remove(self.id);
    }
}

impl std::fmt::Debug for TaskRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistration")
            .field("id", &self.id)
            .finish()
    }
}
