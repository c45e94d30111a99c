//! Time-periodic cycles
//!
//! Stateless replacements for interval timers: each cycle is a pure function
//! of elapsed milliseconds, so nothing needs to be cancelled on teardown.

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// On/off toggle that flips every `period_ms`, starting visible
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blink {
    pub period_ms: f64,
}

impl Blink {
    pub const fn new(period_ms: f64) -> Self {
        Self { period_ms }
    }

    pub fn visible(&self, now_ms: f64) -> bool {
        if !is_positive(self.period_ms) || now_ms < 0.0 {
            return true;
        }
        ((now_ms / self.period_ms) as u64) % 2 == 0
    }
}

impl Default for Blink {
    fn default() -> Self {
        Self::new(500.0)
    }
}

/// Recurring pulse: active for `duration_ms` at the start of every
/// `interval_ms`, beginning when the first interval elapses
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchPulse {
    pub interval_ms: f64,
    pub duration_ms: f64,
}

impl GlitchPulse {
    pub const fn new(interval_ms: f64, duration_ms: f64) -> Self {
        Self {
            interval_ms,
            duration_ms,
        }
    }

    pub fn active(&self, now_ms: f64) -> bool {
        if !is_positive(self.interval_ms) || now_ms < self.interval_ms {
            return false;
        }
        now_ms % self.interval_ms < self.duration_ms
    }
}

impl Default for GlitchPulse {
    fn default() -> Self {
        Self::new(7000.0, 300.0)
    }
}

/// Steps through `len` items, advancing one every `period_ms`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotator {
    pub period_ms: f64,
    pub len: usize,
}

impl Rotator {
    pub const fn new(period_ms: f64, len: usize) -> Self {
        Self { period_ms, len }
    }

    pub fn index(&self, now_ms: f64) -> usize {
        if self.len == 0 || !is_positive(self.period_ms) || now_ms < 0.0 {
            return 0;
        }
        ((now_ms / self.period_ms) as u64 % self.len as u64) as usize
    }
}
