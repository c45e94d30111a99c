//! Typewriter text reveal
//!
//! Reveals a target string one character per timer tick. Each tick is due
//! `delay + random(0, jitter)` milliseconds after the previous one, and rolls
//! a small chance of entering a short-lived glitch state before the character
//! is appended. The completion callback fires exactly once, on the tick that
//! appends the final character.
//!
//! Cancelling (or dropping) a typewriter mid-reveal stops the tick chain and
//! never fires the completion callback.
//!
//! ```
//! use orrery_animation::{TypeWriter, TypeWriterConfig};
//! use orrery_core::SequenceRng;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let done = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&done);
//!
//! let mut writer = TypeWriter::new("hi", TypeWriterConfig::default(), SequenceRng::constant(0.5))
//!     .on_complete(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     });
//!
//! writer.fire();
//! writer.fire();
//! assert_eq!(writer.displayed(), "hi");
//! assert_eq!(done.load(Ordering::SeqCst), 1);
//! ```

use crate::cycle::Blink;
use crate::scheduler::{FrameTask, FrameTime};
use orrery_core::{Color, DrawContext, FontWeight, Point, RandomSource, SceneRng, TextStyle};

/// Timing and glitch parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeWriterConfig {
    /// Base delay between characters
    pub delay_ms: f64,
    /// Upper bound of the random extra delay per character
    pub jitter_ms: f64,
    /// Per-tick probability of entering the glitch state
    pub glitch_probability: f32,
    pub glitch_duration_ms: f64,
    pub cursor_blink_ms: f64,
}

impl Default for TypeWriterConfig {
    fn default() -> Self {
        Self {
            delay_ms: 100.0,
            jitter_ms: 50.0,
            glitch_probability: 0.1,
            glitch_duration_ms: 100.0,
            cursor_blink_ms: 500.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeWriterState {
    /// Not yet started or mid-reveal
    Typing,
    Complete,
    Cancelled,
}

type CompleteCallback = Box<dyn FnOnce() + Send>;

/// A character-by-character text reveal with a blinking cursor
pub struct TypeWriter<R: RandomSource = SceneRng> {
    chars: Vec<char>,
    revealed: usize,
    config: TypeWriterConfig,
    rng: R,
    state: TypeWriterState,
    /// When the next tick is due; `None` until started
    next_due_ms: Option<f64>,
    glitch_until_ms: Option<f64>,
    now_ms: f64,
    on_complete: Option<CompleteCallback>,
    cursor: Blink,
    origin: Point,
    style: TextStyle,
}

impl<R: RandomSource> TypeWriter<R> {
    pub fn new(text: &str, config: TypeWriterConfig, rng: R) -> Self {
        Self {
            chars: text.chars().collect(),
            revealed: 0,
            cursor: Blink::new(config.cursor_blink_ms),
            config,
            rng,
            state: TypeWriterState::Typing,
            next_due_ms: None,
            glitch_until_ms: None,
            now_ms: 0.0,
            on_complete: None,
            origin: Point::ZERO,
            style: TextStyle::new(64.0)
                .with_weight(FontWeight::Bold)
                .with_color(Color::from_hex(0x34d399)),
        }
    }

    /// Set the callback fired once the full string is revealed
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Where the text baseline starts on the surface
    pub fn at(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Begin the tick chain at `now_ms`
    ///
    /// An empty target completes immediately. Calling `start` again has no
    /// effect.
    pub fn start(&mut self, now_ms: f64) {
        if self.state != TypeWriterState::Typing || self.next_due_ms.is_some() {
            return;
        }
        self.now_ms = now_ms;
        if self.chars.is_empty() {
            self.complete();
            return;
        }
        self.next_due_ms = Some(now_ms + self.next_delay());
    }

    /// Process every tick due at or before `now_ms`
    ///
    /// Returns the number of characters revealed by this call.
    pub fn advance(&mut self, now_ms: f64) -> usize {
        self.start(now_ms);
        self.now_ms = self.now_ms.max(now_ms);

        let mut revealed = 0;
        while self.state == TypeWriterState::Typing {
            match self.next_due_ms {
                Some(due) if due <= now_ms => {
                    if self.tick_at(due) {
                        revealed += 1;
                    }
                }
                _ => break,
            }
        }
        revealed
    }

    /// Perform exactly one tick at the current time, ignoring the schedule
    ///
    /// Returns `true` if a character was revealed.
    pub fn fire(&mut self) -> bool {
        let now = self.now_ms;
        self.tick_at(now)
    }

    /// Stop the reveal without firing the completion callback
    pub fn cancel(&mut self) {
        if self.state == TypeWriterState::Typing {
            tracing::debug!(
                "TypeWriter: cancelled after {}/{} characters",
                self.revealed,
                self.chars.len()
            );
            self.state = TypeWriterState::Cancelled;
            self.next_due_ms = None;
            self.on_complete = None;
        }
    }

    fn tick_at(&mut self, at_ms: f64) -> bool {
        if self.state != TypeWriterState::Typing {
            return false;
        }

        if self.revealed >= self.chars.len() {
            self.complete();
            return false;
        }

        if self.rng.chance(self.config.glitch_probability) {
            self.glitch_until_ms = Some(at_ms + self.config.glitch_duration_ms);
        }

        self.revealed += 1;
        tracing::trace!(
            "TypeWriter: revealed {}/{}",
            self.revealed,
            self.chars.len()
        );

        if self.revealed == self.chars.len() {
            self.complete();
        } else {
            self.next_due_ms = Some(at_ms + self.next_delay());
        }
        true
    }

    fn next_delay(&mut self) -> f64 {
        self.config.delay_ms + self.rng.next_f32() as f64 * self.config.jitter_ms
    }

    fn complete(&mut self) {
        self.state = TypeWriterState::Complete;
        self.next_due_ms = None;
        tracing::debug!("TypeWriter: complete ({} characters)", self.chars.len());
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }

    /// The revealed prefix
    pub fn displayed(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn state(&self) -> TypeWriterState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == TypeWriterState::Complete
    }

    pub fn is_glitching(&self) -> bool {
        self.glitch_until_ms.is_some_and(|until| self.now_ms < until)
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible(self.now_ms)
    }

    /// When the next tick is due, if one is scheduled
    pub fn next_due_ms(&self) -> Option<f64> {
        self.next_due_ms
    }

    /// Text as it should appear this frame, including the cursor
    pub fn frame_text(&self) -> String {
        let mut text = self.displayed();
        if self.cursor_visible() {
            text.push('|');
        }
        text
    }

    fn frame_style(&self) -> TextStyle {
        if self.is_glitching() {
            self.style
                .clone()
                .with_color(self.style.color.hue_rotate(90.0))
                .with_glow(10.0, Color::from_hex(0x00ff88))
        } else {
            self.style.clone()
        }
    }
}

impl<R: RandomSource> std::fmt::Debug for TypeWriter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeWriter")
            .field("revealed", &self.revealed)
            .field("len", &self.chars.len())
            .field("state", &self.state)
            .field("next_due_ms", &self.next_due_ms)
            .finish()
    }
}

impl<R: RandomSource + Send + 'static> FrameTask for TypeWriter<R> {
    fn name(&self) -> &str {
        "typewriter"
    }

    fn update(&mut self, time: &FrameTime) {
        self.advance(time.elapsed_ms());
    }

    fn render(&self, ctx: &mut dyn DrawContext) {
        let text = self.frame_text();
        if text.is_empty() {
            return;
        }
        ctx.draw_text(&text, self.origin, &self.frame_style());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{DrawCommand, RecordingContext, SequenceRng, Size};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_writer(text: &str, rng: SequenceRng) -> (TypeWriter<SequenceRng>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let writer = TypeWriter::new(text, TypeWriterConfig::default(), rng).on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (writer, fired)
    }

    #[test]
    fn test_reveals_n_chars_in_n_ticks() {
        let (mut writer, fired) = counting_writer("John Doe", SequenceRng::constant(0.9));

        for i in 1..writer.len() {
            assert!(writer.fire());
            assert_eq!(writer.revealed(), i);
            assert_eq!(fired.load(Ordering::SeqCst), 0);
        }

        assert!(writer.fire());
        assert_eq!(writer.displayed(), "John Doe");
        assert!(writer.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Further ticks change nothing
        assert!(!writer.fire());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_before_completion_never_fires() {
        let (mut writer, fired) = counting_writer("hello", SequenceRng::constant(0.9));
        writer.fire();
        writer.fire();
        writer.cancel();

        assert_eq!(writer.state(), TypeWriterState::Cancelled);
        assert!(!writer.fire());
        assert_eq!(writer.advance(10_000.0), 0);
        assert_eq!(writer.displayed(), "he");
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_mid_reveal_never_fires() {
        let (mut writer, fired) = counting_writer("hello", SequenceRng::constant(0.9));
        writer.advance(0.0);
        writer.advance(300.0);
        drop(writer);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let (mut writer, fired) = counting_writer("", SequenceRng::constant(0.9));
        assert!(!writer.fire());
        assert!(writer.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let (mut started, fired) = counting_writer("", SequenceRng::constant(0.9));
        started.advance(0.0);
        assert!(started.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jittered_schedule() {
        // Every sample is 0.5: 100 + 0.5 * 50 = 125ms per character
        let (mut writer, _) = counting_writer("abc", SequenceRng::constant(0.5));

        assert_eq!(writer.advance(0.0), 0);
        assert_eq!(writer.next_due_ms(), Some(125.0));
        assert_eq!(writer.advance(124.0), 0);
        assert_eq!(writer.advance(125.0), 1);
        assert_eq!(writer.next_due_ms(), Some(250.0));

        // A long gap catches up on every due tick
        assert_eq!(writer.advance(1000.0), 2);
        assert!(writer.is_complete());
    }

    #[test]
    fn test_glitch_window() {
        // Scheduling samples 0.0, the glitch roll samples 0.05 (< 0.1)
        let rng = SequenceRng::new(vec![0.0, 0.05]);
        let mut writer = TypeWriter::new("ab", TypeWriterConfig::default(), rng);

        writer.advance(0.0);
        writer.advance(100.0);
        assert!(writer.is_glitching());

        writer.advance(199.0);
        assert!(writer.is_glitching());

        // Rolls above the probability never glitch
        let mut calm = TypeWriter::new("ab", TypeWriterConfig::default(), SequenceRng::constant(0.5));
        calm.advance(0.0);
        calm.advance(125.0);
        assert!(!calm.is_glitching());
    }

    #[test]
    fn test_unicode_reveal() {
        let (mut writer, _) = counting_writer("héllo→", SequenceRng::constant(0.9));
        writer.fire();
        writer.fire();
        assert_eq!(writer.displayed(), "hé");
        assert_eq!(writer.len(), 6);
    }

    #[test]
    fn test_render_appends_blinking_cursor() {
        let (mut writer, _) = counting_writer("ok", SequenceRng::constant(0.9));
        writer.fire();

        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        writer.render(&mut ctx);
        match &ctx.commands()[0] {
            DrawCommand::DrawText { text, .. } => assert_eq!(text, "o|"),
            other => panic!("unexpected command {:?}", other),
        }

        // Cursor hidden during the second blink period
        writer.advance(600.0);
        assert!(!writer.cursor_visible());
        assert_eq!(writer.frame_text(), writer.displayed());
    }

    #[test]
    fn test_glitch_restyles_text() {
        let rng = SequenceRng::new(vec![0.0, 0.05]);
        let mut writer = TypeWriter::new("ab", TypeWriterConfig::default(), rng);
        writer.advance(0.0);
        writer.advance(100.0);
        assert!(writer.is_glitching());

        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        writer.render(&mut ctx);
        match &ctx.commands()[0] {
            DrawCommand::DrawText { style, .. } => {
                assert_eq!(style.glow, 10.0);
                assert_ne!(style.color, Color::from_hex(0x34d399));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
