//! A single square-wave voice.
//!
//! A voice plays one tone at a time. Starting a new tone replaces the old one
//! on the spot; nothing is queued. Time inside a voice is counted in ticks,
//! one tick per output sample.

use crate::effect::{Effect, modulate, sweep_at, sweep_steps};
use crate::error::ToneError;

/// Loudest volume a tone can request.
pub const MAX_VOLUME: u8 = 10;

/// Peak amplitude of a single voice at full volume.
///
/// Several voices can sound at once; the bank clamps the sum.
pub const VOICE_GAIN: f32 = 0.25;

/// Gate window length per effect offset unit, in seconds.
///
/// Eight samples at 22.05 kHz, the rate the effect levels were tuned for.
pub const GATE_UNIT_SECONDS: f32 = 8.0 / 22050.0;

/// Default sweep step length in milliseconds.
pub const DEFAULT_SWEEP_STEP_MS: u32 = 10;

/// Everything needed to start a tone on a voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToneRequest {
    /// Tone frequency in Hz; 0 is silence.
    pub hz: u32,
    /// Length in ticks; 0 plays until replaced.
    pub duration_ticks: u64,
    /// Volume, 0 to [`MAX_VOLUME`].
    pub volume: u8,
    /// Modulation applied while the tone plays.
    pub effect: Effect,
}

impl ToneRequest {
    /// Create a tone request.
    pub fn new(hz: u32, duration_ticks: u64, volume: u8, effect: Effect) -> Self {
        Self {
            hz,
            duration_ticks,
            volume,
            effect,
        }
    }

    /// A request that stops whatever the voice is playing.
    pub fn silence() -> Self {
        Self::default()
    }

    /// Check volume and effect bounds.
    pub fn validate(&self) -> Result<(), ToneError> {
        ToneError::check_range("volume", u32::from(self.volume), 0, u32::from(MAX_VOLUME))?;
        self.effect.validate()
    }
}

/// One square-wave playback channel.
///
/// # Example
///
/// ```rust
/// use chiptone_synth::{Effect, ToneRequest, Voice};
///
/// let mut voice = Voice::new(22050.0);
/// voice.set(ToneRequest::new(440, 100, 10, Effect::None));
///
/// let samples: Vec<f32> = (0..200).map(|_| voice.tick()).collect();
/// assert!(samples[..100].iter().all(|s| *s != 0.0));
/// assert!(samples[100..].iter().all(|s| *s == 0.0));
/// assert!(!voice.is_sounding());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    request: ToneRequest,
    sample_rate: f32,
    /// Square wave phase [0.0, 1.0)
    phase: f32,
    phase_inc: f32,
    amplitude: f32,
    /// Ticks since the current tone started
    elapsed: u64,
    step_ms: u32,
    step_ticks: u64,
    /// Samples per effect offset unit
    gate_unit: f32,
    /// Current gate window in samples, 0 = gate open
    gate_window: u64,
    offset: f32,
    /// Tick a shortened Up/Down sweep lands on, `None` at normal speed
    sweep_end: Option<u64>,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(22050.0)
    }
}

impl Voice {
    /// Create a silent voice.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            request: ToneRequest::silence(),
            sample_rate,
            phase: 0.0,
            phase_inc: 0.0,
            amplitude: 0.0,
            elapsed: 0,
            step_ms: DEFAULT_SWEEP_STEP_MS,
            step_ticks: 1,
            gate_unit: 0.0,
            gate_window: 0,
            offset: 0.0,
            sweep_end: None,
        };
        voice.recalculate_timing();
        voice
    }

    /// Set sample rate. Takes effect immediately, including for a playing tone.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_timing();
        self.phase_inc = self.request.hz as f32 / self.sample_rate;
    }

    /// Set the sweep step length in milliseconds (minimum 1).
    pub fn set_sweep_step_ms(&mut self, ms: u32) {
        self.step_ms = ms.max(1);
        self.recalculate_timing();
    }

    fn recalculate_timing(&mut self) {
        self.step_ticks = ((self.sample_rate * self.step_ms as f32 / 1000.0) as u64).max(1);
        self.gate_unit = self.sample_rate * GATE_UNIT_SECONDS;
        self.update_sweep_end();
    }

    /// A finite tone must finish its Up/Down sweep by its last tick.
    fn update_sweep_end(&mut self) {
        self.sweep_end = match (self.request.duration_ticks, sweep_steps(self.request.effect)) {
            (0, _) | (_, None) | (_, Some(0)) => None,
            (duration, Some(steps)) => {
                let last = duration - 1;
                (steps.saturating_mul(self.step_ticks) > last).then_some(last)
            }
        };
    }

    /// Start a tone, replacing whatever was playing.
    ///
    /// The request is taken as-is; validate it first with
    /// [`ToneRequest::validate`].
    pub fn set(&mut self, request: ToneRequest) {
        self.request = request;
        self.phase = 0.0;
        self.phase_inc = request.hz as f32 / self.sample_rate;
        self.amplitude = f32::from(request.volume.min(MAX_VOLUME)) / f32::from(MAX_VOLUME)
            * VOICE_GAIN;
        self.elapsed = 0;
        self.gate_window = 0;
        self.offset = 0.0;
        self.update_sweep_end();
    }

    /// Stop the voice.
    pub fn silence(&mut self) {
        self.set(ToneRequest::silence());
    }

    /// Produce the next sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        if self.request.hz == 0 {
            return 0.0;
        }

        if self.elapsed % self.step_ticks == 0 || Some(self.elapsed) == self.sweep_end {
            self.offset = self.current_offset();
            self.gate_window = libm::roundf(self.offset * self.gate_unit) as u64;
        }

        let gated = self.gate_window > 0 && (self.elapsed / self.gate_window) % 2 == 1;
        let out = if gated {
            0.0
        } else if self.phase < 0.5 {
            self.amplitude
        } else {
            -self.amplitude
        };

        self.phase += self.phase_inc;
        self.phase -= libm::floorf(self.phase);
        self.elapsed += 1;

        if self.request.duration_ticks != 0 && self.elapsed >= self.request.duration_ticks {
            self.request.hz = 0;
        }

        out
    }

    fn current_offset(&self) -> f32 {
        let effect = self.request.effect;
        if let Some(end) = self.sweep_end {
            let progress = if self.elapsed >= end {
                1.0
            } else {
                self.elapsed as f32 / end as f32
            };
            if let Some(offset) = sweep_at(effect, progress) {
                return offset;
            }
        }
        let step = (self.elapsed / self.step_ticks).min(u64::from(u32::MAX)) as u32;
        modulate(effect, step)
    }

    /// Whether a tone is currently playing.
    pub fn is_sounding(&self) -> bool {
        self.request.hz != 0
    }

    /// The request currently being played (hz is 0 once it has finished).
    pub fn request(&self) -> &ToneRequest {
        &self.request
    }

    /// Ticks since the current tone started.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed
    }

    /// Ticks left before the tone stops, `None` for an indefinite tone.
    pub fn remaining_ticks(&self) -> Option<u64> {
        match self.request.duration_ticks {
            0 => None,
            d => Some(d.saturating_sub(self.elapsed)),
        }
    }

    /// Most recent effect offset, in level units.
    pub fn effect_offset(&self) -> f32 {
        self.offset
    }

    /// Sweep step length in ticks.
    pub fn step_ticks(&self) -> u64 {
        self.step_ticks
    }
}
