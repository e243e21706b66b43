//! Fixed set of voices mixed into one output signal.

use crate::error::ToneError;
use crate::voice::{ToneRequest, Voice};

/// Number of voices the engine exposes.
pub const VOICE_COUNT: usize = 5;

/// A fixed array of independently addressable voices.
///
/// Every call to [`VoiceBank::render`] ticks all voices once per sample and
/// sums them. The sum is clamped to `[-1.0, 1.0]` so a full chord cannot
/// overflow the output.
///
/// # Example
///
/// ```rust
/// use chiptone_synth::{Effect, ToneRequest, VoiceBank};
///
/// let mut bank: VoiceBank<3> = VoiceBank::new(22050.0);
/// bank.set(0, ToneRequest::new(10, 0, 10, Effect::Fixed { level: 700 })).unwrap();
/// bank.set(1, ToneRequest::new(100, 0, 3, Effect::Down { level: 5 })).unwrap();
/// bank.set(2, ToneRequest::new(20, 0, 2, Effect::Down { level: 1 })).unwrap();
/// assert_eq!(bank.sounding_mask(), 0b111);
///
/// assert!(bank.set(3, ToneRequest::silence()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VoiceBank<const N: usize> {
    voices: [Voice; N],
    sample_rate: f32,
}

impl<const N: usize> VoiceBank<N> {
    /// Create a bank of silent voices.
    pub fn new(sample_rate: f32) -> Self {
        const { assert!(N <= 32, "sounding mask holds at most 32 voices") };
        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            sample_rate,
        }
    }

    /// Number of voices.
    pub const fn voice_count(&self) -> usize {
        N
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set sample rate on every voice.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Set the sweep step length on every voice.
    pub fn set_sweep_step_ms(&mut self, ms: u32) {
        for voice in &mut self.voices {
            voice.set_sweep_step_ms(ms);
        }
    }

    /// Check a voice index against the bank size.
    pub fn check_index(index: usize) -> Result<(), ToneError> {
        if index < N {
            Ok(())
        } else {
            Err(ToneError::VoiceOutOfRange {
                voice: index,
                count: N,
            })
        }
    }

    /// Start a tone on one voice, replacing what it was playing.
    ///
    /// Fails without touching any voice if the index or the request is out of
    /// range.
    pub fn set(&mut self, index: usize, request: ToneRequest) -> Result<(), ToneError> {
        Self::check_index(index)?;
        request.validate()?;
        self.voices[index].set(request);
        Ok(())
    }

    /// Borrow one voice.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Borrow all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Stop every voice.
    pub fn silence_all(&mut self) {
        for voice in &mut self.voices {
            voice.silence();
        }
    }

    /// Bit `i` is set while voice `i` is sounding.
    pub fn sounding_mask(&self) -> u32 {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_sounding())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Number of voices currently sounding.
    pub fn sounding_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    /// Produce one mixed sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let sum: f32 = self.voices.iter_mut().map(Voice::tick).sum();
        sum.clamp(-1.0, 1.0)
    }

    /// Fill `out` with mixed mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.tick();
        }
    }
}

impl Default for VoiceBank<VOICE_COUNT> {
    fn default() -> Self {
        Self::new(22050.0)
    }
}
