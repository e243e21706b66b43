//! Plays parsed note tokens one after another on a single voice.

use std::time::Duration;

use chiptone_synth::{Effect, MalformedNotation, NoteToken};

use crate::Result;

/// Anything that can start a tone and wait.
///
/// [`ToneEngine`](crate::ToneEngine) is the real target; tests substitute a
/// recorder that does not sleep.
pub trait ToneTarget {
    /// Start a tone on `voice`, replacing what it plays.
    fn play_tone(
        &self,
        voice: usize,
        hz: u32,
        duration_ms: u32,
        volume: u8,
        effect: Effect,
    ) -> Result<()>;

    /// Block for `duration`.
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Outcome of playing a note string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    /// Notes and rests that were played, in order.
    pub notes: Vec<NoteToken>,
    /// Characters that were ignored.
    pub skipped: Vec<MalformedNotation>,
    /// Total scheduled length.
    pub elapsed: Duration,
}

/// Drives a [`ToneTarget`] through a list of note tokens.
pub struct Sequencer<'a, T: ToneTarget + ?Sized> {
    target: &'a T,
    voice: usize,
}

impl<'a, T: ToneTarget + ?Sized> Sequencer<'a, T> {
    /// Sequence onto `voice` of `target`.
    pub fn new(target: &'a T, voice: usize) -> Self {
        Self { target, voice }
    }

    /// Play every token, each lasting `base_increment_ms` times its
    /// multiplier, and return the total scheduled time.
    ///
    /// Rests send a 0 Hz tone so the previous note stops. The first error from
    /// the target ends the sequence.
    pub fn play(&self, base_increment_ms: u32, volume: u8, tokens: &[NoteToken]) -> Result<Duration> {
        let mut total = Duration::ZERO;
        for token in tokens {
            let duration_ms = base_increment_ms.saturating_mul(token.multiplier);
            let hz = token.frequency();
            self.target
                .play_tone(self.voice, hz, duration_ms, volume, Effect::None)?;
            tracing::trace!(voice = self.voice, note = %token, hz, duration_ms, "note");

            let duration = Duration::from_millis(u64::from(duration_ms));
            self.target.wait(duration);
            total += duration;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chiptone_synth::parse_notation;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        tones: RefCell<Vec<(usize, u32, u32, u8)>>,
        waited: RefCell<Duration>,
        fail_after: Option<usize>,
    }

    impl ToneTarget for Recorder {
        fn play_tone(
            &self,
            voice: usize,
            hz: u32,
            duration_ms: u32,
            volume: u8,
            _effect: Effect,
        ) -> Result<()> {
            let mut tones = self.tones.borrow_mut();
            if self.fail_after == Some(tones.len()) {
                return Err(Error::AlreadyClosed);
            }
            tones.push((voice, hz, duration_ms, volume));
            Ok(())
        }

        fn wait(&self, duration: Duration) {
            *self.waited.borrow_mut() += duration;
        }
    }

    #[test]
    fn each_token_becomes_one_tone() {
        let recorder = Recorder::default();
        let parsed = parse_notation("C 2D -");
        let total = Sequencer::new(&recorder, 2)
            .play(100, 7, &parsed.tokens)
            .unwrap();

        let tones = recorder.tones.borrow();
        assert_eq!(tones.len(), 3);
        assert_eq!(tones[0], (2, 65, 100, 7));
        assert_eq!(tones[1], (2, 73, 200, 7));
        assert_eq!(tones[2], (2, 0, 100, 7));
        assert_eq!(total, Duration::from_millis(400));
        assert_eq!(*recorder.waited.borrow(), total);
    }

    #[test]
    fn scale_rises_one_tone_per_note() {
        let recorder = Recorder::default();
        let parsed = parse_notation("CDEFG");
        Sequencer::new(&recorder, 4)
            .play(200, 5, &parsed.tokens)
            .unwrap();

        let tones = recorder.tones.borrow();
        assert_eq!(tones.len(), 5);
        assert!(tones.iter().all(|&(voice, _, ms, vol)| (voice, ms, vol) == (4, 200, 5)));
        assert!(tones.windows(2).all(|w| w[0].1 < w[1].1), "{tones:?}");
    }

    #[test]
    fn error_stops_sequence() {
        let recorder = Recorder {
            fail_after: Some(1),
            ..Recorder::default()
        };
        let parsed = parse_notation("CDE");
        let err = Sequencer::new(&recorder, 0)
            .play(100, 5, &parsed.tokens)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyClosed));
        assert_eq!(recorder.tones.borrow().len(), 1);
        assert_eq!(*recorder.waited.borrow(), Duration::from_millis(100));
    }

    #[test]
    fn empty_sequence_takes_no_time() {
        let recorder = Recorder::default();
        let total = Sequencer::new(&recorder, 0).play(100, 5, &[]).unwrap();
        assert_eq!(total, Duration::ZERO);
        assert!(recorder.tones.borrow().is_empty());
    }
}
