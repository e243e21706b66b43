//! The tone engine: voice mailboxes, lifecycle, and the audio callback.
//!
//! Callers never touch voices directly. [`ToneEngine::play_tone`] validates a
//! request and drops it into the target voice's mailbox; the audio callback
//! collects mailboxes once per output block, renders the voice bank, and
//! publishes which voices are still sounding.
//!
//! ```text
//!  caller threads              audio thread
//!  ──────────────              ────────────
//!  play_tone(v, ..) ──► [mailbox v] ──try_lock──► VoiceBank ──► output buffer
//!                                                    │
//!  is_voice_sounding ◄──────── sounding mask ◄───────┘
//! ```
//!
//! The audio thread only ever `try_lock`s a mailbox, so a caller holding one
//! delays that request by a block but never stalls audio.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chiptone_config::EngineConfig;
use chiptone_synth::{
    Effect, MAX_VOLUME, NotationParser, ToneError, ToneRequest, VOICE_COUNT, VoiceBank,
};

use crate::backend::{AudioBackend, BackendStreamConfig, OutputCallback};
use crate::sequencer::{PlayReport, Sequencer, ToneTarget};
use crate::{CpalBackend, Error, Result, StreamHandle};

/// Shortest accepted base increment for note notation, in milliseconds.
pub const MIN_INCREMENT_MS: u32 = 100;

/// Longest accepted base increment for note notation, in milliseconds.
pub const MAX_INCREMENT_MS: u32 = 60_000;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created, no output stream yet.
    Uninitialized,
    /// Output stream open; tones can be played.
    Running,
    /// Shut down for good.
    Closed,
}

/// State shared with the audio callback.
struct Shared {
    mailboxes: [Mutex<Option<ToneRequest>>; VOICE_COUNT],
    /// Bit `i` set while voice `i` sounded at the end of the last block.
    sounding: AtomicU32,
    sample_rate: AtomicU32,
}

impl Shared {
    fn mailbox(&self, voice: usize) -> MutexGuard<'_, Option<ToneRequest>> {
        self.mailboxes[voice]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

struct Lifecycle {
    state: EngineState,
    backend: Box<dyn AudioBackend>,
    stream: Option<StreamHandle>,
}

/// Multi-voice square-wave tone engine.
///
/// `ToneEngine` is `Send + Sync`; share it across threads with `Arc` and call
/// [`play_tone`](Self::play_tone) from anywhere.
///
/// # Example
///
/// ```rust
/// use chiptone_config::EngineConfig;
/// use chiptone_io::{OfflineBackend, ToneEngine};
/// use chiptone_synth::Effect;
///
/// let backend = OfflineBackend::new();
/// let engine = ToneEngine::new(EngineConfig::default(), backend.clone()).unwrap();
///
/// engine.init().unwrap();
/// engine.play_tone(0, 440, 500, 8, Effect::None).unwrap();
/// let block = backend.render(256);
/// assert!(block.iter().any(|s| *s != 0.0));
///
/// engine.close().unwrap();
/// assert!(engine.play_tone(0, 440, 500, 8, Effect::None).is_err());
/// ```
pub struct ToneEngine {
    config: EngineConfig,
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl ToneEngine {
    /// Create an engine that will play through `backend`.
    ///
    /// Nothing is opened until [`init`](Self::init).
    pub fn new(config: EngineConfig, backend: impl AudioBackend + 'static) -> Result<Self> {
        config.validate()?;
        let shared = Shared {
            mailboxes: std::array::from_fn(|_| Mutex::new(None)),
            sounding: AtomicU32::new(0),
            sample_rate: AtomicU32::new(config.sample_rate),
        };
        Ok(Self {
            config,
            shared: Arc::new(shared),
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Uninitialized,
                backend: Box::new(backend),
                stream: None,
            }),
        })
    }

    /// Create an engine on the system audio output.
    pub fn with_cpal(config: EngineConfig) -> Result<Self> {
        Self::new(config, CpalBackend::new())
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the output stream.
    ///
    /// Does nothing if already running. Fails with [`Error::AlreadyClosed`]
    /// after [`close`](Self::close), and with [`Error::SinkUnavailable`] if the
    /// backend cannot open a stream.
    pub fn init(&self) -> Result<()> {
        let mut life = self.lock();
        match life.state {
            EngineState::Running => return Ok(()),
            EngineState::Closed => return Err(Error::AlreadyClosed),
            EngineState::Uninitialized => {}
        }

        let mut stream_config = BackendStreamConfig::from(&self.config);
        let actual = life.backend.actual_sample_rate(&stream_config);
        if actual != stream_config.sample_rate {
            tracing::info!(
                requested = stream_config.sample_rate,
                actual,
                "device sample rate differs from config"
            );
            stream_config.sample_rate = actual;
        }

        let callback = render_callback(
            Arc::clone(&self.shared),
            actual as f32,
            stream_config.channels,
            self.config.sweep_step_ms,
        );
        let on_error = Box::new(|message: &str| {
            tracing::warn!(error = message, "output stream error");
        });

        let stream = life
            .backend
            .build_output_stream(&stream_config, callback, on_error)
            .map_err(|e| Error::SinkUnavailable(e.to_string()))?;

        self.shared.sample_rate.store(actual, Ordering::Release);
        life.stream = Some(stream);
        life.state = EngineState::Running;
        tracing::info!(
            backend = life.backend.name(),
            sample_rate = actual,
            voices = VOICE_COUNT,
            "tone engine started"
        );
        Ok(())
    }

    /// Stop output and silence every voice.
    ///
    /// Idempotent. A closed engine cannot be reopened.
    pub fn close(&self) -> Result<()> {
        let mut life = self.lock();
        if life.state == EngineState::Closed {
            return Ok(());
        }

        // Dropping the handle stops the callback and the voices it owns.
        life.stream = None;
        life.state = EngineState::Closed;
        for voice in 0..VOICE_COUNT {
            *self.shared.mailbox(voice) = None;
        }
        self.shared.sounding.store(0, Ordering::Release);
        tracing::info!("tone engine closed");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    /// Sample rate the engine renders at (the configured rate before `init`).
    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate.load(Ordering::Acquire)
    }

    /// Configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a tone on `voice`, replacing whatever it plays.
    ///
    /// `duration_ms == 0` plays until replaced; `hz == 0` stops the voice.
    /// Returns immediately. Invalid arguments are rejected before anything
    /// changes.
    pub fn play_tone(
        &self,
        voice: usize,
        hz: u32,
        duration_ms: u32,
        volume: u8,
        effect: Effect,
    ) -> Result<()> {
        VoiceBank::<VOICE_COUNT>::check_index(voice)?;
        let mut request = ToneRequest::new(hz, 0, volume, effect);
        request.validate()?;

        let life = self.lock();
        ensure_running(life.state)?;

        request.duration_ticks = ms_to_ticks(duration_ms, self.sample_rate());
        *self.shared.mailbox(voice) = Some(request);
        tracing::debug!(voice, hz, duration_ms, volume, effect = ?effect, "tone queued");
        Ok(())
    }

    /// Whether `voice` is sounding, counting a request not yet picked up by
    /// the audio thread.
    ///
    /// The audio thread updates a voice's bit as soon as it takes the
    /// request, before rendering, so a new tone never reads as silent.
    pub fn is_voice_sounding(&self, voice: usize) -> Result<bool> {
        VoiceBank::<VOICE_COUNT>::check_index(voice)?;
        if let Some(pending) = *self.shared.mailbox(voice) {
            return Ok(pending.hz != 0);
        }
        Ok(self.shared.sounding.load(Ordering::Acquire) & (1 << voice) != 0)
    }

    /// Play a note string on the configured default voice.
    ///
    /// Blocks until the melody has finished.
    pub fn play_notes(
        &self,
        base_increment_ms: u32,
        volume: u8,
        notation: &str,
    ) -> Result<PlayReport> {
        self.play_notes_on(self.config.default_voice, base_increment_ms, volume, notation)
    }

    /// Play a note string on `voice`.
    ///
    /// Each note lasts `base_increment_ms` times its multiplier. Characters
    /// outside the grammar are skipped and listed in the report.
    pub fn play_notes_on(
        &self,
        voice: usize,
        base_increment_ms: u32,
        volume: u8,
        notation: &str,
    ) -> Result<PlayReport> {
        VoiceBank::<VOICE_COUNT>::check_index(voice)?;
        ToneError::check_range(
            "increment_ms",
            base_increment_ms,
            MIN_INCREMENT_MS,
            MAX_INCREMENT_MS,
        )?;
        ToneError::check_range("volume", u32::from(volume), 0, u32::from(MAX_VOLUME))?;
        ensure_running(self.state())?;

        let parsed = NotationParser::new(self.config.base_octave).parse(notation);
        if !parsed.skipped.is_empty() {
            tracing::warn!(
                skipped = parsed.skipped.len(),
                "note string contained characters that were ignored"
            );
        }
        tracing::info!(
            voice,
            notes = parsed.tokens.len(),
            base_increment_ms,
            "playing notes"
        );

        let elapsed = Sequencer::new(self, voice).play(base_increment_ms, volume, &parsed.tokens)?;
        Ok(PlayReport {
            notes: parsed.tokens,
            skipped: parsed.skipped,
            elapsed,
        })
    }
}

impl ToneTarget for ToneEngine {
    fn play_tone(
        &self,
        voice: usize,
        hz: u32,
        duration_ms: u32,
        volume: u8,
        effect: Effect,
    ) -> Result<()> {
        ToneEngine::play_tone(self, voice, hz, duration_ms, volume, effect)
    }
}

fn ensure_running(state: EngineState) -> Result<()> {
    match state {
        EngineState::Running => Ok(()),
        EngineState::Uninitialized => Err(Error::NotInitialized),
        EngineState::Closed => Err(Error::AlreadyClosed),
    }
}

/// Milliseconds to sample ticks; a non-zero duration is at least one tick.
fn ms_to_ticks(duration_ms: u32, sample_rate: u32) -> u64 {
    if duration_ms == 0 {
        return 0;
    }
    (u64::from(duration_ms) * u64::from(sample_rate) / 1000).max(1)
}

/// Build the audio callback. The voice bank lives inside the closure, so it
/// is owned by the audio thread and dropped with the stream.
fn render_callback(
    shared: Arc<Shared>,
    sample_rate: f32,
    channels: u16,
    sweep_step_ms: u32,
) -> OutputCallback {
    let channels = usize::from(channels.max(1));
    let mut bank: VoiceBank<VOICE_COUNT> = VoiceBank::new(sample_rate);
    bank.set_sweep_step_ms(sweep_step_ms);
    let mut mono = vec![0.0f32; 4096];

    Box::new(move |data: &mut [f32]| {
        for (voice, slot) in shared.mailboxes.iter().enumerate() {
            if let Ok(mut pending) = slot.try_lock()
                && let Some(request) = pending.take()
            {
                // Published under the mailbox lock so readers never see a
                // picked-up request as missing from the mask.
                let bit = 1u32 << voice;
                match bank.set(voice, request) {
                    Ok(()) if request.hz != 0 => {
                        shared.sounding.fetch_or(bit, Ordering::AcqRel);
                    }
                    Ok(()) => {
                        shared.sounding.fetch_and(!bit, Ordering::AcqRel);
                    }
                    Err(err) => tracing::warn!(voice, %err, "dropped tone request"),
                }
            }
        }

        let frames = data.len() / channels;
        if mono.len() < frames {
            mono.resize(frames, 0.0);
        }
        let mono = &mut mono[..frames];
        bank.render(mono);

        data.fill(0.0);
        for (frame, sample) in data.chunks_exact_mut(channels).zip(mono.iter()) {
            frame.fill(*sample);
        }

        shared
            .sounding
            .store(bank.sounding_mask(), Ordering::Release);
    })
}
