//! Sweep effects applied to a playing tone.
//!
//! An effect produces an *offset* that changes as the tone plays. The voice
//! uses the offset as a gate window length: the square wave is muted on every
//! other window, so a large offset gives a slow chop ("galloping") and a small
//! one a fast buzz ("helicopter"). Sweeping the offset over time gives the
//! laser, alert and flying-saucer sounds.
//!
//! Time is measured in *sweep steps*. The engine decides how long a step is
//! (10 ms by default); the effect moves `1 / STEPS_PER_LEVEL` of a level unit
//! per step. A finite tone too short for its `Up` or `Down` sweep at that
//! speed gets the sweep squeezed so it lands on its target by the last tick
//! (see [`sweep_at`]).
//!
//! ```text
//!  Up        Down      Bounce (low..level)
//!     ____   ____        /\    /\
//!    /           \      /  \  /  \
//!   /             \____/    \/    \
//! ```

use crate::error::ToneError;

/// Largest accepted effect level or low bound.
pub const MAX_EFFECT_LEVEL: u32 = 16000;

/// Sweep steps needed to move the offset by one level unit.
///
/// Together with the engine's step length this sets sweep speed: a level-6
/// `Up` effect reaches its peak after `6 * 8` steps.
pub const STEPS_PER_LEVEL: u32 = 8;

/// Flat effect selector.
///
/// This is the caller-facing form (an effect type plus separate level and low
/// values). Convert it with [`Effect::from_kind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Straight tone.
    #[default]
    None,
    /// Constant offset.
    Fixed,
    /// Offset rises to the level and holds.
    Up,
    /// Offset falls from the level to zero and holds.
    Down,
    /// Offset bounces between a low bound and the level.
    Bounce,
}

impl TryFrom<u8> for EffectKind {
    type Error = ToneError;

    /// Numeric effect codes: 0 none, 1 fixed, 2 up, 3 down, 4 bounce.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EffectKind::None),
            1 => Ok(EffectKind::Fixed),
            2 => Ok(EffectKind::Up),
            3 => Ok(EffectKind::Down),
            4 => Ok(EffectKind::Bounce),
            _ => Err(ToneError::InvalidParameter {
                name: "effect",
                value: u32::from(code),
                min: 0,
                max: 4,
            }),
        }
    }
}

/// Effect descriptor carried by a tone request.
///
/// Each variant holds only the fields it uses; `low` exists on `Bounce` only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Effect {
    /// No modulation.
    #[default]
    None,
    /// Constant offset of `level`.
    Fixed {
        /// Offset for the whole tone.
        level: u32,
    },
    /// Rises from 0 to `level`, then holds.
    Up {
        /// Peak offset.
        level: u32,
    },
    /// Falls from `level` to 0, then holds.
    Down {
        /// Starting offset.
        level: u32,
    },
    /// Triangle between `low` and `level`, starting at `level`.
    Bounce {
        /// Upper bound.
        level: u32,
        /// Lower bound.
        low: u32,
    },
}

impl Effect {
    /// Build an effect from the flat caller form.
    ///
    /// `low` is dropped for every kind except [`EffectKind::Bounce`], and both
    /// values are dropped for [`EffectKind::None`].
    pub fn from_kind(kind: EffectKind, level: u32, low: u32) -> Self {
        match kind {
            EffectKind::None => Effect::None,
            EffectKind::Fixed => Effect::Fixed { level },
            EffectKind::Up => Effect::Up { level },
            EffectKind::Down => Effect::Down { level },
            EffectKind::Bounce => Effect::Bounce { level, low },
        }
    }

    /// The flat kind of this effect.
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::None => EffectKind::None,
            Effect::Fixed { .. } => EffectKind::Fixed,
            Effect::Up { .. } => EffectKind::Up,
            Effect::Down { .. } => EffectKind::Down,
            Effect::Bounce { .. } => EffectKind::Bounce,
        }
    }

    /// Effect level (0 for [`Effect::None`]).
    pub fn level(&self) -> u32 {
        match *self {
            Effect::None => 0,
            Effect::Fixed { level }
            | Effect::Up { level }
            | Effect::Down { level }
            | Effect::Bounce { level, .. } => level,
        }
    }

    /// Bounce low bound (0 for every other variant).
    pub fn low(&self) -> u32 {
        match *self {
            Effect::Bounce { low, .. } => low,
            _ => 0,
        }
    }

    /// Whether the effect changes the tone at all.
    pub fn is_active(&self) -> bool {
        !matches!(self, Effect::None) && self.level() > 0
    }

    /// Reject levels outside `0..=MAX_EFFECT_LEVEL`.
    pub fn validate(&self) -> Result<(), ToneError> {
        ToneError::check_range("effect_level", self.level(), 0, MAX_EFFECT_LEVEL)?;
        ToneError::check_range("effect_low", self.low(), 0, MAX_EFFECT_LEVEL)
    }
}

/// Offset of `effect` after `elapsed_steps` sweep steps, in level units.
///
/// - `None`: always 0
/// - `Fixed`: always `level`
/// - `Up`: rises linearly to `level` and holds there
/// - `Down`: falls linearly from `level` to 0 and holds there
/// - `Bounce`: triangle wave in `[low, level]`; the period is
///   `2 * (level - low) * STEPS_PER_LEVEL` steps, so a narrower range bounces
///   faster. A `low` above `level` is treated as `level`.
///
/// A level of 0 turns every sweeping effect into `None`.
pub fn modulate(effect: Effect, elapsed_steps: u32) -> f32 {
    let per_level = STEPS_PER_LEVEL as f32;
    match effect {
        Effect::None => 0.0,
        Effect::Fixed { level } => level as f32,
        Effect::Up { level } => (elapsed_steps as f32 / per_level).min(level as f32),
        Effect::Down { level } => (level as f32 - elapsed_steps as f32 / per_level).max(0.0),
        Effect::Bounce { level, low } => {
            if level == 0 {
                return 0.0;
            }
            let low = low.min(level);
            let half = (level - low) * STEPS_PER_LEVEL;
            if half == 0 {
                return level as f32;
            }
            let pos = elapsed_steps % (2 * half);
            if pos <= half {
                level as f32 - pos as f32 / per_level
            } else {
                low as f32 + (pos - half) as f32 / per_level
            }
        }
    }
}

/// Offset of an `Up` or `Down` sweep that has covered `progress` of its run.
///
/// `progress` is clamped to `[0, 1]`. Voices use this for finite tones that
/// end before the sweep would finish at its normal speed, so the sweep is
/// squeezed into the tone. Returns `None` for effects that do not settle.
pub fn sweep_at(effect: Effect, progress: f32) -> Option<f32> {
    let progress = progress.clamp(0.0, 1.0);
    match effect {
        Effect::Up { level } => Some(level as f32 * progress),
        Effect::Down { level } => Some(level as f32 * (1.0 - progress)),
        _ => None,
    }
}

/// Steps an `Up` or `Down` sweep takes to settle at its normal speed.
pub fn sweep_steps(effect: Effect) -> Option<u64> {
    match effect {
        Effect::Up { level } | Effect::Down { level } => {
            Some(u64::from(level) * u64::from(STEPS_PER_LEVEL))
        }
        _ => None,
    }
}
