//! Note notation parser.
//!
//! Turns a compact note string into timed note tokens.
//!
//! # Grammar
//!
//! | input | meaning |
//! |-------|---------|
//! | `A`-`G` | note; a following `#` sharpens it, `b` flattens it |
//! | `-` | rest |
//! | `^` / `v` | octave up / down for every following note (runs stack) |
//! | digits | duration multiplier for the next note or rest only |
//! | whitespace | separator, no other effect |
//!
//! Octaves run from A to G#, so `G ^A B C` is an ascending scale. Anything
//! else is reported in [`Notation::skipped`] and ignored; parsing never fails.
//!
//! ```rust
//! use chiptone_synth::{parse_notation, Pitch, PitchClass, Accidental};
//!
//! let parsed = parse_notation("G ^A B C D E F# G");
//! assert_eq!(parsed.tokens.len(), 8);
//! assert_eq!(parsed.tokens[1].octave_shift, 1);
//! assert_eq!(
//!     parsed.tokens[6].pitch,
//!     Pitch::Note { class: PitchClass::F, accidental: Accidental::Sharp }
//! );
//! assert!(parsed.skipped.is_empty());
//! ```

use alloc::vec::Vec;
use core::fmt;

use crate::pitch::{Accidental, MAX_OCTAVE, PitchClass, note_frequency};

/// Largest duration multiplier; larger values are clamped.
pub const MAX_MULTIPLIER: u32 = 64;

/// What a token sounds like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pitch {
    /// A pitched note.
    Note {
        /// Note letter.
        class: PitchClass,
        /// Sharp, flat or natural.
        accidental: Accidental,
    },
    /// Silence.
    Rest,
}

/// One parsed note or rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteToken {
    /// Note or rest.
    pub pitch: Pitch,
    /// Running octave shift (relative to the base octave) when the token was read.
    pub octave_shift: i8,
    /// Absolute octave, base octave plus shift.
    pub octave: u8,
    /// Length in base increments.
    pub multiplier: u32,
    /// Byte offset of the token in the input.
    pub position: usize,
}

impl NoteToken {
    /// Whether the token is a rest.
    pub fn is_rest(&self) -> bool {
        self.pitch == Pitch::Rest
    }

    /// Frequency in Hz, 0 for a rest.
    pub fn frequency(&self) -> u32 {
        match self.pitch {
            Pitch::Note { class, accidental } => note_frequency(class, accidental, self.octave),
            Pitch::Rest => 0,
        }
    }
}

impl fmt::Display for NoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier != 1 {
            write!(f, "{}", self.multiplier)?;
        }
        match self.pitch {
            Pitch::Note { class, accidental } => write!(f, "{class}{accidental}{}", self.octave),
            Pitch::Rest => write!(f, "-"),
        }
    }
}

/// Why part of the input was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// Character outside the grammar.
    UnknownCharacter,
    /// Multiplier of zero; the note plays with multiplier 1.
    ZeroMultiplier,
    /// Multiplier larger than [`MAX_MULTIPLIER`]; clamped.
    MultiplierTooLarge,
    /// Digits not followed by a note or rest.
    DanglingMultiplier,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::UnknownCharacter => write!(f, "unknown character"),
            MalformedReason::ZeroMultiplier => write!(f, "zero duration multiplier"),
            MalformedReason::MultiplierTooLarge => {
                write!(f, "duration multiplier above {MAX_MULTIPLIER}")
            }
            MalformedReason::DanglingMultiplier => {
                write!(f, "duration multiplier without a note")
            }
        }
    }
}

/// A piece of notation that was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MalformedNotation {
    /// Byte offset in the input.
    pub position: usize,
    /// Offending character (first digit for multiplier problems).
    pub ch: char,
    /// What was wrong.
    pub reason: MalformedReason,
}

impl fmt::Display for MalformedNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at {}", self.reason, self.ch, self.position)
    }
}

/// Result of parsing a note string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Notation {
    /// Notes and rests in playing order.
    pub tokens: Vec<NoteToken>,
    /// Everything that was ignored.
    pub skipped: Vec<MalformedNotation>,
}

impl Notation {
    /// Total length in base increments.
    pub fn total_units(&self) -> u64 {
        self.tokens.iter().map(|t| u64::from(t.multiplier)).sum()
    }
}

/// Digits read so far for the next token.
#[derive(Clone, Copy, Debug)]
struct Pending {
    position: usize,
    ch: char,
    value: u32,
}

#[derive(Clone, Copy, Debug)]
enum ParseState {
    ExpectToken,
    InDuration(Pending),
    InOctaveModifier(Option<Pending>),
}

impl ParseState {
    fn pending(self) -> Option<Pending> {
        match self {
            ParseState::ExpectToken => None,
            ParseState::InDuration(p) => Some(p),
            ParseState::InOctaveModifier(p) => p,
        }
    }
}

/// Note string parser with a configurable starting octave.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotationParser {
    base_octave: u8,
}

impl NotationParser {
    /// Create a parser whose unshifted notes sit in `base_octave`.
    pub fn new(base_octave: u8) -> Self {
        Self {
            base_octave: base_octave.min(MAX_OCTAVE),
        }
    }

    /// Octave that unshifted notes use.
    pub fn base_octave(&self) -> u8 {
        self.base_octave
    }

    /// Parse `input`. Never fails; problems land in [`Notation::skipped`].
    pub fn parse(&self, input: &str) -> Notation {
        let mut out = Notation::default();
        let mut state = ParseState::ExpectToken;
        let min_shift = -(self.base_octave as i8);
        let max_shift = (MAX_OCTAVE - self.base_octave) as i8;
        let mut shift: i8 = 0;
        let mut chars = input.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            match ch {
                '0'..='9' => {
                    let digit = ch.to_digit(10).unwrap_or(0);
                    state = match state {
                        ParseState::InDuration(mut p) => {
                            p.value = p.value.saturating_mul(10).saturating_add(digit);
                            ParseState::InDuration(p)
                        }
                        other => {
                            if let Some(p) = other.pending() {
                                skip(&mut out, p.position, p.ch, MalformedReason::DanglingMultiplier);
                            }
                            ParseState::InDuration(Pending {
                                position,
                                ch,
                                value: digit,
                            })
                        }
                    };
                }
                '^' | 'v' => {
                    shift = if ch == '^' {
                        (shift + 1).min(max_shift)
                    } else {
                        (shift - 1).max(min_shift)
                    };
                    state = ParseState::InOctaveModifier(state.pending());
                }
                'A'..='G' | '-' => {
                    let pitch = match PitchClass::from_letter(ch) {
                        Some(class) => {
                            let accidental = match chars.peek() {
                                Some((_, '#')) => Accidental::Sharp,
                                Some((_, 'b')) => Accidental::Flat,
                                _ => Accidental::Natural,
                            };
                            if accidental != Accidental::Natural {
                                chars.next();
                            }
                            Pitch::Note { class, accidental }
                        }
                        None => Pitch::Rest,
                    };
                    let multiplier = match state.pending() {
                        None => 1,
                        Some(p) if p.value == 0 => {
                            skip(&mut out, p.position, p.ch, MalformedReason::ZeroMultiplier);
                            1
                        }
                        Some(p) if p.value > MAX_MULTIPLIER => {
                            skip(&mut out, p.position, p.ch, MalformedReason::MultiplierTooLarge);
                            MAX_MULTIPLIER
                        }
                        Some(p) => p.value,
                    };
                    out.tokens.push(NoteToken {
                        pitch,
                        octave_shift: shift,
                        octave: (self.base_octave as i8 + shift) as u8,
                        multiplier,
                        position,
                    });
                    state = ParseState::ExpectToken;
                }
                c if c.is_whitespace() => {
                    if let Some(p) = state.pending() {
                        skip(&mut out, p.position, p.ch, MalformedReason::DanglingMultiplier);
                    }
                    state = ParseState::ExpectToken;
                }
                _ => skip(&mut out, position, ch, MalformedReason::UnknownCharacter),
            }
        }

        if let Some(p) = state.pending() {
            skip(&mut out, p.position, p.ch, MalformedReason::DanglingMultiplier);
        }

        out
    }
}

fn skip(out: &mut Notation, position: usize, ch: char, reason: MalformedReason) {
    let malformed = MalformedNotation {
        position,
        ch,
        reason,
    };
    #[cfg(feature = "tracing")]
    tracing::warn!(position, character = %ch, %reason, "skipping malformed notation");
    out.skipped.push(malformed);
}

/// Parse `input` with notes starting in octave 0.
pub fn parse_notation(input: &str) -> Notation {
    NotationParser::default().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn note(class: PitchClass) -> Pitch {
        Pitch::Note {
            class,
            accidental: Accidental::Natural,
        }
    }

    #[test]
    fn adjacent_letters_are_separate_tokens() {
        let parsed = parse_notation("CDE");
        assert_eq!(parsed.tokens.len(), 3);
        assert!(parsed.tokens.iter().all(|t| t.octave_shift == 0));
        assert_eq!(parsed.tokens[0].pitch, note(PitchClass::C));
        assert_eq!(parsed.tokens[2].pitch, note(PitchClass::E));
    }

    #[test]
    fn octave_shifts_stack() {
        let parsed = parse_notation("^C^D^E");
        let shifts: Vec<i8> = parsed.tokens.iter().map(|t| t.octave_shift).collect();
        assert_eq!(shifts, [1, 2, 3]);
    }

    #[test]
    fn down_shift_and_repeats() {
        let parsed = NotationParser::new(2).parse("C ^^D vvvE");
        let octaves: Vec<u8> = parsed.tokens.iter().map(|t| t.octave).collect();
        assert_eq!(octaves, [2, 4, 1]);
    }

    #[test]
    fn shift_is_clamped_to_table() {
        let parsed = parse_notation("vvC^C");
        assert_eq!(parsed.tokens[0].octave, 0);
        assert_eq!(parsed.tokens[1].octave, 1);

        let parsed = parse_notation("^^^^^^^^^^A");
        assert_eq!(parsed.tokens[0].octave, MAX_OCTAVE);
    }

    #[test]
    fn multiplier_applies_to_one_note() {
        let parsed = parse_notation("4CD");
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[0].multiplier, 4);
        assert_eq!(parsed.tokens[1].multiplier, 1);
        assert_eq!(parsed.total_units(), 5);
    }

    #[test]
    fn multi_digit_multiplier() {
        let parsed = parse_notation("12-");
        assert_eq!(parsed.tokens[0].multiplier, 12);
        assert!(parsed.tokens[0].is_rest());
    }

    #[test]
    fn multiplier_survives_octave_modifier() {
        let parsed = parse_notation("2^C");
        assert_eq!(parsed.tokens[0].multiplier, 2);
        assert_eq!(parsed.tokens[0].octave_shift, 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn accidentals() {
        let parsed = parse_notation("C#Db E");
        assert_eq!(
            parsed.tokens[0].pitch,
            Pitch::Note {
                class: PitchClass::C,
                accidental: Accidental::Sharp
            }
        );
        assert_eq!(
            parsed.tokens[1].pitch,
            Pitch::Note {
                class: PitchClass::D,
                accidental: Accidental::Flat
            }
        );
        assert_eq!(parsed.tokens.len(), 3);
    }

    #[test]
    fn rests_have_no_frequency() {
        let parsed = parse_notation("C-E");
        assert_eq!(parsed.tokens.len(), 3);
        assert!(parsed.tokens[1].is_rest());
        assert_eq!(parsed.tokens[1].frequency(), 0);
        assert!(parsed.tokens[0].frequency() > 0);
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let parsed = parse_notation("C x D!");
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].ch, 'x');
        assert_eq!(parsed.skipped[0].position, 2);
        assert_eq!(parsed.skipped[0].reason, MalformedReason::UnknownCharacter);
    }

    #[test]
    fn lower_case_letters_are_not_notes() {
        let parsed = parse_notation("cde");
        assert!(parsed.tokens.is_empty());
        assert_eq!(parsed.skipped.len(), 3);
    }

    #[test]
    fn dangling_multiplier_is_reported() {
        let parsed = parse_notation("C 3 D 5");
        assert_eq!(parsed.tokens.len(), 2);
        assert!(parsed.tokens.iter().all(|t| t.multiplier == 1));
        assert_eq!(parsed.skipped.len(), 2);
        assert!(
            parsed
                .skipped
                .iter()
                .all(|m| m.reason == MalformedReason::DanglingMultiplier)
        );
    }

    #[test]
    fn zero_and_huge_multipliers() {
        let parsed = parse_notation("0C 999D");
        assert_eq!(parsed.tokens[0].multiplier, 1);
        assert_eq!(parsed.tokens[1].multiplier, MAX_MULTIPLIER);
        assert_eq!(parsed.skipped[0].reason, MalformedReason::ZeroMultiplier);
        assert_eq!(parsed.skipped[1].reason, MalformedReason::MultiplierTooLarge);
    }

    #[test]
    fn scale_rises_across_octave_boundary() {
        let parsed = parse_notation("CDEFG^ABC");
        let freqs: Vec<u32> = parsed.tokens.iter().map(NoteToken::frequency).collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]), "{freqs:?}");
    }

    #[test]
    fn token_display() {
        let parsed = NotationParser::new(1).parse("4F# -");
        assert_eq!(parsed.tokens[0].to_string(), "4F#1");
        assert_eq!(parsed.tokens[1].to_string(), "-");
    }

    #[test]
    fn empty_input() {
        let parsed = parse_notation("   ");
        assert!(parsed.tokens.is_empty());
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.total_units(), 0);
    }
}
