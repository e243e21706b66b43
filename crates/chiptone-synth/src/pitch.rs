//! Equal-tempered pitch table.
//!
//! Octaves in the note notation run from A up to G#, so an ascending scale
//! `G ^A B C` crosses the octave boundary between G and A. Octave 0 starts at
//! A = 55 Hz; octave 3 holds A = 440 Hz.
//!
//! Frequencies are rounded to whole hertz, which is what voices accept.

use core::fmt;

/// Frequency of A in octave 0.
const OCTAVE_ZERO_A_HZ: f32 = 55.0;

/// Highest octave in the table (A = 7040 Hz).
pub const MAX_OCTAVE: u8 = 7;

/// Note letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchClass {
    /// A
    A,
    /// B
    B,
    /// C
    C,
    /// D
    D,
    /// E
    E,
    /// F
    F,
    /// G
    G,
}

impl PitchClass {
    /// Parse an upper-case note letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(PitchClass::A),
            'B' => Some(PitchClass::B),
            'C' => Some(PitchClass::C),
            'D' => Some(PitchClass::D),
            'E' => Some(PitchClass::E),
            'F' => Some(PitchClass::F),
            'G' => Some(PitchClass::G),
            _ => None,
        }
    }

    /// Semitones above A within the same notation octave.
    pub fn semitones_from_a(self) -> i32 {
        match self {
            PitchClass::A => 0,
            PitchClass::B => 2,
            PitchClass::C => 3,
            PitchClass::D => 5,
            PitchClass::E => 7,
            PitchClass::F => 8,
            PitchClass::G => 10,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            PitchClass::A => 'A',
            PitchClass::B => 'B',
            PitchClass::C => 'C',
            PitchClass::D => 'D',
            PitchClass::E => 'E',
            PitchClass::F => 'F',
            PitchClass::G => 'G',
        };
        write!(f, "{letter}")
    }
}

/// Sharp, flat or natural.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Accidental {
    /// One semitone down (`b`).
    Flat,
    /// No alteration.
    #[default]
    Natural,
    /// One semitone up (`#`).
    Sharp,
}

impl Accidental {
    /// Semitone adjustment.
    pub fn offset(self) -> i32 {
        match self {
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
        }
    }
}

impl fmt::Display for Accidental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accidental::Flat => write!(f, "b"),
            Accidental::Natural => Ok(()),
            Accidental::Sharp => write!(f, "#"),
        }
    }
}

/// Frequency in whole hertz of a note in the given notation octave.
///
/// Octaves above [`MAX_OCTAVE`] are clamped.
///
/// ```rust
/// use chiptone_synth::{note_frequency, Accidental, PitchClass};
///
/// assert_eq!(note_frequency(PitchClass::A, Accidental::Natural, 3), 440);
/// assert_eq!(note_frequency(PitchClass::C, Accidental::Natural, 2), 262);
/// ```
pub fn note_frequency(class: PitchClass, accidental: Accidental, octave: u8) -> u32 {
    let octave = octave.min(MAX_OCTAVE);
    let semitones = i32::from(octave) * 12 + class.semitones_from_a() + accidental.offset();
    let hz = OCTAVE_ZERO_A_HZ * libm::powf(2.0, semitones as f32 / 12.0);
    libm::roundf(hz) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATURALS: [PitchClass; 7] = [
        PitchClass::A,
        PitchClass::B,
        PitchClass::C,
        PitchClass::D,
        PitchClass::E,
        PitchClass::F,
        PitchClass::G,
    ];

    fn naturals(octave: u8) -> [u32; 7] {
        NATURALS.map(|c| note_frequency(c, Accidental::Natural, octave))
    }

    #[test]
    fn octave_zero_naturals() {
        assert_eq!(naturals(0), [55, 62, 65, 73, 82, 87, 98]);
    }

    #[test]
    fn octave_three_naturals() {
        assert_eq!(naturals(3), [440, 494, 523, 587, 659, 698, 784]);
    }

    #[test]
    fn sharps_and_flats() {
        assert_eq!(note_frequency(PitchClass::F, Accidental::Sharp, 3), 740);
        assert_eq!(note_frequency(PitchClass::A, Accidental::Sharp, 0), 58);
        assert_eq!(note_frequency(PitchClass::A, Accidental::Flat, 0), 52);
        assert_eq!(note_frequency(PitchClass::E, Accidental::Flat, 2), 311);
    }

    #[test]
    fn octaves_double() {
        for octave in 0..MAX_OCTAVE {
            let low = note_frequency(PitchClass::A, Accidental::Natural, octave);
            let high = note_frequency(PitchClass::A, Accidental::Natural, octave + 1);
            assert_eq!(high, low * 2);
        }
    }

    #[test]
    fn octave_is_clamped() {
        assert_eq!(
            note_frequency(PitchClass::A, Accidental::Natural, 200),
            note_frequency(PitchClass::A, Accidental::Natural, MAX_OCTAVE)
        );
    }

    #[test]
    fn display_letters() {
        use alloc::format;
        assert_eq!(format!("{}{}", PitchClass::F, Accidental::Sharp), "F#");
        assert_eq!(format!("{}{}", PitchClass::B, Accidental::Flat), "Bb");
        assert_eq!(format!("{}{}", PitchClass::C, Accidental::Natural), "C");
    }
}
