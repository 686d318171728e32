//! Note-frequency tables and scale definitions.
//!
//! Pure data feeding `play_note`: twelve-tone equal temperament around a
//! configurable reference pitch, plus a few scale shapes with key
//! transposition. Semitone 9 of octave 4 is the reference note (A4).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reference pitch the whole table is tuned around.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyRoot {
    /// Concert pitch, A4 = 440 Hz.
    #[default]
    Standard,
    /// A4 = 432 Hz.
    Magic,
    /// Scientific pitch, A4 ≈ 430.54 Hz.
    Scientific,
}

impl FrequencyRoot {
    pub fn hz(self) -> f32 {
        match self {
            FrequencyRoot::Standard => 440.0,
            FrequencyRoot::Magic => 432.0,
            FrequencyRoot::Scientific => 430.54,
        }
    }
}

pub const SEMITONES_PER_OCTAVE: usize = 12;

/// Frequency of one note in equal temperament.
///
/// `octave` counts from 0, `semitone` from 0 (C) to 11 (B). The offset of
/// -57 semitones places A4 (octave 4, semitone 9) exactly on the root pitch.
pub fn note_frequency(octave: i32, semitone: usize, root: FrequencyRoot) -> f32 {
    let offset = semitone as f32 - 57.0 + octave as f32 * 12.0;
    root.hz() * 2f32.powf(offset / 12.0)
}

/// Frequencies for every semitone of `start_octave ..= end_octave`, one inner
/// vec per octave.
pub fn note_table(start_octave: i32, end_octave: i32, root: FrequencyRoot) -> Vec<Vec<f32>> {
    (start_octave..=end_octave)
        .map(|octave| {
            (0..SEMITONES_PER_OCTAVE)
                .map(|semitone| note_frequency(octave, semitone, root))
                .collect()
        })
        .collect()
}

/// A scale shape: semitone degrees relative to its key root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub name: &'static str,
    pub degrees: &'static [usize],
}

pub const CHROMATIC: Scale = Scale {
    name: "Chromatic",
    degrees: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

pub const MAJOR: Scale = Scale {
    name: "Major",
    degrees: &[0, 2, 4, 5, 7, 9, 11],
};

pub const MINOR: Scale = Scale {
    name: "Minor",
    degrees: &[0, 2, 3, 5, 7, 8, 10],
};

impl Scale {
    /// Semitones of this scale transposed into `key` (0 = C .. 11 = B),
    /// folded back into a single octave.
    pub fn in_key(&self, key: usize) -> Vec<usize> {
        self.degrees
            .iter()
            .map(|degree| (degree + key) % SEMITONES_PER_OCTAVE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_the_reference_pitch() {
        let a4 = note_frequency(4, 9, FrequencyRoot::Standard);
        assert!((a4 - 440.0).abs() < 1e-3, "A4 should be 440 Hz, got {a4}");

        let a4 = note_frequency(4, 9, FrequencyRoot::Magic);
        assert!((a4 - 432.0).abs() < 1e-3, "A4 should be 432 Hz, got {a4}");
    }

    #[test]
    fn octaves_double_frequency() {
        let a4 = note_frequency(4, 9, FrequencyRoot::Standard);
        let a5 = note_frequency(5, 9, FrequencyRoot::Standard);
        assert!((a5 / a4 - 2.0).abs() < 1e-4);
    }

    #[test]
    fn middle_c_frequency() {
        let c4 = note_frequency(4, 0, FrequencyRoot::Standard);
        assert!((c4 - 261.63).abs() < 0.01, "C4 should be ~261.63 Hz, got {c4}");
    }

    #[test]
    fn table_covers_requested_octaves() {
        let table = note_table(0, 8, FrequencyRoot::Standard);
        assert_eq!(table.len(), 9);
        assert!(table.iter().all(|o| o.len() == SEMITONES_PER_OCTAVE));
        assert!((table[4][9] - 440.0).abs() < 1e-3);
    }

    #[test]
    fn scales_transpose_modulo_octave() {
        // A minor: A B C D E F G
        let a_minor = MINOR.in_key(9);
        assert_eq!(a_minor, vec![9, 11, 0, 2, 4, 5, 7]);

        let c_major = MAJOR.in_key(0);
        assert_eq!(c_major, vec![0, 2, 4, 5, 7, 9, 11]);
    }
}
