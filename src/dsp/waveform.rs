use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The shape an oscillator renders at its current phase.
///
/// Every kind except `Custom` is a pure function of phase, evaluated by
/// [`Waveform::sample`]. `Custom` defers to a per-frame callback bound on the
/// owning oscillator; the callback runs on the render path and must be
/// bounded-cost and allocation-free per call.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Custom,
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    WhiteNoise,
}

impl Waveform {
    /// Evaluate this waveform at `phase` (radians in `[0, 2π)`).
    ///
    /// `Custom` yields 0.0 here; the oscillator routes it to its callback
    /// instead of this table.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Custom => 0.0,
            Waveform::Sine => sine(phase),
            Waveform::Square => square(phase),
            Waveform::Triangle => triangle(phase),
            Waveform::SawtoothUp => sawtooth_up(phase),
            Waveform::SawtoothDown => sawtooth_down(phase),
            Waveform::WhiteNoise => white_noise(),
        }
    }
}

/// Pure tone, fundamental only.
#[inline]
pub fn sine(phase: f32) -> f32 {
    phase.sin()
}

/// High for the first half-period, low for the second.
#[inline]
pub fn square(phase: f32) -> f32 {
    if phase <= PI {
        1.0
    } else {
        -1.0
    }
}

/// Linear ramp from +1 down to -1 across the period.
#[inline]
pub fn sawtooth_up(phase: f32) -> f32 {
    1.0 - 2.0 * (phase / TAU)
}

/// Linear ramp from -1 up to +1 across the period.
#[inline]
pub fn sawtooth_down(phase: f32) -> f32 {
    2.0 * (phase / TAU) - 1.0
}

/// Fold of the sawtooth: -1 at phase 0, +1 at the half period, back to -1.
#[inline]
pub fn triangle(phase: f32) -> f32 {
    let value = (2.0 * (phase / TAU) - 1.0).abs();
    2.0 * (value - 0.5)
}

/// Uniform noise in `[-1, 1]`, independent of phase.
///
/// The owning oscillator still advances its phase so noise sources stay
/// time-aligned with pitched oscillators in the same voice.
#[inline]
pub fn white_noise() -> f32 {
    rand::random::<f32>() * 2.0 - 1.0
}
