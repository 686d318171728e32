use std::f32::consts::TAU;

/// Monotonic phase accumulator for one oscillator.
///
/// Advances by a fixed increment per sample and wraps into `[0, 2π)`. The
/// increment is derived from sample rate and frequency and must be recomputed
/// whenever either changes. One wrap correction per direction per call is
/// sufficient: `|increment| < 2π` holds for every audible frequency at any
/// realistic sample rate.
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    phase: f32,
    increment: f32,
}

impl PhaseAccumulator {
    /// A silent accumulator: zero increment until `set_increment` is called.
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
        }
    }

    /// Accumulator tuned for `frequency` at `sample_rate`, starting at phase 0.
    pub fn from_frequency(sample_rate: f32, frequency: f32) -> Self {
        Self {
            phase: 0.0,
            increment: Self::increment_for(sample_rate, frequency),
        }
    }

    /// Per-sample phase step for `frequency` at `sample_rate`.
    #[inline]
    pub fn increment_for(sample_rate: f32, frequency: f32) -> f32 {
        (TAU / sample_rate) * frequency
    }

    /// Retune the accumulator. Takes effect on the next `advance`.
    pub fn set_increment(&mut self, sample_rate: f32, frequency: f32) {
        self.increment = Self::increment_for(sample_rate, frequency);
    }

    /// Current phase in `[0, 2π)`. Does not mutate.
    #[inline]
    pub fn value(&self) -> f32 {
        self.phase
    }

    /// Step the phase by one sample and re-wrap.
    ///
    /// Callers must read `value()` for the current sample *before* advancing;
    /// sample N sees the phase before increment N is applied.
    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.increment;

        if self.phase >= TAU {
            self.phase -= TAU;
        }

        if self.phase < 0.0 {
            self.phase += TAU;
        }
    }
}

impl Default for PhaseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
