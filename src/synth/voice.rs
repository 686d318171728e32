use crate::dsp::oscillator::Oscillator;
use crate::synth::level::SharedLevel;

/// One polyphonic slot: a group of oscillators all driven by the same note,
/// plus the gain the control domain shapes over time.
///
/// Voices never share mutable state. Each owns its oscillators (and their
/// phase) outright; the gain cell's writer half lives on the control side.
#[derive(Debug)]
pub struct Voice {
    oscillators: Vec<Oscillator>,
    level: SharedLevel,
}

impl Voice {
    pub(crate) fn new(level: SharedLevel) -> Self {
        Self {
            oscillators: Vec::new(),
            level,
        }
    }

    pub(crate) fn push_oscillator(&mut self, oscillator: Oscillator) {
        self.oscillators.push(oscillator);
    }

    /// Retune every oscillator in the group.
    pub(crate) fn set_frequency(&mut self, frequency: f32) {
        for osc in &mut self.oscillators {
            osc.set_frequency(frequency);
        }
    }

    /// Arm every oscillator in the group.
    pub(crate) fn start(&mut self) {
        for osc in &mut self.oscillators {
            osc.start();
        }
    }

    /// Sum the oscillator group and scale by the voice gain.
    ///
    /// Runs even when the gain is zero so phase keeps advancing and silent
    /// voices stay time-aligned with audible ones.
    #[inline]
    pub fn render_sample(&mut self) -> f32 {
        let gain = self.level.get();

        let mut sum = 0.0;
        for osc in &mut self.oscillators {
            sum += osc.render_sample();
        }

        sum * gain
    }

    pub fn oscillator_count(&self) -> usize {
        self.oscillators.len()
    }

    /// Gain as last written by the control domain.
    pub fn gain(&self) -> f32 {
        self.level.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_scales_the_oscillator_sum() {
        let level = SharedLevel::new(0.5);
        let mut voice = Voice::new(level.clone());

        let mut osc = Oscillator::square(48_000.0);
        osc.start();
        voice.push_oscillator(osc);

        // Square at phase 0 is 1.0, scaled by the 0.5 gain.
        let s = voice.render_sample();
        assert!((s - 0.5).abs() < 1e-6, "expected 0.5, got {s}");
    }

    #[test]
    fn zero_gain_still_advances_phase() {
        let level = SharedLevel::new(0.0);
        let mut voice = Voice::new(level.clone());

        let mut osc = Oscillator::sine(8.0).with_frequency(1.0);
        osc.start();
        voice.push_oscillator(osc);

        // Render a few samples at zero gain, then open the gain: the phase
        // must have moved on rather than restarting at zero.
        for _ in 0..3 {
            assert_eq!(voice.render_sample(), 0.0);
        }
        level.set(1.0);
        let s = voice.render_sample();
        let expected = (std::f32::consts::TAU * 3.0 / 8.0).sin();
        assert!((s - expected).abs() < 1e-5, "expected {expected}, got {s}");
    }

    #[test]
    fn sums_multiple_oscillators() {
        let mut voice = Voice::new(SharedLevel::new(1.0));
        for _ in 0..3 {
            let mut osc = Oscillator::square(48_000.0).with_amplitude(0.2);
            osc.start();
            voice.push_oscillator(osc);
        }

        let s = voice.render_sample();
        assert!((s - 0.6).abs() < 1e-6, "expected 0.6, got {s}");
    }
}
