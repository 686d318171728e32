use std::fmt;
use std::sync::Arc;

use crate::dsp::phase::PhaseAccumulator;
use crate::dsp::waveform::Waveform;

/*
Oscillator
==========

One oscillator owns one phase accumulator and renders one sample per call.
Per-sample order matters and is fixed:

    1. read the current phase
    2. evaluate the waveform (or the bound custom callback) at that phase
    3. scale by amplitude
    4. advance the phase

so sample N always sees the phase *before* increment N is applied.

Voices are populated from a template: `copy()` produces an independent
instance with the same waveform/amplitude/frequency but a fresh phase and no
bound callback. Custom oscillators therefore carry a callback *factory*
rather than a callback: every copy binds its own closure when it is armed,
and no phase or callback state is ever shared between voices.

`render_sample` is the hot-path operation. It must not allocate, lock, or
call into the control-rate domain, and an unarmed oscillator renders
silence (a source that was never attached to anything).
*/

/// Per-frame render callback: phase in, sample out.
///
/// May be stateful (wavetable position, etc.) but must be bounded-cost and
/// allocation-free per call; it runs on the audio thread.
pub type FrameFn = Box<dyn FnMut(f32) -> f32 + Send>;

/// Factory producing a fresh [`FrameFn`] for each armed oscillator instance.
pub type FrameFactory = Arc<dyn Fn() -> FrameFn + Send + Sync>;

pub struct Oscillator {
    phase: PhaseAccumulator,
    waveform: Waveform,
    amplitude: f32,
    frequency: f32,
    sample_rate: f32,
    started: bool,
    factory: Option<FrameFactory>,
    frame: Option<FrameFn>,
}

impl Oscillator {
    /// Oscillator with the given waveform, tuned to 440 Hz at unit amplitude.
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        let frequency = 440.0;
        Self {
            phase: PhaseAccumulator::from_frequency(sample_rate, frequency),
            waveform,
            amplitude: 1.0,
            frequency,
            sample_rate,
            started: false,
            factory: None,
            frame: None,
        }
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Sine)
    }

    pub fn square(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Square)
    }

    pub fn triangle(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Triangle)
    }

    pub fn sawtooth_up(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::SawtoothUp)
    }

    pub fn sawtooth_down(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::SawtoothDown)
    }

    pub fn white_noise(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::WhiteNoise)
    }

    /// Custom oscillator deferring each frame to a caller-supplied function.
    ///
    /// The factory is invoked once per armed instance, so every voice copy
    /// gets its own independent callback state.
    pub fn custom<F>(sample_rate: f32, factory: F) -> Self
    where
        F: Fn() -> FrameFn + Send + Sync + 'static,
    {
        let mut osc = Self::new(sample_rate, Waveform::Custom);
        osc.factory = Some(Arc::new(factory));
        osc
    }

    /// Builder touch: set the base frequency.
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.set_frequency(frequency);
        self
    }

    /// Builder touch: set the amplitude (clamped into `[0, 1]`).
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.set_amplitude(amplitude);
        self
    }

    /// Retune the oscillator.
    ///
    /// The owned phase increment is recomputed immediately; no smoothing or
    /// interpolation is applied, so the change lands on the next sample (a
    /// phase-slope discontinuity is accepted).
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase.set_increment(self.sample_rate, frequency);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.clamp(0.0, 1.0);
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Arm the oscillator for rendering.
    ///
    /// For `Custom` waveforms this binds a fresh frame callback from the
    /// factory. Calling `start` again re-arms and re-binds; a rebind is cheap
    /// and keeps this usable as "(re)arm this oscillator".
    pub fn start(&mut self) {
        if let Some(factory) = &self.factory {
            self.frame = Some(factory());
        }
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Render one sample: waveform at the current phase times amplitude.
    ///
    /// Unarmed oscillators are silent. Voice-level gain is applied by the
    /// owning voice, not here.
    #[inline]
    pub fn render_sample(&mut self) -> f32 {
        if !self.started {
            return 0.0;
        }

        let phase = self.phase.value();

        let value = match self.waveform {
            Waveform::Custom => match self.frame.as_mut() {
                Some(frame) => frame(phase),
                None => 0.0,
            },
            kind => kind.sample(phase),
        };

        self.phase.advance();

        value * self.amplitude
    }

    /// Independent copy for populating another voice.
    ///
    /// Same waveform/amplitude/frequency configuration; fresh phase at zero,
    /// unarmed, no bound callback. Custom copies share the factory and bind
    /// their own callback at `start`.
    pub fn copy(&self) -> Self {
        Self {
            phase: PhaseAccumulator::from_frequency(self.sample_rate, self.frequency),
            waveform: self.waveform,
            amplitude: self.amplitude,
            frequency: self.frequency,
            sample_rate: self.sample_rate,
            started: false,
            factory: self.factory.clone(),
            frame: None,
        }
    }
}

impl fmt::Debug for Oscillator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oscillator")
            .field("waveform", &self.waveform)
            .field("frequency", &self.frequency)
            .field("amplitude", &self.amplitude)
            .field("sample_rate", &self.sample_rate)
            .field("started", &self.started)
            .field("custom", &self.factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn renders_expected_sine_samples() {
        let sample_rate = 48_000.0;
        let mut osc = Oscillator::sine(sample_rate).with_frequency(440.0);
        osc.start();

        // First call sees phase 0, second call sees one increment.
        let first = osc.render_sample();
        assert!(first.abs() < 1e-7, "expected sin(0), got {first}");

        let second = osc.render_sample();
        let expected = (TAU * 440.0 / sample_rate).sin();
        assert!(
            (second - expected).abs() < 1e-6,
            "expected {expected}, got {second}"
        );
    }

    #[test]
    fn unarmed_oscillator_is_silent() {
        let mut osc = Oscillator::sine(48_000.0);
        for _ in 0..16 {
            assert_eq!(osc.render_sample(), 0.0);
        }
    }

    #[test]
    fn amplitude_scales_output() {
        let mut osc = Oscillator::square(48_000.0).with_amplitude(0.25);
        osc.start();
        let s = osc.render_sample();
        assert!((s - 0.25).abs() < 1e-6, "expected 0.25, got {s}");
    }

    #[test]
    fn amplitude_clamps_to_unit_range() {
        let osc = Oscillator::sine(48_000.0).with_amplitude(3.0);
        assert_eq!(osc.amplitude(), 1.0);
        let osc = Oscillator::sine(48_000.0).with_amplitude(-1.0);
        assert_eq!(osc.amplitude(), 0.0);
    }

    #[test]
    fn set_frequency_takes_effect_next_sample() {
        let sample_rate = 48_000.0;
        let mut osc = Oscillator::sine(sample_rate).with_frequency(440.0);
        osc.start();

        osc.render_sample();
        osc.set_frequency(880.0);
        osc.render_sample(); // sees phase from the 440 Hz increment
        let third = osc.render_sample();

        let expected = ((TAU * 440.0 / sample_rate) + (TAU * 880.0 / sample_rate)).sin();
        assert!(
            (third - expected).abs() < 1e-6,
            "expected {expected}, got {third}"
        );
    }

    #[test]
    fn copy_is_independent() {
        let mut original = Oscillator::sine(48_000.0).with_frequency(220.0);
        original.start();
        original.render_sample();
        original.render_sample();

        let mut copied = original.copy();
        assert!(!copied.is_started());
        assert_eq!(copied.frequency(), 220.0);

        // Copy starts from phase zero regardless of the original's position.
        copied.start();
        let first = copied.render_sample();
        assert!(first.abs() < 1e-7, "copy should start at phase 0, got {first}");
    }

    #[test]
    fn custom_copies_bind_independent_callbacks() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let bindings = Arc::new(AtomicUsize::new(0));
        let counter = bindings.clone();
        let mut template = Oscillator::custom(48_000.0, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut calls = 0u32;
            Box::new(move |_phase| {
                calls += 1;
                calls as f32 * 0.1
            })
        });

        let mut copy = template.copy();
        template.start();
        copy.start();
        assert_eq!(bindings.load(Ordering::SeqCst), 2);

        // Each instance advances its own callback state.
        assert!((template.render_sample() - 0.1).abs() < 1e-6);
        assert!((template.render_sample() - 0.2).abs() < 1e-6);
        assert!((copy.render_sample() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn restart_rebinds_custom_callback() {
        let mut osc = Oscillator::custom(48_000.0, || {
            let mut calls = 0u32;
            Box::new(move |_phase| {
                calls += 1;
                calls as f32
            })
        });

        osc.start();
        osc.render_sample();
        osc.render_sample();

        // Re-arming resets the callback state through a fresh binding.
        osc.start();
        assert!((osc.render_sample() - 1.0).abs() < 1e-6);
    }
}
