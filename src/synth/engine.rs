use rtrb::Consumer;

use crate::dsp::oscillator::Oscillator;
use crate::synth::message::VoiceCommand;
use crate::synth::voice::Voice;

/// Render half of the synth: lives inside the host's audio callback.
///
/// `tick()` is the single per-sample operation the external audio graph
/// drives. It drains pending control commands, sums every voice scaled by its
/// gain, and applies the master volume. Nothing on this path blocks,
/// allocates, or takes a lock; the voices and their phase state are owned
/// exclusively here.
#[derive(Debug)]
pub struct SynthEngine {
    voices: Vec<Voice>,
    rx: Consumer<VoiceCommand>,
    volume: f32,
}

impl SynthEngine {
    pub(crate) fn new(voices: Vec<Voice>, rx: Consumer<VoiceCommand>, volume: f32) -> Self {
        Self { voices, rx, volume }
    }

    /// Append `template` to the first voice and an independent copy to each
    /// of the others. Configuration is shared; phase and callback state are
    /// not.
    pub(crate) fn add_oscillator(&mut self, template: Oscillator) {
        let copies: Vec<_> = (1..self.voices.len()).map(|_| template.copy()).collect();

        if let Some(first) = self.voices.first_mut() {
            first.push_oscillator(template);
        }
        for (voice, copy) in self.voices.iter_mut().skip(1).zip(copies) {
            voice.push_oscillator(copy);
        }
    }

    /// Arm every oscillator in every voice.
    pub(crate) fn start_all(&mut self) {
        for voice in &mut self.voices {
            voice.start();
        }
    }

    /// Master render tick: one output sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        // Apply control commands before rendering so a note's frequency is in
        // place for the first sample that hears its attack.
        while let Ok(cmd) = self.rx.pop() {
            match cmd {
                VoiceCommand::SetFrequency { voice, frequency } => {
                    if let Some(v) = self.voices.get_mut(voice) {
                        v.set_frequency(frequency);
                    }
                }
                VoiceCommand::SetVolume { volume } => {
                    self.volume = volume.clamp(0.0, 1.0);
                }
            }
        }

        let mut sample = 0.0;
        for voice in &mut self.voices {
            sample += voice.render_sample();
        }

        sample * self.volume
    }

    /// Block helper: fill `out` with consecutive ticks.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.tick();
        }
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Gain of one voice as currently visible to the render path.
    pub fn voice_gain(&self, voice: usize) -> Option<f32> {
        self.voices.get(voice).map(Voice::gain)
    }
}
