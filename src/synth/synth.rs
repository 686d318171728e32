use std::time::Duration;

use rtrb::{Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Oscillator;
use crate::engine::allocator::RoundRobin;
use crate::engine::envelope::{
    step_gain, EnvelopeParams, EnvelopeStage, TimingPolicy, FADE_STEPS,
};
use crate::engine::scheduler::{ControlEvent, ControlQueue};
use crate::error::SynthError;
use crate::synth::engine::SynthEngine;
use crate::synth::level::SharedLevel;
use crate::synth::message::VoiceCommand;
use crate::synth::voice::Voice;

/*
Note Lifecycle and Cancellation
===============================

Every note-on bumps the target voice's play token and captures the new value
into the envelope events it schedules. Each event re-checks the token when it
fires:

    play_note ──► token += 1 ──► Attack fade (token captured)
                                    │ step fires: token still current? apply
                                    │            token changed?       drop
                                    ▼
                                 Decay ──► Sustain hold ──► Release ──► Idle

The token comparison is the *only* cancellation mechanism. Nothing is ever
removed from the timer queue; a superseded envelope simply stops propagating
the first time one of its events fires against a newer token. Retriggering a
voice mid-envelope therefore produces a single clean contour for the new note
rather than a blend of two.

Tokens are bumped, read, and compared exclusively on the control side, so they
need no synchronization. The gain they guard crosses domains through one
atomic cell per voice.
*/

const COMMAND_QUEUE_SIZE: usize = 256;

/// Fixed configuration for a synth and its voice pool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    pub sample_rate: f32,
    /// Number of voices, fixed at construction.
    pub polyphony: usize,
    pub bpm: f32,
    /// Master output level in `[0, 1]`.
    pub volume: f32,
    pub envelope: EnvelopeParams,
    pub timing: TimingPolicy,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            polyphony: 1,
            bpm: 90.0,
            volume: 1.0,
            envelope: EnvelopeParams::default(),
            timing: TimingPolicy::default(),
        }
    }
}

/// Control half of the synth.
///
/// Lives on the host's control thread: allocates notes across the voice pool,
/// drives envelope fades on the cooperative timer queue, and owns the writer
/// ends of the per-voice gain cells. The render half is built alongside and
/// handed out once through [`Synth::connect`].
pub struct Synth {
    config: SynthConfig,
    allocator: RoundRobin,
    tokens: Vec<u64>,
    stages: Vec<EnvelopeStage>,
    levels: Vec<SharedLevel>,
    queue: ControlQueue,
    tx: Producer<VoiceCommand>,
    engine: Option<SynthEngine>,
    started: bool,
    enabled: bool,
    stopped: bool,
}

impl Synth {
    /// Build a synth and its render half from `config`.
    ///
    /// All voices exist from here on; playback never allocates voice state.
    /// Out-of-range configuration is clamped rather than rejected.
    pub fn new(config: SynthConfig) -> Self {
        let polyphony = config.polyphony.max(1);
        let bpm = if config.bpm > 0.0 {
            config.bpm
        } else {
            tracing::warn!(bpm = config.bpm, "non-positive bpm, falling back to 90");
            90.0
        };
        let config = SynthConfig {
            polyphony,
            bpm,
            volume: config.volume.clamp(0.0, 1.0),
            envelope: config.envelope.clamped(),
            ..config
        };

        let (tx, rx) = RingBuffer::new(COMMAND_QUEUE_SIZE);
        let levels: Vec<SharedLevel> = (0..polyphony).map(|_| SharedLevel::new(0.0)).collect();
        let voices: Vec<Voice> = levels.iter().map(|level| Voice::new(level.clone())).collect();

        Self {
            allocator: RoundRobin::new(polyphony),
            tokens: vec![0; polyphony],
            stages: vec![EnvelopeStage::Idle; polyphony],
            levels,
            queue: ControlQueue::new(),
            tx,
            engine: Some(SynthEngine::new(voices, rx, config.volume)),
            started: false,
            enabled: true,
            stopped: false,
            config,
        }
    }

    /// Add an oscillator to every voice.
    ///
    /// The first voice takes `template` itself; every other voice gets an
    /// independent [`Oscillator::copy`]. Must happen before [`Synth::connect`]
    /// moves the voices into the render half; afterwards this is a traced
    /// no-op.
    pub fn add_oscillator(&mut self, template: Oscillator) {
        match &mut self.engine {
            Some(engine) => engine.add_oscillator(template),
            None => tracing::warn!("oscillator added after connect; ignored"),
        }
    }

    /// Arm the synth: starts every oscillator in every voice.
    ///
    /// Idempotent; calling again re-arms, which rebinds custom frame
    /// callbacks.
    pub fn start(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.start_all();
        }
        self.started = true;
    }

    /// Hand the render half to the audio host.
    ///
    /// Fails with [`SynthError::NotStarted`] before [`Synth::start`], and with
    /// [`SynthError::AlreadyConnected`] on a second call: the render half
    /// moves into the audio callback and cannot be rewired afterwards.
    pub fn connect(&mut self) -> Result<SynthEngine, SynthError> {
        if !self.started {
            return Err(SynthError::NotStarted);
        }
        self.engine.take().ok_or(SynthError::AlreadyConnected)
    }

    /// Trigger a note at `frequency` on the next round-robin voice.
    ///
    /// Returns the chosen voice index, or `None` when the synth is disabled
    /// or stopped. The new note supersedes whatever envelope the voice was
    /// running; there is no stealing policy beyond strict rotation.
    pub fn play_note(&mut self, frequency: f32) -> Option<usize> {
        if !self.enabled || self.stopped {
            return None;
        }

        let voice = self.allocator.next();
        self.tokens[voice] = next_token(self.tokens[voice]);
        let token = self.tokens[voice];

        if self
            .tx
            .push(VoiceCommand::SetFrequency { voice, frequency })
            .is_err()
        {
            tracing::warn!(voice, frequency, "command ring full; retune dropped");
        }

        if self.config.envelope.reset_gain_on_trigger {
            self.levels[voice].set(0.0);
        }

        tracing::debug!(voice, frequency, token, "note on");

        let from = self.levels[voice].get();
        self.begin_fade(
            voice,
            token,
            EnvelopeStage::Attack,
            from,
            1.0,
            self.config.envelope.attack,
        );

        Some(voice)
    }

    /// Advance the control clock and fire every envelope event that has come
    /// due. The host calls this periodically; resolution only affects how
    /// finely fades are quantized, never their endpoints.
    pub fn advance(&mut self, elapsed: Duration) {
        self.queue.advance(elapsed);
        while let Some(event) = self.queue.pop_due() {
            self.dispatch(event);
        }
    }

    /// Prevent new notes. In-flight envelopes keep running to completion.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        if bpm > 0.0 {
            self.config.bpm = bpm;
        } else {
            tracing::warn!(bpm, "ignoring non-positive bpm");
        }
    }

    pub fn bpm(&self) -> f32 {
        self.config.bpm
    }

    /// Master volume, forwarded to the render half.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.config.volume = volume;
        if self.tx.push(VoiceCommand::SetVolume { volume }).is_err() {
            tracing::warn!(volume, "command ring full; volume change dropped");
        }
    }

    /// Replace the envelope contour. Applies from the next stage transition.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.config.envelope = params.clamped();
    }

    pub fn envelope(&self) -> EnvelopeParams {
        self.config.envelope
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn polyphony(&self) -> usize {
        self.allocator.voices()
    }

    /// Gain of one voice as last written by the envelope machinery.
    pub fn gain(&self, voice: usize) -> Option<f32> {
        self.levels.get(voice).map(SharedLevel::get)
    }

    /// Envelope stage one voice currently sits in.
    pub fn stage(&self, voice: usize) -> Option<EnvelopeStage> {
        self.stages.get(voice).copied()
    }

    /// Number of events waiting on the control queue.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    fn dispatch(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::FadeStep {
                voice,
                token,
                stage,
                step,
                from,
                to,
                base,
                step_time,
            } => {
                if token != self.tokens[voice] {
                    // A newer note owns this voice; the stale chain ends here.
                    return;
                }

                let gain = if step == FADE_STEPS {
                    to
                } else {
                    step_gain(from, to, step, FADE_STEPS)
                };
                self.levels[voice].set(gain);

                if step == FADE_STEPS {
                    self.complete_stage(voice, token, stage);
                } else {
                    let next = step + 1;
                    self.queue.schedule_at(
                        base + step_time * next,
                        ControlEvent::FadeStep {
                            voice,
                            token,
                            stage,
                            step: next,
                            from,
                            to,
                            base,
                            step_time,
                        },
                    );
                }
            }
            ControlEvent::SustainEnd { voice, token } => {
                if token != self.tokens[voice] {
                    return;
                }
                self.enter_release(voice, token);
            }
        }
    }

    /// Start a gain ramp for `voice`, or short-circuit it when the duration
    /// resolves to nothing.
    fn begin_fade(
        &mut self,
        voice: usize,
        token: u64,
        stage: EnvelopeStage,
        from: f32,
        to: f32,
        duration: f32,
    ) {
        self.stages[voice] = stage;

        let seconds = self.config.timing.to_seconds(duration, self.config.bpm);
        if seconds <= 0.0 || !seconds.is_finite() {
            self.levels[voice].set(to);
            self.complete_stage(voice, token, stage);
            return;
        }

        let total = Duration::from_secs_f32(seconds);
        let step_time = total / FADE_STEPS;
        let base = self.queue.now();
        self.queue.schedule_at(
            base,
            ControlEvent::FadeStep {
                voice,
                token,
                stage,
                step: 0,
                from,
                to,
                base,
                step_time,
            },
        );
    }

    /// A fade finished (or short-circuited); push the voice into whatever
    /// comes next.
    fn complete_stage(&mut self, voice: usize, token: u64, stage: EnvelopeStage) {
        match stage {
            EnvelopeStage::Attack => {
                tracing::trace!(voice, "attack complete");
                self.begin_fade(
                    voice,
                    token,
                    EnvelopeStage::Decay,
                    1.0,
                    self.config.envelope.sustain_level,
                    self.config.envelope.decay,
                );
            }
            EnvelopeStage::Decay => self.enter_sustain(voice, token),
            EnvelopeStage::Release => {
                tracing::trace!(voice, "release complete");
                self.stages[voice] = EnvelopeStage::Idle;
            }
            EnvelopeStage::Sustain | EnvelopeStage::Idle => {}
        }
    }

    fn enter_sustain(&mut self, voice: usize, token: u64) {
        self.stages[voice] = EnvelopeStage::Sustain;

        let seconds = self
            .config
            .timing
            .to_seconds(self.config.envelope.sustain_duration, self.config.bpm);
        if seconds <= 0.0 || !seconds.is_finite() {
            self.enter_release(voice, token);
        } else {
            self.queue.schedule(
                Duration::from_secs_f32(seconds),
                ControlEvent::SustainEnd { voice, token },
            );
        }
    }

    fn enter_release(&mut self, voice: usize, token: u64) {
        let params = self.config.envelope;
        if params.release <= 0.0 {
            self.levels[voice].set(0.0);
            self.stages[voice] = EnvelopeStage::Idle;
        } else {
            // Release ramps down from the sustain level, not from whatever
            // instantaneous gain the voice happens to hold.
            self.begin_fade(
                voice,
                token,
                EnvelopeStage::Release,
                params.sustain_level,
                0.0,
                params.release,
            );
        }
    }
}

/// Token bump with an early wrap: reset a couple of values short of the
/// ceiling so arithmetic near `u64::MAX` can never overflow.
fn next_token(token: u64) -> u64 {
    let next = token.wrapping_add(1);
    if next >= u64::MAX - 2 {
        0
    } else {
        next
    }
}
