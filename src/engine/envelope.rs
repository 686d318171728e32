#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Control-Rate ADSR
=================

The envelope is not rendered per sample. It is approximated by a fixed number
of discrete gain updates issued from the control-rate timer queue:

  Gain
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Each ramp is a fade of FADE_STEPS linear steps from a start gain to a target
gain. Step i of a fade over duration D fires at i * (D / FADE_STEPS) after the
fade begins, writes

    gain = from - i * ((from - to) / FADE_STEPS)

clamped between the endpoints so floating-point step error can never
overshoot, and the final step lands exactly on the target. Sustain is not a
fade, just a delayed hand-off into Release after the hold time elapses.

Durations can be read as beats (converted through 60/bpm, the shipped
behavior) or as raw seconds; that is a policy choice, not a fixed rule.

A stage with zero or negative duration short-circuits: gain jumps straight to
the target and the next stage begins synchronously.
*/

/// Number of discrete gain updates per fade. A fade fires steps `0..=FADE_STEPS`,
/// so the ramp spans exactly the configured duration.
pub const FADE_STEPS: u32 = 60;

/// Where a voice currently sits in its envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// How envelope durations are interpreted.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingPolicy {
    /// Durations are beats, converted to wall clock via `60 / bpm`.
    #[default]
    Beats,
    /// Durations are raw seconds; bpm is ignored.
    Seconds,
}

impl TimingPolicy {
    /// Resolve a configured duration to seconds.
    #[inline]
    pub fn to_seconds(self, duration: f32, bpm: f32) -> f32 {
        match self {
            TimingPolicy::Beats => duration * (60.0 / bpm),
            TimingPolicy::Seconds => duration,
        }
    }
}

/// ADSR contour parameters. Durations are interpreted through the synth's
/// [`TimingPolicy`]; levels live in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// Ramp from the trigger gain up to 1.0.
    pub attack: f32,
    /// Ramp from 1.0 down to `sustain_level`.
    pub decay: f32,
    /// Gain held between decay and release.
    pub sustain_level: f32,
    /// How long the sustain level is held.
    pub sustain_duration: f32,
    /// Ramp from `sustain_level` down to 0.
    pub release: f32,
    /// Force gain to 0 at note-on (hard retrigger) instead of ramping from
    /// the voice's current gain (legato).
    pub reset_gain_on_trigger: bool,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 1.14,
            decay: 1.14,
            sustain_level: 0.75,
            sustain_duration: 0.2,
            release: 2.28,
            reset_gain_on_trigger: true,
        }
    }
}

impl EnvelopeParams {
    /// Params with levels clamped into `[0, 1]`. Durations are left alone;
    /// zero and negative durations mean "immediate" by contract.
    pub fn clamped(mut self) -> Self {
        self.sustain_level = self.sustain_level.clamp(0.0, 1.0);
        self
    }
}

/// Gain for step `step` of a fade from `from` to `to`.
///
/// Linear interpolation clamped between the endpoints; callers snap the final
/// step to `to` so endpoints are exact at step boundaries.
#[inline]
pub fn step_gain(from: f32, to: f32, step: u32, steps: u32) -> f32 {
    let interval = (from - to) / steps as f32;
    let gain = from - step as f32 * interval;
    gain.clamp(from.min(to), from.max(to))
}
