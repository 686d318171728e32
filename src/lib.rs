//! Realtime-safe polyphonic voice engine.
//!
//! Two timing domains, kept strictly apart:
//!
//! - the **render domain** ([`SynthEngine`]) produces one sample per tick with
//!   bounded, allocation-free, lock-free work, living inside the host's audio
//!   callback;
//! - the **control domain** ([`Synth`]) allocates notes across a fixed voice
//!   pool and steps per-voice gain through ADSR fades on a cooperative timer
//!   queue.
//!
//! The two halves share nothing except an SPSC command ring and one atomic
//! gain cell per voice.

pub mod dsp;
pub mod engine; // Control-rate scheduling and envelopes
pub mod error;
pub mod notes; // Note-frequency tables and scales
pub mod synth; // Voice management and polyphony

pub use dsp::oscillator::Oscillator;
pub use dsp::waveform::Waveform;
pub use engine::envelope::{EnvelopeParams, EnvelopeStage, TimingPolicy};
pub use error::SynthError;
pub use synth::engine::SynthEngine;
pub use synth::synth::{Synth, SynthConfig};
