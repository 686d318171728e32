// Purpose: voice management, polyphony, and the control/render split.
// The control half (Synth) and render half (SynthEngine) are built as a pair
// and share only atomic gain cells and an SPSC command ring.

/// Render half: owns the voices, produces the master sample stream.
pub mod engine;
/// Single-writer/single-reader atomic gain cell.
pub mod level;
/// Control-to-render commands.
pub mod message;
/// Control half: note allocation and envelope driving.
pub mod synth;
/// One polyphonic slot: an oscillator group plus its gain.
pub mod voice;
