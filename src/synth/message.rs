/// Commands flowing from the control half to the render half.
///
/// Carried over a bounded SPSC ring and drained at the top of every render
/// tick, so a command takes effect on the next sample after it is seen. The
/// ring is the only channel through which the control domain reaches the
/// oscillators; gain travels separately through the per-voice atomic cells.
#[derive(Debug, Copy, Clone)]
pub enum VoiceCommand {
    /// Retune every oscillator in one voice.
    SetFrequency { voice: usize, frequency: f32 },
    /// Adjust the master output level.
    SetVolume { volume: f32 },
}
