use thiserror::Error;

/// Setup-order failures. Everything else in the engine clamps or ignores
/// rather than erroring; these two indicate incorrect wiring and are surfaced
/// immediately.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    /// Output was requested before the engine was armed with `start()`.
    #[error("synth not started before connecting its output")]
    NotStarted,
    /// The render half was already handed to an audio host.
    #[error("synth render engine already connected")]
    AlreadyConnected,
}
