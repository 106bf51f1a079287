use thiserror::Error;

/// Failures raised by [`GridEnvironment`](crate::GridEnvironment).
///
/// None of these are recoverable inside the environment: each one means the
/// driver misused the state machine or handed it a degenerate layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Must call reset() before step()")]
    NotInitialized,

    #[error("Episode already finished; call reset() before stepping again")]
    EpisodeFinished,

    #[error("NPC mood can only be overridden between episodes")]
    EpisodeInProgress,

    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot place agent at ({x}, {y})")]
    InvalidPlacement { x: i32, y: i32 },
}
