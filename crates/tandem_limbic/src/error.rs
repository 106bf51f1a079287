use thiserror::Error;

/// Rejected inputs to the arousal transforms.
///
/// Each case would otherwise turn into NaN or infinity downstream.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ArousalError {
    #[error("max_time must be positive and finite, got {0}")]
    InvalidMaxTime(f32),

    #[error("{signal} must be finite, got {value}")]
    NonFiniteSignal { signal: &'static str, value: f32 },

    #[error("softmax temperature must be positive and finite, got {0}")]
    InvalidTemperature(f32),
}
