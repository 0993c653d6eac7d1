use thiserror::Error;

/// Returned when a reader runs out of bits or meets a value it cannot decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to deserialize value from bit stream. Data may be truncated or malformed")]
pub struct SerdeErr;
