//! Vocabulary conversion errors.

use thiserror::Error;

/// Errors raised when a raw numeric code does not map onto a known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("Unknown bot class: {0}")]
    UnknownClass(u8),

    #[error("Unknown equipment slot: {0}")]
    UnknownSlot(u8),

    #[error("Unknown team: {0}")]
    UnknownTeam(i32),
}
