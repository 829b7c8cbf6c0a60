//! Error types for the host-boundary model

use thiserror::Error;

/// Errors raised by fallible host-boundary operations.
///
/// Shape controllers are written so that these never surface for well-formed
/// interaction sequences: malformed persisted data is clamped or skipped,
/// never rejected through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("No input row named: {0}")]
    UnknownInput(String),

    #[error("No field named: {0}")]
    UnknownField(String),

    #[error("Field is not clickable: {0}")]
    NotClickable(String),

    #[error("Input row has no connection socket: {0}")]
    NoConnection(String),

    #[error("Connection socket already occupied: {0}")]
    ConnectionOccupied(String),

    #[error("Visibility cannot change before the block is drawn")]
    NotRendered,
}
