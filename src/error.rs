//! Unified error types for the dispenser core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! outer layers' error handling uniform.  All variants are `Copy`.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An ingredient-level operation was rejected or could not be persisted.
    Levels(LevelsError),
    /// A pump actuation failed.
    Actuation(ActuationError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Levels(e) => write!(f, "levels: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Level store errors
// ---------------------------------------------------------------------------

/// Failures surfaced by explicit bulk operations on the level store.
///
/// Routine updates never return these; their write failures are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelsError {
    /// Externally supplied level data was empty or malformed.
    ValidationRejected(&'static str),
    /// The durable write failed.
    Storage(StorageError),
    /// The snapshot could not be serialized.
    Encode,
}

impl fmt::Display for LevelsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationRejected(msg) => write!(f, "rejected: {msg}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Encode => write!(f, "encode failed"),
        }
    }
}

impl std::error::Error for LevelsError {}

impl From<StorageError> for LevelsError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<LevelsError> for Error {
    fn from(e: LevelsError) -> Self {
        Self::Levels(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// The machine controller did not answer in time.
    Timeout,
    /// The controller refused the command (busy, unknown pump).
    Rejected,
    /// The pump driver reported a fault.
    Fault(&'static str),
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "controller timed out"),
            Self::Rejected => write!(f, "command rejected"),
            Self::Fault(msg) => write!(f, "pump fault: {msg}"),
        }
    }
}

impl std::error::Error for ActuationError {}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
