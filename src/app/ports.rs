//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LevelStore / VentingOrchestrator / AppService
//! ```
//!
//! Driven adapters (pump actuation, storage, clocks, event sinks) implement
//! these traits.  The domain consumes them via generics, so the core never
//! touches hardware or the filesystem directly.

use std::rc::Rc;

use crate::config::DispenserConfig;
use crate::error::ActuationError;
use crate::model::{PumpId, RecipeItem};

// ───────────────────────────────────────────────────────────────
// Pump actuation port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Runs a pump for a fixed duration.
///
/// The future settles once the pump has stopped again.  Implementations
/// report failure through the returned error; they must not panic.
#[allow(async_fn_in_trait)]
pub trait PumpActuator {
    async fn actuate(&self, pump_id: PumpId, duration_ms: u32) -> Result<(), ActuationError>;
}

impl<T: PumpActuator> PumpActuator for Rc<T> {
    async fn actuate(&self, pump_id: PumpId, duration_ms: u32) -> Result<(), ActuationError> {
        (**self).actuate(pump_id, duration_ms).await
    }
}

// ───────────────────────────────────────────────────────────────
// Recipe port (driven adapter: catalog → domain)
// ───────────────────────────────────────────────────────────────

/// Looks up the recipe of a cocktail.  Storage of the catalog is not our
/// concern.
pub trait RecipePort {
    fn recipe(&self, cocktail_id: &str) -> Option<Vec<RecipeItem>>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock milliseconds.  Used for `lastUpdated` stamps and debounce
/// deadlines.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock> Clock for Rc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`AppEvent`](super::events::AppEvent)s through this
/// port.  Adapters decide where they go (log, websocket push, UI refresh).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ disk / browser storage)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Keys are namespaced to prevent collisions between subsystems.  Writes
/// MUST be atomic per key: a reader sees either the old or the new value.
pub trait StoragePort {
    /// Read a value.  [`StorageError::NotFound`] if the key is absent.
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`DispenserConfig`].
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`] instead of clamping them.
pub trait ConfigPort {
    /// Load configuration.  Returns [`DispenserConfig::default()`] if none
    /// is stored yet.
    fn load_config(&self) -> Result<DispenserConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save_config(&mut self, config: &DispenserConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage failed.
    Storage(StorageError),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage medium is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
