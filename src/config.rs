//! Dispenser configuration parameters.
//!
//! All tunable timings and defaults of the inventory core.  Values can be
//! overridden through any [`StoragePort`]; the blob is postcard-encoded.

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::levels::record::{MAX_CONTAINER_ML, MIN_CONTAINER_ML};

const CONFIG_NAMESPACE: &str = "mixbot";
const CONFIG_KEY: &str = "dispenser-config";

/// Core dispenser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserConfig {
    // --- Inventory ---
    /// Container size (and fill level) of freshly materialized pump slots
    pub default_container_ml: u32,
    /// Coalescing window for durable level writes (milliseconds)
    pub debounce_ms: u32,

    // --- Venting ---
    /// Per-pump run time during the automatic full-rig purge (milliseconds)
    pub auto_vent_ms: u32,
    /// Run time of a manual single-pump purge (milliseconds)
    pub manual_vent_ms: u32,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            default_container_ml: 1000,
            debounce_ms: 500,
            auto_vent_ms: 2000,
            manual_vent_ms: 1000,
        }
    }
}

impl DispenserConfig {
    /// Range-check every field.  Out-of-range values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CONTAINER_ML..=MAX_CONTAINER_ML).contains(&self.default_container_ml) {
            return Err(ConfigError::ValidationFailed(
                "default_container_ml must be 100–5000",
            ));
        }
        if !(10..=60_000).contains(&self.debounce_ms) {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must be 10–60000",
            ));
        }
        if !(100..=30_000).contains(&self.auto_vent_ms) {
            return Err(ConfigError::ValidationFailed(
                "auto_vent_ms must be 100–30000",
            ));
        }
        if !(100..=30_000).contains(&self.manual_vent_ms) {
            return Err(ConfigError::ValidationFailed(
                "manual_vent_ms must be 100–30000",
            ));
        }
        Ok(())
    }
}

impl<S: StoragePort> ConfigPort for S {
    fn load_config(&self) -> Result<DispenserConfig, ConfigError> {
        match self.read(CONFIG_NAMESPACE, CONFIG_KEY) {
            Ok(bytes) => {
                let cfg: DispenserConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                info!("config: loaded from storage");
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("config: nothing stored, using defaults");
                Ok(DispenserConfig::default())
            }
            Err(e) => Err(ConfigError::Storage(e)),
        }
    }

    fn save_config(&mut self, config: &DispenserConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::Corrupted)?;
        self.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
        info!("config: saved ({} bytes)", bytes.len());
        Ok(())
    }
}
