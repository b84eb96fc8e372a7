//! Simulated pump actuator.
//!
//! Stands in for the machine controller on hosts without pumps: logs the
//! command and sleeps for the requested duration on the async-io-mini
//! timer.  Pumps listed as faulty fail immediately.

use std::cell::RefCell;
use std::time::Duration;

use async_io_mini::Timer;
use heapless::FnvIndexSet;
use log::{info, warn};

use crate::app::ports::PumpActuator;
use crate::error::ActuationError;
use crate::model::PumpId;

#[derive(Default)]
pub struct SimulatedActuator {
    faulty: RefCell<FnvIndexSet<PumpId, 32>>,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a pump as broken (or repaired).
    pub fn set_faulty(&self, pump_id: PumpId, faulty: bool) {
        let mut set = self.faulty.borrow_mut();
        if faulty {
            // Capacity covers every pump id we ever hand out.
            let _ = set.insert(pump_id);
        } else {
            set.remove(&pump_id);
        }
    }
}

impl PumpActuator for SimulatedActuator {
    async fn actuate(&self, pump_id: PumpId, duration_ms: u32) -> Result<(), ActuationError> {
        if self.faulty.borrow().contains(&pump_id) {
            warn!("pump {} did not respond", pump_id);
            return Err(ActuationError::Fault("pump did not respond"));
        }
        info!("pump {} on for {}ms", pump_id, duration_ms);
        Timer::after(Duration::from_millis(u64::from(duration_ms))).await;
        info!("pump {} off", pump_id);
        Ok(())
    }
}
