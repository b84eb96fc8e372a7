//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  A UI push adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LevelsPersisted => {
                info!("LEVELS | persisted");
            }
            AppEvent::BindingsChanged { count } => {
                info!("LEVELS | {} record(s) rebound to new pump wiring", count);
            }
            AppEvent::VentingStarted { total } => {
                info!("VENT | started over {} pump(s)", total);
            }
            AppEvent::VentingProgress { pump_id, done, total, progress } => {
                info!("VENT | pump={} {}/{} ({}%)", pump_id, done, total, progress);
            }
            AppEvent::PumpVentFailed { pump_id, error } => {
                warn!("VENT | pump={} failed: {}", pump_id, error);
            }
            AppEvent::VentingFinished { failed } => {
                info!("VENT | finished, failed={}", failed);
            }
            AppEvent::VentingCancelled { done } => {
                info!("VENT | cancelled after {} pump(s)", done);
            }
        }
    }
}
