//! Outbound application events.
//!
//! The level store and the venting orchestrator emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, e.g. log them or push them to the UI.

use crate::error::ActuationError;
use crate::model::PumpId;

/// Structured events emitted by the dispenser core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Level data was durably written.  Subscribers should re-read.
    LevelsPersisted,

    /// Pump wiring changed the ingredient of `count` level records.
    BindingsChanged { count: usize },

    /// An automatic venting run started over `total` pumps.
    VentingStarted { total: usize },

    /// One pump of the automatic run settled.
    VentingProgress {
        pump_id: PumpId,
        done: usize,
        total: usize,
        progress: u8,
    },

    /// A pump's actuation failed during venting; the run carries on.
    PumpVentFailed { pump_id: PumpId, error: ActuationError },

    /// The automatic run went through every pump.
    VentingFinished { failed: usize },

    /// The automatic run was reset before it finished.
    VentingCancelled { done: usize },
}
