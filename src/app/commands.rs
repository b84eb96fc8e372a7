//! Inbound commands to the application service.
//!
//! These represent level edits requested by the outside world (settings
//! page, machine controller after a pour) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::model::PumpId;

/// Level edits that external adapters can send into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelCommand {
    /// Operator measured a container and typed in its fill level.
    SetLevel { pump_id: PumpId, level: i64 },

    /// A differently sized bottle was hooked up.
    SetContainerSize { pump_id: PumpId, size: i64 },

    /// Relabel the ingredient behind a pump.
    Rename { pump_id: PumpId, name: String },

    /// A single shot was poured from one pump.
    RecordShot { pump_id: PumpId, amount: u32 },

    /// Every bottle was replaced with a full one.
    RefillAll,
}
