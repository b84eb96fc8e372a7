//! Pump venting (air purge) — state machine plus its async driver.

pub mod machine;
pub mod orchestrator;

pub use machine::{VentEvent, VentRun, VentState};
pub use orchestrator::{AutoVentOutcome, ManualVentOutcome, VentingOrchestrator};
