//! Venting state machine.
//!
//! ```text
//!            Start(pumps)
//!   ┌──────┐ ───────────▶ ┌─────────────────────────────────┐
//!   │ Idle │              │ Venting{pumps,current,done,%}   │◀─┐ PumpStarted /
//!   └──────┘ ◀─────────── └─────────────────────────────────┘ ─┘ PumpSettled
//!             Finish | Reset
//! ```
//!
//! [`VentState::apply`] is a pure transition function; the orchestrator
//! owns the only instance and feeds it events as actuations start and
//! settle.

use heapless::Vec;

use crate::model::{PUMP_COUNT, PumpId};

/// Pump list captured when a run starts.
pub type PumpList = Vec<PumpId, PUMP_COUNT>;

/// Progress of an automatic run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VentRun {
    /// Enabled pumps in configuration order, snapshotted at start.
    pub pumps: PumpList,
    /// Pump under actuation right now.
    pub current: Option<PumpId>,
    /// Pumps whose actuation has settled, in order.
    pub done: PumpList,
    /// `round(done / total * 100)`.
    pub progress: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VentState {
    #[default]
    Idle,
    Venting(VentRun),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentEvent<'a> {
    Start(&'a [PumpId]),
    PumpStarted(PumpId),
    PumpSettled(PumpId),
    Finish,
    Reset,
}

impl VentState {
    /// Next state after `event`.  Events that make no sense in the current
    /// state leave it unchanged.
    #[must_use]
    pub fn apply(self, event: VentEvent<'_>) -> Self {
        match (self, event) {
            (_, VentEvent::Reset) => Self::Idle,
            (Self::Idle, VentEvent::Start(pumps)) => {
                let mut list = PumpList::new();
                for &p in pumps.iter().take(PUMP_COUNT) {
                    let _ = list.push(p);
                }
                Self::Venting(VentRun {
                    pumps: list,
                    current: None,
                    done: PumpList::new(),
                    progress: 0,
                })
            }
            (Self::Venting(mut run), VentEvent::PumpStarted(id)) => {
                run.current = Some(id);
                Self::Venting(run)
            }
            (Self::Venting(mut run), VentEvent::PumpSettled(id)) => {
                let _ = run.done.push(id);
                run.progress = percent(run.done.len(), run.pumps.len());
                Self::Venting(run)
            }
            (Self::Venting(_), VentEvent::Finish) => Self::Idle,
            (state, _) => state,
        }
    }

    pub fn is_venting(&self) -> bool {
        matches!(self, Self::Venting(_))
    }

    pub fn progress(&self) -> u8 {
        match self {
            Self::Venting(run) => run.progress,
            Self::Idle => 0,
        }
    }

    pub fn current(&self) -> Option<PumpId> {
        match self {
            Self::Venting(run) => run.current,
            Self::Idle => None,
        }
    }

    pub fn done(&self) -> &[PumpId] {
        match self {
            Self::Venting(run) => run.done.as_slice(),
            Self::Idle => &[],
        }
    }
}

/// Rounded percentage, halves rounding up.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done * 200 + total) / (total * 2)).min(100) as u8
}
