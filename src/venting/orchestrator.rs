//! Venting orchestrator — drives the pump actuator for purges.
//!
//! Two modes share one actuator:
//!
//! - **Automatic**: every enabled pump, one after the other, for
//!   `auto_vent_ms` each.  Pump *i+1* never starts before pump *i* settled.
//! - **Manual**: a single pump for `manual_vent_ms`.  Any number of distinct
//!   pumps may run at once; refused while an automatic run is active.
//!
//! All methods take `&self` so a reset or a status read can interleave with
//! a run on the same cooperative executor.  No `RefCell` borrow is held
//! across an `.await`.

use core::cell::{Cell, RefCell};

use heapless::FnvIndexSet;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PumpActuator};
use crate::config::DispenserConfig;
use crate::model::{PumpConfig, PumpId};

use super::machine::{PumpList, VentEvent, VentState};

/// How an automatic run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoVentOutcome {
    /// Every pump was actuated; `failed` of them reported an error.
    Completed { vented: usize, failed: usize },
    /// [`VentingOrchestrator::reset`] stopped the run after `vented` pumps.
    Cancelled { vented: usize },
    /// Another automatic run was already active.
    AlreadyRunning,
}

/// How a manual single-pump vent ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualVentOutcome {
    Vented,
    /// The actuator reported an error (logged).
    Failed,
    /// An automatic run is active; nothing was actuated.
    Blocked,
}

pub struct VentingOrchestrator<A: PumpActuator> {
    actuator: A,
    auto_vent_ms: u32,
    manual_vent_ms: u32,
    state: RefCell<VentState>,
    /// Bumped by every start and reset; a run stops once it no longer owns it.
    generation: Cell<u32>,
    /// Set while an automatic-run actuation is in flight, cancelled or not.
    auto_in_flight: Cell<bool>,
    manual: RefCell<FnvIndexSet<PumpId, 32>>,
}

impl<A: PumpActuator> VentingOrchestrator<A> {
    pub fn new(actuator: A, config: &DispenserConfig) -> Self {
        Self {
            actuator,
            auto_vent_ms: config.auto_vent_ms,
            manual_vent_ms: config.manual_vent_ms,
            state: RefCell::new(VentState::Idle),
            generation: Cell::new(0),
            auto_in_flight: Cell::new(false),
            manual: RefCell::new(FnvIndexSet::new()),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Copy of the automatic-run state for the UI.
    pub fn state(&self) -> VentState {
        self.state.borrow().clone()
    }

    pub fn is_auto_active(&self) -> bool {
        self.state.borrow().is_venting()
    }

    /// Whether an automatic-run actuation has yet to settle.
    pub fn is_auto_in_flight(&self) -> bool {
        self.auto_in_flight.get()
    }

    /// Pumps currently under manual actuation, ascending.
    pub fn manual_venting(&self) -> Vec<PumpId> {
        let mut pumps: Vec<PumpId> = self.manual.borrow().iter().copied().collect();
        pumps.sort_unstable();
        pumps
    }

    pub fn is_manually_venting(&self, pump_id: PumpId) -> bool {
        self.manual.borrow().contains(&pump_id)
    }

    // ── Automatic venting ─────────────────────────────────────

    /// Purge every enabled pump in configuration order.
    ///
    /// A failing pump is logged and skipped over; it still counts towards
    /// progress.  Resolves once the run has finished or noticed a reset.
    /// Refused while a reset run still has its last pump in flight.
    pub async fn start_auto(&self, pumps: &[PumpConfig], sink: &mut impl EventSink) -> AutoVentOutcome {
        if self.is_auto_active() {
            warn!("VENT: automatic run already active");
            return AutoVentOutcome::AlreadyRunning;
        }
        if self.auto_in_flight.get() {
            warn!("VENT: cancelled run still actuating, start refused");
            return AutoVentOutcome::AlreadyRunning;
        }

        let mut order = PumpList::new();
        for p in pumps.iter().filter(|p| p.enabled) {
            if order.push(p.id).is_err() {
                warn!("VENT: more enabled pumps than slots, P{} skipped", p.id);
            }
        }

        let run = self.generation.get().wrapping_add(1);
        self.generation.set(run);
        self.transition(VentEvent::Start(&order));
        let total = order.len();
        info!("VENT: automatic run over {} pump(s)", total);
        sink.emit(&AppEvent::VentingStarted { total });

        let mut failed = 0;
        for (i, &pump_id) in order.iter().enumerate() {
            if !self.owns(run) {
                return self.cancelled(i, sink);
            }
            self.transition(VentEvent::PumpStarted(pump_id));

            let result = {
                let _in_flight = InFlight::enter(&self.auto_in_flight);
                self.actuator.actuate(pump_id, self.auto_vent_ms).await
            };
            if let Err(e) = result {
                warn!("VENT: P{} failed: {}", pump_id, e);
                failed += 1;
                sink.emit(&AppEvent::PumpVentFailed { pump_id, error: e });
            }

            // The in-flight actuation always runs to completion; only now
            // can a reset be observed.
            if !self.owns(run) {
                return self.cancelled(i + 1, sink);
            }
            self.transition(VentEvent::PumpSettled(pump_id));
            sink.emit(&AppEvent::VentingProgress {
                pump_id,
                done: i + 1,
                total,
                progress: self.state.borrow().progress(),
            });
        }

        self.transition(VentEvent::Finish);
        info!("VENT: automatic run finished ({} failed)", failed);
        sink.emit(&AppEvent::VentingFinished { failed });
        AutoVentOutcome::Completed {
            vented: total,
            failed,
        }
    }

    /// Abandon the automatic run.  Cooperative: an actuation already in
    /// flight completes, then the run stops advancing.
    pub fn reset(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.transition(VentEvent::Reset);
        info!("VENT: reset");
    }

    // ── Manual venting ────────────────────────────────────────

    /// Purge a single pump.  Does not guard against the same pump being
    /// vented twice concurrently.
    pub async fn vent_single(&self, pump_id: PumpId) -> ManualVentOutcome {
        if self.is_auto_active() {
            warn!("VENT: manual P{} refused, automatic run active", pump_id);
            return ManualVentOutcome::Blocked;
        }

        if self.manual.borrow_mut().insert(pump_id).is_err() {
            warn!("VENT: manual vent set full, P{} not tracked", pump_id);
        }
        info!("VENT: manual P{} for {}ms", pump_id, self.manual_vent_ms);

        let outcome = match self.actuator.actuate(pump_id, self.manual_vent_ms).await {
            Ok(()) => ManualVentOutcome::Vented,
            Err(e) => {
                warn!("VENT: manual P{} failed: {}", pump_id, e);
                ManualVentOutcome::Failed
            }
        };

        self.manual.borrow_mut().remove(&pump_id);
        outcome
    }

    // ── Internal ──────────────────────────────────────────────

    fn transition(&self, event: VentEvent<'_>) {
        let current = self.state.take();
        *self.state.borrow_mut() = current.apply(event);
    }

    fn owns(&self, run: u32) -> bool {
        self.generation.get() == run && self.is_auto_active()
    }

    fn cancelled(&self, vented: usize, sink: &mut impl EventSink) -> AutoVentOutcome {
        info!("VENT: automatic run cancelled after {} pump(s)", vented);
        sink.emit(&AppEvent::VentingCancelled { done: vented });
        AutoVentOutcome::Cancelled { vented }
    }
}

/// Clears the in-flight flag when the actuation settles or the run is dropped.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
