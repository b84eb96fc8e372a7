//! Venting orchestrator against the fake actuator: ordering, progress,
//! reset, and the manual/automatic exclusion.

use std::rc::Rc;

use edge_executor::LocalExecutor;
use futures_lite::future::{block_on, yield_now, zip};
use mixbot::app::events::AppEvent;
use mixbot::config::DispenserConfig;
use mixbot::model::PumpConfig;
use mixbot::venting::{AutoVentOutcome, ManualVentOutcome, VentState, VentingOrchestrator};

use crate::mock_hw::{Actuation, FakeActuator, Recorder, enabled_pumps};

type Orchestrator = VentingOrchestrator<Rc<FakeActuator>>;

fn orchestrator(actuator: FakeActuator) -> (Orchestrator, Rc<FakeActuator>) {
    let actuator = Rc::new(actuator);
    let orch = VentingOrchestrator::new(actuator.clone(), &DispenserConfig::default());
    (orch, actuator)
}

#[test]
fn five_pumps_progress_in_order() {
    let (orch, _) = orchestrator(FakeActuator::new());
    let mut rec = Recorder::new();
    let pumps = enabled_pumps(5);

    let mut seen: Vec<Vec<u8>> = Vec::new();
    let (outcome, ()) = block_on(zip(orch.start_auto(&pumps, &mut rec), async {
        while !orch.is_auto_active() {
            yield_now().await;
        }
        while orch.is_auto_active() {
            let done = orch.state().done().to_vec();
            if seen.last() != Some(&done) {
                seen.push(done);
            }
            yield_now().await;
        }
    }));

    assert_eq!(outcome, AutoVentOutcome::Completed { vented: 5, failed: 0 });
    assert_eq!(
        seen,
        vec![vec![], vec![1], vec![1, 2], vec![1, 2, 3], vec![1, 2, 3, 4]]
    );
    assert_eq!(rec.progress(), vec![20, 40, 60, 80, 100]);
    let settled: Vec<(u8, usize)> = rec
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::VentingProgress { pump_id, done, .. } => Some((*pump_id, *done)),
            _ => None,
        })
        .collect();
    assert_eq!(settled, vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
    assert_eq!(orch.state(), VentState::Idle);
    assert_eq!(orch.state().current(), None);
}

#[test]
fn pumps_are_actuated_one_at_a_time_in_config_order() {
    let pumps = vec![
        PumpConfig::new(9, "a", true),
        PumpConfig::new(2, "b", true),
        PumpConfig::new(4, "c", false),
        PumpConfig::new(5, "d", true),
    ];
    let (orch, actuator) = orchestrator(FakeActuator::new());

    block_on(zip(orch.start_auto(&pumps, &mut Recorder::new()), async {
        while !orch.is_auto_active() {
            yield_now().await;
        }
        while orch.is_auto_active() {
            assert!(actuator.running() <= 1);
            yield_now().await;
        }
    }));

    let auto_ms = DispenserConfig::default().auto_vent_ms;
    assert_eq!(
        *actuator.calls.borrow(),
        vec![
            Actuation { pump_id: 9, duration_ms: auto_ms },
            Actuation { pump_id: 2, duration_ms: auto_ms },
            Actuation { pump_id: 5, duration_ms: auto_ms },
        ]
    );
}

#[test]
fn failing_pump_is_reported_and_run_continues() {
    let actuator = FakeActuator::new();
    actuator.fail_pump(2);
    let (orch, _) = orchestrator(actuator);
    let mut rec = Recorder::new();

    let outcome = block_on(orch.start_auto(&enabled_pumps(3), &mut rec));

    assert_eq!(outcome, AutoVentOutcome::Completed { vented: 3, failed: 1 });
    assert_eq!(rec.count(|e| matches!(e, AppEvent::PumpVentFailed { pump_id: 2, .. })), 1);
    assert_eq!(rec.progress(), vec![33, 67, 100]);
    assert_eq!(rec.events().last(), Some(&AppEvent::VentingFinished { failed: 1 }));
}

#[test]
fn reset_stops_the_run_after_the_inflight_pump() {
    let (orch, actuator) = orchestrator(FakeActuator::new());
    let mut rec = Recorder::new();
    let pumps = enabled_pumps(5);

    let (outcome, ()) = block_on(zip(orch.start_auto(&pumps, &mut rec), async {
        while orch.state().done().len() < 2 {
            yield_now().await;
        }
        orch.reset();
    }));

    assert_eq!(outcome, AutoVentOutcome::Cancelled { vented: 3 });
    assert_eq!(actuator.pumps_called(), vec![1, 2, 3], "pumps 4 and 5 never ran");
    assert_eq!(orch.state(), VentState::Idle);
    assert_eq!(rec.events().last(), Some(&AppEvent::VentingCancelled { done: 3 }));
    assert_eq!(rec.count(|e| matches!(e, AppEvent::VentingFinished { .. })), 0);
}

#[test]
fn restart_waits_for_the_cancelled_pump_to_settle() {
    let (orch, actuator) = orchestrator(FakeActuator::gated());
    let pumps = enabled_pumps(3);

    let (first, (refused, restarted)) = block_on(zip(
        orch.start_auto(&pumps, &mut Recorder::new()),
        async {
            while actuator.running() == 0 {
                yield_now().await;
            }
            orch.reset();
            assert!(!orch.is_auto_active());
            assert!(orch.is_auto_in_flight());

            let refused = orch.start_auto(&pumps, &mut Recorder::new()).await;
            assert_eq!(actuator.pumps_called(), vec![1], "no second actuation overlaps P1");

            actuator.release();
            while orch.is_auto_in_flight() {
                yield_now().await;
            }
            let restarted = orch.start_auto(&pumps, &mut Recorder::new()).await;
            (refused, restarted)
        },
    ));

    assert_eq!(first, AutoVentOutcome::Cancelled { vented: 1 });
    assert_eq!(refused, AutoVentOutcome::AlreadyRunning);
    assert_eq!(restarted, AutoVentOutcome::Completed { vented: 3, failed: 0 });
    assert_eq!(actuator.pumps_called(), vec![1, 1, 2, 3]);
    assert!(!orch.is_auto_in_flight());
}

#[test]
fn a_new_run_can_start_after_reset() {
    let (orch, _) = orchestrator(FakeActuator::new());
    orch.reset();
    let outcome = block_on(orch.start_auto(&enabled_pumps(2), &mut Recorder::new()));
    assert_eq!(outcome, AutoVentOutcome::Completed { vented: 2, failed: 0 });
}

#[test]
fn second_auto_run_is_refused_while_one_is_active() {
    let (orch, _) = orchestrator(FakeActuator::new());
    let pumps = enabled_pumps(3);
    let (first, second) = block_on(zip(
        orch.start_auto(&pumps, &mut Recorder::new()),
        async {
            yield_now().await;
            orch.start_auto(&pumps, &mut Recorder::new()).await
        },
    ));
    assert_eq!(first, AutoVentOutcome::Completed { vented: 3, failed: 0 });
    assert_eq!(second, AutoVentOutcome::AlreadyRunning);
}

#[test]
fn manual_vent_is_blocked_during_auto_run() {
    let (orch, actuator) = orchestrator(FakeActuator::new());
    let pumps = enabled_pumps(5);
    let (_, manual) = block_on(zip(
        orch.start_auto(&pumps, &mut Recorder::new()),
        async {
            yield_now().await;
            orch.vent_single(7).await
        },
    ));
    assert_eq!(manual, ManualVentOutcome::Blocked);
    assert!(!actuator.pumps_called().contains(&7));
}

#[test]
fn manual_vents_on_distinct_pumps_run_concurrently() {
    let (orch, actuator) = orchestrator(FakeActuator::gated());
    let ex: LocalExecutor<'_, 8> = LocalExecutor::new();

    let a = ex.spawn(orch.vent_single(3));
    let b = ex.spawn(orch.vent_single(5));

    let (ra, rb) = block_on(ex.run(async {
        while orch.manual_venting().len() < 2 {
            yield_now().await;
        }
        assert_eq!(orch.manual_venting(), vec![3, 5]);
        assert!(!orch.is_auto_active());
        actuator.release();
        (a.await, b.await)
    }));

    assert_eq!((ra, rb), (ManualVentOutcome::Vented, ManualVentOutcome::Vented));
    assert!(orch.manual_venting().is_empty());
    let manual_ms = DispenserConfig::default().manual_vent_ms;
    assert!(actuator.calls.borrow().iter().all(|c| c.duration_ms == manual_ms));
}

#[test]
fn manual_vent_failure_is_reported() {
    let actuator = FakeActuator::new();
    actuator.fail_pump(4);
    let (orch, _) = orchestrator(actuator);
    assert_eq!(block_on(orch.vent_single(4)), ManualVentOutcome::Failed);
    assert!(!orch.is_manually_venting(4));
}
