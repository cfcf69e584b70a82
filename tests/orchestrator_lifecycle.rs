//! Start/stop/reload behaviour of the service orchestrator.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use strafe_hcf::health::SubsystemStatus;
use strafe_hcf::lifecycle::OrchestratorState;
use strafe_hcf::HcfError;

mod common;
use common::{CallLog, Harness, RecordingHook};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_start_brings_subsystems_up_in_order() {
    let h = Harness::new();

    h.orchestrator.start().await.unwrap();

    assert_eq!(
        h.log.entries(),
        strings(&["database.initialize", "commands.initialize", "events.initialize"])
    );
    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
    assert_eq!(h.orchestrator.active_services(), 3);
    assert!(h.orchestrator.is_healthy().await);
}

#[tokio::test]
async fn test_second_start_is_a_noop() {
    let h = Harness::new();

    h.orchestrator.start().await.unwrap();
    h.orchestrator.start().await.unwrap();

    assert_eq!(h.persistence.init_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.entries().len(), 3);
    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
}

#[tokio::test]
async fn test_stop_runs_in_reverse_order_once() {
    let h = Harness::new();
    h.orchestrator.start().await.unwrap();
    h.log.clear();

    h.orchestrator.stop().await;
    h.orchestrator.stop().await;

    assert_eq!(
        h.log.entries(),
        strings(&["events.shutdown", "commands.shutdown", "database.shutdown"])
    );
    assert_eq!(h.orchestrator.state(), OrchestratorState::Stopped);
    assert_eq!(h.orchestrator.active_services(), 0);
    assert!(!h.orchestrator.is_healthy().await);
}

#[tokio::test]
async fn test_stop_before_start_does_nothing() {
    let h = Harness::new();

    h.orchestrator.stop().await;

    assert!(h.log.entries().is_empty());
    assert_eq!(h.orchestrator.state(), OrchestratorState::NotStarted);
}

#[tokio::test]
async fn test_event_failure_unwinds_started_subsystems() {
    let h = Harness::new();
    h.events.fail_init.store(true, Ordering::SeqCst);

    let err = h.orchestrator.start().await.unwrap_err();

    assert!(matches!(err, HcfError::StartFailed(_)));
    assert_eq!(
        h.log.entries(),
        strings(&[
            "database.initialize",
            "commands.initialize",
            "events.initialize",
            "commands.shutdown",
            "database.shutdown",
        ])
    );
    assert_eq!(h.orchestrator.state(), OrchestratorState::Stopped);
    assert_eq!(h.orchestrator.active_services(), 0);
}

#[tokio::test]
async fn test_database_failure_fails_start() {
    let h = Harness::new();
    h.persistence.fail_init.store(true, Ordering::SeqCst);

    let err = h.orchestrator.start().await.unwrap_err();

    match err {
        HcfError::StartFailed(inner) => {
            assert!(matches!(*inner, HcfError::Initialization { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!h.orchestrator.is_healthy().await);
    assert_eq!(h.orchestrator.active_services(), 0);
    assert_eq!(h.log.entries(), strings(&["database.initialize"]));
}

#[tokio::test]
async fn test_integrity_failure_unwinds_everything() {
    let h = Harness::new();
    h.persistence.healthy.store(false, Ordering::SeqCst);

    let err = h.orchestrator.start().await.unwrap_err();

    match err {
        HcfError::StartFailed(inner) => match *inner {
            HcfError::Unhealthy(failures) => assert_eq!(failures, strings(&["database"])),
            other => panic!("unexpected cause: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
    let entries = h.log.entries();
    assert_eq!(
        &entries[3..],
        strings(&["events.shutdown", "commands.shutdown", "database.shutdown"]).as_slice()
    );
    assert_eq!(h.orchestrator.state(), OrchestratorState::Stopped);
}

#[tokio::test]
async fn test_failed_post_start_hook_rolls_back() {
    let log = CallLog::default();
    let hook = Arc::new(RecordingHook::new(log.clone()));
    hook.fail.store(true, Ordering::SeqCst);
    let h = Harness::with_hook(log, hook);

    assert!(h.orchestrator.start().await.is_err());

    let entries = h.log.entries();
    assert_eq!(entries[3], "hook.run");
    assert_eq!(
        &entries[4..],
        strings(&["events.shutdown", "commands.shutdown", "database.shutdown"]).as_slice()
    );
}

#[tokio::test]
async fn test_post_start_hook_runs_after_surfaces() {
    let log = CallLog::default();
    let hook = Arc::new(RecordingHook::new(log.clone()));
    let h = Harness::with_hook(log, hook);

    h.orchestrator.start().await.unwrap();

    assert_eq!(h.log.entries().last().map(String::as_str), Some("hook.run"));
}

#[tokio::test]
async fn test_stop_continues_past_shutdown_failure() {
    let h = Harness::new();
    h.commands.fail_shutdown.store(true, Ordering::SeqCst);
    h.orchestrator.start().await.unwrap();
    h.log.clear();

    h.orchestrator.stop().await;

    assert_eq!(
        h.log.entries(),
        strings(&["events.shutdown", "commands.shutdown", "database.shutdown"])
    );
    assert_eq!(h.orchestrator.state(), OrchestratorState::Stopped);
}

#[tokio::test]
async fn test_reload_stops_reloads_config_and_starts() {
    let h = Harness::new();
    h.orchestrator.start().await.unwrap();
    h.log.clear();

    h.orchestrator.reload().await.unwrap();

    assert_eq!(
        h.log.entries(),
        strings(&[
            "events.shutdown",
            "commands.shutdown",
            "database.shutdown",
            "config.reload",
            "database.initialize",
            "commands.initialize",
            "events.initialize",
        ])
    );
    assert_eq!(h.orchestrator.active_services(), 3);
    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
}

#[tokio::test]
async fn test_reload_failure_leaves_services_stopped() {
    let h = Harness::new();
    h.orchestrator.start().await.unwrap();
    h.provider.fail_reload.store(true, Ordering::SeqCst);

    let err = h.orchestrator.reload().await.unwrap_err();

    assert!(matches!(err, HcfError::ReloadFailed(_)));
    assert_eq!(h.orchestrator.state(), OrchestratorState::Stopped);
    assert!(!h.orchestrator.is_healthy().await);
}

#[tokio::test]
async fn test_restart_after_stop() {
    let h = Harness::new();
    h.orchestrator.start().await.unwrap();
    h.orchestrator.stop().await;

    h.orchestrator.start().await.unwrap();

    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
    assert_eq!(h.persistence.init_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_start_initializes_once() {
    let h = Harness::with_init_delay(Duration::from_millis(50));

    let a = h.orchestrator.clone();
    let b = h.orchestrator.clone();
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.start().await }),
        tokio::spawn(async move { b.start().await }),
    );
    ra.unwrap().unwrap();
    rb.unwrap().unwrap();

    assert_eq!(h.persistence.init_calls.load(Ordering::SeqCst), 1);

    // The loser returned while the winner was still starting.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
}

#[tokio::test]
async fn test_start_during_start_returns_before_running() {
    let h = Harness::with_init_delay(Duration::from_millis(300));

    let winner = tokio::spawn({
        let orchestrator = h.orchestrator.clone();
        async move { orchestrator.start().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    h.orchestrator.start().await.unwrap();
    assert_eq!(h.orchestrator.state(), OrchestratorState::Starting);

    winner.await.unwrap().unwrap();
    assert_eq!(h.orchestrator.state(), OrchestratorState::Running);
    assert_eq!(h.persistence.init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_health_info_tracks_lifecycle() {
    let h = Harness::new();

    let before = h.orchestrator.health_info().await;
    assert!(!before.started);
    assert_eq!(before.database, SubsystemStatus::NotInitialized);
    assert_eq!(before.commands, SubsystemStatus::NotInitialized);
    assert!(before.pool.is_none());

    h.orchestrator.start().await.unwrap();
    let running = h.orchestrator.health_info().await;
    assert!(running.started);
    assert_eq!(running.active_services, 3);
    assert_eq!(running.database, SubsystemStatus::Healthy);
    assert_eq!(running.events, SubsystemStatus::Initialized);
    assert!(running.pool.is_some());

    h.persistence.healthy.store(false, Ordering::SeqCst);
    let degraded = h.orchestrator.health_info().await;
    assert_eq!(degraded.database, SubsystemStatus::Unhealthy);
    assert!(!h.orchestrator.is_healthy().await);
}
