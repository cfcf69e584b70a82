//! Lifecycle scheduler: periodic tasks, deferred work and bounded shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use strafe_hcf::config::LifecycleConfig;
use strafe_hcf::LifecycleScheduler;
use tokio::sync::Notify;

mod common;
use common::Harness;

fn fast_config() -> LifecycleConfig {
    LifecycleConfig {
        health_check_interval_secs: 1,
        cleanup_interval_secs: 3600,
        statistics_interval_secs: 1,
        shutdown_timeout_secs: 1,
        termination_hook: false,
        watch_config: false,
    }
}

fn scheduler(h: &Harness) -> Arc<LifecycleScheduler> {
    Arc::new(LifecycleScheduler::new(h.orchestrator.clone(), fast_config()))
}

#[tokio::test]
async fn test_tasks_rejected_when_not_running() {
    let h = Harness::new();
    let scheduler = scheduler(&h);

    assert!(!scheduler.run_async(async {}));
    assert!(!scheduler.run_later(async {}, Duration::from_millis(1)));

    // Shutdown without start is a no-op.
    scheduler.shutdown().await;
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_run_async_and_run_later_execute() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    let ran = Arc::new(AtomicUsize::new(0));
    let a = ran.clone();
    let b = ran.clone();
    assert!(scheduler.run_async(async move {
        a.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(scheduler.run_later(
        async move {
            b.fetch_add(1, Ordering::SeqCst);
        },
        Duration::from_millis(20),
    ));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(ran.load(Ordering::SeqCst), 2);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_cancels_pending_delayed_task() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    scheduler.run_later(
        async move {
            flag.store(true, Ordering::SeqCst);
        },
        Duration::from_secs(30),
    );

    scheduler.shutdown().await;
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_shutdown_is_bounded_by_grace_period() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    scheduler.run_async(async {
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let started = Instant::now();
    scheduler.shutdown().await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(900), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "not bounded: {elapsed:?}");
    assert!(!scheduler.is_running());

    // Second call returns immediately.
    let again = Instant::now();
    scheduler.shutdown().await;
    assert!(again.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_panicking_task_does_not_stop_scheduler() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    scheduler.run_async(async {
        panic!("task bug");
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    assert!(scheduler.run_async(async move {
        flag.store(true, Ordering::SeqCst);
    }));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(ran.load(Ordering::SeqCst));

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_periodic_health_check_reaches_orchestrator() {
    let h = Harness::new();
    h.orchestrator.start().await.unwrap();
    let checks_after_start = h.persistence.health_checks.load(Ordering::SeqCst);

    let scheduler = scheduler(&h);
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    scheduler.shutdown().await;

    assert!(h.persistence.health_checks.load(Ordering::SeqCst) > checks_after_start);
}

#[tokio::test]
async fn test_restart_builds_fresh_task_set() {
    let h = Harness::new();
    let scheduler = scheduler(&h);

    scheduler.start();
    scheduler.shutdown().await;
    scheduler.start();

    assert!(scheduler.is_running());
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    assert!(scheduler.run_async(async move {
        flag.store(true, Ordering::SeqCst);
    }));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(ran.load(Ordering::SeqCst));

    scheduler.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_does_not_wait_for_blocked_task() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    scheduler.run_async(async {
        std::thread::sleep(Duration::from_secs(4));
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    scheduler.shutdown().await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(3), "waited on blocked task: {elapsed:?}");
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_overlapping_shutdowns_wait_for_the_same_drain() {
    let h = Harness::new();
    let scheduler = scheduler(&h);
    scheduler.start();

    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();
    scheduler.run_async(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        flag.store(true, Ordering::SeqCst);
    });

    let first = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.shutdown().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    scheduler.shutdown().await;
    assert!(finished.load(Ordering::SeqCst), "second shutdown returned mid-drain");

    first.await.unwrap();
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_termination_hook_and_stop_path_share_one_shutdown() {
    let h = Harness::new();
    let terminate = Arc::new(Notify::new());
    let source = terminate.clone();
    let scheduler = Arc::new(
        LifecycleScheduler::new(
            h.orchestrator.clone(),
            LifecycleConfig {
                termination_hook: true,
                ..fast_config()
            },
        )
        .with_termination_source(move || {
            let source = source.clone();
            async move { source.notified().await }
        }),
    );
    scheduler.start();

    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();
    scheduler.run_async(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        flag.store(true, Ordering::SeqCst);
    });

    terminate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!scheduler.is_running(), "termination hook did not stop the scheduler");

    scheduler.shutdown().await;
    assert!(finished.load(Ordering::SeqCst));
    assert!(!scheduler.run_async(async {}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_start_and_shutdown_leave_consistent_state() {
    let h = Harness::new();
    let scheduler = scheduler(&h);

    for _ in 0..50 {
        let starter = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.start() }
        });
        let stopper = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.shutdown().await }
        });
        starter.await.unwrap();
        stopper.await.unwrap();

        // Whoever won, running state and accepted work agree.
        assert_eq!(scheduler.is_running(), scheduler.run_async(async {}));

        scheduler.shutdown().await;
        assert!(!scheduler.is_running());
        assert!(!scheduler.run_async(async {}));
    }
}
