// Periodic mode: report cadence and stop semantics

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use syshealth_core::application::{Engine, ExecOptions, ProbeRegistry, Selection};
use syshealth_core::domain::Category;
use syshealth_core::port::probe::mocks::MockProbe;
use syshealth_core::port::Probe;

fn engine() -> Engine {
    let mut registry = ProbeRegistry::new();
    registry
        .register(Arc::new(MockProbe::passing("internet", Category::Network)) as Arc<dyn Probe>)
        .unwrap();
    Engine::new(registry)
}

#[tokio::test]
async fn reports_arrive_on_the_interval_until_stopped() {
    let engine = engine();
    let scheduler = engine.scheduler(Selection::All, ExecOptions::default());
    let mut reports = scheduler.subscribe();

    scheduler.start(Duration::from_millis(100)).unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    scheduler.stop();

    // Let any run that was in flight at stop time drain before counting
    tokio::time::sleep(Duration::from_millis(250)).await;

    // Immediate first run plus interval ticks: boundary-tolerant window
    let mut delivered = 0;
    while let Ok(report) = reports.try_recv() {
        assert_eq!(report.results.len(), 1);
        delivered += 1;
    }
    assert!(
        (3..=5).contains(&delivered),
        "expected 3..=5 reports in 350ms at 100ms interval, got {}",
        delivered
    );

    // Nothing further after stop
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(matches!(reports.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn subscriber_after_start_sees_subsequent_reports() {
    let engine = engine();
    let scheduler = engine.scheduler(Selection::All, ExecOptions::default());

    scheduler.start(Duration::from_millis(50)).unwrap();
    let mut late = scheduler.subscribe();

    let report = tokio::time::timeout(Duration::from_secs(1), late.recv())
        .await
        .expect("no report within 1s")
        .expect("channel closed");
    assert_eq!(report.results.len(), 1);

    scheduler.stop();
}

#[tokio::test]
async fn stop_is_idempotent_from_the_caller_side() {
    let engine = engine();
    let scheduler = engine.scheduler(Selection::All, ExecOptions::default());

    scheduler.start(Duration::from_millis(100)).unwrap();
    scheduler.stop();
    scheduler.stop();
    scheduler.stop();
    assert!(scheduler.is_stopped());
}
