// Engine-level properties: result cardinality, ordering, timeout bound,
// fail-fast dispatch halting

use std::sync::Arc;
use std::time::{Duration, Instant};

use syshealth_core::application::{Engine, ExecOptions, ProbeRegistry, Selection};
use syshealth_core::domain::{Category, Status};
use syshealth_core::port::probe::mocks::MockProbe;
use syshealth_core::port::Probe;

fn engine_with(probes: Vec<MockProbe>) -> Engine {
    let mut registry = ProbeRegistry::new();
    for probe in probes {
        registry.register(Arc::new(probe) as Arc<dyn Probe>).unwrap();
    }
    Engine::new(registry)
}

#[tokio::test]
async fn exactly_one_result_per_probe_for_every_concurrency_bound() {
    for bound in [0usize, 1, 3, 16] {
        let engine = engine_with(vec![
            MockProbe::passing("internet", Category::Network),
            MockProbe::failing("dns", Category::Network),
            MockProbe::sleeping("disk", Category::Filesystem, Duration::from_millis(30)),
            MockProbe::panicking("mysql", Category::Database, "driver exploded"),
        ]);

        let report = engine
            .check(
                &Selection::All,
                &ExecOptions {
                    max_concurrency: bound,
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(report.results.len(), 4, "bound {}", bound);

        // Report order is registration order regardless of completion order
        let names: Vec<&str> = report.results.iter().map(|r| r.probe_name.as_str()).collect();
        assert_eq!(names, vec!["internet", "dns", "disk", "mysql"], "bound {}", bound);
    }
}

#[tokio::test]
async fn category_selection_runs_only_that_category() {
    let engine = engine_with(vec![
        MockProbe::passing("internet", Category::Network),
        MockProbe::passing("disk", Category::Filesystem),
        MockProbe::passing("dns", Category::Network),
    ]);

    let report = engine
        .check(
            &Selection::Category(Category::Network),
            &ExecOptions::default(),
        )
        .await;

    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.category == Category::Network));
}

#[tokio::test]
async fn selecting_nothing_yields_empty_pass_report() {
    let engine = engine_with(vec![MockProbe::passing("internet", Category::Network)]);

    let report = engine
        .check(
            &Selection::Probe("no-such-probe".to_string()),
            &ExecOptions::default(),
        )
        .await;

    assert!(report.is_empty());
    assert_eq!(report.overall_status, Status::Pass);
}

#[tokio::test]
async fn execute_returns_promptly_after_probe_deadline() {
    let engine = engine_with(vec![MockProbe::sleeping(
        "stuck",
        Category::Services,
        Duration::from_secs(60),
    )]);

    let started = Instant::now();
    let report = engine
        .check(
            &Selection::All,
            &ExecOptions {
                per_probe_timeout: Duration::from_millis(100),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(report.results[0].status, Status::Timeout);
    // Deadline plus scheduling overhead, nowhere near the probe's sleep
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "executor waited past the deadline: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn panic_message_is_captured_verbatim() {
    let engine = engine_with(vec![
        MockProbe::panicking("boom", Category::Services, "systemctl went missing"),
        MockProbe::passing("calm", Category::Services),
    ]);

    let report = engine.check(&Selection::All, &ExecOptions::default()).await;

    assert_eq!(report.results[0].status, Status::Error);
    assert_eq!(report.results[0].message, "systemctl went missing");
    assert_eq!(report.results[1].status, Status::Pass);
}

#[tokio::test]
async fn fail_fast_report_contains_fewer_results_than_selected() {
    let engine = engine_with(vec![
        MockProbe::failing("a", Category::Network),
        MockProbe::passing("b", Category::Network),
        MockProbe::passing("c", Category::Network),
    ]);

    let report = engine
        .check(
            &Selection::All,
            &ExecOptions {
                max_concurrency: 1,
                fail_fast: true,
                ..Default::default()
            },
        )
        .await;

    assert!(
        report.results.len() < 3,
        "expected halted dispatch, got {} results",
        report.results.len()
    );
    // No fabricated Skipped rows: the report is simply shorter
    assert_eq!(report.overall_status, Status::Fail);
}

#[tokio::test]
async fn report_round_trips_through_json() {
    let engine = engine_with(vec![
        MockProbe::passing("internet", Category::Network),
        MockProbe::failing("disk", Category::Filesystem),
    ]);

    let report = engine.check(&Selection::All, &ExecOptions::default()).await;
    let json = serde_json::to_string(&report).unwrap();
    let parsed: syshealth_core::domain::Report = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.results.len(), 2);
    assert_eq!(parsed.overall_status, Status::Fail);
}
