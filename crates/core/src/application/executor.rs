// Executor - runs a selected probe set under a concurrency/timeout policy
//
// Each probe is dispatched as its own tokio task; panics are caught inside
// the task so the fault is recorded with the probe's own timing, and the
// JoinHandle boundary stays as a backstop against task cancellation.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::application::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PER_PROBE_TIMEOUT};
use crate::domain::{CheckResult, Report, Status};
use crate::port::probe::Observation;
use crate::port::{Probe, ProbeContext, SystemTimeProvider, TimeProvider};

/// Execution policy for one run
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Deadline per probe; past it the probe is recorded as Timeout and
    /// the executor stops waiting on it
    pub per_probe_timeout: std::time::Duration,
    /// Maximum probes in flight; 0 means unbounded
    pub max_concurrency: usize,
    /// Halt dispatch of not-yet-started probes once any probe fails
    pub fail_fast: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            per_probe_timeout: DEFAULT_PER_PROBE_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fail_fast: false,
        }
    }
}

/// Runs probes and collects their results into a Report
///
/// The executor is the only writer of the Report it builds. Probe faults
/// (panics) and deadline overruns become result rows, never engine errors:
/// with `fail_fast` off, every dispatched probe yields exactly one
/// `CheckResult`.
pub struct Executor {
    time_provider: Arc<dyn TimeProvider>,
}

impl Executor {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Executor stamping results with the system clock
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemTimeProvider))
    }

    /// Run the given probes and return a Report
    ///
    /// Result order in the Report is the order of `probes` (registry
    /// order), regardless of completion order. An empty probe list yields
    /// an empty Pass report. This never returns an error: there is no
    /// probe outcome that does not map onto a `CheckResult`.
    pub async fn execute(&self, probes: Vec<Arc<dyn Probe>>, options: &ExecOptions) -> Report {
        let run_started = Instant::now();
        let selected = probes.len();

        let semaphore = (options.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(options.max_concurrency)));
        let halt = Arc::new(AtomicBool::new(false));

        // Dispatch every probe as an independent task; handles stay in
        // registry order so reassembly below restores it.
        let mut handles = Vec::with_capacity(probes.len());
        for probe in &probes {
            let probe = Arc::clone(probe);
            let semaphore = semaphore.clone();
            let halt = Arc::clone(&halt);
            let time_provider = Arc::clone(&self.time_provider);
            let deadline = options.per_probe_timeout;
            let fail_fast = options.fail_fast;

            handles.push(tokio::spawn(async move {
                if fail_fast && halt.load(Ordering::SeqCst) {
                    return None;
                }

                let _permit = match &semaphore {
                    // acquire only fails on a closed semaphore, which we never close
                    Some(s) => s.acquire().await.ok(),
                    None => None,
                };

                // Re-check after waiting for a slot: a sibling may have
                // failed while this probe was queued.
                if fail_fast && halt.load(Ordering::SeqCst) {
                    return None;
                }

                let ctx = ProbeContext::new(deadline);
                let started = Instant::now();

                let outcome = AssertUnwindSafe(timeout(deadline, probe.run(&ctx)))
                    .catch_unwind()
                    .await;

                let observation = match outcome {
                    Ok(Ok(observation)) => observation,
                    // The dropped future is the probe's cancellation path;
                    // the synthetic Timeout row is authoritative for reporting.
                    Ok(Err(_)) => Observation::new(
                        Status::Timeout,
                        format!("probe exceeded {}ms deadline", deadline.as_millis()),
                    ),
                    Err(payload) => {
                        let message = panic_message(payload);
                        warn!(probe = probe.name(), %message, "probe panicked");
                        Observation::new(Status::Error, message)
                    }
                };

                if fail_fast && observation.status.is_failure() {
                    halt.store(true, Ordering::SeqCst);
                }

                Some(CheckResult {
                    probe_name: probe.name().to_string(),
                    category: probe.category(),
                    status: observation.status,
                    message: observation.message,
                    duration_ms: started.elapsed().as_millis() as u64,
                    completed_at: time_provider.now(),
                })
            }));
        }

        // Reassemble in dispatch order. Tasks run concurrently; awaiting
        // handle i while handle j is already done just collects j later.
        let mut results = Vec::with_capacity(probes.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {
                    debug!(probe = probes[idx].name(), "probe skipped by fail-fast");
                }
                Err(join_err) => {
                    // Panics are caught in-task; a JoinError here means the
                    // task itself was torn down before it could report.
                    let message = if join_err.is_panic() {
                        panic_message(join_err.into_panic())
                    } else {
                        "probe task cancelled".to_string()
                    };
                    warn!(probe = probes[idx].name(), %message, "probe task faulted");

                    if options.fail_fast {
                        halt.store(true, Ordering::SeqCst);
                    }
                    results.push(CheckResult {
                        probe_name: probes[idx].name().to_string(),
                        category: probes[idx].category(),
                        status: Status::Error,
                        message,
                        duration_ms: 0,
                        completed_at: self.time_provider.now(),
                    });
                }
            }
        }

        debug!(
            selected,
            collected = results.len(),
            elapsed_ms = run_started.elapsed().as_millis() as u64,
            "executor run finished"
        );

        Report::new(
            results,
            self.time_provider.now(),
            run_started.elapsed().as_millis() as u64,
        )
    }
}

/// Extract a human-readable message from a panic payload
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
