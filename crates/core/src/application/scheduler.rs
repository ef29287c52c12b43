//! Scheduler - periodic re-execution of a probe set for dashboard-style
//! monitoring
//!
//! Runs the executor immediately on `start`, then on every interval tick,
//! publishing each Report to subscribers over a bounded broadcast channel.
//! Delivery is fire-and-forget: a slow subscriber lags and loses the
//! oldest reports instead of stalling the probe cycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info};

use crate::application::constants::REPORT_CHANNEL_CAPACITY;
use crate::application::executor::{ExecOptions, Executor};
use crate::application::registry::{ProbeRegistry, Selection};
use crate::domain::Report;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Periodic runner over a read-only registry
///
/// State machine: Idle -> Running (via `start`) -> Stopped (via `stop`,
/// terminal). `stop` is idempotent; stopping an already-stopped scheduler
/// is a no-op.
pub struct Scheduler {
    executor: Arc<Executor>,
    registry: Arc<ProbeRegistry>,
    selection: Selection,
    options: ExecOptions,
    report_tx: broadcast::Sender<Report>,
    shutdown_tx: watch::Sender<bool>,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    pub fn new(
        executor: Arc<Executor>,
        registry: Arc<ProbeRegistry>,
        selection: Selection,
        options: ExecOptions,
    ) -> Self {
        let (report_tx, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            executor,
            registry,
            selection,
            options,
            report_tx,
            shutdown_tx,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    /// Subscribe to published reports
    ///
    /// Subscribers created after `start` only see reports published from
    /// that point on.
    pub fn subscribe(&self) -> broadcast::Receiver<Report> {
        self.report_tx.subscribe()
    }

    /// Begin periodic execution: one run immediately, then every `interval`
    ///
    /// # Errors
    /// `AppError::InvalidState` if the scheduler is already running or was
    /// stopped (Stopped is terminal).
    pub fn start(&self, interval: Duration) -> Result<()> {
        {
            let mut state = self.state.lock().expect("scheduler state lock poisoned");
            match *state {
                SchedulerState::Idle => *state = SchedulerState::Running,
                SchedulerState::Running => {
                    return Err(AppError::InvalidState("scheduler already running".into()))
                }
                SchedulerState::Stopped => {
                    return Err(AppError::InvalidState("scheduler was stopped".into()))
                }
            }
        }

        let executor = Arc::clone(&self.executor);
        let registry = Arc::clone(&self.registry);
        let selection = self.selection.clone();
        let options = self.options.clone();
        let report_tx = self.report_tx.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(interval_ms = interval.as_millis() as u64, "scheduler started");

        tokio::spawn(async move {
            // First tick completes immediately, giving the immediate first run
            let mut tick = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let probes = registry.select(&selection);
                        let report = executor.execute(probes, &options).await;

                        debug!(
                            overall = %report.overall_status,
                            results = report.results.len(),
                            "publishing report"
                        );
                        // send only fails with zero subscribers, which is fine
                        if report_tx.send(report).is_err() {
                            debug!("no subscribers for this report");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("scheduler stopping");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    /// Stop periodic execution. Idempotent; any in-flight run completes
    /// but its report may not be delivered before the loop exits.
    pub fn stop(&self) {
        let mut state = self.state.lock().expect("scheduler state lock poisoned");
        if *state == SchedulerState::Stopped {
            return;
        }
        *state = SchedulerState::Stopped;
        if self.shutdown_tx.send(true).is_err() {
            error!("scheduler loop already gone");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.state.lock().expect("scheduler state lock poisoned") == SchedulerState::Stopped
    }
}
