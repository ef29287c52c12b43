// Application Layer - Engine use cases

pub mod constants;
pub mod executor;
pub mod registry;
pub mod scheduler;

// Re-exports
pub use executor::{ExecOptions, Executor};
pub use registry::{ProbeRegistry, Selection};
pub use scheduler::Scheduler;

use std::sync::Arc;

use crate::domain::Report;
use crate::port::TimeProvider;

/// Single entry surface over registry + executor
///
/// Built once at startup from a fully registered `ProbeRegistry`; the
/// registry is read-only from here on, so `check` calls may overlap.
pub struct Engine {
    registry: Arc<ProbeRegistry>,
    executor: Arc<Executor>,
}

impl Engine {
    pub fn new(registry: ProbeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            executor: Arc::new(Executor::with_system_clock()),
        }
    }

    pub fn with_time_provider(registry: ProbeRegistry, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            registry: Arc::new(registry),
            executor: Arc::new(Executor::new(time_provider)),
        }
    }

    /// One-shot run of the selected probes
    pub async fn check(&self, selection: &Selection, options: &ExecOptions) -> Report {
        let probes = self.registry.select(selection);
        self.executor.execute(probes, options).await
    }

    /// Build a periodic scheduler over the same registry; call
    /// [`Scheduler::start`] with an interval to begin publishing
    pub fn scheduler(&self, selection: Selection, options: ExecOptions) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.executor),
            Arc::clone(&self.registry),
            selection,
            options,
        )
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }
}
