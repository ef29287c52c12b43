// Probe Port
// Abstraction for a single diagnostic check against the host

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Category, Status};

/// Invocation parameters passed to a probe by the executor
///
/// `deadline` is the per-probe timeout the executor enforces; probes
/// doing their own I/O should bound it with this value so the underlying
/// socket or subprocess is released when the executor stops waiting.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub deadline: Duration,
}

impl ProbeContext {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

/// What a probe observed: the evaluated half of a `CheckResult`
///
/// The executor stamps duration and completion time and fills in the
/// probe's name and category.
#[derive(Debug, Clone)]
pub struct Observation {
    pub status: Status,
    pub message: String,
}

impl Observation {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Status::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Status::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    /// The probe could not evaluate its condition at all
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }
}

/// A single, independently executable diagnostic check
///
/// Implementations must not mutate shared engine state. `run` should
/// return within `ctx.deadline`; the executor forcibly records a Timeout
/// result past that point and stops waiting. A panic inside `run` is
/// isolated by the executor and recorded as an Error result.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Unique within the probe's category
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    async fn run(&self, ctx: &ProbeContext) -> Observation;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted probe behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return the given status immediately
        Status(Status),
        /// Sleep for the given duration, then pass
        Sleep(Duration),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock probe for engine tests
    pub struct MockProbe {
        name: String,
        category: Category,
        behavior: MockBehavior,
        run_count: Arc<AtomicUsize>,
    }

    impl MockProbe {
        pub fn new(name: impl Into<String>, category: Category, behavior: MockBehavior) -> Self {
            Self {
                name: name.into(),
                category,
                behavior,
                run_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn passing(name: impl Into<String>, category: Category) -> Self {
            Self::new(name, category, MockBehavior::Status(Status::Pass))
        }

        pub fn failing(name: impl Into<String>, category: Category) -> Self {
            Self::new(name, category, MockBehavior::Status(Status::Fail))
        }

        pub fn panicking(name: impl Into<String>, category: Category, msg: impl Into<String>) -> Self {
            Self::new(name, category, MockBehavior::Panic(msg.into()))
        }

        pub fn sleeping(name: impl Into<String>, category: Category, d: Duration) -> Self {
            Self::new(name, category, MockBehavior::Sleep(d))
        }

        /// Number of times `run` was actually entered
        pub fn run_count(&self) -> usize {
            self.run_count.load(Ordering::SeqCst)
        }

        /// Handle to the run counter, usable after the probe is moved into a registry
        pub fn run_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.run_count)
        }
    }

    #[async_trait]
    impl Probe for MockProbe {
        fn name(&self) -> &str {
            &self.name
        }

        fn category(&self) -> Category {
            self.category.clone()
        }

        async fn run(&self, _ctx: &ProbeContext) -> Observation {
            self.run_count.fetch_add(1, Ordering::SeqCst);

            match &self.behavior {
                MockBehavior::Status(status) => {
                    Observation::new(*status, format!("mock {} outcome", status))
                }
                MockBehavior::Sleep(d) => {
                    tokio::time::sleep(*d).await;
                    Observation::pass("mock slept")
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for isolation testing
                }
            }
        }
    }
}
