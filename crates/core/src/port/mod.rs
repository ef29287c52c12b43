// Port Layer - Interfaces the engine is built against

pub mod probe;
pub mod time_provider;

// Re-exports
pub use probe::{Observation, Probe, ProbeContext};
pub use time_provider::{SystemTimeProvider, TimeProvider};
