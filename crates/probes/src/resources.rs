// Resource load probes: load average and memory utilization

use async_trait::async_trait;
use sysinfo::System;
use tracing::debug;

use syshealth_core::domain::Category;
use syshealth_core::port::{Observation, Probe, ProbeContext};

/// 1-minute load average against per-core multipliers
///
/// A load of 1.0 per core means fully busy; `warn_per_core` and
/// `fail_per_core` scale with the core count so the same policy works on
/// any machine size.
pub struct LoadAverageProbe {
    name: String,
    warn_per_core: f64,
    fail_per_core: f64,
}

impl LoadAverageProbe {
    pub fn new(name: impl Into<String>, warn_per_core: f64, fail_per_core: f64) -> Self {
        Self {
            name: name.into(),
            warn_per_core,
            fail_per_core,
        }
    }
}

#[async_trait]
impl Probe for LoadAverageProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Resources
    }

    async fn run(&self, _ctx: &ProbeContext) -> Observation {
        let load = System::load_average();
        let cores = {
            let sys = System::new_all();
            sys.cpus().len().max(1)
        };
        debug!(one = load.one, five = load.five, fifteen = load.fifteen, cores, "load average read");

        let detail = format!(
            "load average (1/5/15m): {:.2} {:.2} {:.2} across {} cores",
            load.one, load.five, load.fifteen, cores
        );

        let per_core = load.one / cores as f64;
        if per_core >= self.fail_per_core {
            Observation::fail(detail)
        } else if per_core >= self.warn_per_core {
            Observation::warn(detail)
        } else {
            Observation::pass(detail)
        }
    }
}

/// Memory utilization percentage against warn/fail thresholds
pub struct MemoryProbe {
    name: String,
    warn_above_pct: f64,
    fail_above_pct: f64,
}

impl MemoryProbe {
    pub fn new(name: impl Into<String>, warn_above_pct: f64, fail_above_pct: f64) -> Self {
        Self {
            name: name.into(),
            warn_above_pct,
            fail_above_pct,
        }
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Resources
    }

    async fn run(&self, _ctx: &ProbeContext) -> Observation {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Observation::error("total memory reported as zero");
        }
        let used_pct = sys.used_memory() as f64 / total as f64 * 100.0;

        let detail = format!(
            "memory usage: {:.1}% ({} MiB of {} MiB)",
            used_pct,
            sys.used_memory() / 1024 / 1024,
            total / 1024 / 1024
        );

        if used_pct >= self.fail_above_pct {
            Observation::fail(detail)
        } else if used_pct >= self.warn_above_pct {
            Observation::warn(detail)
        } else {
            Observation::pass(detail)
        }
    }
}

/// Flags processes hogging CPU or memory
///
/// Scans the process table and reports any process above the per-process
/// CPU or memory thresholds. Hot processes are a Warn with the worst
/// offenders named, not a Fail - a busy process is a lead for an
/// operator, not a broken host.
pub struct ProcessHotlistProbe {
    name: String,
    cpu_hot_pct: f64,
    mem_hot_pct: f64,
}

impl ProcessHotlistProbe {
    pub fn new(name: impl Into<String>, cpu_hot_pct: f64, mem_hot_pct: f64) -> Self {
        Self {
            name: name.into(),
            cpu_hot_pct,
            mem_hot_pct,
        }
    }
}

#[async_trait]
impl Probe for ProcessHotlistProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Resources
    }

    async fn run(&self, _ctx: &ProbeContext) -> Observation {
        let sys = System::new_all();

        let total_mem = sys.total_memory().max(1);
        let mut hot: Vec<(String, f64, f64)> = sys
            .processes()
            .values()
            .filter_map(|process| {
                let cpu = process.cpu_usage() as f64;
                let mem = process.memory() as f64 / total_mem as f64 * 100.0;
                (cpu >= self.cpu_hot_pct || mem >= self.mem_hot_pct)
                    .then(|| (process.name().to_string(), cpu, mem))
            })
            .collect();

        let scanned = sys.processes().len();
        debug!(scanned, hot = hot.len(), "process table scanned");

        if hot.is_empty() {
            return Observation::pass(format!("no hot processes among {}", scanned));
        }

        hot.sort_by(|a, b| b.1.total_cmp(&a.1));
        let worst: Vec<String> = hot
            .iter()
            .take(3)
            .map(|(name, cpu, mem)| format!("{} (cpu {:.1}%, mem {:.1}%)", name, cpu, mem))
            .collect();

        Observation::warn(format!(
            "{} of {} processes above thresholds: {}",
            hot.len(),
            scanned,
            worst.join(", ")
        ))
    }
}
