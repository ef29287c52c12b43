// Disk capacity probe

use std::path::PathBuf;

use async_trait::async_trait;
use sysinfo::Disks;
use tracing::debug;

use syshealth_core::domain::Category;
use syshealth_core::port::{Observation, Probe, ProbeContext};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Free-space check against the disk backing a path
///
/// Low free space is policy, not a constant: below `warn_below_gb` the
/// result is Warn, below the harder `fail_below_gb` it is Fail. Both
/// thresholds are caller-supplied.
pub struct DiskSpaceProbe {
    name: String,
    path: PathBuf,
    warn_below_gb: f64,
    fail_below_gb: f64,
}

impl DiskSpaceProbe {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        warn_below_gb: f64,
        fail_below_gb: f64,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            warn_below_gb,
            fail_below_gb,
        }
    }
}

#[async_trait]
impl Probe for DiskSpaceProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Filesystem
    }

    async fn run(&self, _ctx: &ProbeContext) -> Observation {
        let disks = Disks::new_with_refreshed_list();

        // Longest mount point that is a prefix of the path wins
        let disk = disks
            .iter()
            .filter(|d| self.path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());

        let Some(disk) = disk else {
            // Cannot evaluate the condition at all
            return Observation::error(format!("no disk found backing {}", self.path.display()));
        };

        let free_gb = disk.available_space() as f64 / GIB;
        let total_gb = disk.total_space() as f64 / GIB;
        debug!(path = %self.path.display(), free_gb, total_gb, "disk usage read");

        let detail = format!(
            "{:.1} GiB free of {:.1} GiB on {}",
            free_gb,
            total_gb,
            disk.mount_point().display()
        );

        if free_gb < self.fail_below_gb {
            Observation::fail(format!("{} (below {:.1} GiB hard limit)", detail, self.fail_below_gb))
        } else if free_gb < self.warn_below_gb {
            Observation::warn(format!("{} (below {:.1} GiB soft limit)", detail, self.warn_below_gb))
        } else {
            Observation::pass(detail)
        }
    }
}
