// Service liveness probe via the OS service manager

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use syshealth_core::domain::Category;
use syshealth_core::port::{Observation, Probe, ProbeContext};

const DEFAULT_MANAGER: &str = "systemctl";

/// Queries the service manager for a unit's active state
///
/// `<manager> is-active <unit>` printing "active" is a Pass; any other
/// verdict (inactive, failed, unknown) is a Fail. Not being able to
/// invoke the manager at all is an Error. The manager program is a field
/// so tests can substitute a stub command.
pub struct ServiceProbe {
    name: String,
    unit: String,
    manager: String,
}

impl ServiceProbe {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            manager: DEFAULT_MANAGER.to_string(),
        }
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = manager.into();
        self
    }
}

#[async_trait]
impl Probe for ServiceProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Services
    }

    async fn run(&self, ctx: &ProbeContext) -> Observation {
        // kill_on_drop: a hung manager must not outlive this probe's
        // deadline - resource reclamation is the probe's job, not the
        // executor's
        let output = timeout(
            ctx.deadline,
            Command::new(&self.manager)
                .arg("is-active")
                .arg(&self.unit)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Err(_) => Observation::error(format!(
                "{} gave no answer for {} within {}ms",
                self.manager,
                self.unit,
                ctx.deadline.as_millis()
            )),
            Ok(Ok(output)) => {
                let verdict = String::from_utf8_lossy(&output.stdout).trim().to_string();
                debug!(unit = %self.unit, %verdict, "service state queried");

                if verdict == "active" {
                    Observation::pass(format!("service {} is active", self.unit))
                } else {
                    let shown = if verdict.is_empty() { "unknown" } else { &verdict };
                    Observation::fail(format!("service {} is {}", self.unit, shown))
                }
            }
            Ok(Err(e)) => Observation::error(format!("cannot invoke {}: {}", self.manager, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use syshealth_core::domain::Status;

    fn ctx() -> ProbeContext {
        ProbeContext::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn missing_manager_is_error() {
        let probe =
            ServiceProbe::new("sshd", "sshd").with_manager("/nonexistent/service-manager");
        let observation = probe.run(&ctx()).await;

        assert_eq!(observation.status, Status::Error);
        assert!(!observation.message.is_empty());
    }

    #[tokio::test]
    async fn non_active_verdict_is_fail() {
        // `echo is-active <unit>` prints the arguments, never "active"
        let probe = ServiceProbe::new("stub", "someunit").with_manager("echo");
        let observation = probe.run(&ctx()).await;

        assert_eq!(observation.status, Status::Fail);
        assert!(observation.message.contains("someunit"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_manager_is_killed_at_the_deadline() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        // Stub manager that never answers. The trailing exit keeps the
        // shell process alive (no tail-exec), so its command line stays
        // findable by the script path.
        let script = std::env::temp_dir().join(format!("syshealth-hang-{}.sh", std::process::id()));
        {
            let mut file = std::fs::File::create(&script).unwrap();
            writeln!(file, "#!/bin/sh\nsleep 30\nexit 0").unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = ServiceProbe::new("hang", "someunit")
            .with_manager(script.to_str().unwrap());
        let observation = probe
            .run(&ProbeContext::new(Duration::from_millis(200)))
            .await;

        assert_eq!(observation.status, Status::Error);
        assert!(observation.message.contains("no answer"));

        // The dropped wait must have taken the child with it
        tokio::time::sleep(Duration::from_millis(300)).await;
        let leftover = std::process::Command::new("pgrep")
            .arg("-f")
            .arg(script.to_str().unwrap())
            .output()
            .unwrap();
        assert!(
            !leftover.status.success(),
            "manager child still running after deadline: {}",
            String::from_utf8_lossy(&leftover.stdout)
        );

        let _ = std::fs::remove_file(&script);
    }
}
