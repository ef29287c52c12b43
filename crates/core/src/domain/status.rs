// Check Status and Probe Category

use serde::{Deserialize, Serialize};

/// Outcome of a single check evaluation
///
/// `Warn` is distinct from `Fail` (condition degraded but not broken).
/// `Error` means the probe could not evaluate its condition at all;
/// `Fail` means the condition was evaluated and is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    Warn,
    Fail,
    Timeout,
    Error,
}

impl Status {
    /// Severity rank used for aggregation. Timeout and Error both count
    /// as failures; Warn sits between Pass and Fail.
    pub fn severity(&self) -> u8 {
        match self {
            Status::Pass => 0,
            Status::Warn => 1,
            Status::Fail | Status::Timeout | Status::Error => 2,
        }
    }

    /// True for any outcome that halts dispatch under fail-fast
    pub fn is_failure(&self) -> bool {
        self.severity() == 2
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Warn => write!(f, "WARN"),
            Status::Fail => write!(f, "FAIL"),
            Status::Timeout => write!(f, "TIMEOUT"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// Probe classification - open-ended via `Custom`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Network,
    Filesystem,
    Resources,
    Services,
    Database,
    Custom(String),
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Network => write!(f, "NETWORK"),
            Category::Filesystem => write!(f, "FILESYSTEM"),
            Category::Resources => write!(f, "RESOURCES"),
            Category::Services => write!(f, "SERVICES"),
            Category::Database => write!(f, "DATABASE"),
            Category::Custom(name) => write!(f, "{}", name.to_uppercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Status::Pass.severity() < Status::Warn.severity());
        assert!(Status::Warn.severity() < Status::Fail.severity());
        assert_eq!(Status::Fail.severity(), Status::Error.severity());
        assert_eq!(Status::Fail.severity(), Status::Timeout.severity());
    }

    #[test]
    fn failure_classification() {
        assert!(!Status::Pass.is_failure());
        assert!(!Status::Warn.is_failure());
        assert!(Status::Fail.is_failure());
        assert!(Status::Timeout.is_failure());
        assert!(Status::Error.is_failure());
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Network.to_string(), "NETWORK");
        assert_eq!(Category::Custom("gpu".to_string()).to_string(), "GPU");
    }
}
