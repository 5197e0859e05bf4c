use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle of the scan worker.
///
/// Transitions are strictly `Idle -> Scanning -> Stopping -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WorkerStatus {
    /// The sensor is not open.
    #[default]
    Idle,
    /// The ingestion loop is running.
    Scanning,
    /// The sensor is being released.
    Stopping,
}

impl WorkerStatus {
    /// Whether `next` is the only state allowed to follow `self`.
    pub fn can_transition_to(self, next: WorkerStatus) -> bool {
        matches!(
            (self, next),
            (WorkerStatus::Idle, WorkerStatus::Scanning)
                | (WorkerStatus::Scanning, WorkerStatus::Stopping)
                | (WorkerStatus::Stopping, WorkerStatus::Idle)
        )
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WorkerStatus::Idle => write!(f, "Idle"),
            WorkerStatus::Scanning => write!(f, "Scanning"),
            WorkerStatus::Stopping => write!(f, "Stopping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(WorkerStatus::Idle.can_transition_to(WorkerStatus::Scanning));
        assert!(WorkerStatus::Scanning.can_transition_to(WorkerStatus::Stopping));
        assert!(WorkerStatus::Stopping.can_transition_to(WorkerStatus::Idle));

        assert!(!WorkerStatus::Idle.can_transition_to(WorkerStatus::Stopping));
        assert!(!WorkerStatus::Scanning.can_transition_to(WorkerStatus::Idle));
        assert!(!WorkerStatus::Stopping.can_transition_to(WorkerStatus::Scanning));
        assert!(!WorkerStatus::Idle.can_transition_to(WorkerStatus::Idle));
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerStatus::Idle.to_string(), "Idle");
        assert_eq!(WorkerStatus::Scanning.to_string(), "Scanning");
        assert_eq!(WorkerStatus::Stopping.to_string(), "Stopping");
        assert_eq!(WorkerStatus::default(), WorkerStatus::Idle);
    }
}
