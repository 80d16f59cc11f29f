use std::fmt;

/// Outcome of a check run, ordered from best to worst.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStatus {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl RunStatus {
    /// Process exit code expected by the scheduler.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Ok => 0,
            RunStatus::Warning => 1,
            RunStatus::Critical => 2,
        }
    }

    /// Keep the worse of two statuses.
    pub fn degrade(self, other: RunStatus) -> RunStatus {
        self.max(other)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Ok => write!(f, "OK"),
            RunStatus::Warning => write!(f, "WARNING"),
            RunStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}
