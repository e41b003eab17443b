use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl SessionStatus {
    pub fn is_running(&self) -> bool {
        *self == SessionStatus::Running
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, SessionStatus::Succeeded | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Succeeded => "succeeded",
            SessionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One generation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub topic: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Local>,
}

impl Session {
    pub fn start(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            status: SessionStatus::Running,
            started_at: Local::now(),
        }
    }
}
