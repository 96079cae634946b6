use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Info,
    Error,
}

/// A message the bot sends back to the user who issued a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub timestamp: u64,
    pub kind: ReplyKind,
    pub content: String,
}

impl Reply {
    pub fn info(content: String) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis() as u64,
            kind: ReplyKind::Info,
            content,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis() as u64,
            kind: ReplyKind::Error,
            content,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ReplyKind::Error
    }
}
