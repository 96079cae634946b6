//! Error reports that users can refer back to.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, warn};
use uuid::Uuid;

use crate::request::UserId;

/// Identifier shown to the user so a report can be found later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Records `error` on behalf of `user`. Never fails.
    async fn report(&self, error: &anyhow::Error, user: UserId) -> CorrelationToken;
}

#[derive(Serialize)]
struct ReportLine<'a> {
    token: &'a CorrelationToken,
    user_id: UserId,
    timestamp: String,
    error: String,
}

/// Logs reports through `tracing` and optionally appends them to a JSON
/// lines file.
#[derive(Debug, Clone, Default)]
pub struct LogReporter {
    log_path: Option<PathBuf>,
}

impl LogReporter {
    pub fn new(log_path: Option<PathBuf>) -> Self {
        Self { log_path }
    }

    async fn append(&self, line: &ReportLine<'_>) -> anyhow::Result<()> {
        let Some(path) = self.log_path.clone() else {
            return Ok(());
        };
        let mut json = serde_json::to_string(line)?;
        json.push('\n');

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(json.as_bytes())?;
            Ok(())
        })
        .await?
    }
}

#[async_trait]
impl ErrorReporter for LogReporter {
    async fn report(&self, err: &anyhow::Error, user: UserId) -> CorrelationToken {
        let token = CorrelationToken::new();
        error!(token = %token, user_id = %user, error = ?err, "Command failed");

        let line = ReportLine {
            token: &token,
            user_id: user,
            timestamp: Utc::now().to_rfc3339(),
            error: format!("{err:#}"),
        };
        if let Err(e) = self.append(&line).await {
            warn!(error = ?e, path = ?self.log_path, "Failed to write error report");
        }

        token
    }
}

/// A report kept by [`RecordingReporter`].
#[derive(Debug, Clone)]
pub struct RecordedReport {
    pub token: CorrelationToken,
    pub user: UserId,
    pub message: String,
}

/// Keeps reports in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<RecordedReport>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, error: &anyhow::Error, user: UserId) -> CorrelationToken {
        let token = CorrelationToken::new();
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedReport {
                token: token.clone(),
                user,
                message: format!("{error:#}"),
            });
        token
    }
}
