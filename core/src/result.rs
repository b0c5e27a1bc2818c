//! Per-attempt publish outcomes

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome classification of one publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    /// The publish call returned without error
    Success,
    /// The publish call failed
    Failed,
}

impl PublishStatus {
    /// Check if this status indicates success
    pub fn is_success(&self) -> bool {
        matches!(self, PublishStatus::Success)
    }
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStatus::Success => write!(f, "success"),
            PublishStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable record of one publish attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    /// Worker that made the attempt
    pub worker_id: usize,
    /// Session the attempt was made on
    pub session_id: u64,
    /// Outcome
    pub status: PublishStatus,
    /// Error detail for failed attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time spent in the publish call
    pub duration: Duration,
    /// Payload bytes sent; 0 on failure
    pub size: u64,
    /// Wall-clock time the attempt finished
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl PublishResult {
    /// Record a successful attempt
    pub fn success(worker_id: usize, session_id: u64, duration: Duration, size: u64) -> Self {
        Self {
            worker_id,
            session_id,
            status: PublishStatus::Success,
            error: None,
            duration,
            size,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Record a failed attempt
    pub fn failure(
        worker_id: usize,
        session_id: u64,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            worker_id,
            session_id,
            status: PublishStatus::Failed,
            error: Some(error.into()),
            duration,
            size: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Check if the attempt succeeded
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
