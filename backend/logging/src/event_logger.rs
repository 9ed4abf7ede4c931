//! Verdict Event Logger
//!
//! One structured event per invocation, emitted under the `imageguard_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
    InvalidInput,
    Failed,
}

impl Outcome {
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            200 => Outcome::Accepted,
            403 => Outcome::Rejected,
            400 => Outcome::InvalidInput,
            _ => Outcome::Failed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerdictEvent {
    pub invocation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    pub outcome: Outcome,
    pub reason_count: usize,
    pub location_type: Option<String>,
    pub latency_ms: u64,
    /// Internal failure detail, redacted. Never sent to callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerdictEvent {
    pub fn new(status_code: u16) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            status_code,
            outcome: Outcome::from_status(status_code),
            reason_count: 0,
            location_type: None,
            latency_ms: 0,
            error: None,
        }
    }

    pub fn with_reasons(mut self, count: usize) -> Self {
        self.reason_count = count;
        self
    }

    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.location_type = location.map(str::to_string);
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.error = Some(redact_sensitive_data(&error.to_string()));
        self
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_verdict(event: &VerdictEvent) {
        info!(
            target: "imageguard_events",
            invocation_id = %event.invocation_id,
            status_code = event.status_code,
            outcome = ?event.outcome,
            reason_count = event.reason_count,
            location_type = event.location_type.as_deref(),
            latency_ms = event.latency_ms,
            error = event.error.as_deref(),
            "Image analysis completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_follows_status() {
        assert_eq!(Outcome::from_status(200), Outcome::Accepted);
        assert_eq!(Outcome::from_status(403), Outcome::Rejected);
        assert_eq!(Outcome::from_status(400), Outcome::InvalidInput);
        assert_eq!(Outcome::from_status(500), Outcome::Failed);
    }

    #[test]
    fn error_detail_is_redacted() {
        let event = VerdictEvent::new(500)
            .with_error("vision API returned 401: Bearer abc.def.ghi rejected");
        let detail = event.error.unwrap();
        assert!(!detail.contains("abc.def.ghi"));
    }
}
