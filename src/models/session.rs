use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::network::CapturedResponse;
use super::step::RecordedStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// One recording session: the ordered step log plus lifecycle metadata.
/// Replaced wholesale by a new `start`, retained after `stop` for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: String,
    pub start_url: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub steps: Vec<RecordedStep>,
    /// Snapshot of the monitor's captured responses, taken at stop.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<CapturedResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

impl RecordingSession {
    pub fn new(start_url: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            start_url: start_url.to_string(),
            status: SessionStatus::Recording,
            steps: Vec::new(),
            responses: Vec::new(),
            started_at: Some(Utc::now()),
            stopped_at: None,
        }
    }

    /// Recording or paused; a stopped session can be exported but no longer
    /// accepts events or edits.
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Recording | SessionStatus::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_recording() {
        let session = RecordingSession::new("https://example.com");
        assert_eq!(session.status, SessionStatus::Recording);
        assert!(session.is_active());
        assert!(session.steps.is_empty());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(SessionStatus::Recording).unwrap();
        assert_eq!(json, "recording");
    }
}
