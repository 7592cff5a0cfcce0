use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subject::SubjectRef;
use super::timestamp::format_timestamp;
use crate::entities::focus_sessions;

/// A persisted focus interval joined with its subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: i32,
    pub user_id: i32,
    pub subject_id: i32,
    pub start_time: String,
    pub end_time: String,
    /// Seconds
    pub duration: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub subject: SubjectRef,
}

impl FocusSession {
    #[must_use]
    pub fn from_parts(model: focus_sessions::Model, subject: SubjectRef) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            subject_id: model.subject_id,
            start_time: model.start_time,
            end_time: model.end_time,
            duration: model.duration,
            notes: model.notes,
            created_at: model.created_at,
            subject,
        }
    }
}

/// Validated input for the ledger; timestamps already normalized.
#[derive(Debug, Clone)]
pub struct NewFocusSession {
    pub subject_id: i32,
    pub start_time: String,
    pub end_time: String,
    pub duration: i64,
    pub notes: Option<String>,
}

/// What a finished timer run hands to its sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub subject_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Configured run length in seconds, not the measured wall-clock span.
    pub duration_seconds: i64,
}

impl SessionDraft {
    #[must_use]
    pub fn into_new_session(self) -> NewFocusSession {
        NewFocusSession {
            subject_id: self.subject_id,
            start_time: format_timestamp(self.start_time),
            end_time: format_timestamp(self.end_time),
            duration: self.duration_seconds,
            notes: None,
        }
    }
}
