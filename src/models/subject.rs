use serde::{Deserialize, Serialize};

use crate::entities::subjects;

/// Color used when a subject is created without one.
pub const DEFAULT_SUBJECT_COLOR: &str = "#6366f1";

/// Subjects every account starts with, in creation order.
pub const DEFAULT_SUBJECTS: [(&str, &str); 3] = [
    ("Study", "#6366f1"),
    ("Work", "#22d3ee"),
    ("Reading", "#f472b6"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: String,
}

impl From<subjects::Model> for Subject {
    fn from(model: subjects::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            color: model.color,
            icon: model.icon,
            created_at: model.created_at,
        }
    }
}

/// The slice of a subject embedded in session listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<&Subject> for SubjectRef {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            color: subject.color.clone(),
        }
    }
}

impl From<subjects::Model> for SubjectRef {
    fn from(model: subjects::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct SubjectChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the stored icon.
    pub icon: Option<Option<String>>,
}
