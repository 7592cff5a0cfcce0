//! Domain service for the subject registry.
//!
//! Subjects are scoped by owner. "Does not exist" and "belongs to someone
//! else" both surface as [`SubjectError::NotFound`].

use thiserror::Error;

use crate::models::Subject;

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("Subject not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SubjectError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SubjectError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateSubjectInput {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Fields left as `None` keep their stored value. `icon: Some(None)` or a
/// blank icon clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSubjectInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

#[async_trait::async_trait]
pub trait SubjectService: Send + Sync {
    /// Lists the caller's subjects, oldest first.
    async fn list(&self, user_id: i32) -> Result<Vec<Subject>, SubjectError>;

    /// # Errors
    ///
    /// Returns [`SubjectError::Validation`] when the name is blank.
    async fn create(&self, user_id: i32, input: CreateSubjectInput)
    -> Result<Subject, SubjectError>;

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: UpdateSubjectInput,
    ) -> Result<Subject, SubjectError>;

    /// Deletes the subject and, through the database cascade, its sessions.
    async fn delete(&self, user_id: i32, id: i32) -> Result<(), SubjectError>;
}
