//! Domain service for the session ledger and its month aggregation.

use thiserror::Error;

use crate::models::FocusSession;
use crate::services::analytics::{MonthRange, MonthView};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Subject not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for LedgerError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<crate::models::timestamp::InvalidTimestamp> for LedgerError {
    fn from(err: crate::models::timestamp::InvalidTimestamp) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Raw create request; every field is optional so that missing input is a
/// validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default)]
pub struct RecordSessionInput {
    pub subject_id: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
pub trait LedgerService: Send + Sync {
    /// Persists one completed focus interval.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] when a required field is missing or
    /// malformed, [`LedgerError::NotFound`] when the subject is not
    /// owned by the caller. Nothing is written in either case.
    async fn record(
        &self,
        user_id: i32,
        input: RecordSessionInput,
    ) -> Result<FocusSession, LedgerError>;

    /// Sessions whose start time is within the given inclusive bounds,
    /// newest first. Absent bounds are open.
    async fn list(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<FocusSession>, LedgerError>;

    /// Loads exactly one month from the ledger and aggregates it.
    async fn month_view(&self, user_id: i32, range: MonthRange) -> Result<MonthView, LedgerError>;
}
