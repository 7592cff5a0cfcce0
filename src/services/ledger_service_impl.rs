//! `SeaORM` implementation of the `LedgerService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::timestamp::{normalize_range_bound, normalize_timestamp};
use crate::models::{FocusSession, NewFocusSession, SubjectRef};
use crate::services::analytics::{MonthRange, MonthView, build_month_view};
use crate::services::ledger_service::{LedgerError, LedgerService, RecordSessionInput};

pub struct SeaOrmLedgerService {
    store: Store,
}

impl SeaOrmLedgerService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Longest session the ledger accepts, one leap year of seconds.
pub const MAX_DURATION_SECONDS: i64 = 366 * 24 * 60 * 60;

fn missing_fields() -> LedgerError {
    LedgerError::Validation("Missing required fields".to_string())
}

fn validate(input: RecordSessionInput) -> Result<NewFocusSession, LedgerError> {
    let (Some(subject_id), Some(start_time), Some(end_time), Some(duration)) = (
        input.subject_id,
        input.start_time.filter(|s| !s.trim().is_empty()),
        input.end_time.filter(|s| !s.trim().is_empty()),
        input.duration,
    ) else {
        return Err(missing_fields());
    };

    if duration < 0 {
        return Err(LedgerError::Validation(
            "Duration cannot be negative".to_string(),
        ));
    }

    if duration > MAX_DURATION_SECONDS {
        return Err(LedgerError::Validation(format!(
            "Duration cannot exceed {MAX_DURATION_SECONDS} seconds"
        )));
    }

    Ok(NewFocusSession {
        subject_id,
        start_time: normalize_timestamp(&start_time)?,
        end_time: normalize_timestamp(&end_time)?,
        duration,
        notes: input
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

fn normalize_bound(bound: Option<&str>) -> Result<Option<String>, LedgerError> {
    bound
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(normalize_range_bound)
        .transpose()
        .map_err(LedgerError::from)
}

#[async_trait]
impl LedgerService for SeaOrmLedgerService {
    async fn record(
        &self,
        user_id: i32,
        input: RecordSessionInput,
    ) -> Result<FocusSession, LedgerError> {
        let session = validate(input)?;

        let subject = self
            .store
            .get_subject(user_id, session.subject_id)
            .await?
            .ok_or(LedgerError::NotFound)?;

        let model = self.store.insert_focus_session(user_id, session).await?;

        info!(
            user_id,
            session_id = model.id,
            subject_id = subject.id,
            duration = model.duration,
            "Focus session recorded"
        );

        Ok(FocusSession::from_parts(model, SubjectRef::from(&subject)))
    }

    async fn list(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<FocusSession>, LedgerError> {
        let from = normalize_bound(from)?;
        let to = normalize_bound(to)?;

        let sessions = self
            .store
            .list_focus_sessions(user_id, from.as_deref(), to.as_deref())
            .await?;

        debug!(user_id, count = sessions.len(), "Listed focus sessions");
        Ok(sessions)
    }

    async fn month_view(&self, user_id: i32, range: MonthRange) -> Result<MonthView, LedgerError> {
        let sessions = self
            .store
            .list_focus_sessions(
                user_id,
                Some(&range.from_bound()),
                Some(&range.to_bound()),
            )
            .await?;

        Ok(build_month_view(range, &sessions))
    }
}
