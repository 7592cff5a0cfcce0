use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::warn;

use crate::entities::{focus_sessions, prelude::*};
use crate::models::timestamp::now_timestamp;
use crate::models::{FocusSession, NewFocusSession, SubjectRef};

/// Append-only ledger of completed focus intervals.
pub struct FocusSessionRepository {
    conn: DatabaseConnection,
}

impl FocusSessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The caller must have checked that `session.subject_id` belongs to `user_id`.
    pub async fn create(
        &self,
        user_id: i32,
        session: NewFocusSession,
    ) -> Result<focus_sessions::Model> {
        let model = focus_sessions::ActiveModel {
            user_id: Set(user_id),
            subject_id: Set(session.subject_id),
            start_time: Set(session.start_time),
            end_time: Set(session.end_time),
            duration: Set(session.duration),
            notes: Set(session.notes),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert focus session")?;

        Ok(model)
    }

    /// Sessions whose start time lies within the present bounds (both
    /// inclusive), newest first. Bounds must already be normalized.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<FocusSession>> {
        let mut query = FocusSessions::find().filter(focus_sessions::Column::UserId.eq(user_id));

        if let Some(from) = from {
            query = query.filter(focus_sessions::Column::StartTime.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(focus_sessions::Column::StartTime.lte(to));
        }

        let rows = query
            .order_by_desc(focus_sessions::Column::StartTime)
            .order_by_desc(focus_sessions::Column::Id)
            .find_also_related(Subjects)
            .all(&self.conn)
            .await
            .context("Failed to list focus sessions")?;

        Ok(rows
            .into_iter()
            .filter_map(|(session, subject)| {
                let Some(subject) = subject else {
                    warn!(session_id = session.id, "Focus session without subject, skipping");
                    return None;
                };
                Some(FocusSession::from_parts(session, SubjectRef::from(subject)))
            })
            .collect())
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        let count = FocusSessions::find()
            .filter(focus_sessions::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count focus sessions")?;

        Ok(count)
    }
}
