use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, subjects};
use crate::models::timestamp::now_timestamp;
use crate::models::{NewSubject, Subject, SubjectChanges};

/// Every query here is scoped by owning user; a subject that belongs to
/// someone else is indistinguishable from one that does not exist.
pub struct SubjectRepository {
    conn: DatabaseConnection,
}

impl SubjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Subject>> {
        let rows = Subjects::find()
            .filter(subjects::Column::UserId.eq(user_id))
            .order_by_asc(subjects::Column::CreatedAt)
            .order_by_asc(subjects::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list subjects")?;

        Ok(rows.into_iter().map(Subject::from).collect())
    }

    pub async fn get_owned(&self, user_id: i32, id: i32) -> Result<Option<Subject>> {
        let row = Subjects::find_by_id(id)
            .filter(subjects::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query subject")?;

        Ok(row.map(Subject::from))
    }

    pub async fn create(&self, user_id: i32, subject: NewSubject) -> Result<Subject> {
        let model = subjects::ActiveModel {
            user_id: Set(user_id),
            name: Set(subject.name),
            color: Set(subject.color),
            icon: Set(subject.icon),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert subject")?;

        Ok(Subject::from(model))
    }

    /// Returns `None` when the caller owns no subject with this id.
    pub async fn update_owned(
        &self,
        user_id: i32,
        id: i32,
        changes: SubjectChanges,
    ) -> Result<Option<Subject>> {
        let Some(existing) = Subjects::find_by_id(id)
            .filter(subjects::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query subject for update")?
        else {
            return Ok(None);
        };

        if changes.name.is_none() && changes.color.is_none() && changes.icon.is_none() {
            return Ok(Some(Subject::from(existing)));
        }

        let mut active: subjects::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(icon) = changes.icon {
            active.icon = Set(icon);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update subject")?;

        Ok(Some(Subject::from(updated)))
    }

    /// Sessions referencing the subject go with it through the foreign key.
    pub async fn delete_owned(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Subjects::delete_many()
            .filter(subjects::Column::Id.eq(id))
            .filter(subjects::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete subject")?;

        Ok(result.rows_affected > 0)
    }
}
