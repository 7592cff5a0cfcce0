//! `SeaORM` implementation of the `SubjectService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::models::subject::DEFAULT_SUBJECT_COLOR;
use crate::models::{NewSubject, Subject, SubjectChanges};
use crate::services::subject_service::{
    CreateSubjectInput, SubjectError, SubjectService, UpdateSubjectInput,
};

pub struct SeaOrmSubjectService {
    store: Store,
}

impl SeaOrmSubjectService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl SubjectService for SeaOrmSubjectService {
    async fn list(&self, user_id: i32) -> Result<Vec<Subject>, SubjectError> {
        Ok(self.store.list_subjects(user_id).await?)
    }

    async fn create(
        &self,
        user_id: i32,
        input: CreateSubjectInput,
    ) -> Result<Subject, SubjectError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(SubjectError::Validation(
                "Subject name is required".to_string(),
            ));
        }

        let subject = NewSubject {
            name,
            color: non_blank(input.color).unwrap_or_else(|| DEFAULT_SUBJECT_COLOR.to_string()),
            icon: non_blank(input.icon),
        };

        let created = self.store.create_subject(user_id, subject).await?;
        info!(user_id, subject_id = created.id, "Subject created");
        Ok(created)
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: UpdateSubjectInput,
    ) -> Result<Subject, SubjectError> {
        let name = match input.name {
            Some(name) if name.trim().is_empty() => {
                return Err(SubjectError::Validation(
                    "Subject name cannot be empty".to_string(),
                ));
            }
            other => other.map(|n| n.trim().to_string()),
        };

        let changes = SubjectChanges {
            name,
            color: non_blank(input.color),
            icon: input.icon.map(non_blank),
        };

        self.store
            .update_subject(user_id, id, changes)
            .await?
            .ok_or(SubjectError::NotFound)
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), SubjectError> {
        if !self.store.delete_subject(user_id, id).await? {
            return Err(SubjectError::NotFound);
        }

        info!(user_id, subject_id = id, "Subject deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, temp_store};

    #[tokio::test]
    async fn test_create_defaults_color() {
        let store = temp_store().await;
        let user_id = seed_user(&store, "owner@example.com").await;
        let service = SeaOrmSubjectService::new(store);

        let subject = service
            .create(
                user_id,
                CreateSubjectInput {
                    name: "  Piano ".to_string(),
                    color: None,
                    icon: Some(String::new()),
                },
            )
            .await
            .unwrap();

        assert_eq!(subject.name, "Piano");
        assert_eq!(subject.color, DEFAULT_SUBJECT_COLOR);
        assert_eq!(subject.icon, None);

        let err = service
            .create(user_id, CreateSubjectInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubjectError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_creation() {
        let store = temp_store().await;
        let user_id = seed_user(&store, "order@example.com").await;
        let service = SeaOrmSubjectService::new(store);

        for name in ["First", "Second", "Third"] {
            service
                .create(
                    user_id,
                    CreateSubjectInput {
                        name: name.to_string(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let names: Vec<String> = service
            .list(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let store = temp_store().await;
        let user_id = seed_user(&store, "idem@example.com").await;
        let service = SeaOrmSubjectService::new(store);
        let subject = service
            .create(
                user_id,
                CreateSubjectInput {
                    name: "Math".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let change = UpdateSubjectInput {
            name: Some("Maths".to_string()),
            color: Some("#10b981".to_string()),
            icon: None,
        };
        let first = service
            .update(user_id, subject.id, change.clone())
            .await
            .unwrap();
        let second = service.update(user_id, subject.id, change).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.name, "Maths");
        assert_eq!(second.color, "#10b981");
        assert_eq!(service.list(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_sets_and_clears_icon() {
        let store = temp_store().await;
        let user_id = seed_user(&store, "icon@example.com").await;
        let service = SeaOrmSubjectService::new(store);
        let subject = service
            .create(
                user_id,
                CreateSubjectInput {
                    name: "Chess".to_string(),
                    icon: Some("♞".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let renamed = service
            .update(
                user_id,
                subject.id,
                UpdateSubjectInput {
                    name: Some("Go".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.icon.as_deref(), Some("♞"));

        let cleared = service
            .update(
                user_id,
                subject.id,
                UpdateSubjectInput {
                    icon: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.icon, None);

        service
            .update(
                user_id,
                subject.id,
                UpdateSubjectInput {
                    icon: Some(Some("●".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let blanked = service
            .update(
                user_id,
                subject.id,
                UpdateSubjectInput {
                    icon: Some(Some("  ".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(blanked.icon, None);
        assert_eq!(blanked.name, "Go");
    }

    #[tokio::test]
    async fn test_foreign_subject_is_not_found() {
        let store = temp_store().await;
        let owner = seed_user(&store, "mine@example.com").await;
        let intruder = seed_user(&store, "yours@example.com").await;
        let service = SeaOrmSubjectService::new(store);

        let subject = service
            .create(
                owner,
                CreateSubjectInput {
                    name: "Private".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let update = service
            .update(
                intruder,
                subject.id,
                UpdateSubjectInput {
                    name: Some("Stolen".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(update, Err(SubjectError::NotFound)));
        assert!(matches!(
            service.delete(intruder, subject.id).await,
            Err(SubjectError::NotFound)
        ));
        assert!(matches!(
            service.delete(owner, 9999).await,
            Err(SubjectError::NotFound)
        ));

        service.delete(owner, subject.id).await.unwrap();
        assert!(service.list(owner).await.unwrap().is_empty());
    }
}
