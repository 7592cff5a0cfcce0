use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, SecurityConfig, StorageBackend};
use crate::models::{FocusSession, NewFocusSession, NewSubject, Subject, SubjectChanges};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

/// Shared persistence handle. Cloning is cheap: the connection pool is
/// reference counted, so one `Store` built at startup serves every request.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let backend = config.backend()?;
        Self::connect(&backend, config.max_connections, config.min_connections).await
    }

    /// Opens either backend behind the same interface and applies migrations.
    pub async fn connect(
        backend: &StorageBackend,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let StorageBackend::Local { path } = backend
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut opt = ConnectOptions::new(backend.connection_url());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None).await?;

        match backend {
            StorageBackend::Local { path } => info!(
                "Local database {} ready (pool: {}-{})",
                path.display(),
                min_connections,
                max_connections
            ),
            StorageBackend::Remote { .. } => info!(
                "Remote database ready (pool: {}-{})",
                min_connections, max_connections
            ),
        }

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn subject_repo(&self) -> repositories::subject::SubjectRepository {
        repositories::subject::SubjectRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::focus_session::FocusSessionRepository {
        repositories::focus_session::FocusSessionRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user_with_subjects(
        &self,
        email: &str,
        password_hash: String,
        name: Option<String>,
        starter_subjects: &[(&str, &str)],
    ) -> Result<User> {
        self.user_repo()
            .create_with_subjects(email, password_hash, name, starter_subjects)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, user_id: i32) -> Result<String> {
        self.user_repo().regenerate_api_key(user_id).await
    }

    // ========== Subjects ==========

    pub async fn list_subjects(&self, user_id: i32) -> Result<Vec<Subject>> {
        self.subject_repo().list_for_user(user_id).await
    }

    pub async fn get_subject(&self, user_id: i32, id: i32) -> Result<Option<Subject>> {
        self.subject_repo().get_owned(user_id, id).await
    }

    pub async fn create_subject(&self, user_id: i32, subject: NewSubject) -> Result<Subject> {
        self.subject_repo().create(user_id, subject).await
    }

    pub async fn update_subject(
        &self,
        user_id: i32,
        id: i32,
        changes: SubjectChanges,
    ) -> Result<Option<Subject>> {
        self.subject_repo().update_owned(user_id, id, changes).await
    }

    pub async fn delete_subject(&self, user_id: i32, id: i32) -> Result<bool> {
        self.subject_repo().delete_owned(user_id, id).await
    }

    // ========== Focus sessions ==========

    pub async fn insert_focus_session(
        &self,
        user_id: i32,
        session: NewFocusSession,
    ) -> Result<crate::entities::focus_sessions::Model> {
        self.session_repo().create(user_id, session).await
    }

    pub async fn list_focus_sessions(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<FocusSession>> {
        self.session_repo().list_for_user(user_id, from, to).await
    }

    pub async fn count_focus_sessions(&self, user_id: i32) -> Result<u64> {
        self.session_repo().count_for_user(user_id).await
    }
}
