//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::db::repositories::user::hash_password;
use crate::models::subject::DEFAULT_SUBJECTS;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, SignupInput, UserInfo};
use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn find_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn user_info(user: User) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at,
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, input: SignupInput) -> Result<UserInfo, AuthError> {
        let email = input.email.trim().to_string();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(email));
        }

        let password = input.password;
        let security = self.security.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let name = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let user = match self
            .store
            .create_user_with_subjects(&email, password_hash, name, &DEFAULT_SUBJECTS)
            .await
        {
            Ok(user) => user,
            // Lost a race against a concurrent signup for the same email.
            Err(e) if is_unique_violation(&e) => return Err(AuthError::Conflict(email)),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, "Account created");
        Ok(user_info(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .verify_user_credentials(email.trim(), password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(LoginResult {
            id: user.id,
            email: user.email,
            name: user.name,
            token: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<i32>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(|u| u.id))
    }

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        self.find_user(user_id).await.map(user_info)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self.find_user(user_id).await?;

        let verified = self
            .store
            .verify_user_credentials(&user.email, current_password)
            .await?;

        if verified.is_none() {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn regenerate_api_key(&self, user_id: i32) -> Result<String, AuthError> {
        self.find_user(user_id).await?;
        let key = self.store.regenerate_user_api_key(user_id).await?;
        info!(user_id, "API token regenerated");
        Ok(key)
    }
}
