use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use super::validation::{json_body, path_param, validate_subject_id};
use super::{ApiError, ApiResponse, AppState, CurrentUser, MessageResponse};
use crate::models::Subject;
use crate::services::{CreateSubjectInput, UpdateSubjectInput};

#[derive(Deserialize)]
pub struct CreateSubjectRequest {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub color: Option<String>,
    /// Absent keeps the icon; `null` or `""` clears it.
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
}

/// Marks a field as supplied, so an explicit `null` differs from absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Subject>>>, ApiError> {
    let subjects = state.shared.subject_service.list(user_id).await?;
    Ok(Json(ApiResponse::success(subjects)))
}

pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateSubjectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Subject>>, ApiError> {
    let payload = json_body(payload)?;

    let subject = state
        .shared
        .subject_service
        .create(
            user_id,
            CreateSubjectInput {
                name: payload.name,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(subject)))
}

pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateSubjectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Subject>>, ApiError> {
    let id = validate_subject_id(path_param(id)?)?;
    let payload = json_body(payload)?;

    let subject = state
        .shared
        .subject_service
        .update(
            user_id,
            id,
            UpdateSubjectInput {
                name: payload.name,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(subject)))
}

/// Sessions recorded against the subject are removed with it.
pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_subject_id(path_param(id)?)?;
    state.shared.subject_service.delete(user_id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Subject deleted",
    ))))
}
