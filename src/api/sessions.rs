use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{json_body, query_params};
use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::models::FocusSession;
use crate::services::RecordSessionInput;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Every field optional so that an incomplete body reads as
/// "Missing required fields" rather than a decoding error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub subject_id: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

/// GET /sessions?from=&to=
/// Both bounds inclusive on start time, newest first
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<FocusSession>>>, ApiError> {
    let range = query_params(query)?;

    let sessions = state
        .shared
        .ledger_service
        .list(user_id, range.from.as_deref(), range.to.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(sessions)))
}

/// POST /sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<FocusSession>>, ApiError> {
    let payload = json_body(payload)?;

    let session = state
        .shared
        .ledger_service
        .record(
            user_id,
            RecordSessionInput {
                subject_id: payload.subject_id,
                start_time: payload.start_time,
                end_time: payload.end_time,
                duration: payload.duration,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(session)))
}
