use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::json_body;
use super::{ApiError, ApiResponse, AppState, CurrentUser, MessageResponse};
use crate::services::{LoginResult, SignupInput, UserInfo};

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller from, in order:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <token>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        return admit(user_id, request, next).await;
    }

    if let Some(key) = extract_api_key(&headers) {
        match state.shared.auth_service.verify_api_key(&key).await {
            Ok(Some(user_id)) => return admit(user_id, request, next).await,
            Ok(None) => {}
            Err(e) => return ApiError::from(e).into_response(),
        }
    }

    ApiError::unauthorized().into_response()
}

async fn admit(user_id: i32, mut request: Request, next: Next) -> Response {
    tracing::Span::current().record("user_id", user_id);
    request.extensions_mut().insert(CurrentUser(user_id));
    next.run(request).await
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
/// Create an account with the three starter subjects
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let payload = json_body(payload)?;

    let user = state
        .shared
        .auth_service
        .signup(SignupInput {
            email: payload.email,
            password: payload.password,
            name: payload.name,
        })
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Verify credentials, open a cookie session and return the API token
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let payload = json_body(payload)?;

    let result = state
        .shared
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, result.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.shared.auth_service.get_user_info(user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let payload = json_body(payload)?;

    state
        .shared
        .auth_service
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /auth/token/regenerate
/// Rotate the API token; the old one stops working immediately
pub async fn regenerate_token(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let token = state.shared.auth_service.regenerate_api_key(user_id).await?;
    Ok(Json(ApiResponse::success(TokenResponse { token })))
}
