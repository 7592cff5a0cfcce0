use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{query_params, validate_month};
use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::services::MonthView;

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /analytics?year=&month=
/// Calendar, per-subject minutes and total for one month (current UTC month by default)
pub async fn get_month(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MonthView>>, ApiError> {
    let query = query_params(query)?;
    let range = validate_month(query.year, query.month)?;

    let view = state
        .shared
        .ledger_service
        .month_view(user_id, range)
        .await?;

    Ok(Json(ApiResponse::success(view)))
}
