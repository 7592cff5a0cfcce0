use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::Query;

use super::ApiError;
use crate::services::MonthRange;
use crate::services::analytics::{MAX_YEAR, MIN_YEAR};

pub fn validate_subject_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid subject ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Both parts or neither; neither means the current month.
pub fn validate_month(year: Option<i32>, month: Option<u32>) -> Result<MonthRange, ApiError> {
    match (year, month) {
        (None, None) => Ok(MonthRange::current()),
        (Some(year), Some(month)) => MonthRange::new(year, month).ok_or_else(|| {
            ApiError::validation(format!(
                "Invalid month: {year}-{month}. Year must be between {MIN_YEAR} and {MAX_YEAR}, month between 1 and 12"
            ))
        }),
        _ => Err(ApiError::validation(
            "Both year and month are required when either is given",
        )),
    }
}

/// Malformed bodies are client errors; report them through the normal envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_subject_id() {
        assert!(validate_subject_id(1).is_ok());
        assert!(validate_subject_id(0).is_err());
        assert!(validate_subject_id(-4).is_err());
    }

    #[test]
    fn test_validate_month() {
        let march = validate_month(Some(2026), Some(3)).unwrap();
        assert_eq!(march.to_string(), "2026-03");
        assert!(validate_month(Some(2026), Some(13)).is_err());
        assert!(validate_month(Some(262_142), Some(12)).is_err());
        assert!(validate_month(Some(2026), None).is_err());
        assert_eq!(validate_month(None, None).unwrap(), MonthRange::current());
    }
}
