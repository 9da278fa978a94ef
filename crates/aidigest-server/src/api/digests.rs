//! Digest read endpoints and the manual run trigger.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use aidigest_digest::RunError;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    limit: Option<i64>,
}

/// `GET /api/digests`: recent digest summaries, newest first.
pub(super) async fn list_digests(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = normalize_limit(params.limit);
    let briefs = state
        .store
        .recent_digests(limit)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: briefs,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/digests/today`: today's digest, if one has been produced.
pub(super) async fn get_today(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    fetch_digest(&state, req_id, Utc::now().date_naive()).await
}

/// `GET /api/digests/{date}`: the digest for a specific date.
pub(super) async fn get_by_date(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let date = date.parse::<NaiveDate>().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            "date must be formatted YYYY-MM-DD",
        )
    })?;
    fetch_digest(&state, req_id, date).await
}

async fn fetch_digest(
    state: &AppState,
    req_id: RequestId,
    date: NaiveDate,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .get_by_date(date)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no digest exists for {date}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RunParams {
    date: Option<NaiveDate>,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    notify: bool,
}

/// `POST /api/digests/run`: trigger a digest run. Answers 409 when a run is
/// already in progress.
pub(super) async fn trigger_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<RunParams>>,
) -> Result<impl IntoResponse, ApiError> {
    let params = body.map(|Json(p)| p).unwrap_or_default();
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let record = state
        .service
        .run(date, params.force, params.notify)
        .await
        .map_err(|e| match e {
            RunError::AlreadyRunning => {
                ApiError::new(req_id.0.clone(), "conflict", e.to_string())
            }
            RunError::Persistence(_) => {
                tracing::error!(error = %e, "digest run failed");
                ApiError::new(req_id.0.clone(), "internal_error", "digest run failed")
            }
        })?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}
