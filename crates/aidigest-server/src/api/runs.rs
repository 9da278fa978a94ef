//! Execution-ledger read endpoint.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    limit: Option<i64>,
}

/// `GET /api/runs`: recent ledger entries, newest first.
pub(super) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = normalize_limit(params.limit);
    let entries = state
        .store
        .recent_log_entries(limit)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: entries,
        meta: ResponseMeta::new(req_id.0),
    }))
}
