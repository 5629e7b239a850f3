/// Analytics endpoints
///
/// Read-only aggregation over the caller's assigned tasks.
///
/// # Endpoints
///
/// - `GET /v1/analytics/overview` - Task count per status
/// - `GET /v1/analytics/performance` - Totals, overdue, completion metrics
/// - `GET /v1/analytics/trends` - Per-day created/completed counts
/// - `GET /v1/analytics/export` - The caller's tasks as CSV
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use taskhub_shared::analytics::{self, PerformanceSnapshot, StatusCount, TrendPoint};
use taskhub_shared::auth::identity::Subject;
use uuid::Uuid;

/// Overview response
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// Non-deleted task count per status
    pub status_counts: Vec<StatusCount>,
}

/// Performance response
#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    /// User the snapshot was computed for
    pub user_id: Uuid,

    /// The snapshot itself
    #[serde(flatten)]
    pub snapshot: PerformanceSnapshot,
}

/// Trends response
#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    /// Per-day counts, ascending by date
    pub trends: Vec<TrendPoint>,
}

/// Task count per status for the caller's assignments
pub async fn overview(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Json<OverviewResponse>> {
    let status_counts = analytics::status_breakdown(&state.db, subject.id).await?;

    Ok(Json(OverviewResponse { status_counts }))
}

/// Performance snapshot for the caller
pub async fn performance(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Json<PerformanceResponse>> {
    let snapshot = analytics::performance(&state.db, subject.id).await?;

    Ok(Json(PerformanceResponse {
        user_id: subject.id,
        snapshot,
    }))
}

/// Per-day trend series for the caller
///
/// One row per UTC calendar day that has at least one task, ascending.
pub async fn trends(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Json<TrendsResponse>> {
    let trends = analytics::trends(&state.db, subject.id).await?;

    Ok(Json(TrendsResponse { trends }))
}

/// Export the caller's non-deleted tasks as CSV
///
/// # Errors
///
/// - `404 Not Found`: the caller has no tasks to export
pub async fn export_tasks(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Response> {
    let rows = analytics::export_rows(&state.db, subject.id).await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound("No tasks found to export".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &rows {
        writer
            .serialize(row)
            .map_err(|e| ApiError::InternalError(format!("CSV serialization failed: {}", e)))?;
    }
    let csv_bytes = writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("CSV buffer error: {}", e)))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"tasks.csv\"".to_string(),
        ),
    ];

    Ok((headers, csv_bytes).into_response())
}
