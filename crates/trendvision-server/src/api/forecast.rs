use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use trendvision_core::ForecastPoint;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Forecast rows as last written; no file yet means no rows.
pub(super) async fn list_forecast(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ForecastPoint>>>, ApiError> {
    let file = Arc::clone(&state.forecast);
    let points = tokio::task::spawn_blocking(move || file.read_or_empty())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "forecast read task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "forecast read failed")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "forecast read failed");
            ApiError::new(req_id.0.clone(), "internal_error", "forecast read failed")
        })?;
    Ok(Json(ApiResponse::new(points, req_id.0)))
}
