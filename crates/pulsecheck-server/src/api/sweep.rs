use axum::{extract::State, Extension, Json};
use pulsecheck_monitor::run_monitoring_sweep;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SweepData {
    pub total: usize,
    pub completed: usize,
    pub no_data: usize,
    pub not_due: usize,
    pub failed: usize,
}

/// POST /api/v1/monitor/sweep: run the monitoring sweep immediately.
///
/// The scheduled job invokes the same sweep; this route exists for operators
/// and external time-based triggers.
pub(super) async fn run_sweep(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SweepData>>, ApiError> {
    let report = run_monitoring_sweep(&state.deps).await.map_err(|e| {
        tracing::error!(error = %e, "monitoring sweep failed to start");
        ApiError::new(req_id.0.clone(), "internal_error", "sweep failed to start")
    })?;

    Ok(Json(ApiResponse {
        data: SweepData {
            total: report.outcomes.len(),
            completed: report.completed(),
            no_data: report.no_data(),
            not_due: report.not_due(),
            failed: report.failed(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
