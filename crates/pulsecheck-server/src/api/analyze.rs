use axum::{extract::State, Extension, Json};
use chrono::Utc;
use pulsecheck_analysis::SentimentSummary;
use pulsecheck_monitor::{analyze_subject, AnalyzeOutcome, MonitorError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub subject: String,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub summary: SentimentSummary,
    pub saved: bool,
    pub save_error: Option<String>,
}

/// POST /api/v1/analyze: run an interactive analysis.
///
/// Always returns a best-effort summary or the `no_data` signal; retrieval
/// and classification plumbing errors never reach the client. A persistence
/// failure is reported in `save_error` next to the summary it failed to save.
pub(super) async fn run_analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let outcome = analyze_subject(&state.deps, &body.subject, body.owner_id, Utc::now())
        .await
        .map_err(|e| match e {
            MonitorError::Validation(v) => {
                ApiError::new(req_id.0.clone(), "validation_error", v.to_string())
            }
            other => {
                tracing::error!(error = %other, "interactive analysis failed");
                ApiError::new(req_id.0.clone(), "internal_error", "analysis failed")
            }
        })?;

    match outcome {
        AnalyzeOutcome::NoData => Err(ApiError::new(
            req_id.0,
            "no_data",
            format!("no recent mentions found for '{}'", body.subject.trim()),
        )),
        AnalyzeOutcome::Completed {
            summary,
            save_error,
        } => Ok(Json(ApiResponse {
            data: AnalyzeData {
                saved: save_error.is_none(),
                save_error,
                summary,
            },
            meta: ResponseMeta::new(req_id.0),
        })),
    }
}
