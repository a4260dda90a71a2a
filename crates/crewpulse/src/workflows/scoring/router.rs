use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::period::parse_month;
use super::repository::{OperationsSource, SnapshotStore};
use super::service::MonthlyScoringService;

/// Trigger payload. The whole body is optional and so is the field; both
/// degrade to the previous-month default rather than erroring.
#[derive(Debug, Default, Deserialize)]
pub struct ScoreRunRequest {
    #[serde(default)]
    pub month: Option<String>,
}

/// Router builder exposing the scoring trigger and the snapshot read-back.
pub fn scoring_router<S, P>(service: Arc<MonthlyScoringService<S, P>>) -> Router
where
    S: OperationsSource + 'static,
    P: SnapshotStore + 'static,
{
    Router::new()
        .route("/api/v1/scores/runs", post(run_handler::<S, P>))
        .route("/api/v1/scores/:month", get(month_handler::<S, P>))
        .with_state(service)
}

pub(crate) async fn run_handler<S, P>(
    State(service): State<Arc<MonthlyScoringService<S, P>>>,
    payload: Option<axum::Json<ScoreRunRequest>>,
) -> Response
where
    S: OperationsSource + 'static,
    P: SnapshotStore + 'static,
{
    let requested = payload
        .and_then(|axum::Json(request)| request.month)
        .and_then(|raw| parse_month(&raw));

    match service.run(requested).await {
        Ok(summary) => {
            let body = json!({
                "success": true,
                "upserted": summary.upserted,
                "month": summary.month,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => {
            let body = json!({
                "success": false,
                "error": err.to_string(),
                "upserted": 0,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

pub(crate) async fn month_handler<S, P>(
    State(service): State<Arc<MonthlyScoringService<S, P>>>,
    Path(month): Path<String>,
) -> Response
where
    S: OperationsSource + 'static,
    P: SnapshotStore + 'static,
{
    let Some(month) = parse_month(&month) else {
        let body = json!({ "error": "month must be a YYYY-MM-DD date" });
        return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
    };

    match service.month_rows(month) {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(err) => {
            let body = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}
