//! HTTP/JSON surface consumed by the dashboard
//!
//! - `GET /measurements` - full retained history, newest-first
//! - `POST /measurements` - run one manual measurement synchronously
//! - `GET /measurements/latest` - most recent record, or null
//! - `GET /measurements/summary` - averages over the retained history
//! - `GET /status` - scheduler state and next periodic deadline
//!
//! Every payload uses the `{success, data | error}` envelope.

use crate::error::MonitorError;
use crate::history::HistoryStore;
use crate::measurement::MeasurementRecord;
use crate::scheduler::{RunState, Scheduler, Trigger};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ApiState {
    pub history: Arc<HistoryStore>,
    pub scheduler: Arc<Scheduler>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

struct ApiError(MonitorError);

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            MonitorError::MeasurementInProgress => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.0.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/measurements", get(get_measurements).post(run_measurement))
        .route("/measurements/latest", get(get_latest))
        .route("/measurements/summary", get(get_summary))
        .route("/status", get(get_status))
        .with_state(state)
}

/// GET /measurements - the retained history, newest-first
async fn get_measurements(
    State(state): State<ApiState>,
) -> Json<ApiResponse<Vec<Arc<MeasurementRecord>>>> {
    ApiResponse::ok(state.history.snapshot().await)
}

/// POST /measurements - trigger one manual measurement
async fn run_measurement(
    State(state): State<ApiState>,
) -> Result<Json<ApiResponse<Arc<MeasurementRecord>>>, ApiError> {
    info!("POST /measurements");
    let record = state.scheduler.request_measurement(Trigger::Manual).await?;
    Ok(ApiResponse::ok(record))
}

/// GET /measurements/latest - most recent record, null while empty
async fn get_latest(
    State(state): State<ApiState>,
) -> Json<ApiResponse<Option<Arc<MeasurementRecord>>>> {
    ApiResponse::ok(state.history.latest().await)
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistorySummary {
    count: usize,
    avg_download: f64,
    avg_upload: f64,
    avg_ping: f64,
}

fn summarize(records: &[Arc<MeasurementRecord>]) -> HistorySummary {
    if records.is_empty() {
        return HistorySummary::default();
    }

    let count = records.len();
    let sum = |f: fn(&MeasurementRecord) -> f64| {
        records.iter().map(|r| f(r)).sum::<f64>() / count as f64
    };

    HistorySummary {
        count,
        avg_download: sum(|r| r.download),
        avg_upload: sum(|r| r.upload),
        avg_ping: sum(|r| r.ping),
    }
}

/// GET /measurements/summary - averages over the retained history
async fn get_summary(State(state): State<ApiState>) -> Json<ApiResponse<HistorySummary>> {
    let records = state.history.snapshot().await;
    ApiResponse::ok(summarize(&records))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    state: RunState,
    next_deadline: Option<DateTime<Utc>>,
}

/// GET /status - scheduler state and next periodic deadline
async fn get_status(State(state): State<ApiState>) -> Json<ApiResponse<StatusResponse>> {
    ApiResponse::ok(StatusResponse {
        state: state.scheduler.state().await,
        next_deadline: state.scheduler.next_deadline().await,
    })
}
