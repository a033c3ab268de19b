//! Monitor error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("probe failed for {target}: {reason}")]
    ProbeFailure { target: String, reason: String },

    #[error("measurement failed: {0}")]
    MeasurementFailure(String),

    #[error("a measurement is already in progress")]
    MeasurementInProgress,

    #[allow(dead_code)]
    #[error("history unavailable: {0}")]
    HistoryUnavailable(String),
}
