//! Prometheus collectors for inkpad.
//!
//! HTTP traffic plus account and note lifecycle counters, exposed at
//! `/metrics` for Prometheus scraping.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// Latency buckets in seconds. Login and register sit near the top because
/// of bcrypt.
const LATENCY_BUCKETS: &[f64] = &[0.002, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

/// Registered once, on first use.
pub static METRICS: Lazy<ApiResult<InkpadMetrics>> = Lazy::new(InkpadMetrics::new);

/// The registered metrics, or `None` if registration failed.
pub fn metrics() -> Option<&'static InkpadMetrics> {
    match METRICS.as_ref() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics unavailable");
            None
        }
    }
}

/// Container for all inkpad metrics.
#[derive(Clone)]
pub struct InkpadMetrics {
    /// `method`, `path`, `status`
    pub http_requests_total: CounterVec,
    /// `method`, `path`
    pub http_request_duration_seconds: HistogramVec,
    /// `event`
    pub account_events_total: CounterVec,
    /// `event`
    pub note_events_total: CounterVec,
}

impl InkpadMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "inkpad_http_requests_total",
                "Requests served, by route template and status",
                &["method", "path", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_requests_total: {}", e))
            })?,

            http_request_duration_seconds: register_histogram_vec!(
                "inkpad_http_request_duration_seconds",
                "Time spent handling a request",
                &["method", "path"],
                LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!(
                    "Failed to register http_request_duration_seconds: {}",
                    e
                ))
            })?,

            account_events_total: register_counter_vec!(
                "inkpad_account_events_total",
                "Account lifecycle events",
                &["event"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register account_events_total: {}", e))
            })?,

            note_events_total: register_counter_vec!(
                "inkpad_note_events_total",
                "Note lifecycle events",
                &["event"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register note_events_total: {}", e))
            })?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record an account event (`registered`, `login_succeeded`, `login_failed`, `deleted`).
    pub fn record_account_event(&self, event: &str) {
        self.account_events_total.with_label_values(&[event]).inc();
    }

    /// Record a note event (`created`, `updated`, `deleted`).
    pub fn record_note_event(&self, event: &str) {
        self.note_events_total.with_label_values(&[event]).inc();
    }
}

/// GET /metrics in the Prometheus text exposition format.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Exposition text", content_type = "text/plain"),
        (status = 400, description = "Encoding failed", body = crate::error::ApiError),
    ),
))]
pub async fn metrics_handler() -> ApiResult<impl IntoResponse> {
    // Touch the registry so the inkpad families exist before the first scrape.
    let _ = metrics();

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut body)
        .map_err(|e| {
            tracing::error!(error = %e, "Metrics encoding failed");
            ApiError::internal_error("Metrics encoding failed")
        })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    ))
}
