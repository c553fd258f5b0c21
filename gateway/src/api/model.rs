use serde::Serialize;
use viewpointcore::telemetry::MetricsSnapshot;

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub mode: &'static str,
    pub model: String,
    pub metrics: MetricsSnapshot,
}
