//! Liveness report served by `/health`.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Derived, read-only view of the cache for the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// False once the most recent refresh attempt failed
    pub healthy: bool,
    /// When the current snapshot was fetched, if any
    pub last_success_at: Option<DateTime<Utc>>,
    pub service_name: String,
}

/// JSON body of the `/health` response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub service: String,
    pub last_success_at: Option<String>,
}

impl HealthStatus {
    /// `"healthy"` or `"degraded"`.
    pub fn label(&self) -> &'static str {
        if self.healthy { "healthy" } else { "degraded" }
    }

    /// Build the wire report stamped with `now`.
    pub fn report(&self, now: DateTime<Utc>) -> HealthReport {
        HealthReport {
            status: self.label(),
            timestamp: now.to_rfc3339(),
            service: self.service_name.clone(),
            last_success_at: self.last_success_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_null_when_never_fetched() {
        let status = HealthStatus {
            healthy: true,
            last_success_at: None,
            service_name: "svc".to_string(),
        };
        let json = serde_json::to_value(status.report(Utc::now())).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "svc");
        assert!(json["last_success_at"].is_null());
    }

    #[test]
    fn test_degraded_label() {
        let status = HealthStatus {
            healthy: false,
            last_success_at: Some(Utc::now()),
            service_name: "svc".to_string(),
        };
        assert_eq!(status.label(), "degraded");
        assert!(status.report(Utc::now()).last_success_at.is_some());
    }
}
