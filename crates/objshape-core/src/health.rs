//! Health reporting for platform clients.
//!
//! A client reports whether the hosting platform answered, how long it took,
//! and which server answered.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Whether the platform answered a health check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    #[default]
    Healthy,
    Unhealthy,
}

/// Outcome of a single platform health check.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: ServiceStatus,
    /// Round trip of the health query.
    pub response_time: Option<Duration>,
    /// Failure description for unhealthy reports.
    pub message: Option<String>,
    /// Name the server reports for itself.
    pub server_name: Option<String>,
    /// Server release, when the server discloses it.
    pub server_version: Option<String>,
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates an unhealthy report carrying the failure.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_time = Some(response_time);
        self
    }

    /// Records the server that answered.
    pub fn with_server(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.server_name = Some(name.into());
        self.server_version = version;
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_report_with_server() {
        let health = ServiceHealth::healthy()
            .with_response_time(Duration::from_millis(12))
            .with_server("Speckle Server", Some("2.23.0".to_owned()));

        assert!(health.is_healthy());
        assert_eq!(health.response_time, Some(Duration::from_millis(12)));
        assert_eq!(health.server_name.as_deref(), Some("Speckle Server"));
        assert_eq!(health.server_version.as_deref(), Some("2.23.0"));
        assert!(health.message.is_none());
    }

    #[test]
    fn test_unhealthy_report() {
        let health = ServiceHealth::unhealthy("connection refused");

        assert!(!health.is_healthy());
        assert_eq!(health.status, ServiceStatus::Unhealthy);
        assert_eq!(health.message.as_deref(), Some("connection refused"));
        assert!(health.server_name.is_none());
    }

    #[test]
    fn test_serialized_fields() {
        let health = ServiceHealth::healthy().with_server("Speckle Server", None);
        let json = serde_json::to_value(&health).unwrap();

        assert_eq!(json["status"], "Healthy");
        assert_eq!(json["server_name"], "Speckle Server");
        assert!(json["server_version"].is_null());
    }
}
