//! Component health reporting

use serde::{Deserialize, Serialize};

/// Health classification for a single component
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Status of one external component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,

    /// Status classification
    pub status: HealthStatus,

    /// Detail message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregated health report across components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status (worst of the components)
    pub status: HealthStatus,

    /// Per-component status
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    /// Aggregate component checks; overall status is the worst observed
    pub fn aggregate(components: Vec<ComponentHealth>) -> Self {
        let status = components
            .iter()
            .map(|c| c.status)
            .max_by_key(|s| match s {
                HealthStatus::Healthy => 0,
                HealthStatus::Degraded => 1,
                HealthStatus::Unhealthy => 2,
            })
            .unwrap_or(HealthStatus::Healthy);
        Self { status, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_takes_worst() {
        let report = HealthReport::aggregate(vec![
            ComponentHealth {
                name: "embedding".into(),
                status: HealthStatus::Healthy,
                detail: None,
            },
            ComponentHealth {
                name: "generation".into(),
                status: HealthStatus::Degraded,
                detail: Some("no api key configured".into()),
            },
        ]);
        assert_eq!(report.status, HealthStatus::Degraded);
    }
}
