//! Scheduled health checking.
//!
//! # Responsibilities
//! - Probe aggregate service health on each tick
//! - Log the full snapshot when something is wrong
//! - Record the result as metrics

use std::sync::Arc;

use crate::lifecycle::ServiceOrchestrator;
use crate::observability::metrics;

pub struct HealthMonitor {
    orchestrator: Arc<ServiceOrchestrator>,
}

impl HealthMonitor {
    pub fn new(orchestrator: Arc<ServiceOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Run one check. Returns the observed health.
    pub async fn check(&self) -> bool {
        let healthy = self.orchestrator.is_healthy().await;
        if healthy {
            tracing::info!(
                active_services = self.orchestrator.active_services(),
                "Health check passed"
            );
        } else {
            let info = self.orchestrator.health_info().await;
            tracing::warn!(health = %info.to_json(), "Health check failed");
        }

        metrics::record_health_check(healthy);
        metrics::record_active_services(self.orchestrator.active_services());
        healthy
    }
}
