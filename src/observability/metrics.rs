//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hcf_active_services` (gauge): subsystems brought up by the last start
//! - `hcf_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `hcf_health_checks_total` (counter): scheduled checks by result
//! - `hcf_pool_connections` (gauge): pool connections by state
//! - `hcf_process_memory_bytes` (gauge): resident set size
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in

use std::net::SocketAddr;

use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::error::Result;
use crate::lifecycle::Hook;
use crate::storage::PoolStatus;

pub const ACTIVE_SERVICES: &str = "hcf_active_services";
pub const HEALTHY: &str = "hcf_healthy";
pub const HEALTH_CHECKS_TOTAL: &str = "hcf_health_checks_total";
pub const POOL_CONNECTIONS: &str = "hcf_pool_connections";
pub const PROCESS_MEMORY: &str = "hcf_process_memory_bytes";

/// Install the Prometheus recorder with an HTTP scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> std::result::Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn describe_metrics() {
    describe_gauge!(ACTIVE_SERVICES, "Subsystems started by the last start cycle");
    describe_gauge!(HEALTHY, "Aggregate service health (1=healthy)");
    describe_counter!(HEALTH_CHECKS_TOTAL, "Scheduled health checks by result");
    describe_gauge!(POOL_CONNECTIONS, "Connection pool utilization by state");
    describe_gauge!(PROCESS_MEMORY, "Resident set size of the process");
}

pub fn record_active_services(count: usize) {
    gauge!(ACTIVE_SERVICES).set(count as f64);
}

pub fn record_health_check(healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    counter!(HEALTH_CHECKS_TOTAL, "result" => result).increment(1);
    gauge!(HEALTHY).set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_pool_status(status: &PoolStatus) {
    gauge!(POOL_CONNECTIONS, "state" => "active").set(status.active as f64);
    gauge!(POOL_CONNECTIONS, "state" => "idle").set(status.idle as f64);
    gauge!(POOL_CONNECTIONS, "state" => "waiting").set(status.waiting as f64);
    gauge!(POOL_CONNECTIONS, "state" => "total").set(status.total as f64);
}

pub fn record_memory(bytes: u64) {
    gauge!(PROCESS_MEMORY).set(bytes as f64);
}

/// Post-start hook registering metric descriptions.
pub struct MetricsRegistration;

#[async_trait]
impl Hook for MetricsRegistration {
    fn name(&self) -> &str {
        "metrics-registration"
    }

    async fn run(&self) -> Result<()> {
        describe_metrics();
        tracing::debug!("Metric descriptions registered");
        Ok(())
    }
}
