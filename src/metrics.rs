//! Metric name constants.

use std::time::Duration;

use anyhow::Context;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config;

pub const COMPLAINTS_CREATED: &str = "muniport.complaints.created"; // Counter.
pub const COMPLAINTS_STATUS_UPDATED: &str = "muniport.complaints.status_updated"; // Counter.
pub const COMPLAINTS_DELETED: &str = "muniport.complaints.deleted"; // Counter.

pub const VEHICLES_CREATED: &str = "muniport.vehicles.created"; // Counter.
pub const VEHICLES_DELETED: &str = "muniport.vehicles.deleted"; // Counter.

pub const UPLOADS_STORED: &str = "muniport.uploads.stored"; // Counter.

/// Must be ran exactly once on startup. This will declare all of the instruments for `metrics`.
pub fn setup(config: Option<&config::MetricConfig>) -> anyhow::Result<()> {
    describe_counter!(COMPLAINTS_CREATED, "The number of complaints filed.");
    describe_counter!(
        COMPLAINTS_STATUS_UPDATED,
        "The number of complaint status updates."
    );
    describe_counter!(COMPLAINTS_DELETED, "The number of complaints deleted.");

    describe_counter!(VEHICLES_CREATED, "The number of vehicles registered.");
    describe_counter!(VEHICLES_DELETED, "The number of vehicles deleted.");

    describe_counter!(UPLOADS_STORED, "The number of photos stored on disk.");

    if let Some(config) = config {
        match config {
            config::MetricConfig::PrometheusPush(prometheus_config) => {
                PrometheusBuilder::new()
                    .with_push_gateway(
                        prometheus_config.url.clone(),
                        Duration::from_secs(10),
                        None,
                        None,
                    )
                    .context("failed to set up push gateway")?
                    .install()
                    .context("failed to install metrics exporter")?;
            }
        }
    }

    Ok(())
}
