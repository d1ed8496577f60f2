use tracing::{debug, warn};

use crate::{integration::Integration, metrics, models::StatsResponse};

pub const EVENT_TYPE: &str = "ApigeeSample";
pub const ORG_ATTRIBUTE: &str = "ApigeeOrg";
pub const ENV_ATTRIBUTE: &str = "ApigeeEnv";
pub const PROXY_ATTRIBUTE: &str = "ApigeeProxyName";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub metric_sets: usize,
    pub gauges: usize,
    /// Metrics left out because they had no values or a non-numeric first value.
    pub skipped: usize,
}

/// Adds one metric set per environment/dimension pair to `integration`.
///
/// Each set carries the org, env and proxy attributes even when none of its
/// metrics produced a gauge.
pub fn emit(response: &StatsResponse, org: &str, integration: &mut Integration) -> EmitSummary {
    debug!("Beginning populate metrics for org {}", org);
    let mut summary = EmitSummary::default();

    for environment in &response.environments {
        for dimension in &environment.dimensions {
            debug!(
                "Processing - Org : {}, Env : {}, Dim : {}",
                org, environment.name, dimension.name
            );
            let set = integration.new_metric_set(EVENT_TYPE);
            set.set_attribute(ORG_ATTRIBUTE, org);
            set.set_attribute(ENV_ATTRIBUTE, environment.name.as_str());
            set.set_attribute(PROXY_ATTRIBUTE, dimension.name.as_str());
            summary.metric_sets += 1;

            for metric in &dimension.metrics {
                let Some(first) = metric.values.first() else {
                    debug!("Metric Name : {} has no values", metric.name);
                    summary.skipped += 1;
                    continue;
                };
                match first.as_f64() {
                    Some(value) => {
                        debug!("Metric Name : {} = {}", metric.name, first.as_str());
                        set.set_gauge(metric.name.as_str(), value);
                        summary.gauges += 1;
                    }
                    None => {
                        warn!(
                            "Skipping non-numeric value {:?} for {} ({}/{}/{})",
                            first.as_str(),
                            metric.name,
                            org,
                            environment.name,
                            dimension.name
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }
    }

    metrics::record_metric_sets(summary.metric_sets);
    summary
}
