use tracing::{debug, warn};

use crate::{models::StatsResponse, CollectorError, Result};

/// Parses the discovery response: a JSON array of environment names.
pub fn parse_environments(body: &[u8]) -> Result<Vec<String>> {
    serde_json::from_slice(body)
        .map_err(|e| CollectorError::Parse(format!("Failed to parse environment list: {}", e)))
}

/// Parses a stats response into its environment/dimension/metric tree.
///
/// Any shape mismatch fails the whole response; nothing is salvaged.
pub fn parse_stats(body: &[u8]) -> Result<StatsResponse> {
    serde_json::from_slice(body)
        .map_err(|e| CollectorError::Parse(format!("Failed to parse stats response: {}", e)))
}

/// Logs the `metaData` block. Errors reported there do not fail the run.
pub fn log_metadata(response: &StatsResponse, org: &str, env: &str) {
    for error in &response.metadata.errors {
        warn!("Remote reported error for {}/{}: {}", org, env, error);
    }
    for notice in &response.metadata.notices {
        debug!("Remote notice for {}/{}: {}", org, env, notice);
    }
}
