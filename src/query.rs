use tracing::debug;

use crate::window::TimeWindow;

/// `{base_url}/{org}/environments`
pub fn build_discovery_query(base_url: &str, org: &str) -> String {
    let url = format!("{}/{}/environments", base_url, org);
    debug!("Environment query URL: {}", url);
    url
}

/// `{base_url}/{org}/environments/{env}/stats/{dimension}?{select}&timeRange={window}`
///
/// `select_clause` is the prebuilt `select=...` string shared by the run.
pub fn build_stats_query(
    base_url: &str,
    org: &str,
    env: &str,
    select_clause: &str,
    dimension: &str,
    window: &TimeWindow,
) -> String {
    let url = format!(
        "{}/{}/environments/{}/stats/{}?{}&timeRange={}",
        base_url,
        org,
        env,
        dimension,
        select_clause,
        window.time_range()
    );
    debug!("Stats query URL: {}", url);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::compute_window;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discovery_query() {
        assert_eq!(
            build_discovery_query("https://api.example.com", "acme"),
            "https://api.example.com/acme/environments"
        );
    }

    #[test]
    fn test_stats_query() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = compute_window(now, Duration::minutes(5));

        let url = build_stats_query(
            "https://api.example.com",
            "acme",
            "prod",
            "select=sum(message_count),avg(total_response_time)",
            "apiproxy",
            &window,
        );

        assert_eq!(
            url,
            "https://api.example.com/acme/environments/prod/stats/apiproxy\
             ?select=sum(message_count),avg(total_response_time)\
             &timeRange=12/31/2023%2023:45~12/31/2023%2023:49"
        );
    }

    #[test]
    fn test_stats_query_is_deterministic_for_a_window() {
        let window = compute_window(Utc::now(), Duration::minutes(5));
        let build = || build_stats_query("https://h", "o", "e", "select=m", "d", &window);
        assert_eq!(build(), build());
    }
}
