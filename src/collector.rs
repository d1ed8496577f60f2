use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use crate::{
    client::QueryExecutor,
    config::{Config, Organization},
    emit::emit,
    error::OrgFailure,
    integration::Integration,
    metrics::{self, QueryKind, QueryTimer},
    normalize::{log_metadata, parse_environments, parse_stats},
    query::{build_discovery_query, build_stats_query},
    window::compute_window,
    CollectorError, Result,
};

pub type Clock = fn() -> DateTime<Utc>;

/// Per-run query parameters shared by every organization.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub dimension: String,
    pub select_clause: String,
    pub aggregation_span: Duration,
}

impl From<&Config> for QuerySettings {
    fn from(config: &Config) -> Self {
        Self {
            dimension: config.dimension.clone(),
            select_clause: config.select_clause(),
            aggregation_span: config.aggregation_span(),
        }
    }
}

/// Outcome of one pass over all organizations.
#[derive(Debug, Default)]
pub struct CollectReport {
    pub organizations: usize,
    pub metric_sets: usize,
    pub failures: Vec<OrgFailure>,
}

impl CollectReport {
    pub fn into_result(self) -> Result<usize> {
        if self.failures.is_empty() {
            Ok(self.metric_sets)
        } else {
            Err(CollectorError::Partial {
                failures: self.failures,
                total: self.organizations,
            })
        }
    }
}

pub struct Collector<E> {
    executor: E,
    settings: QuerySettings,
    clock: Clock,
}

impl<E: QueryExecutor> Collector<E> {
    pub fn new(executor: E, settings: QuerySettings) -> Self {
        Self {
            executor,
            settings,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock used for every window computation.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Collects every organization in turn. A failing organization is
    /// recorded and skipped; the others still run.
    pub async fn collect(
        &self,
        orgs: &[Organization],
        integration: &mut Integration,
    ) -> CollectReport {
        let mut report = CollectReport {
            organizations: orgs.len(),
            ..Default::default()
        };

        for org in orgs {
            match self.collect_org(org, integration).await {
                Ok(sets) => {
                    info!("Collected {} metric sets for org {}", sets, org.org);
                    report.metric_sets += sets;
                }
                Err(e) => {
                    error!("Collection for org {} failed: {}", org.org, e);
                    metrics::record_org_failure();
                    report.failures.push(OrgFailure {
                        org: org.org.clone(),
                        error: e,
                    });
                }
            }
        }

        report
    }

    /// Discovers (or reads) the org's environments, then queries each one.
    /// The first error stops this organization.
    pub async fn collect_org(
        &self,
        org: &Organization,
        integration: &mut Integration,
    ) -> Result<usize> {
        let envs = self.environments(org).await?;
        debug!("Org: {} has environments: {:?}", org.org, envs);

        let mut sets = 0;
        for env in &envs {
            sets += self.collect_env(org, env, integration).await?;
        }
        Ok(sets)
    }

    async fn environments(&self, org: &Organization) -> Result<Vec<String>> {
        if !org.envs.is_empty() {
            debug!("Using configured environments for org {}", org.org);
            return Ok(org.envs.clone());
        }

        let url = build_discovery_query(&org.base_url, &org.org);
        let body = self.run_query(QueryKind::Discovery, &url, org).await?;
        parse_environments(&body)
    }

    async fn collect_env(
        &self,
        org: &Organization,
        env: &str,
        integration: &mut Integration,
    ) -> Result<usize> {
        debug!(
            "Asking for - Org : {}, Env : {}, Dim : {}, Time Range : {}m",
            org.org,
            env,
            self.settings.dimension,
            self.settings.aggregation_span.num_minutes()
        );

        let window = compute_window((self.clock)(), self.settings.aggregation_span);
        let url = build_stats_query(
            &org.base_url,
            &org.org,
            env,
            &self.settings.select_clause,
            &self.settings.dimension,
            &window,
        );
        let body = self.run_query(QueryKind::Stats, &url, org).await?;
        let response = parse_stats(&body)?;
        log_metadata(&response, &org.org, env);

        let summary = emit(&response, &org.org, integration);
        debug!(
            "Emitted {} metric sets with {} gauges for {}/{}",
            summary.metric_sets, summary.gauges, org.org, env
        );
        if summary.skipped > 0 {
            info!(
                "Skipped {} metrics without a numeric value for {}/{}",
                summary.skipped, org.org, env
            );
        }
        Ok(summary.metric_sets)
    }

    async fn run_query(
        &self,
        kind: QueryKind,
        url: &str,
        org: &Organization,
    ) -> Result<bytes::Bytes> {
        let timer = QueryTimer::new(kind);
        let result = self.executor.execute(url, &org.credentials()).await;
        timer.finish(result.is_ok());
        result
    }
}

/// One full collection run: query every organization, publish whatever was
/// collected, then report any organization failures.
pub async fn run<E, W>(config: &Config, executor: E, writer: W, pretty: bool) -> Result<usize>
where
    E: QueryExecutor,
    W: std::io::Write,
{
    let collector = Collector::new(executor, QuerySettings::from(config));
    let mut integration = Integration::default();

    debug!("Ready to poll {} organizations", config.apigee.orgs.len());
    let report = collector.collect(&config.apigee.orgs, &mut integration).await;

    debug!("Publishing");
    integration.publish(writer, pretty)?;
    report.into_result()
}
