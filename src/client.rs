use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Proxy};
use tracing::debug;

use crate::{
    config::{Credentials, TransportConfig},
    CollectorError, Result,
};

/// Runs one authenticated GET and returns the raw body.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, url: &str, credentials: &Credentials) -> Result<Bytes>;
}

/// HTTP executor backed by a single `reqwest` client. No retries.
#[derive(Clone)]
pub struct ApigeeClient {
    client: Client,
}

impl ApigeeClient {
    pub fn new(transport: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder();

        // A configured proxy replaces the environment proxies; without one,
        // reqwest reads HTTP_PROXY/HTTPS_PROXY/NO_PROXY unless disabled.
        match &transport.proxy_url {
            Some(proxy_url) => {
                debug!("Proxy setting detected: {}", proxy_url);
                let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| {
                    CollectorError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e))
                })?;
                builder = builder.proxy(proxy);
            }
            None if !transport.system_proxy => builder = builder.no_proxy(),
            None => {}
        }
        if let Some(timeout) = transport.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| CollectorError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl QueryExecutor for ApigeeClient {
    async fn execute(&self, url: &str, credentials: &Credentials) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.user, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| CollectorError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        debug!("Response: {}", status);
        if !status.is_success() {
            return Err(CollectorError::Transport(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CollectorError::Transport(format!("Reading body of {} failed: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_with_proxy_and_timeout() {
        let transport = TransportConfig {
            proxy_url: Some("http://proxy.internal:3128".to_string()),
            timeout: Some(Duration::from_secs(30)),
            system_proxy: true,
        };
        assert!(ApigeeClient::new(&transport).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let transport = TransportConfig {
            proxy_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ApigeeClient::new(&transport),
            Err(CollectorError::Config(_))
        ));
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let client = ApigeeClient::new(&TransportConfig::default()).unwrap();
        let credentials = Credentials {
            user: "u".to_string(),
            password: "p".to_string(),
        };

        let err = tokio_test::block_on(
            client.execute("http://127.0.0.1:1/acme/environments", &credentials),
        )
        .unwrap_err();
        assert!(matches!(err, CollectorError::Transport(_)));
    }
}
