//! HTTP access to the collector's read endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::model::{NetworkEvent, OrgStats, StatsSummary};

pub const STATS_PATH: &str = "api/stats";
pub const ORG_STATS_PATH: &str = "api/org-stats";
pub const EVENTS_PATH: &str = "api/events";

/// Errors from fetching one endpoint.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Base URL or endpoint path could not form a URL.
    #[error("Invalid backend URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS or body transfer failure.
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("Request to {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Body was not JSON of the expected shape.
    #[error("Failed to parse response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of dashboard data.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/stats`.
    async fn stats(&self) -> Result<StatsSummary, FetchError>;

    /// `GET /api/org-stats`.
    async fn org_stats(&self) -> Result<OrgStats, FetchError>;

    /// `GET /api/events`.
    async fn events(&self) -> Result<Vec<NetworkEvent>, FetchError>;
}

/// [`Backend`] talking JSON over HTTP to a collector.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Backend rooted at `base_url`. Endpoint paths are resolved relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        // A trailing slash keeps any path prefix when endpoints are joined on.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|source| FetchError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| FetchError::Transport {
            endpoint: base_url.to_string(),
            source,
        })?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|source| FetchError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        let endpoint = url.path().to_string();
        tracing::trace!(url = %url, "Fetching");

        let transport = |source| FetchError::Transport {
            endpoint: endpoint.clone(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Parse { endpoint, source })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn stats(&self) -> Result<StatsSummary, FetchError> {
        self.get_json(STATS_PATH).await
    }

    async fn org_stats(&self) -> Result<OrgStats, FetchError> {
        self.get_json(ORG_STATS_PATH).await
    }

    async fn events(&self) -> Result<Vec<NetworkEvent>, FetchError> {
        let items: Vec<serde_json::Value> = self.get_json(EVENTS_PATH).await?;
        Ok(items.into_iter().map(NetworkEvent::from_value).collect())
    }
}
