//! REST client for the cluster's namespace API.
//!
//! Volumes are plain directories under the dataset prefix, so existence is a
//! `HEAD` on the directory URL and creation is a `PUT` of a container object.

use std::time::Duration;

use async_trait::async_trait;
use isivol_shared::constants::cluster as const_cluster;
use isivol_shared::errors::{IsivolError, IsivolResult};
use reqwest::{Client, StatusCode, Url};

use super::VolumeService;
use crate::runtime::options::ClusterOptions;

/// Namespace API client authenticated with HTTP basic credentials.
pub struct IsilonClient {
    http: Client,
    base_url: Url,
    dataset_prefix: String,
    username: String,
    password: String,
}

impl IsilonClient {
    pub fn new(options: &ClusterOptions, dataset_prefix: &str) -> IsivolResult<Self> {
        let base_url = Url::parse(&format!("https://{}:{}/", options.address, options.port))
            .map_err(|e| {
                IsivolError::Config(format!(
                    "invalid cluster address '{}': {}",
                    options.address, e
                ))
            })?;

        let http = Client::builder()
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| IsivolError::Cluster(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            dataset_prefix: dataset_prefix.to_string(),
            username: options.username.clone(),
            password: options.password.clone(),
        })
    }

    /// `https://<address>:<port>/namespace/<dataset_prefix>/<name>`
    pub fn volume_url(&self, name: &str) -> IsivolResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IsivolError::Config(format!("cannot use {} as base URL", self.base_url)))?
            .pop_if_empty()
            .push(const_cluster::NAMESPACE_PREFIX.trim_start_matches('/'))
            .extend(self.dataset_prefix.split('/').filter(|s| !s.is_empty()))
            .push(name);
        Ok(url)
    }
}

impl std::fmt::Debug for IsilonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsilonClient")
            .field("base_url", &self.base_url.as_str())
            .field("dataset_prefix", &self.dataset_prefix)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl VolumeService for IsilonClient {
    async fn exists(&self, name: &str) -> IsivolResult<bool> {
        let url = self.volume_url(name)?;
        tracing::debug!(url = %url, "Checking volume on cluster");

        let response = self
            .http
            .head(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| IsivolError::Cluster(format!("HEAD {}: {}", name, e)))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(IsivolError::Cluster(format!(
                "unexpected status {} checking volume {}",
                status, name
            ))),
        }
    }

    async fn create(&self, name: &str) -> IsivolResult<()> {
        let url = self.volume_url(name)?;
        tracing::debug!(url = %url, "Creating volume on cluster");

        let response = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(const_cluster::TARGET_TYPE_HEADER, "container")
            .header(const_cluster::ACCESS_CONTROL_HEADER, "public_read_write")
            .send()
            .await
            .map_err(|e| IsivolError::Cluster(format!("PUT {}: {}", name, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(IsivolError::Cluster(format!(
            "unexpected status {} creating volume {}: {}",
            status,
            name,
            body.trim()
        )))
    }
}
