use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{payload, BackendAdapter};

/// Connection settings for an HTTP key-value backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Idle connections kept per host; size to the run's concurrency.
    pub pool_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3030".to_string(),
            timeout_secs: 10,
            pool_size: 100,
        }
    }
}

/// Key-value store backend driven over its REST surface.
///
/// The store upserts, so insert and update hit the same endpoint; the
/// driver still distinguishes them when attributing latency.
pub struct HttpAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdapter {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_size)
            .pool_idle_timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_millis(500))
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn put(&self, id: u64) -> Result<()> {
        let url = format!("{}/v1/put/{}", self.base_url, id);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(payload())
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("PUT {} failed with status {}", id, response.status());
        }
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for HttpAdapter {
    async fn setup(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("backend unhealthy: {} returned {}", url, response.status());
        }
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        // The store has no scratch namespace to drop.
        Ok(())
    }

    async fn read(&self, id: u64) -> Result<()> {
        let url = format!("{}/v1/get/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        // Absent keys answer 404; that is a served read, not a failure.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            bail!("GET {} failed with status {}", id, response.status());
        }
        Ok(())
    }

    async fn insert(&self, id: u64) -> Result<()> {
        self.put(id).await
    }

    async fn update(&self, id: u64) -> Result<()> {
        self.put(id).await
    }
}
