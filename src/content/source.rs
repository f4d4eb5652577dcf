//! Where hall documents come from.
//!
//! A [`HallSource`] only fetches raw document text for a validated hall id;
//! parsing lives in [`crate::content::Hall::from_json`].

use std::path::PathBuf;
#[cfg(feature = "remote")]
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::debug;
#[cfg(feature = "remote")]
use tokio::time::timeout;

use crate::config::HallsConfig;
use crate::errors::LoadCause;
use crate::validation::validate_hall_id;

/// External content collaborator keyed by hall id.
#[allow(async_fn_in_trait)]
pub trait HallSource {
    /// Fetch the raw hall document for `hall_id`.
    async fn fetch(&self, hall_id: &str) -> Result<String, LoadCause>;
}

/// Reads `<root>/<hall_id>.json` from the local filesystem.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, hall_id: &str) -> Result<PathBuf, LoadCause> {
        let id = validate_hall_id(hall_id).map_err(|e| LoadCause::InvalidId(e.to_string()))?;
        Ok(self.root.join(format!("{}.json", id)))
    }
}

impl HallSource for DirSource {
    async fn fetch(&self, hall_id: &str) -> Result<String, LoadCause> {
        let path = self.document_path(hall_id)?;
        debug!("Reading hall document {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Fetches `<base_url>/<hall_id>.json` over HTTP(S).
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl HttpSource {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_seconds),
            client: reqwest::Client::new(),
        }
    }

    /// Build the document URL for a hall id.
    pub fn document_url(&self, hall_id: &str) -> Result<String, LoadCause> {
        let id = validate_hall_id(hall_id).map_err(|e| LoadCause::InvalidId(e.to_string()))?;
        Ok(format!("{}/{}.json", self.base_url, urlencoding::encode(id)))
    }
}

#[cfg(feature = "remote")]
impl HallSource for HttpSource {
    async fn fetch(&self, hall_id: &str) -> Result<String, LoadCause> {
        let url = self.document_url(hall_id)?;
        debug!("Fetching hall document from: {}", url);

        let response = timeout(self.timeout, self.client.get(&url).send())
            .await
            .map_err(|_| LoadCause::Http(format!("request timeout after {}s", self.timeout.as_secs())))?
            .map_err(|e| LoadCause::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LoadCause::Http(format!("HTTP error {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| LoadCause::Http(format!("failed to read body: {}", e)))
    }
}

/// Source chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Dir(DirSource),
    #[cfg(feature = "remote")]
    Http(HttpSource),
}

impl ContentSource {
    /// Build the configured source (`source = "dir"` or `"http"`).
    pub fn from_config(config: &HallsConfig) -> Result<Self> {
        match config.source.as_str() {
            "dir" => Ok(ContentSource::Dir(DirSource::new(&config.content_dir))),
            #[cfg(feature = "remote")]
            "http" => {
                if config.base_url.is_empty() {
                    return Err(anyhow!("halls.base_url must be set when halls.source = \"http\""));
                }
                Ok(ContentSource::Http(HttpSource::new(
                    &config.base_url,
                    config.timeout_seconds,
                )))
            }
            #[cfg(not(feature = "remote"))]
            "http" => Err(anyhow!("HTTP hall source requires the `remote` feature")),
            other => Err(anyhow!("Invalid halls.source: {}", other)),
        }
    }
}

impl HallSource for ContentSource {
    async fn fetch(&self, hall_id: &str) -> Result<String, LoadCause> {
        match self {
            ContentSource::Dir(source) => source.fetch(hall_id).await,
            #[cfg(feature = "remote")]
            ContentSource::Http(source) => source.fetch(hall_id).await,
        }
    }
}
