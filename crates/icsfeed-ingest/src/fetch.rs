//! Document retrieval.
//!
//! A locator is either a local path (optionally as a `file://` URL) or an
//! `http(s)://` URL. Remote documents are written to a transient file under
//! the configured directory, read back, and removed unless the configuration
//! asks to keep them.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::debug;
use url::Url;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves raw document text for a locator.
///
/// The session only talks to this trait, so tests and embedders can supply
/// their own transport.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, IngestResult<String>>;
}

/// Returns true for `http://` and `https://` locators.
pub fn is_remote(locator: &str) -> bool {
    Url::parse(locator).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Maps a local locator to a filesystem path, decoding `file://` URLs.
pub fn local_path(locator: &str) -> PathBuf {
    Url::parse(locator)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(locator))
}

/// The default fetcher: local files plus HTTP(S) with transient files.
pub struct DocumentFetcher {
    #[cfg_attr(not(feature = "remote"), allow(dead_code))]
    config: IngestConfig,
    #[cfg(feature = "remote")]
    client: reqwest::Client,
}

impl DocumentFetcher {
    /// Creates a fetcher for the given configuration.
    pub fn new(config: IngestConfig) -> IngestResult<Self> {
        #[cfg(feature = "remote")]
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(IngestError::client)?;

        Ok(Self {
            config,
            #[cfg(feature = "remote")]
            client,
        })
    }

    async fn fetch_local(&self, locator: &str) -> IngestResult<String> {
        let path = local_path(locator);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(IngestError::not_found(locator));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| IngestError::read(locator, e))?;
        debug!(locator, bytes = bytes.len(), "Read local document");

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[cfg(feature = "remote")]
    async fn fetch_remote(&self, locator: &str) -> IngestResult<String> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| IngestError::download(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::http_status(locator, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IngestError::download(locator, e))?;

        let dir = self.config.temp_file_path.clone();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| IngestError::read(locator, e))?;

        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix("icsfeed-")
                .suffix(".ics")
                .tempfile_in(&dir)
                .map(tempfile::NamedTempFile::into_temp_path)
        })
        .await
        .map_err(|e| IngestError::read(locator, e))?
        .map_err(|e| IngestError::read(locator, e))?;

        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| IngestError::read(locator, e))?;
        let bytes = tokio::fs::read(&temp)
            .await
            .map_err(|e| IngestError::read(locator, e))?;

        let path = temp.keep().map_err(|e| IngestError::read(locator, e))?;
        debug!(locator, bytes = bytes.len(), path = %path.display(), "Downloaded document");

        if self.config.delete_temp_files {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| IngestError::read(locator, e))?;
        } else {
            debug!(locator, path = %path.display(), "Kept downloaded document");
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[cfg(not(feature = "remote"))]
    async fn fetch_remote(&self, locator: &str) -> IngestResult<String> {
        Err(IngestError::download(
            locator,
            "remote sources are not supported in this build",
        ))
    }
}

impl Fetcher for DocumentFetcher {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, IngestResult<String>> {
        Box::pin(async move {
            if is_remote(locator) {
                self.fetch_remote(locator).await
            } else {
                self.fetch_local(locator).await
            }
        })
    }
}
