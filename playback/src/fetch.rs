//! Fetching raw asset bytes
//!
//! Locators are resolved the way a browser resolves them from the sound
//! board page: absolute `http(s)` URLs go over HTTP, relative locators are
//! joined to a base URL when one is configured and otherwise read from disk
//! relative to a root directory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;
use crate::locator::Locator;

/// Boxed future returned by [`AssetFetcher::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, FetchError>> + Send + 'a>>;

/// Retrieves the encoded bytes behind a locator
pub trait AssetFetcher: Send + Sync {
    fn fetch<'a>(&'a self, locator: &'a Locator) -> FetchFuture<'a>;
}

/// Default fetcher: HTTP for URLs, filesystem for relative paths
pub struct LocatorFetcher {
    client: reqwest::Client,
    root: PathBuf,
    base_url: Option<Url>,
}

impl LocatorFetcher {
    /// Fetcher that reads relative locators from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            root: root.into(),
            base_url: None,
        }
    }

    /// Resolve relative locators against `base_url` instead of the filesystem
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a locator will be read from
    fn resolve(&self, locator: &Locator) -> Result<Source, FetchError> {
        let invalid = |reason: String| FetchError::InvalidLocator {
            locator: locator.to_string(),
            reason,
        };

        if locator.as_str().trim().is_empty() {
            return Err(invalid("empty locator".to_string()));
        }

        if locator.is_remote() {
            let url = Url::parse(locator.as_str()).map_err(|e| invalid(e.to_string()))?;
            return Ok(Source::Remote(url));
        }

        match &self.base_url {
            Some(base) => {
                let url = base
                    .join(locator.as_str())
                    .map_err(|e| invalid(e.to_string()))?;
                Ok(Source::Remote(url))
            }
            None => Ok(Source::Local(self.root.join(locator.as_str()))),
        }
    }

    async fn fetch_remote(&self, locator: &Locator, url: Url) -> Result<Bytes, FetchError> {
        let http_error = |e: reqwest::Error| FetchError::Http {
            locator: locator.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(http_error)
    }

    async fn fetch_local(&self, locator: &Locator, path: PathBuf) -> Result<Bytes, FetchError> {
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| FetchError::Io {
                locator: locator.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl AssetFetcher for LocatorFetcher {
    fn fetch<'a>(&'a self, locator: &'a Locator) -> FetchFuture<'a> {
        Box::pin(async move {
            match self.resolve(locator)? {
                Source::Remote(url) => {
                    debug!("Fetching {} from {}", locator, url);
                    self.fetch_remote(locator, url).await
                }
                Source::Local(path) => {
                    debug!("Reading {} from {}", locator, path.display());
                    self.fetch_local(locator, path).await
                }
            }
        })
    }
}
