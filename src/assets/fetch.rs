//! Byte sources for models and textures
//!
//! The cache never talks to the network directly; it asks an [`AssetFetcher`]
//! for the bytes behind a URL. Fetch futures are `'static` so they can be
//! shared between every caller waiting on the same URL.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::RwLock;

use crate::error::LoadError;

/// Resolves an asset URL to its raw bytes.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, LoadError>>;
}

/// In-memory asset source.
///
/// Counts fetches so callers can verify cache behaviour.
#[derive(Default)]
pub struct MemoryFetcher {
    assets: RwLock<HashMap<String, Arc<Vec<u8>>>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, bytes: impl Into<Vec<u8>>) {
        self.assets
            .write()
            .insert(url.to_string(), Arc::new(bytes.into()));
    }

    pub fn remove(&self, url: &str) {
        self.assets.write().remove(url);
    }

    /// Number of fetches issued so far, including failed ones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = match self.assets.read().get(url) {
            Some(bytes) => Ok(bytes.as_ref().clone()),
            None => Err(LoadError::fetch(url, "not found")),
        };
        future::ready(result).boxed()
    }
}

/// Reads `file://` URLs and plain paths from disk.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl AssetFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
        let path = self.resolve(url);
        let url = url.to_string();
        async move { std::fs::read(&path).map_err(|e| LoadError::fetch(&url, e)) }.boxed()
    }
}

/// HTTP(S) fetcher backed by `reqwest`. The returned futures need a tokio
/// runtime.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
        let client = self.client.clone();
        let url = url.to_string();
        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| LoadError::fetch(&url, e))?;
            let bytes = response.bytes().await.map_err(|e| LoadError::fetch(&url, e))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}
