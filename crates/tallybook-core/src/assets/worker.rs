use std::path::PathBuf;

use reqwest::{Method, Url};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::bucket::{cache_key, CacheBucket};
use super::manifest::{self, CACHE_NAME};
use super::{AssetError, AssetRequest, AssetResponse, Fetcher};

/// Lifecycle of the asset worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninstalled,
    Installing,
    Active,
}

pub struct AssetWorker<F> {
    fetcher: F,
    origin: Url,
    cache_root: PathBuf,
    state: watch::Sender<WorkerState>,
    bucket: Option<CacheBucket>,
}

impl<F: Fetcher> AssetWorker<F> {
    /// Create a worker. If the bucket was installed by an earlier run the
    /// worker starts out active.
    pub fn new(fetcher: F, origin: Url, cache_root: PathBuf) -> Self {
        let bucket = match CacheBucket::open(&cache_root, CACHE_NAME) {
            Ok(bucket) => bucket,
            Err(e) => {
                warn!(error = %e, bucket = CACHE_NAME, "Ignoring unreadable cache bucket");
                None
            }
        };

        let state = if bucket.is_some() {
            WorkerState::Active
        } else {
            WorkerState::Uninstalled
        };

        Self {
            fetcher,
            origin,
            cache_root,
            state: watch::Sender::new(state),
            bucket,
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Follow state changes, including `Installing` while an install runs
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: WorkerState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "Asset worker state changed");
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn bucket(&self) -> Option<&CacheBucket> {
        self.bucket.as_ref()
    }

    /// Pre-fetch every manifest asset into the bucket.
    ///
    /// All-or-nothing: if any asset fails to fetch, nothing is written and
    /// the worker goes back to the state it was in before. Returns the number
    /// of cached assets.
    pub async fn install(&mut self) -> Result<usize, AssetError> {
        let previous = self.state();
        self.set_state(WorkerState::Installing);
        info!(bucket = CACHE_NAME, origin = %self.origin, "Installing asset cache");

        match self.populate().await {
            Ok(bucket) => {
                let count = bucket.len();
                self.bucket = Some(bucket);
                self.set_state(WorkerState::Active);
                info!(bucket = CACHE_NAME, count, "Asset cache installed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, bucket = CACHE_NAME, "Asset cache install failed");
                self.set_state(previous);
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<CacheBucket, AssetError> {
        let urls = manifest::resolve_all(&self.origin)?;
        let fetcher = &self.fetcher;

        let fetches = urls.into_iter().map(|url| async move {
            let request = AssetRequest::get(url);
            let mut response = fetcher.fetch(&request).await?;
            if !response.is_success() {
                return Err(AssetError::BadStatus {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            response.url = cache_key(&request.url);
            Ok::<_, AssetError>(response)
        });

        let responses: Vec<AssetResponse> = futures::future::try_join_all(fetches).await?;
        CacheBucket::write(&self.cache_root, CACHE_NAME, &responses)
    }

    /// Answer a request from the cache when possible, otherwise from the
    /// network. Network responses are returned as-is and never cached.
    pub async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, AssetError> {
        if let Some(hit) = self.match_cache(request) {
            debug!(url = %request.url, "Served from cache");
            return Ok(hit);
        }

        debug!(url = %request.url, "Cache miss, going to network");
        self.fetcher.fetch(request).await
    }

    /// Resolve a path against the origin and fetch it
    pub async fn fetch_path(&self, path: &str) -> Result<AssetResponse, AssetError> {
        let url = manifest::resolve(&self.origin, path)?;
        self.fetch(&AssetRequest::get(url)).await
    }

    fn match_cache(&self, request: &AssetRequest) -> Option<AssetResponse> {
        if self.state() != WorkerState::Active || request.method != Method::GET {
            return None;
        }

        let bucket = self.bucket.as_ref()?;
        match bucket.lookup(&request.url) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, url = %request.url, "Failed to read cached asset");
                None
            }
        }
    }
}
