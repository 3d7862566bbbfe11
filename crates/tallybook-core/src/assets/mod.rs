//! Offline asset cache.
//!
//! The `AssetWorker` pre-fetches a fixed manifest of static assets into a
//! named cache bucket on install, then answers asset requests from that
//! bucket, falling back to the network for anything it does not hold.
//!
//! Only the install step ever writes to the bucket. A failed install leaves
//! whatever was cached before untouched.

pub mod bucket;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod worker;

pub use bucket::CacheBucket;
pub use error::AssetError;
pub use fetch::{AssetRequest, AssetResponse, Fetcher, HttpFetcher, ResponseSource};
pub use manifest::{ASSETS, CACHE_NAME};
pub use worker::{AssetWorker, WorkerState};
