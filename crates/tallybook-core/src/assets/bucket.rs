use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AssetError, AssetResponse, ResponseSource};

/// Index file name inside a bucket directory
const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAsset {
    file: String,
    status: u16,
    content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BucketIndex {
    name: String,
    cached_at: DateTime<Utc>,
    assets: BTreeMap<String, StoredAsset>,
}

/// Requests are matched on their URL without the fragment
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

/// A named set of cached responses stored under `<root>/<name>/`.
#[derive(Debug, Clone)]
pub struct CacheBucket {
    dir: PathBuf,
    index: BucketIndex,
}

impl CacheBucket {
    fn bucket_dir(root: &Path, name: &str) -> PathBuf {
        root.join(name)
    }

    /// Open an existing bucket, `None` if it was never written
    pub fn open(root: &Path, name: &str) -> Result<Option<Self>, AssetError> {
        let dir = Self::bucket_dir(root, name);
        let index_path = dir.join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&index_path)?;
        let index: BucketIndex = serde_json::from_str(&contents)?;
        debug!(bucket = name, assets = index.assets.len(), "Cache bucket opened");

        Ok(Some(Self { dir, index }))
    }

    /// Write a complete bucket from a set of responses.
    ///
    /// Everything is written to a staging directory first and only swapped
    /// in once all files are on disk.
    pub fn write(root: &Path, name: &str, responses: &[AssetResponse]) -> Result<Self, AssetError> {
        std::fs::create_dir_all(root)?;
        let staging = root.join(format!(".{}.staging", name));
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        let mut assets = BTreeMap::new();
        for (i, response) in responses.iter().enumerate() {
            let file = format!("{}.body", i);
            std::fs::write(staging.join(&file), &response.body)?;
            assets.insert(
                response.url.clone(),
                StoredAsset {
                    file,
                    status: response.status,
                    content_type: response.content_type.clone(),
                },
            );
        }

        let index = BucketIndex {
            name: name.to_string(),
            cached_at: Utc::now(),
            assets,
        };
        std::fs::write(staging.join(INDEX_FILE), serde_json::to_string_pretty(&index)?)?;

        let dir = Self::bucket_dir(root, name);
        if dir.exists() {
            let old = root.join(format!(".{}.old", name));
            if old.exists() {
                std::fs::remove_dir_all(&old)?;
            }
            std::fs::rename(&dir, &old)?;
            std::fs::rename(&staging, &dir)?;
            std::fs::remove_dir_all(&old)?;
        } else {
            std::fs::rename(&staging, &dir)?;
        }

        debug!(bucket = name, assets = index.assets.len(), "Cache bucket written");
        Ok(Self { dir, index })
    }

    pub fn name(&self) -> &str {
        &self.index.name
    }

    pub fn len(&self) -> usize {
        self.index.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.assets.is_empty()
    }

    /// Cached URLs in sorted order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.index.assets.keys().map(String::as_str)
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.index.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.index.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    /// Look up the cached response for a URL
    pub fn lookup(&self, url: &Url) -> Result<Option<AssetResponse>, AssetError> {
        let key = cache_key(url);
        let stored = match self.index.assets.get(&key) {
            Some(stored) => stored,
            None => return Ok(None),
        };

        let body = std::fs::read(self.dir.join(&stored.file))?;
        Ok(Some(AssetResponse {
            url: key,
            status: stored.status,
            content_type: stored.content_type.clone(),
            body,
            source: ResponseSource::Cache,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn response(url: &str, body: &str) -> AssetResponse {
        AssetResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
            source: ResponseSource::Network,
        }
    }

    #[test]
    fn test_open_missing_bucket() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheBucket::open(dir.path(), "v1").unwrap().is_none());
    }

    #[test]
    fn test_write_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let written = CacheBucket::write(
            dir.path(),
            "v1",
            &[response("http://h/a.css", "a"), response("http://h/b.js", "b")],
        )
        .unwrap();
        assert_eq!(written.len(), 2);

        let bucket = CacheBucket::open(dir.path(), "v1").unwrap().unwrap();
        assert_eq!(bucket.name(), "v1");
        assert_eq!(bucket.urls().collect::<Vec<_>>(), ["http://h/a.css", "http://h/b.js"]);

        let url = Url::parse("http://h/b.js#frag").unwrap();
        let hit = bucket.lookup(&url).unwrap().unwrap();
        assert_eq!(hit.body, b"b");
        assert_eq!(hit.source, ResponseSource::Cache);
        assert_eq!(hit.content_type.as_deref(), Some("text/plain"));

        let miss = Url::parse("http://h/c.png").unwrap();
        assert!(bucket.lookup(&miss).unwrap().is_none());
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        CacheBucket::write(dir.path(), "v1", &[response("http://h/a.css", "old")]).unwrap();
        CacheBucket::write(dir.path(), "v1", &[response("http://h/b.css", "new")]).unwrap();

        let bucket = CacheBucket::open(dir.path(), "v1").unwrap().unwrap();
        assert_eq!(bucket.urls().collect::<Vec<_>>(), ["http://h/b.css"]);
        assert!(!dir.path().join(".v1.staging").exists());
        assert!(!dir.path().join(".v1.old").exists());
    }

    #[test]
    fn test_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("v1")).unwrap();
        std::fs::write(dir.path().join("v1").join(INDEX_FILE), "garbage").unwrap();
        assert!(matches!(
            CacheBucket::open(dir.path(), "v1"),
            Err(AssetError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_age_display() {
        let dir = tempfile::tempdir().unwrap();
        let mut bucket = CacheBucket::write(dir.path(), "v1", &[]).unwrap();
        assert_eq!(bucket.age_display(), "just now");
        assert!(Utc::now() - bucket.cached_at() < Duration::minutes(1));

        // The timestamp survives reopening
        let reopened = CacheBucket::open(dir.path(), "v1").unwrap().unwrap();
        assert_eq!(reopened.cached_at(), bucket.cached_at());

        bucket.index.cached_at = Utc::now() - Duration::minutes(90);
        assert_eq!(bucket.age_display(), "1h ago");

        bucket.index.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(bucket.age_display(), "3d ago");
    }
}
