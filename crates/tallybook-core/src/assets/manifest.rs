use reqwest::Url;

use super::AssetError;

/// Name of the cache bucket. A new name means a new, separate bucket.
pub const CACHE_NAME: &str = "tallybook-v1";

/// Assets pre-fetched on install, relative to the asset origin
pub const ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./script.js",
    "./manifest.json",
];

pub fn parse_origin(origin: &str) -> Result<Url, AssetError> {
    let mut url = Url::parse(origin).map_err(|e| AssetError::InvalidUrl(format!("{}: {}", origin, e)))?;
    // Relative paths resolve against the last path segment unless it ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve a path against the origin
pub fn resolve(origin: &Url, path: &str) -> Result<Url, AssetError> {
    origin
        .join(path)
        .map_err(|e| AssetError::InvalidUrl(format!("{}: {}", path, e)))
}

/// Resolve every manifest entry against the origin
pub fn resolve_all(origin: &Url) -> Result<Vec<Url>, AssetError> {
    ASSETS.iter().map(|path| resolve(origin, path)).collect()
}
