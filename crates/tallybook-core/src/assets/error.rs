use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Invalid asset URL: {0}")]
    InvalidUrl(String),

    #[error("Could not reach {0}")]
    Unreachable(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to fetch {url}: status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Cache storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Cache index is corrupt: {0}")]
    CorruptIndex(#[from] serde_json::Error),
}

impl AssetError {
    /// Classify a transport failure; connection failures mean we are offline
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AssetError::Unreachable(url.to_string())
        } else {
            AssetError::Network(err)
        }
    }
}
