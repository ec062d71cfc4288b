use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrlyError {
    #[error("Request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("Failed to parse document: {0}")]
    Parse(String),
    #[error("Failed to decode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Authentication failure: {0}")]
    AuthenticationFailed(String),
    #[error("Unable to resolve table of contents: {0}")]
    Resolution(String),
    #[error("Downloader '{0}' not found, make sure it is installed and on PATH")]
    DownloaderMissing(String),
    #[error("Downloader failed: {0}")]
    DownloaderFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrlyError {
    /// Transport level failures, as opposed to a response we could not make sense of.
    pub fn is_transport(&self) -> bool {
        matches!(self, OrlyError::HttpRequest(_) | OrlyError::Status { .. })
    }
}

pub type Result<T> = anyhow::Result<T, OrlyError>;
