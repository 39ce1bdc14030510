//! Error types for seoscope

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeoscopeError {
    #[error("Failed to fetch URL: {url}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for URL: {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("All {attempts} fetch endpoints failed for {url} (last error: {last_error})")]
    ProxiesExhausted {
        url: String,
        attempts: usize,
        last_error: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("AI API error: {0}")]
    AiError(String),

    #[error("Failed to parse AI response: {0}")]
    ParseError(String),

    #[error("Keyword API error: {0}")]
    KeywordError(String),

    #[error("Deployment API error: {0}")]
    DeployError(String),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("Invalid project archive: {0}")]
    ArchiveError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("File system error")]
    FsError(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, SeoscopeError>;
