use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
