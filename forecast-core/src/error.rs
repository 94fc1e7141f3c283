use thiserror::Error;

/// Failures surfaced by the forecast pipeline.
///
/// A category value that cannot be located in the feed is not an error; it
/// shows up as an empty field on the resulting summary instead.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported location '{0}'")]
    UnknownLocation(String),

    #[error("Forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Forecast service reported failure ({code}): {message}")]
    Upstream { code: String, message: String },

    #[error("Malformed forecast response: {0}")]
    Malformed(String),

    #[error("No forecast data available")]
    NoData,
}

impl ForecastError {
    /// Whether the caller may reasonably try the same request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
