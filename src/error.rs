use std::path::PathBuf;
use thiserror::Error;

/// Failures of the tap-list pipeline.
///
/// `MalformedPage` means an expected marker is absent from the markup;
/// `MalformedBeer` means the marker was there but its text could not be parsed.
#[derive(Debug, Error)]
pub enum TapError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("malformed page {url}: missing `{marker}`")]
    MalformedPage { url: String, marker: &'static str },

    #[error("malformed beer `{beer}` on {url}: {details:?}")]
    MalformedBeer { url: String, beer: String, details: String },

    #[error("filesystem error at `{}`", path.display())]
    Filesystem { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to render template `{template}`")]
    Render { template: String, #[source] source: tera::Error },

    #[error("publish failed for `{key}`: {reason}")]
    Publish { key: String, reason: String },

    #[error("config error: {0}")]
    Config(String),
}

impl TapError {
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TapError::Filesystem { path: path.into(), source }
    }

    pub fn publish(key: impl Into<String>, reason: impl ToString) -> Self {
        TapError::Publish { key: key.into(), reason: reason.to_string() }
    }
}

pub type TapResult<T> = Result<T, TapError>;
