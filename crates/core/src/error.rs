use thiserror::Error;

/// Startup configuration failures. Fatal: the server never starts serving.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid warehouse endpoint '{0}': expected an http(s) URL")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A failed call against the warehouse API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The warehouse answered with a non-success status.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl UpstreamError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    /// An API failure that carries no status code.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Numeric status code, when the failure has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}
