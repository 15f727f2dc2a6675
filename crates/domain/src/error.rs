/// Shared error type used across all archplan crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Missing credential or otherwise unusable configuration.
    #[error("configuration: {0}")]
    Configuration(String),

    /// A remote service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    /// Network-level failure (connect, TLS, timeout, broken body).
    #[error("transport: {0}")]
    Transport(String),

    /// The model reply could not be turned into a project state.
    #[error("extraction: {0}")]
    Extraction(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Upper bound on error bodies carried inside [`Error::Upstream`].
pub const MAX_ERROR_BODY_CHARS: usize = 512;

impl Error {
    /// Build an [`Error::Upstream`], truncating the body at a char boundary.
    pub fn upstream(service: impl Into<String>, status: u16, body: &str) -> Self {
        let body = if body.len() > MAX_ERROR_BODY_CHARS {
            format!("{}…", crate::text::clip(body, MAX_ERROR_BODY_CHARS))
        } else {
            body.to_owned()
        };
        Error::Upstream {
            service: service.into(),
            status,
            body,
        }
    }

    /// The upstream HTTP status, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Every network-level failure maps to [`Error::Transport`]; timeouts keep
/// a `timeout:` prefix so logs can tell them apart.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Transport(format!("timeout: {e}"))
        } else {
            Error::Transport(e.to_string())
        }
    }
}
