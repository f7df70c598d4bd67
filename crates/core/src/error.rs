use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("unsupported upload type: {0} (expected .pdf, .docx or .txt)")]
    UnsupportedUpload(String),

    #[error("unknown view address: {0}")]
    InvalidView(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Transport failures and 429/5xx responses are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(error) => error.is_connect() || error.is_timeout() || error.is_request(),
            ClientError::Backend { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Text suitable for showing to the user: the backend's own message when
    /// it sent one, otherwise the error description.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
