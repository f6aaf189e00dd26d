use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(u16),

    /// The remote system answered but refused the request (ErrorCode != 1)
    #[error("{status} ({code}): {message}")]
    Platform { code: i32, status: String, message: String },

    #[error("missing path parameters: {0}")]
    MissingPathParam(String),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("no viable profile, {} request(s) failed", .0.len())]
    NoViableProfile(Vec<ApiError>),
}

impl ApiError {
    pub fn platform(code: i32, status: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Platform {
            code,
            status: status.into(),
            message: message.into(),
        }
    }

    /// Worth trying again later (throttling or a server side hiccup)
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            ApiError::Timeout(_) => true,
            _ => false,
        }
    }
}
