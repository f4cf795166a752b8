use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        ChatError::RequestFailed(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        ChatError::MalformedResponse(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatError::Config(msg.into())
    }

    /// Whether resending the same prompt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChatError::RequestFailed(_) | ChatError::Api { .. } | ChatError::MalformedResponse(_)
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ChatError::Api {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_timeout() {
            ChatError::RequestFailed(format!("timed out: {}", err))
        } else if err.is_connect() {
            ChatError::RequestFailed(format!("could not connect: {}", err))
        } else {
            ChatError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::MalformedResponse(err.to_string())
    }
}
