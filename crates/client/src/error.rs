use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while talking to the persistence API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session token: raised before any request is sent.
    #[error("missing token, log in first")]
    MissingToken,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds the error for a non-2xx status.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => Self::Validation(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Server { status, message },
        }
    }

    /// Short message meant to be shown inline to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingToken => "No token found. Please log in.".to_string(),
            Self::Unauthorized(message) if !message.is_empty() => message.clone(),
            Self::Unauthorized(_) => {
                "Login failed. Check your user name and password.".to_string()
            }
            Self::Forbidden(_) => "You are not allowed to access this data.".to_string(),
            Self::NotFound(message) => format!("Not found: {message}"),
            Self::Conflict(message) | Self::Validation(message) => message.clone(),
            Self::Server { status, message } => format!("Server error {status}: {message}"),
            Self::Transport(err) => format!("Server unreachable: {err}"),
            Self::Malformed(message) => format!("Unexpected server response: {message}"),
            Self::InvalidUrl(message) => format!("Invalid server address: {message}"),
            Self::Engine(err) => err.to_string(),
            Self::Io(err) => format!("Local storage error: {err}"),
            Self::Json(err) => format!("Local storage is corrupted: {err}"),
        }
    }
}
