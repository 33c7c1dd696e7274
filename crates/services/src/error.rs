//! Error envelope shared by both upstream services.

use serde::Deserialize;

/// Error type for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur when calling an upstream service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered and refused the request
    #[error("{0}")]
    Rejected(Rejection),

    /// The service answered with a body we could not read
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Machine-readable code, when the service sent one.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            ServiceError::Rejected(rejection) => rejection.code.as_ref(),
            _ => None,
        }
    }

    /// Human-readable message, when the service sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ServiceError::Rejected(rejection) => rejection.message.as_deref(),
            ServiceError::Transport(message) | ServiceError::Decode(message) => Some(message),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Rejection codes the services are known to emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No monitoring session exists for the employee
    SessionNotFound,
    /// A session exists but is not running
    NoActiveSession,
    /// Daily progress has not been recorded
    ProgressNotSet,
    /// The daily aim is not complete
    AimNotCompleted,
    /// The daily aim has no completion comment
    AimCommentMissing,
    /// Any other code, kept verbatim
    Other(String),
}

impl ErrorCode {
    /// Parse a wire code.
    pub fn parse(code: &str) -> Self {
        match code {
            "SESSION_NOT_FOUND" => ErrorCode::SessionNotFound,
            "NO_ACTIVE_SESSION" => ErrorCode::NoActiveSession,
            "PROGRESS_NOT_SET" => ErrorCode::ProgressNotSet,
            "AIM_NOT_COMPLETED" => ErrorCode::AimNotCompleted,
            "AIM_COMMENT_MISSING" => ErrorCode::AimCommentMissing,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    /// Wire form of the code.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::NoActiveSession => "NO_ACTIVE_SESSION",
            ErrorCode::ProgressNotSet => "PROGRESS_NOT_SET",
            ErrorCode::AimNotCompleted => "AIM_NOT_COMPLETED",
            ErrorCode::AimCommentMissing => "AIM_COMMENT_MISSING",
            ErrorCode::Other(code) => code,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the daily aim attached to an `AIM_*` rejection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AimStatus {
    /// e.g. "Pending", "In Progress"
    #[serde(default)]
    pub completion_status: Option<String>,

    /// Aim text
    #[serde(default)]
    pub aims: Option<String>,
}

/// Raw error body, `{code, error | message, aim}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code
    #[serde(default)]
    pub code: Option<String>,

    /// Preferred message field
    #[serde(default)]
    pub error: Option<String>,

    /// Fallback message field
    #[serde(default)]
    pub message: Option<String>,

    /// Aim details for aim rejections
    #[serde(default)]
    pub aim: Option<AimStatus>,
}

/// A request the service refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rejection {
    /// HTTP status, if the rejection came over HTTP
    pub status: Option<u16>,

    /// Parsed code
    pub code: Option<ErrorCode>,

    /// `error` if present, else `message`
    pub message: Option<String>,

    /// Aim details
    pub aim: Option<AimStatus>,
}

impl Rejection {
    /// Build a rejection from a parsed error body.
    pub fn from_body(status: Option<u16>, body: ErrorBody) -> Self {
        Self {
            status,
            code: body.code.as_deref().map(ErrorCode::parse),
            message: body.error.or(body.message),
            aim: body.aim,
        }
    }

    /// Build a rejection from raw response text; non-JSON text becomes the message.
    pub fn from_text(status: Option<u16>, text: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(text) {
            Ok(body) => Self::from_body(status, body),
            Err(_) => Self {
                status,
                message: (!text.trim().is_empty()).then(|| text.trim().to_string()),
                ..Self::default()
            },
        }
    }

    /// A rejection carrying only a code.
    pub fn with_code(code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// A rejection carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{}: {}", code, message),
            (Some(code), None) => write!(f, "{}", code),
            (None, Some(message)) => write!(f, "{}", message),
            (None, None) => match self.status {
                Some(status) => write!(f, "request rejected with status {}", status),
                None => write!(f, "request rejected"),
            },
        }
    }
}
