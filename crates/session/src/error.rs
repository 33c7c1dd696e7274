//! Errors returned by work-day intents.

use workday_core::{EmployeeId, GeoError, Intent, SessionStatus};
use workday_services::ServiceError;

use crate::notice::Notice;

/// Error type for intents.
pub type Result<T> = std::result::Result<T, IntentError>;

/// Something the user must do before the day can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Daily progress has not been recorded
    ProgressNotSet,
    /// The daily aim is not complete
    AimNotCompleted {
        /// Status reported for the aim
        completion_status: Option<String>,
    },
    /// The aim needs a completion comment
    AimCommentMissing,
}

impl Precondition {
    /// Headline for the user.
    pub fn title(&self) -> &'static str {
        match self {
            Precondition::ProgressNotSet => "Progress Required",
            Precondition::AimNotCompleted { .. } => "Aim Not Completed",
            Precondition::AimCommentMissing => "Completion Comment Required",
        }
    }
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precondition::ProgressNotSet => {
                write!(f, "Please set your daily progress before ending your work day.")
            }
            Precondition::AimNotCompleted { completion_status } => write!(
                f,
                "Please complete your daily aim before ending your work day. Current status: {}",
                completion_status.as_deref().unwrap_or("Unknown")
            ),
            Precondition::AimCommentMissing => {
                write!(f, "Please add a completion comment for your aim.")
            }
        }
    }
}

/// Errors that can occur while carrying out an intent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntentError {
    /// The start request is malformed; nothing was sent upstream
    #[error("invalid start request: {0}")]
    Validation(String),

    /// Another intent for the same employee has not finished
    #[error("a request for {employee} is already in progress")]
    InFlight {
        /// Employee with the pending request
        employee: EmployeeId,
    },

    /// The intent is not valid from the current state
    #[error("cannot {intent} a work day that is {status}")]
    InvalidTransition {
        /// Requested intent
        intent: Intent,
        /// State the day is in
        status: SessionStatus,
    },

    /// There is no running day to act on
    #[error("no active session")]
    NoActiveSession,

    /// The user has to resolve something first
    #[error("{0}")]
    Precondition(Precondition),

    /// The upstream service failed or refused
    #[error("failed to {intent} work day: {source}")]
    Upstream {
        /// Requested intent
        intent: Intent,
        /// What the service said
        source: ServiceError,
    },
}

impl From<GeoError> for IntentError {
    fn from(err: GeoError) -> Self {
        IntentError::Validation(err.to_string())
    }
}

impl IntentError {
    /// The notice to show for this error.
    pub fn notice(&self) -> Notice {
        match self {
            IntentError::Validation(reason) => Notice::error("Invalid Location", reason.clone()),
            IntentError::InFlight { .. } => Notice::info(
                "Request In Progress",
                "Your previous request is still being processed.",
            ),
            IntentError::InvalidTransition { intent, status } => Notice::error(
                "Error",
                format!("Cannot {} a work day that is {}.", intent, status_phrase(*status)),
            ),
            IntentError::NoActiveSession => Notice::info(
                "No Active Session",
                "Your work day has already ended or was not started.",
            ),
            IntentError::Precondition(precondition) => {
                Notice::error(precondition.title(), precondition.to_string())
            }
            IntentError::Upstream { intent, source } => Notice::error(
                "Error",
                upstream_message(source)
                    .unwrap_or_else(|| format!("Failed to {} work day.", intent)),
            ),
        }
    }
}

fn status_phrase(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::NotStarted => "not started",
        SessionStatus::Active => "active",
        SessionStatus::Paused => "paused",
        SessionStatus::Completed => "completed",
    }
}

/// The service's own words, when it sent any. Transport details stay out of
/// user-facing text.
fn upstream_message(source: &ServiceError) -> Option<String> {
    match source {
        ServiceError::Rejected(rejection) => rejection.message.clone(),
        ServiceError::Transport(_) | ServiceError::Decode(_) => None,
    }
}
