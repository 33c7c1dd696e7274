//! Classification of upstream failures into actionable kinds.
//!
//! Machine-readable codes always win. Message matching only exists for
//! services that still answer with prose instead of a code.

use std::sync::LazyLock;

use regex::Regex;
use workday_services::{ErrorCode, ServiceError};

use crate::error::Precondition;

static LEGACY_NO_SESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"No active|No monitoring session found|SESSION_NOT_FOUND|NO_ACTIVE_SESSION")
        .expect("legacy no-session pattern")
});

static LEGACY_PROGRESS_NOT_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"set your daily progress|PROGRESS_NOT_SET").expect("legacy progress pattern")
});

/// What a failed upstream call means for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// The service could not be reached
    Transport,
    /// There is no session to act on
    NoActiveSession,
    /// The user has to do something first
    Precondition(Precondition),
    /// Anything else
    Other,
}

/// Classify a service error.
pub fn classify(err: &ServiceError) -> FailureKind {
    let rejection = match err {
        ServiceError::Transport(_) => return FailureKind::Transport,
        ServiceError::Decode(_) => return FailureKind::Other,
        ServiceError::Rejected(rejection) => rejection,
    };

    let by_code = match &rejection.code {
        Some(ErrorCode::SessionNotFound | ErrorCode::NoActiveSession) => {
            Some(FailureKind::NoActiveSession)
        }
        Some(ErrorCode::ProgressNotSet) => {
            Some(FailureKind::Precondition(Precondition::ProgressNotSet))
        }
        Some(ErrorCode::AimNotCompleted) => {
            Some(FailureKind::Precondition(Precondition::AimNotCompleted {
                completion_status: rejection
                    .aim
                    .as_ref()
                    .and_then(|aim| aim.completion_status.clone()),
            }))
        }
        Some(ErrorCode::AimCommentMissing) => {
            Some(FailureKind::Precondition(Precondition::AimCommentMissing))
        }
        Some(ErrorCode::Other(_)) | None => None,
    };
    if let Some(kind) = by_code {
        return kind;
    }

    match rejection.message.as_deref() {
        Some(message) if LEGACY_NO_SESSION.is_match(message) => FailureKind::NoActiveSession,
        Some(message) if LEGACY_PROGRESS_NOT_SET.is_match(message) => {
            FailureKind::Precondition(Precondition::ProgressNotSet)
        }
        _ => FailureKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workday_services::{AimStatus, Rejection};

    fn rejected(code: Option<&str>, message: Option<&str>) -> ServiceError {
        ServiceError::Rejected(Rejection {
            status: Some(400),
            code: code.map(ErrorCode::parse),
            message: message.map(str::to_string),
            aim: None,
        })
    }

    #[test]
    fn test_codes_take_precedence_over_messages() {
        let err = rejected(Some("AIM_COMMENT_MISSING"), Some("No active work session found"));
        assert_eq!(classify(&err), FailureKind::Precondition(Precondition::AimCommentMissing));
    }

    #[test]
    fn test_no_session_codes() {
        assert_eq!(classify(&rejected(Some("SESSION_NOT_FOUND"), None)), FailureKind::NoActiveSession);
        assert_eq!(classify(&rejected(Some("NO_ACTIVE_SESSION"), None)), FailureKind::NoActiveSession);
    }

    #[test]
    fn test_legacy_messages() {
        for message in [
            "No active work session found",
            "No monitoring session found",
            "No active session for employee",
        ] {
            assert_eq!(classify(&rejected(None, Some(message))), FailureKind::NoActiveSession);
        }

        assert_eq!(
            classify(&rejected(None, Some("Please set your daily progress first"))),
            FailureKind::Precondition(Precondition::ProgressNotSet)
        );
    }

    #[test]
    fn test_aim_status_is_carried() {
        let err = ServiceError::Rejected(Rejection {
            status: Some(400),
            code: Some(ErrorCode::AimNotCompleted),
            message: None,
            aim: Some(AimStatus {
                completion_status: Some("In Progress".to_string()),
                aims: None,
            }),
        });
        assert_eq!(
            classify(&err),
            FailureKind::Precondition(Precondition::AimNotCompleted {
                completion_status: Some("In Progress".to_string()),
            })
        );
    }

    #[test]
    fn test_transport_and_unknown() {
        assert_eq!(classify(&ServiceError::Transport("refused".into())), FailureKind::Transport);
        assert_eq!(classify(&ServiceError::Decode("bad json".into())), FailureKind::Other);
        assert_eq!(classify(&rejected(Some("RATE_LIMITED"), Some("slow down"))), FailureKind::Other);
        assert_eq!(classify(&rejected(None, None)), FailureKind::Other);
    }
}
