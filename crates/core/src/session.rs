//! Work session model - the reconciled view of an employee's day.

use serde::{Deserialize, Serialize};
use crate::progress::SessionProgress;
use crate::Time;

/// Target length of a work day when the upstream record carries none.
pub const DEFAULT_TARGET_HOURS: f64 = 8.0;

/// Errors raised when a session would break its own invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Target hours must be a positive, finite number
    #[error("target hours must be positive, got {0}")]
    NonPositiveTarget(f64),

    /// A completed session cannot end before it started
    #[error("session ends at {end} before it starts at {start}")]
    EndBeforeStart {
        /// Session start
        start: Time,
        /// Session end
        end: Time,
    },
}

/// Client-visible state of a work day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No work day recorded yet
    NotStarted,
    /// Work day running
    Active,
    /// Work day on hold
    Paused,
    /// Work day ended
    Completed,
}

impl SessionStatus {
    /// Whether `intent` is a valid transition out of this state.
    pub fn permits(self, intent: Intent) -> bool {
        matches!(
            (self, intent),
            (SessionStatus::NotStarted, Intent::Start)
                | (SessionStatus::Completed, Intent::Start)
                | (SessionStatus::Active, Intent::Pause)
                | (SessionStatus::Active, Intent::End)
                | (SessionStatus::Paused, Intent::Resume)
                | (SessionStatus::Paused, Intent::End)
        )
    }

    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-triggered action against the work day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Begin a (new) work day
    Start,
    /// Put the running day on hold
    Pause,
    /// Continue a paused day
    Resume,
    /// Finish the day
    End,
}

impl Intent {
    /// Verb used in user-facing messages ("Failed to pause work day.").
    pub fn verb(&self) -> &'static str {
        match self {
            Intent::Start => "start",
            Intent::Pause => "pause",
            Intent::Resume => "resume",
            Intent::End => "end",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Where the employee works from today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkLocation {
    /// At the office
    #[default]
    Office,
    /// Remote, from home
    Home,
}

impl WorkLocation {
    /// Map the attendance record's `workPattern` onto a location.
    ///
    /// Only `"Remote"` means home; every other pattern is an office day.
    pub fn from_work_pattern(pattern: Option<&str>) -> Self {
        match pattern {
            Some("Remote") => WorkLocation::Home,
            _ => WorkLocation::Office,
        }
    }

    /// Label used on the wire and in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkLocation::Office => "Office",
            WorkLocation::Home => "Home",
        }
    }
}

impl std::fmt::Display for WorkLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "office" => Ok(WorkLocation::Office),
            "home" | "remote" => Ok(WorkLocation::Home),
            other => Err(format!("unknown work location: {}", other)),
        }
    }
}

/// Which upstream produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionSource {
    /// The monitoring service's explicit session record
    Monitoring,
    /// Synthesized from the attendance day record
    Attendance,
    /// Synthesized locally after a failed start; replaced on the next read
    Provisional,
}

/// Data shared by every started session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetails {
    /// When the day started
    pub start_time: Time,

    /// Goal length of the day, in hours
    pub target_hours: f64,

    /// Office or home
    pub work_location: WorkLocation,

    /// Where this view came from
    pub source: SessionSource,
}

impl SessionDetails {
    /// Create details, rejecting a non-positive target.
    pub fn new(
        start_time: Time,
        target_hours: f64,
        work_location: WorkLocation,
        source: SessionSource,
    ) -> Result<Self, SessionError> {
        if !target_hours.is_finite() || target_hours <= 0.0 {
            return Err(SessionError::NonPositiveTarget(target_hours));
        }
        Ok(Self {
            start_time,
            target_hours,
            work_location,
            source,
        })
    }

    /// Create details with the default eight hour target.
    pub fn with_default_target(
        start_time: Time,
        work_location: WorkLocation,
        source: SessionSource,
    ) -> Self {
        Self {
            start_time,
            target_hours: DEFAULT_TARGET_HOURS,
            work_location,
            source,
        }
    }
}

/// The reconciled work-session view.
///
/// Each variant only carries the fields valid in that state, so a
/// `NotStarted` session has no start time and only `Completed` has an end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkSession {
    /// No day recorded
    #[default]
    NotStarted,
    /// Day running
    Active(SessionDetails),
    /// Day on hold
    Paused(SessionDetails),
    /// Day ended
    Completed {
        /// Shared session data
        #[serde(flatten)]
        details: SessionDetails,
        /// When the day ended
        end_time: Time,
    },
}

impl WorkSession {
    /// Build a completed session, enforcing `end_time >= start_time`.
    pub fn completed(details: SessionDetails, end_time: Time) -> Result<Self, SessionError> {
        if end_time < details.start_time {
            return Err(SessionError::EndBeforeStart {
                start: details.start_time,
                end: end_time,
            });
        }
        Ok(WorkSession::Completed { details, end_time })
    }

    /// Current state.
    pub fn status(&self) -> SessionStatus {
        match self {
            WorkSession::NotStarted => SessionStatus::NotStarted,
            WorkSession::Active(_) => SessionStatus::Active,
            WorkSession::Paused(_) => SessionStatus::Paused,
            WorkSession::Completed { .. } => SessionStatus::Completed,
        }
    }

    /// Session data, if the day has started.
    pub fn details(&self) -> Option<&SessionDetails> {
        match self {
            WorkSession::NotStarted => None,
            WorkSession::Active(details) | WorkSession::Paused(details) => Some(details),
            WorkSession::Completed { details, .. } => Some(details),
        }
    }

    /// Start time, if the day has started.
    pub fn start_time(&self) -> Option<Time> {
        self.details().map(|d| d.start_time)
    }

    /// End time, only for completed days.
    pub fn end_time(&self) -> Option<Time> {
        match self {
            WorkSession::Completed { end_time, .. } => Some(*end_time),
            _ => None,
        }
    }

    /// Target hours, falling back to the default before the day starts.
    pub fn target_hours(&self) -> f64 {
        self.details()
            .map(|d| d.target_hours)
            .unwrap_or(DEFAULT_TARGET_HOURS)
    }

    /// Whether this view was synthesized locally and awaits confirmation.
    pub fn is_provisional(&self) -> bool {
        self.details()
            .is_some_and(|d| d.source == SessionSource::Provisional)
    }

    /// Whether `intent` is allowed from the current state.
    pub fn permits(&self, intent: Intent) -> bool {
        self.status().permits(intent)
    }

    /// Progress of the day at `now`.
    ///
    /// Completed days stop counting at their end time.
    pub fn progress(&self, now: Time) -> SessionProgress {
        match self {
            WorkSession::NotStarted => SessionProgress::default(),
            WorkSession::Active(details) | WorkSession::Paused(details) => {
                SessionProgress::compute(details.start_time, now, details.target_hours)
            }
            WorkSession::Completed { details, end_time } => SessionProgress::compute(
                details.start_time,
                now.min(*end_time),
                details.target_hours,
            ),
        }
    }
}
