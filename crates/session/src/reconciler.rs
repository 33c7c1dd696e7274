//! Session state merger.
//!
//! Builds one [`WorkSession`] from the monitoring and attendance services.
//! Precedence is fixed:
//!
//! 1. A usable monitoring session is authoritative.
//! 2. Otherwise the attendance day record is mapped onto a session.
//! 3. Otherwise, or on any failure, the day is `NotStarted`.
//!
//! Reads never fail outward; every error resolves to `NotStarted`.

use std::sync::Arc;

use tracing::{debug, warn};
use workday_core::{
    EmployeeId, SessionDetails, SessionSource, WorkLocation, WorkSession, DEFAULT_TARGET_HOURS,
};
use workday_services::{AttendanceDay, AttendanceService, MonitoringService, MonitoringSession};

/// Merges both upstream views into a single session.
#[derive(Clone)]
pub struct Reconciler {
    monitoring: Arc<dyn MonitoringService>,
    attendance: Arc<dyn AttendanceService>,
}

impl Reconciler {
    /// Create a reconciler over the two services.
    pub fn new(
        monitoring: Arc<dyn MonitoringService>,
        attendance: Arc<dyn AttendanceService>,
    ) -> Self {
        Self {
            monitoring,
            attendance,
        }
    }

    /// Current work session for the employee.
    pub async fn reconcile(&self, employee: &EmployeeId) -> WorkSession {
        self.reconcile_checked(employee).await.session
    }

    /// Current work session, noting whether an upstream read failed on the
    /// way. A failed read makes `NotStarted` mean "unknown" rather than
    /// "no day".
    pub async fn reconcile_checked(&self, employee: &EmployeeId) -> Reconciliation {
        let mut read_failed = false;

        match self.monitoring.current_session(employee).await {
            Ok(Some(record)) => match session_from_monitoring(&record) {
                Some(session) => {
                    debug!("Monitoring session for {}: {}", employee, session.status());
                    return Reconciliation {
                        session,
                        read_failed,
                    };
                }
                None => warn!(
                    "Ignoring unusable monitoring session for {}: {:?}",
                    employee, record
                ),
            },
            Ok(None) => debug!("No monitoring session for {}", employee),
            Err(e) => {
                debug!(
                    "Monitoring lookup failed for {}, checking attendance: {}",
                    employee, e
                );
                read_failed = true;
            }
        }

        let session = match self.attendance.verify_day(employee).await {
            Ok(Some(day)) => session_from_attendance(&day),
            Ok(None) => WorkSession::NotStarted,
            Err(e) => {
                warn!("Attendance lookup failed for {}: {}", employee, e);
                read_failed = true;
                WorkSession::NotStarted
            }
        };
        Reconciliation {
            session,
            read_failed,
        }
    }
}

/// A reconciled session and whether it rests on a complete read.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Merged session
    pub session: WorkSession,

    /// At least one service could not be read
    pub read_failed: bool,
}

/// Map a monitoring record onto a session.
///
/// Returns `None` for records that cannot be trusted: unknown status, no
/// start time, or a completed record without a valid end.
pub fn session_from_monitoring(record: &MonitoringSession) -> Option<WorkSession> {
    let start_time = record.start_time?;
    let target_hours = record
        .target_hours
        .filter(|hours| hours.is_finite() && *hours > 0.0)
        .unwrap_or(DEFAULT_TARGET_HOURS);
    let work_location = record
        .work_location
        .as_deref()
        .and_then(|location| location.parse().ok())
        .unwrap_or(WorkLocation::Office);

    let details = SessionDetails::new(
        start_time,
        target_hours,
        work_location,
        SessionSource::Monitoring,
    )
    .ok()?;

    match record.status.as_deref()?.to_lowercase().as_str() {
        "active" => Some(WorkSession::Active(details)),
        "paused" => Some(WorkSession::Paused(details)),
        "completed" => WorkSession::completed(details, record.end_time?).ok(),
        _ => None,
    }
}

/// Map the attendance day record onto a session.
pub fn session_from_attendance(day: &AttendanceDay) -> WorkSession {
    let Some(start_time) = day.start_day_time else {
        if day.end_day_time.is_some() {
            warn!("Attendance record has a check-out without a check-in");
        }
        return WorkSession::NotStarted;
    };

    let details = SessionDetails::with_default_target(
        start_time,
        WorkLocation::from_work_pattern(day.work_pattern.as_deref()),
        SessionSource::Attendance,
    );

    match day.end_day_time {
        None => WorkSession::Active(details),
        Some(end_time) => WorkSession::completed(details, end_time).unwrap_or_else(|e| {
            warn!("Discarding inconsistent attendance record: {}", e);
            WorkSession::NotStarted
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{at, FakeAttendance, FakeMonitoring};
    use workday_core::SessionStatus;
    use workday_services::{ErrorCode, Rejection, ServiceError};

    fn reconciler(monitoring: &Arc<FakeMonitoring>, attendance: &Arc<FakeAttendance>) -> Reconciler {
        Reconciler::new(monitoring.clone(), attendance.clone())
    }

    fn employee() -> EmployeeId {
        EmployeeId::new("e-1")
    }

    #[tokio::test]
    async fn test_monitoring_session_is_authoritative() {
        let monitoring = Arc::new(FakeMonitoring::new().with_current(Ok(Some(MonitoringSession {
            status: Some("paused".into()),
            start_time: Some(at(9, 0)),
            end_time: None,
            target_hours: Some(6.0),
            work_location: Some("Home".into()),
        }))));
        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay {
            start_day_time: Some(at(8, 0)),
            end_day_time: Some(at(17, 0)),
            work_pattern: None,
        }))));

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;

        assert_eq!(session.status(), SessionStatus::Paused);
        let details = session.details().unwrap();
        assert_eq!(details.start_time, at(9, 0));
        assert_eq!(details.target_hours, 6.0);
        assert_eq!(details.work_location, WorkLocation::Home);
        assert_eq!(details.source, SessionSource::Monitoring);
        assert_eq!(attendance.calls(), Vec::<&str>::new());
    }

    #[tokio::test]
    async fn test_remote_attendance_day_is_active_at_home() {
        let monitoring = Arc::new(FakeMonitoring::new());
        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay {
            start_day_time: Some(at(9, 30)),
            end_day_time: None,
            work_pattern: Some("Remote".into()),
        }))));

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;

        assert_eq!(session.status(), SessionStatus::Active);
        let details = session.details().unwrap();
        assert_eq!(details.start_time, at(9, 30));
        assert_eq!(details.target_hours, 8.0);
        assert_eq!(details.work_location, WorkLocation::Home);
        assert_eq!(details.source, SessionSource::Attendance);
    }

    #[tokio::test]
    async fn test_attendance_day_with_check_out_is_completed() {
        let monitoring = Arc::new(FakeMonitoring::new());
        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay {
            start_day_time: Some(at(9, 0)),
            end_day_time: Some(at(18, 0)),
            work_pattern: Some("Regular".into()),
        }))));

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.start_time(), Some(at(9, 0)));
        assert_eq!(session.end_time(), Some(at(18, 0)));
        assert_eq!(session.details().unwrap().work_location, WorkLocation::Office);
    }

    #[tokio::test]
    async fn test_monitoring_failure_falls_back_to_attendance() {
        let monitoring = Arc::new(FakeMonitoring::new().with_current(Err(ServiceError::Rejected(
            Rejection::with_code(ErrorCode::SessionNotFound),
        ))));
        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay {
            start_day_time: Some(at(9, 0)),
            end_day_time: None,
            work_pattern: None,
        }))));

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[tokio::test]
    async fn test_both_services_failing_is_not_started() {
        let monitoring = Arc::new(
            FakeMonitoring::new().with_current(Err(ServiceError::Transport("down".into()))),
        );
        let attendance = Arc::new(
            FakeAttendance::new().with_day(Err(ServiceError::Transport("down".into()))),
        );

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;
        assert_eq!(session, WorkSession::NotStarted);
    }

    #[tokio::test]
    async fn test_both_services_empty_is_not_started() {
        let monitoring = Arc::new(FakeMonitoring::new());
        let attendance = Arc::new(FakeAttendance::new());

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;
        assert_eq!(session, WorkSession::NotStarted);

        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay::default()))));
        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;
        assert_eq!(session, WorkSession::NotStarted);
    }

    #[tokio::test]
    async fn test_unusable_monitoring_record_is_skipped() {
        let monitoring = Arc::new(FakeMonitoring::new().with_current(Ok(Some(MonitoringSession {
            status: Some("active".into()),
            start_time: None,
            ..MonitoringSession::default()
        }))));
        let attendance = Arc::new(FakeAttendance::new());

        let session = reconciler(&monitoring, &attendance).reconcile(&employee()).await;
        assert_eq!(session, WorkSession::NotStarted);
        assert_eq!(attendance.calls(), vec!["verify_day"]);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let monitoring = Arc::new(FakeMonitoring::new());
        let attendance = Arc::new(FakeAttendance::new().with_day(Ok(Some(AttendanceDay {
            start_day_time: Some(at(9, 0)),
            end_day_time: None,
            work_pattern: Some("Remote".into()),
        }))));
        let reconciler = reconciler(&monitoring, &attendance);

        let first = reconciler.reconcile(&employee()).await;
        let second = reconciler.reconcile(&employee()).await;

        assert_eq!(first, second);
        assert_eq!(monitoring.calls(), vec!["current_session", "current_session"]);
        assert_eq!(attendance.calls(), vec!["verify_day", "verify_day"]);
    }

    #[tokio::test]
    async fn test_checked_read_reports_failures() {
        let monitoring = Arc::new(
            FakeMonitoring::new().with_current(Err(ServiceError::Transport("down".into()))),
        );
        let attendance = Arc::new(FakeAttendance::new());
        let read = reconciler(&monitoring, &attendance)
            .reconcile_checked(&employee())
            .await;
        assert_eq!(read.session, WorkSession::NotStarted);
        assert!(read.read_failed);

        let monitoring = Arc::new(FakeMonitoring::new());
        let read = reconciler(&monitoring, &attendance)
            .reconcile_checked(&employee())
            .await;
        assert_eq!(read.session, WorkSession::NotStarted);
        assert!(!read.read_failed);
    }

    #[test]
    fn test_monitoring_mapping_edge_cases() {
        let base = MonitoringSession {
            status: Some("Active".into()),
            start_time: Some(at(9, 0)),
            end_time: None,
            target_hours: Some(-1.0),
            work_location: Some("Moon".into()),
        };
        let session = session_from_monitoring(&base).unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.target_hours(), DEFAULT_TARGET_HOURS);
        assert_eq!(session.details().unwrap().work_location, WorkLocation::Office);

        let completed_without_end = MonitoringSession {
            status: Some("completed".into()),
            ..base.clone()
        };
        assert!(session_from_monitoring(&completed_without_end).is_none());

        let ends_before_start = MonitoringSession {
            status: Some("completed".into()),
            end_time: Some(at(8, 0)),
            ..base.clone()
        };
        assert!(session_from_monitoring(&ends_before_start).is_none());

        let unknown = MonitoringSession {
            status: Some("archived".into()),
            ..base
        };
        assert!(session_from_monitoring(&unknown).is_none());
    }

    #[test]
    fn test_attendance_mapping_edge_cases() {
        let check_out_only = AttendanceDay {
            start_day_time: None,
            end_day_time: Some(at(17, 0)),
            work_pattern: None,
        };
        assert_eq!(session_from_attendance(&check_out_only), WorkSession::NotStarted);

        let inverted = AttendanceDay {
            start_day_time: Some(at(17, 0)),
            end_day_time: Some(at(9, 0)),
            work_pattern: None,
        };
        assert_eq!(session_from_attendance(&inverted), WorkSession::NotStarted);
    }
}
