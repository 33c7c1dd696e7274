//! Session control gateway.
//!
//! Issues start/pause/resume/end against the upstream services. Every intent
//! claims the employee in the in-flight guard, checks the transition against
//! a fresh read, and re-reads once it succeeds rather than trusting the
//! response body.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use workday_core::{
    Coordinates, EmployeeId, EmployeeLocationSample, Intent, SessionDetails, SessionSource,
    SessionStatus, WorkLocation, WorkSession, DEFAULT_TARGET_HOURS,
};
use workday_services::{AttendanceService, MonitoringService, StartSessionRequest};

use crate::classify::{classify, FailureKind};
use crate::error::{IntentError, Result};
use crate::guard::{InFlightGuard, InFlightTicket};
use crate::notice::Notice;
use crate::reconciler::{session_from_monitoring, Reconciler};

/// What the start-day dialog hands over once the user confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct StartDayRequest {
    /// Office or home
    pub work_location: WorkLocation,

    /// Location captured by the dialog
    pub location: Option<EmployeeLocationSample>,
}

impl StartDayRequest {
    /// Check the request before anything is sent upstream.
    pub fn validate(&self) -> Result<Coordinates> {
        let sample = self
            .location
            .as_ref()
            .ok_or_else(|| IntentError::Validation("location is required".to_string()))?;
        Ok(sample.coordinates()?)
    }
}

/// A successful intent: the re-read session and what to tell the user.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentOutcome {
    /// Session after the intent
    pub session: WorkSession,

    /// Message for the user
    pub notice: Notice,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Target length of days started through the gateway
    pub target_hours: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_HOURS,
        }
    }
}

/// Issues work-day intents against both services.
pub struct SessionGateway {
    monitoring: Arc<dyn MonitoringService>,
    attendance: Arc<dyn AttendanceService>,
    reconciler: Reconciler,
    guard: InFlightGuard,
    config: GatewayConfig,
}

impl SessionGateway {
    /// Create a gateway over the two services.
    pub fn new(
        monitoring: Arc<dyn MonitoringService>,
        attendance: Arc<dyn AttendanceService>,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(Arc::clone(&monitoring), Arc::clone(&attendance)),
            monitoring,
            attendance,
            guard: InFlightGuard::new(),
            config: GatewayConfig::default(),
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Current session for the employee. Never fails.
    pub async fn reconcile(&self, employee: &EmployeeId) -> WorkSession {
        self.reconciler.reconcile(employee).await
    }

    /// Whether the employee has an intent in flight.
    pub fn is_in_flight(&self, employee: &EmployeeId) -> bool {
        self.guard.is_in_flight(employee)
    }

    /// Start the day.
    ///
    /// If the monitoring service cannot create a session, the failure is
    /// logged and the day still starts: the re-read is used when it shows a
    /// running day, otherwise a provisional session stands in until the next
    /// read replaces it.
    pub async fn start(
        &self,
        employee: &EmployeeId,
        request: &StartDayRequest,
    ) -> Result<IntentOutcome> {
        let coordinates = request.validate()?;
        let _ticket = self.claim(employee)?;
        self.expect_transition(employee, Intent::Start).await?;

        debug!("Starting work day for {} at {}", employee, coordinates);
        let start_request = StartSessionRequest {
            employee_id: employee.clone(),
            start_time: Utc::now(),
            target_hours: self.config.target_hours,
            work_location: request.work_location,
        };

        let created = match self.monitoring.start_session(&start_request).await {
            Ok(record) => session_from_monitoring(&record),
            Err(e) => {
                warn!(
                    "Monitoring session start failed for {}, continuing with attendance data: {}",
                    employee, e
                );
                None
            }
        };

        let session = match self.reconcile(employee).await {
            running @ (WorkSession::Active(_) | WorkSession::Paused(_)) => running,
            _ => match created {
                Some(session @ WorkSession::Active(_)) => session,
                _ => WorkSession::Active(SessionDetails {
                    start_time: start_request.start_time,
                    target_hours: start_request.target_hours,
                    work_location: request.work_location,
                    source: SessionSource::Provisional,
                }),
            },
        };

        info!("Work day started for {} ({})", employee, request.work_location);
        let place = match request.work_location {
            WorkLocation::Home => "from home",
            WorkLocation::Office => "from office",
        };
        Ok(IntentOutcome {
            session,
            notice: Notice::success(
                "Work Day Started",
                format!("Your work day has begun {}!", place),
            ),
        })
    }

    /// Pause the running day. Failures are reported as the service gave them.
    pub async fn pause(&self, employee: &EmployeeId) -> Result<IntentOutcome> {
        let _ticket = self.claim(employee)?;
        self.expect_transition(employee, Intent::Pause).await?;

        self.monitoring
            .pause_session(employee)
            .await
            .map_err(|source| IntentError::Upstream {
                intent: Intent::Pause,
                source,
            })?;

        info!("Work day paused for {}", employee);
        Ok(IntentOutcome {
            session: self.reconcile(employee).await,
            notice: Notice::success("Work Day Paused", "Your work session has been paused."),
        })
    }

    /// Resume the paused day. Failures are reported as the service gave them.
    pub async fn resume(&self, employee: &EmployeeId) -> Result<IntentOutcome> {
        let _ticket = self.claim(employee)?;
        self.expect_transition(employee, Intent::Resume).await?;

        self.monitoring
            .resume_session(employee)
            .await
            .map_err(|source| IntentError::Upstream {
                intent: Intent::Resume,
                source,
            })?;

        info!("Work day resumed for {}", employee);
        Ok(IntentOutcome {
            session: self.reconcile(employee).await,
            notice: Notice::success("Work Day Resumed", "Your work session has been resumed."),
        })
    }

    /// End the day.
    ///
    /// Tries the monitoring session first. When that service has no session
    /// for the employee, the attendance service ends the day instead.
    pub async fn end(&self, employee: &EmployeeId) -> Result<IntentOutcome> {
        let _ticket = self.claim(employee)?;
        self.expect_transition(employee, Intent::End).await?;

        let monitoring_error = match self.monitoring.end_session(employee).await {
            Ok(ack) => {
                info!("Monitoring session ended for {}", employee);
                return Ok(IntentOutcome {
                    session: self.reconcile(employee).await,
                    notice: Notice::success(
                        "Work Day Ended",
                        ack.message
                            .unwrap_or_else(|| "Your work session has been completed.".to_string()),
                    ),
                });
            }
            Err(e) => e,
        };

        match classify(&monitoring_error) {
            FailureKind::NoActiveSession => {
                debug!(
                    "No monitoring session for {}, ending via attendance: {}",
                    employee, monitoring_error
                );
            }
            FailureKind::Precondition(precondition) => {
                return Err(IntentError::Precondition(precondition))
            }
            FailureKind::Transport | FailureKind::Other => {
                return Err(IntentError::Upstream {
                    intent: Intent::End,
                    source: monitoring_error,
                })
            }
        }

        match self.attendance.end_day(employee).await {
            Ok(ack) => {
                info!("Attendance day ended for {}", employee);
                Ok(IntentOutcome {
                    session: self.reconcile(employee).await,
                    notice: Notice::success(
                        "Work Day Ended",
                        ack.message
                            .unwrap_or_else(|| "Your work day has been completed.".to_string()),
                    ),
                })
            }
            Err(e) => {
                warn!("Attendance end-day failed for {}: {}", employee, e);
                Err(match classify(&e) {
                    FailureKind::NoActiveSession => IntentError::NoActiveSession,
                    FailureKind::Precondition(precondition) => {
                        IntentError::Precondition(precondition)
                    }
                    FailureKind::Transport | FailureKind::Other => IntentError::Upstream {
                        intent: Intent::End,
                        source: e,
                    },
                })
            }
        }
    }

    fn claim(&self, employee: &EmployeeId) -> Result<InFlightTicket> {
        self.guard
            .try_acquire(employee)
            .ok_or_else(|| IntentError::InFlight {
                employee: employee.clone(),
            })
    }

    /// Re-read the day and check that `intent` is allowed from it.
    ///
    /// When a service could not be read the state is unknown, so the intent
    /// goes upstream unchecked and the service's answer decides.
    async fn expect_transition(&self, employee: &EmployeeId, intent: Intent) -> Result<WorkSession> {
        let read = self.reconciler.reconcile_checked(employee).await;
        if read.read_failed {
            debug!(
                "State of {} unknown, sending {} upstream unchecked",
                employee, intent
            );
            return Ok(read.session);
        }

        let current = read.session;
        if permits(&current, intent) {
            return Ok(current);
        }
        Err(match (intent, current.status()) {
            (Intent::End, SessionStatus::NotStarted) => IntentError::NoActiveSession,
            (intent, status) => IntentError::InvalidTransition { intent, status },
        })
    }
}

/// Transition check for the gateway. An attendance check-in precedes the
/// monitoring start, so only a running monitoring session blocks a start.
fn permits(current: &WorkSession, intent: Intent) -> bool {
    match intent {
        Intent::Start => {
            current.permits(Intent::Start)
                || current
                    .details()
                    .is_some_and(|details| details.source != SessionSource::Monitoring)
        }
        _ => current.permits(intent),
    }
}
