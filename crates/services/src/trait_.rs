//! Service trait abstraction.

use async_trait::async_trait;
use workday_core::EmployeeId;
use crate::error::Result;
use crate::wire::{Acknowledgement, AttendanceDay, MonitoringSession, StartSessionRequest};

/// The monitoring service: explicit, pause-capable work sessions.
///
/// This trait allows different backends (HTTP, in-process fakes) to be
/// plugged in.
#[async_trait]
pub trait MonitoringService: Send + Sync {
    /// Current session for the employee; `None` when there is none.
    async fn current_session(&self, employee: &EmployeeId) -> Result<Option<MonitoringSession>>;

    /// Create a session.
    async fn start_session(&self, request: &StartSessionRequest) -> Result<MonitoringSession>;

    /// Pause the running session.
    async fn pause_session(&self, employee: &EmployeeId) -> Result<Acknowledgement>;

    /// Resume the paused session.
    async fn resume_session(&self, employee: &EmployeeId) -> Result<Acknowledgement>;

    /// End the session.
    async fn end_session(&self, employee: &EmployeeId) -> Result<Acknowledgement>;
}

/// The attendance service: daily check-in and check-out.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    /// Today's record for the employee; `None` when there is none.
    async fn verify_day(&self, employee: &EmployeeId) -> Result<Option<AttendanceDay>>;

    /// Check the employee out for the day.
    async fn end_day(&self, employee: &EmployeeId) -> Result<Acknowledgement>;
}
