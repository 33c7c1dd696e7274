//! Work-day session control for Workday.
//!
//! This crate merges the monitoring and attendance views into one session,
//! issues start/pause/resume/end against them, and keeps a per-employee view
//! with a progress tick.

#![warn(missing_docs)]

pub mod classify;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod notice;
pub mod reconciler;

#[cfg(test)]
mod fakes;

pub use classify::{classify, FailureKind};
pub use controller::{SessionController, SessionTicker};
pub use error::{IntentError, Precondition, Result};
pub use gateway::{GatewayConfig, IntentOutcome, SessionGateway, StartDayRequest};
pub use guard::{InFlightGuard, InFlightTicket};
pub use notice::{Notice, Severity};
pub use reconciler::{
    session_from_attendance, session_from_monitoring, Reconciler, Reconciliation,
};
