//! Upstream service interfaces for Workday.
//!
//! This crate provides trait-based interfaces for the monitoring and
//! attendance services, their JSON contracts, and reqwest-backed
//! implementations.

#![warn(missing_docs)]

pub mod error;
pub mod wire;
pub mod trait_;
pub mod http;

pub use error::{AimStatus, ErrorBody, ErrorCode, Rejection, Result, ServiceError};
pub use wire::{Acknowledgement, AttendanceDay, MonitoringSession, StartSessionRequest};
pub use trait_::{AttendanceService, MonitoringService};
pub use http::{ApiClient, HttpAttendanceService, HttpMonitoringService};
