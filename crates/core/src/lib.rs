//! Workday core data models.
//!
//! This crate defines the work-session view, the geofence math used to
//! place an employee relative to the office, and the progress figures
//! derived from a running session.

#![warn(missing_docs)]

// Identities
mod id;

// Work sessions
mod session;
mod progress;

// Location
mod geofence;
mod roster;

// Re-exports
pub use id::EmployeeId;

// Sessions
pub use session::{
    Intent, SessionDetails, SessionError, SessionSource, SessionStatus, WorkLocation,
    WorkSession, DEFAULT_TARGET_HOURS,
};
pub use progress::SessionProgress;

// Geofence & roster
pub use geofence::{
    classify, describe_distance, distance, Coordinates, EmployeeLocationSample, GeoError,
    GeofenceResult, OfficeLocation, DEFAULT_OFFICE_RADIUS_METERS, EARTH_RADIUS_KM,
};
pub use roster::{locate_roster, AttendanceStatus, LocatedEmployee, Presence, RosterEntry};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
