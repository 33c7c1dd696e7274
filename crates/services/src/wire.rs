//! JSON contracts of the monitoring and attendance services.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workday_core::{EmployeeId, Time, WorkLocation};

/// A monitoring session as the service returns it.
///
/// Every field is optional on the wire; the reconciler decides what a
/// usable record looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSession {
    /// "active", "paused" or "completed"
    #[serde(default)]
    pub status: Option<String>,

    /// Session start
    #[serde(default)]
    pub start_time: Option<Time>,

    /// Session end
    #[serde(default)]
    pub end_time: Option<Time>,

    /// Goal length of the day
    #[serde(default)]
    pub target_hours: Option<f64>,

    /// "Office" or "Home"
    #[serde(default)]
    pub work_location: Option<String>,
}

/// Body of `POST /monitoring/work-session/start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Employee starting the day
    pub employee_id: EmployeeId,

    /// Client-side start time
    pub start_time: Time,

    /// Goal length of the day
    pub target_hours: f64,

    /// Office or home
    pub work_location: WorkLocation,
}

/// Body of the pause/resume/end calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmployeeRef<'a> {
    pub employee_id: &'a EmployeeId,
}

/// The attendance service's record of the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDay {
    /// Check-in time
    #[serde(default)]
    pub start_day_time: Option<Time>,

    /// Check-out time
    #[serde(default)]
    pub end_day_time: Option<Time>,

    /// e.g. "Regular", "Remote"
    #[serde(default)]
    pub work_pattern: Option<String>,
}

/// Envelope of `GET /attendance/verify/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VerifyEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AttendanceDay>,
}

impl VerifyEnvelope {
    /// The day record, only when the service reports success.
    pub fn into_day(self) -> Option<AttendanceDay> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// Acknowledgement of a write call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Acknowledgement {
    /// Whether the service reports success
    pub success: bool,

    /// Message to show the user
    pub message: Option<String>,
}

impl Acknowledgement {
    /// A successful acknowledgement with an optional message.
    pub fn ok(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
        }
    }

    /// Read an acknowledgement from a response body.
    ///
    /// The services put `success` and `message` either at the top level or
    /// under `data`. A body without any `success` flag (a bare session
    /// object, for instance) counts as success.
    pub fn from_value(value: &Value) -> Self {
        let nested = value.get("data");
        let flag = |v: Option<&Value>| v.and_then(|v| v.get("success")).and_then(Value::as_bool);
        let text = |v: Option<&Value>| {
            v.and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let success = match (flag(Some(value)), flag(nested)) {
            (Some(true), _) | (_, Some(true)) => true,
            (None, None) => true,
            _ => false,
        };

        Self {
            success,
            message: text(Some(value)).or_else(|| text(nested)),
        }
    }
}
