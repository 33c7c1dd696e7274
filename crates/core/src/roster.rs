//! Live attendance roster - who is where relative to the office.

use serde::{Deserialize, Deserializer, Serialize};
use crate::geofence::{classify, EmployeeLocationSample, GeoError, GeofenceResult, OfficeLocation};
use crate::id::EmployeeId;
use crate::session::WorkLocation;
use crate::Time;

/// Attendance status reported for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    /// Checked in on time
    Present,
    /// Not checked in
    Absent,
    /// Checked in late
    Late,
    /// On approved leave
    OnLeave,
    /// Anything the service adds later
    #[serde(other)]
    Unknown,
}

/// One employee's row in the attendance roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Employee
    pub employee_id: EmployeeId,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Attendance status
    pub status: AttendanceStatus,

    /// Location captured at check-in
    #[serde(default)]
    pub location: Option<EmployeeLocationSample>,

    /// Declared work location; missing or `null` means office
    #[serde(
        default,
        rename = "workLocationType",
        deserialize_with = "office_if_null"
    )]
    pub work_location: WorkLocation,

    /// Check-in time
    #[serde(default)]
    pub start_day_time: Option<Time>,
}

fn office_if_null<'de, D>(deserializer: D) -> Result<WorkLocation, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WorkLocation>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where an employee is, relative to the office fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    /// Inside the office radius
    InOffice,
    /// Outside the radius on a declared home day
    WorkingFromHome,
    /// Outside the radius on an office day
    Away,
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presence::InOffice => write!(f, "in office"),
            Presence::WorkingFromHome => write!(f, "WFH"),
            Presence::Away => write!(f, "away"),
        }
    }
}

/// A roster entry placed on the geofence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedEmployee {
    /// Roster row
    pub entry: RosterEntry,

    /// Distance and fence check
    pub geofence: GeofenceResult,

    /// Derived presence
    pub presence: Presence,
}

/// Place every roster entry that carries a valid location on the office fence.
///
/// Entries without a location, or with a malformed one, are left out.
/// The result is ordered nearest first.
pub fn locate_roster(
    office: &OfficeLocation,
    entries: &[RosterEntry],
) -> Result<Vec<LocatedEmployee>, GeoError> {
    office.validate()?;
    let center = office.coordinates()?;

    let mut located: Vec<_> = entries
        .iter()
        .filter_map(|entry| {
            let point = entry.location.as_ref()?.coordinates().ok()?;
            let geofence = classify(center.distance_to(&point), office.radius_meters);
            let presence = if geofence.within_radius {
                Presence::InOffice
            } else if entry.work_location == WorkLocation::Home {
                Presence::WorkingFromHome
            } else {
                Presence::Away
            };
            Some(LocatedEmployee {
                entry: entry.clone(),
                geofence,
                presence,
            })
        })
        .collect();

    located.sort_by(|a, b| {
        a.geofence
            .distance_meters
            .partial_cmp(&b.geofence.distance_meters)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(located)
}
