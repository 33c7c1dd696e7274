//! Geofence math - great-circle distance and office radius checks.
//!
//! Distances use the haversine formula on a spherical earth. The raw
//! [`distance`] function mirrors what a map widget computes and returns
//! `NaN` for malformed input; [`Coordinates`] is the validated entry point.

use serde::{Deserialize, Serialize};

/// Mean earth radius used for every distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius of the office geofence.
pub const DEFAULT_OFFICE_RADIUS_METERS: f64 = 500.0;

/// Errors for malformed coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude or longitude is NaN or infinite
    #[error("coordinate is not a finite number")]
    NonFinite,

    /// Latitude outside [-90, 90]
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// Geofence radius must be positive
    #[error("geofence radius must be positive, got {0}")]
    NonPositiveRadius(f64),
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = GeoError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Validate and wrap a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_meters(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in meters between two points.
///
/// Returns `NaN` when either point is not a valid coordinate pair; callers
/// must reject that before using the value.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if Coordinates::new(lat1, lon1).is_err() || Coordinates::new(lat2, lon2).is_err() {
        return f64::NAN;
    }
    haversine_meters(lat1, lon1, lat2, lon2)
}

fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let half_lat = (d_lat / 2.0).sin();
    let half_lon = (d_lon / 2.0).sin();

    let a = half_lat * half_lat
        + lat1.to_radians().cos() * lat2.to_radians().cos() * half_lon * half_lon;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}

/// Outcome of a geofence check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeofenceResult {
    /// Distance from the fence center
    pub distance_meters: f64,

    /// `distance_meters <= radius`
    pub within_radius: bool,
}

/// Classify a distance against a fence radius. The boundary is inside.
pub fn classify(distance_meters: f64, radius_meters: f64) -> GeofenceResult {
    GeofenceResult {
        distance_meters,
        within_radius: distance_meters <= radius_meters,
    }
}

/// Human-readable distance: meters when in the office, kilometers otherwise.
pub fn describe_distance(result: &GeofenceResult) -> String {
    if result.within_radius {
        format!("{:.0}m (In office)", result.distance_meters)
    } else {
        format!("{:.1}km away", result.distance_meters / 1000.0)
    }
}

/// A live location captured for an employee at check-in.
///
/// Kept as raw numbers since it comes straight from a device; use
/// [`EmployeeLocationSample::coordinates`] to validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeLocationSample {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Reverse-geocoded address, when the device supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl EmployeeLocationSample {
    /// Validated coordinates of this sample.
    pub fn coordinates(&self) -> Result<Coordinates, GeoError> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// The office the geofence is drawn around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeLocation {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Fence radius in meters
    #[serde(default = "default_radius")]
    pub radius_meters: f64,

    /// Street address
    #[serde(default)]
    pub address: String,
}

fn default_radius() -> f64 {
    DEFAULT_OFFICE_RADIUS_METERS
}

impl Default for OfficeLocation {
    fn default() -> Self {
        Self {
            latitude: 19.160122,
            longitude: 72.839720,
            radius_meters: DEFAULT_OFFICE_RADIUS_METERS,
            address: "Blackhole Infiverse, Kali Gali, 176/1410, Rd Number 3, near Hathi Circle, \
                      above Bright Connection, Motilal Nagar II, Goregaon West, Mumbai, \
                      Maharashtra 400104"
                .to_string(),
        }
    }
}

impl OfficeLocation {
    /// Validated center of the fence.
    pub fn coordinates(&self) -> Result<Coordinates, GeoError> {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Check the office's own configuration.
    pub fn validate(&self) -> Result<(), GeoError> {
        self.coordinates()?;
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeoError::NonPositiveRadius(self.radius_meters));
        }
        Ok(())
    }

    /// Where `point` sits relative to the office fence.
    pub fn check(&self, point: &Coordinates) -> Result<GeofenceResult, GeoError> {
        let center = self.coordinates()?;
        Ok(classify(center.distance_to(point), self.radius_meters))
    }
}
