//! Geographic primitives shared by the router, weather fields and reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3_440.065;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    /// Create a validated position.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let position = Self { lat, lon };
        position.validate()?;
        Ok(position)
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::invalid(format!(
                "latitude must be within [-90, 90], got {}",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::invalid(format!(
                "longitude must be within [-180, 180], got {}",
                self.lon
            )));
        }
        Ok(())
    }

    /// Great-circle distance to `other` in nautical miles.
    pub fn distance_nm(&self, other: &GeoPosition) -> f64 {
        great_circle_nm(self, other)
    }

    /// Initial true bearing towards `other` in degrees `[0, 360)`.
    pub fn bearing_to(&self, other: &GeoPosition) -> f64 {
        initial_bearing_deg(self, other)
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

impl FromStr for GeoPosition {
    type Err = Error;

    /// Parse `"lat,lon"` in decimal degrees.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| Error::invalid(format!("expected LAT,LON but got '{s}'")))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid(format!("invalid latitude '{}'", lat.trim())))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid(format!("invalid longitude '{}'", lon.trim())))?;
        GeoPosition::new(lat, lon)
    }
}

/// Haversine distance between two positions in nautical miles.
pub fn great_circle_nm(start: &GeoPosition, end: &GeoPosition) -> f64 {
    let start_lat = start.lat.to_radians();
    let end_lat = end.lat.to_radians();
    let d_lat = (end.lat - start.lat).to_radians();
    let d_lon = (end.lon - start.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + start_lat.cos() * end_lat.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_NM * c
}

/// Initial bearing from `start` to `end` in degrees `[0, 360)`.
pub fn initial_bearing_deg(start: &GeoPosition, end: &GeoPosition) -> f64 {
    let start_lat = start.lat.to_radians();
    let end_lat = end.lat.to_radians();
    let d_lon = (end.lon - start.lon).to_radians();

    let y = d_lon.sin() * end_lat.cos();
    let x = start_lat.cos() * end_lat.sin() - start_lat.sin() * end_lat.cos() * d_lon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Point halfway along the great circle between two positions.
pub fn midpoint(start: &GeoPosition, end: &GeoPosition) -> GeoPosition {
    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();
    let lat2 = end.lat.to_radians();
    let d_lon = (end.lon - start.lon).to_radians();

    let bx = lat2.cos() * d_lon.cos();
    let by = lat2.cos() * d_lon.sin();
    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    GeoPosition {
        lat: lat.to_degrees(),
        lon: normalize_lon(lon.to_degrees()),
    }
}

/// Wrap a longitude into `[-180, 180)`.
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Wrap a bearing into `[0, 360)`.
pub fn normalize_bearing(bearing: f64) -> f64 {
    bearing.rem_euclid(360.0)
}

/// Signed longitude difference `to - from`, taken the short way round.
pub fn lon_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_lon(to - from);
    if delta == 180.0 {
        -180.0
    } else {
        delta
    }
}
