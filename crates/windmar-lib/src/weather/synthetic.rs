//! Deterministic synthetic weather for development and demos.
//!
//! The field is a band of westerlies modulated by latitude plus a single cyclonic
//! system that drifts with the hour of day. Waves are derived from the local wind.

use std::f64::consts::PI;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;

use super::{wind_from_components, WeatherField, WeatherSample};

/// Parameters of the synthetic field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticWeather {
    /// Mean westerly wind component (m/s).
    pub westerly_ms: f64,
    /// Peak tangential wind of the cyclonic system (m/s).
    pub system_strength_ms: f64,
    /// Latitude of the system centre at 00:00 UTC.
    pub system_lat: f64,
    /// Longitude of the system centre at 00:00 UTC.
    pub system_lon: f64,
    /// E-folding radius of the system in degrees.
    pub system_radius_deg: f64,
}

impl Default for SyntheticWeather {
    fn default() -> Self {
        Self {
            westerly_ms: 5.0,
            system_strength_ms: 8.0,
            system_lat: 45.0,
            system_lon: 0.0,
            system_radius_deg: 10.0,
        }
    }
}

impl SyntheticWeather {
    /// Eastward/northward wind components at a point and time.
    pub fn wind_components(&self, position: &GeoPosition, time: DateTime<Utc>) -> (f64, f64) {
        let lat = position.lat;
        let lon = position.lon;

        let base_u = self.westerly_ms + 3.0 * (lat * 2.0).to_radians().sin();
        let base_v = 2.0 * (lon * 3.0 + lat * 2.0).to_radians().cos();

        let hours = time.hour() as f64 + time.minute() as f64 / 60.0;
        let drift = (hours * PI / 12.0).sin();
        let centre_lat = self.system_lat + 5.0 * drift;
        let centre_lon = self.system_lon + 10.0 * drift;

        let d_lat = lat - centre_lat;
        let d_lon = lon - centre_lon;
        let dist = (d_lat * d_lat + d_lon * d_lon).sqrt();
        let strength = self.system_strength_ms * (-dist / self.system_radius_deg).exp();

        let angle = d_lat.atan2(d_lon) + PI / 2.0;
        let u = base_u - strength * angle.sin();
        let v = base_v + strength * angle.cos();
        (u, v)
    }
}

impl WeatherField for SyntheticWeather {
    fn sample(&self, position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample> {
        let (u, v) = self.wind_components(position, time);
        let (wind_speed, wind_dir) = wind_from_components(u, v);

        let wave_height = (0.15 * wind_speed).max(0.3);
        // Fully developed sea: peak period grows with the square root of height.
        let wave_period = 3.86 * wave_height.sqrt();

        Some(
            WeatherSample::calm()
                .with_wind(wind_speed, wind_dir)
                .with_waves(wave_height, Some(wave_period), wind_dir),
        )
    }
}
