//! Common test utilities and fixture helpers.
//!
//! Provides fixture paths, a fixed departure time and hand-built weather fields for
//! the routing integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use windmar_lib::weather::WeatherField;
use windmar_lib::{GeoPosition, WeatherSample, WeatherSource};

/// Path to fixtures directory used by tests (noon reports, weather grids).
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn departure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn position(lat: f64, lon: f64) -> GeoPosition {
    GeoPosition::new(lat, lon).expect("valid test position")
}

/// Axis-aligned box of severe weather in an otherwise calm sea.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct StormBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub wind_speed_ms: f64,
}

impl StormBox {
    #[allow(dead_code)]
    pub fn contains(&self, position: &GeoPosition) -> bool {
        (self.min_lat..=self.max_lat).contains(&position.lat)
            && (self.min_lon..=self.max_lon).contains(&position.lon)
    }

    #[allow(dead_code)]
    pub fn into_source(self) -> WeatherSource {
        WeatherSource::Service(Arc::new(self))
    }
}

impl WeatherField for StormBox {
    fn sample(&self, position: &GeoPosition, _time: DateTime<Utc>) -> Option<WeatherSample> {
        let sample = if self.contains(position) {
            WeatherSample::calm()
                .with_wind(self.wind_speed_ms, 270.0)
                .with_waves(6.0, Some(10.0), 270.0)
        } else {
            WeatherSample::calm()
        };
        Some(sample)
    }
}

/// Uniform weather everywhere.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct UniformField(pub WeatherSample);

impl WeatherField for UniformField {
    fn sample(&self, _position: &GeoPosition, _time: DateTime<Utc>) -> Option<WeatherSample> {
        Some(self.0)
    }
}

#[allow(dead_code)]
pub fn uniform(sample: WeatherSample) -> WeatherSource {
    WeatherSource::Service(Arc::new(UniformField(sample)))
}

/// Calm sea that turns to storm everywhere `calm_hours` after [`departure`].
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct StormAfter {
    pub calm_hours: f64,
    pub wind_speed_ms: f64,
}

impl StormAfter {
    #[allow(dead_code)]
    pub fn into_source(self) -> WeatherSource {
        WeatherSource::Service(Arc::new(self))
    }
}

impl WeatherField for StormAfter {
    fn sample(&self, _position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample> {
        let elapsed_hours = (time - departure()).num_milliseconds() as f64 / 3_600_000.0;
        let sample = if elapsed_hours > self.calm_hours {
            WeatherSample::calm()
                .with_wind(self.wind_speed_ms, 270.0)
                .with_waves(8.0, Some(11.0), 270.0)
        } else {
            WeatherSample::calm()
        };
        Some(sample)
    }
}
