//! Weather samples and the sources that supply them.
//!
//! - [`WeatherField`] - the collaborator contract: a sample at a point and time, or nothing
//! - [`WeatherSource`] - the capability chosen once at construction (gridded, service,
//!   synthetic or absent)
//! - [`grid`] - in-memory gridded field with bilinear/temporal interpolation
//! - [`synthetic`] - deterministic development field
//! - [`cache`] - per-request sample cache used by the router
//!
//! Directions follow the meteorological convention: wind and waves are given as the
//! direction they come FROM, currents as the direction they flow TO, all in degrees
//! clockwise from true north.

pub mod cache;
pub mod grid;
pub mod synthetic;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{normalize_bearing, GeoPosition};

pub use cache::WeatherCache;
pub use grid::{GriddedWeather, TemporalMode, WeatherFrame};
pub use synthetic::SyntheticWeather;

/// Surface current at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Current {
    /// Current speed in m/s.
    pub speed_ms: f64,
    /// Direction the current sets towards, degrees true.
    pub dir_deg: f64,
}

/// Weather conditions at a point and time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub wind_speed_ms: f64,
    pub wind_dir_deg: f64,
    pub wave_height_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_period_s: Option<f64>,
    pub wave_dir_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Current>,
}

impl Default for WeatherSample {
    fn default() -> Self {
        Self::calm()
    }
}

impl WeatherSample {
    /// No wind, no waves, no current.
    pub const fn calm() -> Self {
        Self {
            wind_speed_ms: 0.0,
            wind_dir_deg: 0.0,
            wave_height_m: 0.0,
            wave_period_s: None,
            wave_dir_deg: 0.0,
            current: None,
        }
    }

    pub fn with_wind(mut self, speed_ms: f64, dir_deg: f64) -> Self {
        self.wind_speed_ms = speed_ms;
        self.wind_dir_deg = dir_deg;
        self
    }

    pub fn with_waves(mut self, height_m: f64, period_s: Option<f64>, dir_deg: f64) -> Self {
        self.wave_height_m = height_m;
        self.wave_period_s = period_s;
        self.wave_dir_deg = dir_deg;
        self
    }

    pub fn with_current(mut self, speed_ms: f64, dir_deg: f64) -> Self {
        self.current = Some(Current { speed_ms, dir_deg });
        self
    }

    /// Reject negative magnitudes and non-finite values.
    pub fn validate(&self) -> Result<()> {
        let magnitudes = [
            (self.wind_speed_ms, "wind_speed_ms"),
            (self.wave_height_m, "wave_height_m"),
        ];
        for (value, field) in magnitudes {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(format!(
                    "{field} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.wind_dir_deg.is_finite() || !self.wave_dir_deg.is_finite() {
            return Err(Error::invalid("weather directions must be finite"));
        }
        if let Some(period) = self.wave_period_s {
            if !period.is_finite() || period <= 0.0 {
                return Err(Error::invalid(format!(
                    "wave_period_s must be finite and positive, got {period}"
                )));
            }
        }
        if let Some(current) = self.current {
            if !current.speed_ms.is_finite() || current.speed_ms < 0.0 {
                return Err(Error::invalid("current speed must be finite and non-negative"));
            }
            if !current.dir_deg.is_finite() {
                return Err(Error::invalid("current direction must be finite"));
            }
        }
        Ok(())
    }
}

/// Wind speed and "from" direction for eastward/northward components.
pub fn wind_from_components(u: f64, v: f64) -> (f64, f64) {
    let speed = (u * u + v * v).sqrt();
    let dir = normalize_bearing((-u).atan2(-v).to_degrees());
    (speed, dir)
}

/// Current speed and "towards" direction for eastward/northward components.
pub fn current_from_components(u: f64, v: f64) -> (f64, f64) {
    let speed = (u * u + v * v).sqrt();
    let dir = normalize_bearing(u.atan2(v).to_degrees());
    (speed, dir)
}

/// Supplies weather at a point and time.
///
/// Returning `None` means the field has no data there (outside coverage, before the
/// first forecast, etc.). That is a normal outcome; consumers assume calm weather.
pub trait WeatherField: Send + Sync {
    fn sample(&self, position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample>;
}

/// Weather capability selected once when a router is built.
#[derive(Clone, Default)]
pub enum WeatherSource {
    /// No weather; routing takes the direct great-circle path.
    #[default]
    Absent,
    /// In-memory forecast grid.
    Gridded(Arc<GriddedWeather>),
    /// Deterministic development field.
    Synthetic(SyntheticWeather),
    /// Any external provider implementing [`WeatherField`].
    Service(Arc<dyn WeatherField>),
}

impl WeatherSource {
    /// Whether this source can supply weather at all.
    pub fn is_available(&self) -> bool {
        !matches!(self, WeatherSource::Absent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherSource::Absent => "absent",
            WeatherSource::Gridded(_) => "gridded",
            WeatherSource::Synthetic(_) => "synthetic",
            WeatherSource::Service(_) => "service",
        }
    }

    /// Sample the underlying field; always `None` when absent.
    pub fn sample(&self, position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample> {
        match self {
            WeatherSource::Absent => None,
            WeatherSource::Gridded(grid) => grid.sample(position, time),
            WeatherSource::Synthetic(field) => field.sample(position, time),
            WeatherSource::Service(field) => field.sample(position, time),
        }
    }
}

impl fmt::Debug for WeatherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeatherSource").field(&self.label()).finish()
    }
}
