//! Noon reports: the observed voyage days the calibrator fits against.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::GeoPosition;
use crate::vessel::LegConditions;
use crate::weather::WeatherSample;

/// Hours covered by one noon report when no distance is recorded.
pub const REPORT_HOURS: f64 = 24.0;

/// Observed true wind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    pub speed_ms: f64,
    pub dir_deg: f64,
}

/// Observed sea state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveObservation {
    pub height_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_s: Option<f64>,
    pub dir_deg: f64,
}

/// One day of observed performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoonReport {
    pub date: NaiveDate,
    pub position: GeoPosition,
    pub speed_kts: f64,
    pub distance_nm: f64,
    pub fuel_mt: f64,
    pub is_laden: bool,
    pub heading_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindObservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waves: Option<WaveObservation>,
}

impl NoonReport {
    /// Calm-weather report covering a full day at `speed_kts`.
    pub fn new(
        date: NaiveDate,
        position: GeoPosition,
        speed_kts: f64,
        fuel_mt: f64,
        is_laden: bool,
        heading_deg: f64,
    ) -> Self {
        Self {
            date,
            position,
            speed_kts,
            distance_nm: speed_kts * REPORT_HOURS,
            fuel_mt,
            is_laden,
            heading_deg,
            wind: None,
            waves: None,
        }
    }

    pub fn with_wind(mut self, speed_ms: f64, dir_deg: f64) -> Self {
        self.wind = Some(WindObservation { speed_ms, dir_deg });
        self
    }

    pub fn with_waves(mut self, height_m: f64, period_s: Option<f64>, dir_deg: f64) -> Self {
        self.waves = Some(WaveObservation {
            height_m,
            period_s,
            dir_deg,
        });
        self
    }

    /// Why the report cannot be used for fitting, if anything.
    pub fn unusable_reason(&self) -> Option<String> {
        for (value, field) in [
            (self.speed_kts, "speed"),
            (self.distance_nm, "distance"),
            (self.fuel_mt, "fuel"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Some(format!("non-positive {field} ({value})"));
            }
        }
        if !self.heading_deg.is_finite() {
            return Some("heading is not finite".to_string());
        }
        if let Err(err) = self.conditions().weather.validate() {
            return Some(err.to_string());
        }
        None
    }

    /// Heading and observed weather. A missing observation contributes nothing.
    pub fn conditions(&self) -> LegConditions {
        let mut weather = WeatherSample::calm();
        if let Some(wind) = self.wind {
            weather = weather.with_wind(wind.speed_ms, wind.dir_deg);
        }
        if let Some(waves) = self.waves {
            weather = weather.with_waves(waves.height_m, waves.period_s, waves.dir_deg);
        }
        LegConditions::new(self.heading_deg, weather)
    }
}

/// Flat CSV layout of a noon report.
#[derive(Debug, Deserialize)]
struct NoonReportRecord {
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    speed_kts: f64,
    #[serde(default)]
    distance_nm: Option<f64>,
    fuel_mt: f64,
    #[serde(default = "default_laden")]
    is_laden: bool,
    #[serde(default)]
    heading_deg: Option<f64>,
    #[serde(default)]
    wind_speed_ms: Option<f64>,
    #[serde(default)]
    wind_dir_deg: Option<f64>,
    #[serde(default)]
    wave_height_m: Option<f64>,
    #[serde(default)]
    wave_period_s: Option<f64>,
    #[serde(default)]
    wave_dir_deg: Option<f64>,
}

fn default_laden() -> bool {
    true
}

impl NoonReportRecord {
    fn into_report(self) -> Result<NoonReport> {
        let position = GeoPosition::new(self.latitude, self.longitude)?;
        let mut report = NoonReport::new(
            self.date,
            position,
            self.speed_kts,
            self.fuel_mt,
            self.is_laden,
            self.heading_deg.unwrap_or(0.0),
        );
        if let Some(distance) = self.distance_nm {
            report.distance_nm = distance;
        }
        if let Some(speed) = self.wind_speed_ms {
            report = report.with_wind(speed, self.wind_dir_deg.unwrap_or(0.0));
        }
        if let Some(height) = self.wave_height_m {
            report = report.with_waves(height, self.wave_period_s, self.wave_dir_deg.unwrap_or(0.0));
        }
        Ok(report)
    }
}

/// Read noon reports from CSV with a header row.
///
/// Required columns: `date` (YYYY-MM-DD), `latitude`, `longitude`, `speed_kts`,
/// `fuel_mt`. Optional: `distance_nm`, `is_laden`, `heading_deg`, `wind_speed_ms`,
/// `wind_dir_deg`, `wave_height_m`, `wave_period_s`, `wave_dir_deg`.
pub fn read_noon_reports<R: Read>(reader: R) -> Result<Vec<NoonReport>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut reports = Vec::new();
    for (index, row) in csv_reader.deserialize::<NoonReportRecord>().enumerate() {
        let report = row?.into_report().map_err(|err| {
            Error::invalid(format!("noon report row {}: {err}", index + 1))
        })?;
        reports.push(report);
    }
    Ok(reports)
}

/// Load noon reports from a CSV file.
pub fn load_noon_reports(path: &Path) -> Result<Vec<NoonReport>> {
    let reports = read_noon_reports(File::open(path)?)?;
    debug!(path = %path.display(), count = reports.len(), "loaded noon reports");
    Ok(reports)
}
