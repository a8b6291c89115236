//! Gridded forecast field held in memory.
//!
//! Layers are stored row-major (`[lat][lon]`) per forecast frame. Spatial lookup is
//! bilinear over the enclosing cell; temporal lookup is nearest-frame or linear between
//! the two bracketing frames. Vector quantities are interpolated as components so that
//! directions wrap correctly.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{normalize_bearing, GeoPosition};

use super::{current_from_components, wind_from_components, WeatherField, WeatherSample};

/// How samples between forecast frames are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalMode {
    Nearest,
    #[default]
    Linear,
}

/// One forecast time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFrame {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub wind_u: Option<Vec<f64>>,
    #[serde(default)]
    pub wind_v: Option<Vec<f64>>,
    #[serde(default)]
    pub wave_height: Option<Vec<f64>>,
    #[serde(default)]
    pub wave_period: Option<Vec<f64>>,
    #[serde(default)]
    pub wave_dir: Option<Vec<f64>>,
    #[serde(default)]
    pub current_u: Option<Vec<f64>>,
    #[serde(default)]
    pub current_v: Option<Vec<f64>>,
}

impl WeatherFrame {
    /// Frame with no layers; add them with the `with_*` builders.
    pub fn empty(time: DateTime<Utc>) -> Self {
        Self {
            time,
            wind_u: None,
            wind_v: None,
            wave_height: None,
            wave_period: None,
            wave_dir: None,
            current_u: None,
            current_v: None,
        }
    }

    pub fn with_wind(mut self, u: Vec<f64>, v: Vec<f64>) -> Self {
        self.wind_u = Some(u);
        self.wind_v = Some(v);
        self
    }

    pub fn with_waves(mut self, height: Vec<f64>, period: Option<Vec<f64>>, dir: Vec<f64>) -> Self {
        self.wave_height = Some(height);
        self.wave_period = period;
        self.wave_dir = Some(dir);
        self
    }

    pub fn with_current(mut self, u: Vec<f64>, v: Vec<f64>) -> Self {
        self.current_u = Some(u);
        self.current_v = Some(v);
        self
    }

    fn layers(&self) -> [(&Option<Vec<f64>>, &'static str); 7] {
        [
            (&self.wind_u, "wind_u"),
            (&self.wind_v, "wind_v"),
            (&self.wave_height, "wave_height"),
            (&self.wave_period, "wave_period"),
            (&self.wave_dir, "wave_dir"),
            (&self.current_u, "current_u"),
            (&self.current_v, "current_v"),
        ]
    }
}

/// Regular lat/lon forecast grid.
///
/// Deserialising goes through [`GriddedWeather::new`], so a decoded grid is always
/// validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct GriddedWeather {
    /// Latitudes of grid rows, strictly ascending.
    pub lats: Vec<f64>,
    /// Longitudes of grid columns, strictly ascending.
    pub lons: Vec<f64>,
    /// Frames sorted by time.
    pub frames: Vec<WeatherFrame>,
    #[serde(default)]
    pub temporal_mode: TemporalMode,
}

/// Wire shape of [`GriddedWeather`] before validation.
#[derive(Deserialize)]
struct RawGrid {
    lats: Vec<f64>,
    lons: Vec<f64>,
    frames: Vec<WeatherFrame>,
    #[serde(default)]
    temporal_mode: TemporalMode,
}

impl TryFrom<RawGrid> for GriddedWeather {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        Self::new(raw.lats, raw.lons, raw.frames, raw.temporal_mode)
    }
}

impl GriddedWeather {
    /// Build and validate a grid.
    pub fn new(
        lats: Vec<f64>,
        lons: Vec<f64>,
        mut frames: Vec<WeatherFrame>,
        temporal_mode: TemporalMode,
    ) -> Result<Self> {
        frames.sort_by_key(|frame| frame.time);
        let grid = Self {
            lats,
            lons,
            frames,
            temporal_mode,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Load a grid previously serialised as JSON.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        // Decode the raw shape first so validation failures stay `InvalidInput`.
        let raw: RawGrid = serde_json::from_reader(reader)?;
        let grid = Self::try_from(raw)?;
        debug!(
            path = %path.display(),
            rows = grid.lats.len(),
            cols = grid.lons.len(),
            frames = grid.frames.len(),
            "loaded weather grid"
        );
        Ok(grid)
    }

    fn validate(&self) -> Result<()> {
        for (axis, name) in [(&self.lats, "lats"), (&self.lons, "lons")] {
            if axis.len() < 2 {
                return Err(Error::invalid(format!(
                    "weather grid needs at least two {name}"
                )));
            }
            if axis.windows(2).any(|pair| !(pair[1] > pair[0])) {
                return Err(Error::invalid(format!(
                    "weather grid {name} must be strictly ascending"
                )));
            }
        }
        if self.frames.is_empty() {
            return Err(Error::invalid("weather grid has no frames"));
        }

        let cells = self.lats.len() * self.lons.len();
        for frame in &self.frames {
            for (layer, name) in frame.layers() {
                if let Some(values) = layer {
                    if values.len() != cells {
                        return Err(Error::invalid(format!(
                            "layer {name} at {} has {} values, expected {cells}",
                            frame.time,
                            values.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn cell(&self, position: &GeoPosition) -> Option<Cell> {
        let (row, lat_t) = locate(&self.lats, position.lat)?;
        // Accept grids stored in either [-180, 180] or [0, 360] longitudes.
        let (col, lon_t) = [position.lon, position.lon + 360.0, position.lon - 360.0]
            .into_iter()
            .find_map(|lon| locate(&self.lons, lon))?;

        let cols = self.lons.len();
        let base = row * cols + col;
        Some(Cell {
            indices: [base, base + 1, base + cols, base + cols + 1],
            weights: [
                (1.0 - lat_t) * (1.0 - lon_t),
                (1.0 - lat_t) * lon_t,
                lat_t * (1.0 - lon_t),
                lat_t * lon_t,
            ],
        })
    }

    fn frame_components(&self, frame: &WeatherFrame, cell: &Cell) -> Components {
        let wind = cell.pair(&frame.wind_u, &frame.wind_v).unwrap_or((0.0, 0.0));
        let wave_dir = frame.wave_dir.as_ref().map(|dirs| {
            let x = cell.blend(dirs, |d| d.to_radians().sin());
            let y = cell.blend(dirs, |d| d.to_radians().cos());
            (x, y)
        });

        Components {
            wind_u: wind.0,
            wind_v: wind.1,
            wave_height: frame
                .wave_height
                .as_ref()
                .map(|h| cell.blend(h, |v| v.max(0.0)))
                .unwrap_or(0.0),
            wave_period: frame
                .wave_period
                .as_ref()
                .map(|p| cell.blend(p, |v| v))
                .filter(|period| *period > 0.0),
            wave_dir: wave_dir.unwrap_or((0.0, 0.0)),
            current: cell.pair(&frame.current_u, &frame.current_v),
        }
    }

    /// Index of the frame at or before `time` and the blend weight towards the next one.
    fn bracket(&self, time: DateTime<Utc>) -> (usize, usize, f64) {
        let last = self.frames.len() - 1;
        let upper = self.frames.partition_point(|frame| frame.time <= time);
        if upper == 0 {
            return (0, 0, 0.0);
        }
        if upper > last {
            return (last, last, 0.0);
        }
        let lower = upper - 1;
        let span = (self.frames[upper].time - self.frames[lower].time).num_seconds() as f64;
        let offset = (time - self.frames[lower].time).num_seconds() as f64;
        let t = if span > 0.0 { offset / span } else { 0.0 };
        match self.temporal_mode {
            TemporalMode::Linear => (lower, upper, t),
            TemporalMode::Nearest if t < 0.5 => (lower, lower, 0.0),
            TemporalMode::Nearest => (upper, upper, 0.0),
        }
    }
}

impl WeatherField for GriddedWeather {
    fn sample(&self, position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample> {
        let cell = self.cell(position)?;
        let (lower, upper, t) = self.bracket(time);
        let first = self.frame_components(&self.frames[lower], &cell);
        let components = if lower == upper {
            first
        } else {
            first.blend(&self.frame_components(&self.frames[upper], &cell), t)
        };
        Some(components.into_sample())
    }
}

fn locate(axis: &[f64], x: f64) -> Option<(usize, f64)> {
    let first = *axis.first()?;
    let last = *axis.last()?;
    if axis.len() < 2 || !x.is_finite() || x < first || x > last {
        return None;
    }
    let upper = axis.partition_point(|value| *value <= x);
    let lower = upper.saturating_sub(1).min(axis.len() - 2);
    let span = axis[lower + 1] - axis[lower];
    let t = ((x - axis[lower]) / span).clamp(0.0, 1.0);
    Some((lower, t))
}

struct Cell {
    indices: [usize; 4],
    weights: [f64; 4],
}

impl Cell {
    fn blend(&self, values: &[f64], map: impl Fn(f64) -> f64) -> f64 {
        self.indices
            .iter()
            .zip(self.weights)
            .map(|(&index, weight)| map(values[index]) * weight)
            .sum()
    }

    fn pair(&self, u: &Option<Vec<f64>>, v: &Option<Vec<f64>>) -> Option<(f64, f64)> {
        match (u, v) {
            (Some(u), Some(v)) => Some((self.blend(u, |x| x), self.blend(v, |x| x))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Components {
    wind_u: f64,
    wind_v: f64,
    wave_height: f64,
    wave_period: Option<f64>,
    wave_dir: (f64, f64),
    current: Option<(f64, f64)>,
}

impl Components {
    fn blend(&self, other: &Components, t: f64) -> Components {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Components {
            wind_u: lerp(self.wind_u, other.wind_u),
            wind_v: lerp(self.wind_v, other.wind_v),
            wave_height: lerp(self.wave_height, other.wave_height),
            wave_period: match (self.wave_period, other.wave_period) {
                (Some(a), Some(b)) => Some(lerp(a, b)),
                (a, b) => a.or(b),
            },
            wave_dir: (
                lerp(self.wave_dir.0, other.wave_dir.0),
                lerp(self.wave_dir.1, other.wave_dir.1),
            ),
            current: match (self.current, other.current) {
                (Some(a), Some(b)) => Some((lerp(a.0, b.0), lerp(a.1, b.1))),
                (a, b) => a.or(b),
            },
        }
    }

    fn into_sample(self) -> WeatherSample {
        let (wind_speed, wind_dir) = wind_from_components(self.wind_u, self.wind_v);
        let wave_dir = normalize_bearing(self.wave_dir.0.atan2(self.wave_dir.1).to_degrees());
        let sample = WeatherSample::calm()
            .with_wind(wind_speed, wind_dir)
            .with_waves(self.wave_height, self.wave_period, wave_dir);
        match self.current {
            Some((u, v)) => {
                let (speed, dir) = current_from_components(u, v);
                sample.with_current(speed, dir)
            }
            None => sample,
        }
    }
}
