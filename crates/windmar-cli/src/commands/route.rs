//! Route command handler for planning a voyage between two positions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};

use windmar_lib::{
    GeoPosition, GriddedWeather, RenderMode, RouteConstraints, RouteRequest, RouteSummary, Router,
    SyntheticWeather, WeatherSource,
};

use super::CommandContext;

/// Built-in weather choices when no forecast file is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WeatherChoice {
    /// No weather: direct great-circle route.
    #[default]
    None,
    /// Deterministic synthetic field.
    Synthetic,
}

/// Arguments shared by `route` and `pareto`.
#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// Start position as LAT,LON in decimal degrees.
    #[arg(long = "from", allow_hyphen_values = true)]
    pub from: String,
    /// End position as LAT,LON in decimal degrees.
    #[arg(long = "to", allow_hyphen_values = true)]
    pub to: String,
    /// Departure time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub departure: Option<String>,
    /// Plan the voyage in ballast instead of laden.
    #[arg(long)]
    pub ballast: bool,
    /// Fixed speed through the water (knots).
    #[arg(long)]
    pub speed: Option<f64>,
    /// Weather source when no forecast file is given.
    #[arg(long, value_enum, default_value_t = WeatherChoice::None)]
    pub weather: WeatherChoice,
    /// Gridded forecast in JSON; overrides --weather.
    #[arg(long)]
    pub weather_file: Option<PathBuf>,
    /// Search grid resolution in degrees.
    #[arg(long)]
    pub resolution: Option<f64>,
    /// Maximum wind speed on any leg (m/s).
    #[arg(long)]
    pub max_wind: Option<f64>,
    /// Maximum significant wave height on any leg (m).
    #[arg(long)]
    pub max_wave: Option<f64>,
    /// Fail instead of assuming calm weather when no weather is available.
    #[arg(long)]
    pub require_weather: bool,
}

impl RouteArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> Result<RouteRequest> {
        let start = self.from.parse::<GeoPosition>().context("invalid --from position")?;
        let end = self.to.parse::<GeoPosition>().context("invalid --to position")?;
        let departure = match &self.departure {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid --departure '{raw}', expected RFC 3339"))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        Ok(RouteRequest::new(start, end, departure)
            .laden(!self.ballast)
            .with_target_speed(self.speed))
    }

    /// Configured constraints with command-line overrides applied.
    pub fn constraints(&self, base: &RouteConstraints) -> RouteConstraints {
        let mut constraints = base.clone();
        if let Some(resolution) = self.resolution {
            constraints.grid_resolution_deg = resolution;
        }
        if let Some(max_wind) = self.max_wind {
            constraints.max_wind_speed_ms = max_wind;
        }
        if let Some(max_wave) = self.max_wave {
            constraints.max_wave_height_m = max_wave;
        }
        constraints.require_weather |= self.require_weather;
        constraints
    }

    pub fn weather(&self) -> Result<WeatherSource> {
        if let Some(path) = &self.weather_file {
            let grid = GriddedWeather::from_json_path(path)
                .with_context(|| format!("failed to load weather grid from {}", path.display()))?;
            return Ok(WeatherSource::Gridded(Arc::new(grid)));
        }
        Ok(match self.weather {
            WeatherChoice::None => WeatherSource::Absent,
            WeatherChoice::Synthetic => WeatherSource::Synthetic(SyntheticWeather::default()),
        })
    }
}

/// Handle the route subcommand.
pub fn handle_route(ctx: &CommandContext, args: &RouteArgs) -> Result<()> {
    let request = args.to_request()?;
    let router = Router::new(
        ctx.model()?,
        args.weather()?,
        args.constraints(&ctx.config.constraints),
    )?;
    let route = router.plan(&request).context("route planning failed")?;
    let summary = RouteSummary::from_result(&route)?;
    ctx.emit(&summary, |summary| summary.render(RenderMode::PlainText))
}
