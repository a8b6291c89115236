//! Weather routing.
//!
//! This module provides:
//! - [`RouteConstraints`] - Grid, safety limits and search budget
//! - [`CostWeighting`] - Fuel/time blend used as the edge cost
//! - [`RouteRequest`] - Start, end, departure, loading and optional target speed
//! - [`RouteResult`] - Planned route returned to callers
//! - [`Router`] - Main entry point for computing routes
//!
//! # Strategy Pattern
//!
//! The routing module uses the Strategy pattern via the [`RoutePlanner`] trait. With no
//! weather source the router takes the direct great-circle leg
//! ([`GreatCirclePlanner`]); with any weather source it runs A* over a regular lat/lon
//! grid ([`WeatherGridPlanner`]).
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use windmar_lib::geo::GeoPosition;
//! use windmar_lib::routing::{RouteConstraints, RouteMethod, Router};
//! use windmar_lib::vessel::VesselModel;
//! use windmar_lib::weather::WeatherSource;
//!
//! let router = Router::new(
//!     VesselModel::default(),
//!     WeatherSource::Absent,
//!     RouteConstraints::default(),
//! )
//! .unwrap();
//! let start = GeoPosition::new(51.0, 1.5).unwrap();
//! let end = GeoPosition::new(43.5, -9.5).unwrap();
//! let departure = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
//!
//! let route = router.find_optimal_route(start, end, departure, true, None).unwrap();
//! assert_eq!(route.method, RouteMethod::GreatCircle);
//! assert_eq!(route.waypoints.len(), 2);
//! ```

mod grid;
mod planner;
mod search;

pub use grid::{GridCell, GridNode, SearchGrid, MAX_GRID_LAT};
pub use planner::{select_planner, GreatCirclePlanner, RoutePlanner, WeatherGridPlanner};

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::{great_circle_nm, GeoPosition};
use crate::vessel::VesselModel;
use crate::weather::WeatherSource;

/// Default weight converting hours into tonnes of fuel for blended costs.
pub const DEFAULT_TIME_WEIGHT: f64 = 3.0;

/// How a route was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMethod {
    /// Direct two-point great-circle leg.
    GreatCircle,
    /// Weather-constrained A* over a lat/lon grid.
    WeatherAStar,
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteMethod::GreatCircle => "great_circle",
            RouteMethod::WeatherAStar => "weather_a_star",
        };
        f.write_str(value)
    }
}

/// Constraints applied during route planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConstraints {
    pub grid_resolution_deg: f64,
    /// Edges with a stronger wind at traversal time are pruned.
    pub max_wind_speed_ms: f64,
    /// Edges with higher significant waves at traversal time are pruned.
    pub max_wave_height_m: f64,
    /// Degrees added around the start/end box.
    pub grid_margin_deg: f64,
    pub max_expansions: usize,
    /// Optional wall-clock limit for a single search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    /// Multipliers of the service speed tried on every edge when no target speed is set.
    pub speed_factors: Vec<f64>,
    /// Fail instead of assuming calm weather when no weather is available.
    pub require_weather: bool,
}

impl Default for RouteConstraints {
    fn default() -> Self {
        Self {
            grid_resolution_deg: 0.5,
            max_wind_speed_ms: 25.0,
            max_wave_height_m: 5.0,
            grid_margin_deg: 2.0,
            max_expansions: 250_000,
            deadline_ms: None,
            speed_factors: vec![1.0],
            require_weather: false,
        }
    }
}

impl RouteConstraints {
    pub fn validate(&self) -> Result<()> {
        if !self.grid_resolution_deg.is_finite()
            || self.grid_resolution_deg <= 0.0
            || self.grid_resolution_deg > 10.0
        {
            return Err(Error::invalid(format!(
                "grid_resolution_deg must be in (0, 10], got {}",
                self.grid_resolution_deg
            )));
        }
        if !self.grid_margin_deg.is_finite() || !(0.0..=30.0).contains(&self.grid_margin_deg) {
            return Err(Error::invalid(format!(
                "grid_margin_deg must be in [0, 30], got {}",
                self.grid_margin_deg
            )));
        }
        for (value, field) in [
            (self.max_wind_speed_ms, "max_wind_speed_ms"),
            (self.max_wave_height_m, "max_wave_height_m"),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(Error::invalid(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }
        if self.max_expansions == 0 {
            return Err(Error::invalid("max_expansions must be at least 1"));
        }
        if self.speed_factors.is_empty() {
            return Err(Error::invalid("speed_factors must not be empty"));
        }
        if let Some(factor) = self
            .speed_factors
            .iter()
            .find(|factor| !factor.is_finite() || **factor <= 0.0 || **factor > 2.0)
        {
            return Err(Error::invalid(format!(
                "speed factors must be in (0, 2], got {factor}"
            )));
        }
        Ok(())
    }
}

/// Edge cost `fuel + lambda * time_weight * time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeighting {
    /// Blend between pure fuel (0) and fuel plus full time weight (1).
    pub lambda: f64,
    /// Tonnes of fuel one hour is worth at `lambda = 1`.
    pub time_weight: f64,
}

impl Default for CostWeighting {
    fn default() -> Self {
        Self {
            lambda: 0.0,
            time_weight: DEFAULT_TIME_WEIGHT,
        }
    }
}

impl CostWeighting {
    pub fn new(lambda: f64, time_weight: f64) -> Result<Self> {
        let weighting = Self {
            lambda,
            time_weight,
        };
        weighting.validate()?;
        Ok(weighting)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || !(0.0..=1.0).contains(&self.lambda) {
            return Err(Error::invalid(format!(
                "lambda must be within [0, 1], got {}",
                self.lambda
            )));
        }
        if !self.time_weight.is_finite() || self.time_weight < 0.0 {
            return Err(Error::invalid(format!(
                "time_weight must be finite and non-negative, got {}",
                self.time_weight
            )));
        }
        Ok(())
    }

    /// Cost of one hour under this weighting.
    pub fn time_cost_per_hour(&self) -> f64 {
        self.lambda * self.time_weight
    }
}

/// A single routing question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub start: GeoPosition,
    pub end: GeoPosition,
    pub departure: DateTime<Utc>,
    pub is_laden: bool,
    /// Speed through the water; the loading condition's service speed when `None`.
    pub target_speed_kts: Option<f64>,
}

impl RouteRequest {
    /// Laden voyage at service speed.
    pub fn new(start: GeoPosition, end: GeoPosition, departure: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            departure,
            is_laden: true,
            target_speed_kts: None,
        }
    }

    pub fn laden(mut self, is_laden: bool) -> Self {
        self.is_laden = is_laden;
        self
    }

    pub fn with_target_speed(mut self, speed_kts: Option<f64>) -> Self {
        self.target_speed_kts = speed_kts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.end.validate()?;
        if let Some(speed) = self.target_speed_kts {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(Error::invalid(format!(
                    "target speed must be finite and positive, got {speed}"
                )));
            }
        }
        Ok(())
    }

    fn is_zero_length(&self) -> bool {
        self.start == self.end || great_circle_nm(&self.start, &self.end) == 0.0
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub waypoints: Vec<GeoPosition>,
    /// Speed through the water on each leg (kn); one entry per leg.
    pub speed_profile_kts: Vec<f64>,
    pub total_distance_nm: f64,
    pub total_time_hours: f64,
    pub total_fuel_mt: f64,
    pub fuel_per_nm: f64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub method: RouteMethod,
    /// Nodes expanded by the search; zero for direct routes.
    pub expansions: usize,
}

impl RouteResult {
    pub(crate) fn new(
        request: &RouteRequest,
        method: RouteMethod,
        path: PlannedPath,
    ) -> Result<Self> {
        let arrival_time = search::after_hours(request.departure, path.time_hours)?;
        let fuel_per_nm = if path.distance_nm > 0.0 {
            path.fuel_mt / path.distance_nm
        } else {
            0.0
        };
        Ok(Self {
            waypoints: path.waypoints,
            speed_profile_kts: path.speed_profile,
            total_distance_nm: path.distance_nm,
            total_time_hours: path.time_hours,
            total_fuel_mt: path.fuel_mt,
            fuel_per_nm,
            departure_time: request.departure,
            arrival_time,
            method,
            expansions: path.expansions,
        })
    }

    /// Number of legs in the route.
    pub fn leg_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

/// Raw path produced by a planner.
#[derive(Debug, Clone)]
pub(crate) struct PlannedPath {
    pub waypoints: Vec<GeoPosition>,
    pub speed_profile: Vec<f64>,
    pub distance_nm: f64,
    pub time_hours: f64,
    pub fuel_mt: f64,
    pub expansions: usize,
}

/// Computes routes for one vessel against one weather capability.
#[derive(Debug, Clone)]
pub struct Router {
    model: VesselModel,
    weather: WeatherSource,
    constraints: RouteConstraints,
    weighting: CostWeighting,
}

impl Router {
    pub fn new(
        model: VesselModel,
        weather: WeatherSource,
        constraints: RouteConstraints,
    ) -> Result<Self> {
        constraints.validate()?;
        Ok(Self {
            model,
            weather,
            constraints,
            weighting: CostWeighting::default(),
        })
    }

    pub fn with_weighting(mut self, weighting: CostWeighting) -> Result<Self> {
        weighting.validate()?;
        self.weighting = weighting;
        Ok(self)
    }

    /// Replace the per-search deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.constraints.deadline_ms =
            deadline.map(|limit| u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn model(&self) -> &VesselModel {
        &self.model
    }

    pub fn weather(&self) -> &WeatherSource {
        &self.weather
    }

    pub fn constraints(&self) -> &RouteConstraints {
        &self.constraints
    }

    pub fn weighting(&self) -> CostWeighting {
        self.weighting
    }

    /// Speeds through the water tried on every leg.
    pub fn candidate_speeds(&self, request: &RouteRequest) -> Vec<f64> {
        match request.target_speed_kts {
            Some(speed) => vec![speed],
            None => {
                let service = self.model.specs().service_speed(request.is_laden);
                self.constraints
                    .speed_factors
                    .iter()
                    .map(|factor| factor * service)
                    .collect()
            }
        }
    }

    /// Find the cheapest route from `start` to `end`.
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] for bad coordinates, a non-positive target speed, an
    ///   arrival time chrono cannot represent, or a gridded search with an endpoint
    ///   beyond [`MAX_GRID_LAT`]
    /// - [`Error::WeatherUnavailable`] when weather is required but missing
    /// - [`Error::RouteUnreachable`] when weather limits cut every path
    /// - [`Error::SearchBudgetExceeded`] / [`Error::SearchDeadlineExceeded`]
    pub fn find_optimal_route(
        &self,
        start: GeoPosition,
        end: GeoPosition,
        departure: DateTime<Utc>,
        is_laden: bool,
        target_speed_kts: Option<f64>,
    ) -> Result<RouteResult> {
        let request = RouteRequest::new(start, end, departure)
            .laden(is_laden)
            .with_target_speed(target_speed_kts);
        self.plan(&request)
    }

    /// Plan a route for a prepared request.
    pub fn plan(&self, request: &RouteRequest) -> Result<RouteResult> {
        request.validate()?;
        self.check_weather(request)?;

        let planner = select_planner(&self.weather);

        if request.is_zero_length() {
            debug!("start equals end; returning empty route");
            let speed = self
                .candidate_speeds(request)
                .first()
                .copied()
                .unwrap_or_else(|| self.model.specs().service_speed(request.is_laden));
            let path = PlannedPath {
                waypoints: vec![request.start, request.end],
                speed_profile: vec![speed],
                distance_nm: 0.0,
                time_hours: 0.0,
                fuel_mt: 0.0,
                expansions: 0,
            };
            return RouteResult::new(request, planner.method(), path);
        }

        let result = planner.plan(self, request)?;
        info!(
            method = %result.method,
            weather = self.weather.label(),
            lambda = self.weighting.lambda,
            distance_nm = result.total_distance_nm,
            fuel_mt = result.total_fuel_mt,
            hours = result.total_time_hours,
            expansions = result.expansions,
            "route planned"
        );
        Ok(result)
    }

    fn check_weather(&self, request: &RouteRequest) -> Result<()> {
        if !self.weather.is_available() {
            if self.constraints.require_weather {
                return Err(Error::WeatherUnavailable {
                    message: "no weather source configured".to_string(),
                });
            }
            return Ok(());
        }
        if self.weather.sample(&request.start, request.departure).is_none() {
            if self.constraints.require_weather {
                return Err(Error::WeatherUnavailable {
                    message: format!(
                        "{} weather has no data at {} for {}",
                        self.weather.label(),
                        request.start,
                        request.departure.to_rfc3339()
                    ),
                });
            }
            debug!(
                start = %request.start,
                "no weather at departure point; assuming calm where data is missing"
            );
        }
        Ok(())
    }
}
