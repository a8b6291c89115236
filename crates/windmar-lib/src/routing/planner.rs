//! Route planning strategies implementing the Strategy pattern.
//!
//! The weather capability decides the strategy once, when the router is asked for a
//! route: no weather means the direct great-circle leg, any weather source means the
//! gridded A* search.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::great_circle_nm;
use crate::weather::WeatherSource;

use super::grid::{SearchGrid, MAX_GRID_LAT};
use super::search::{find_route_a_star, SearchContext};
use super::{PlannedPath, RouteMethod, RouteRequest, RouteResult, Router};

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The method identifier reported in results.
    fn method(&self) -> RouteMethod;

    /// Plan a route for a validated request with distinct start and end.
    fn plan(&self, router: &Router, request: &RouteRequest) -> Result<RouteResult>;
}

/// Direct two-waypoint great-circle leg in calm water.
///
/// Picks the cheapest candidate speed under the router's cost weighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCirclePlanner;

impl RoutePlanner for GreatCirclePlanner {
    fn method(&self) -> RouteMethod {
        RouteMethod::GreatCircle
    }

    fn plan(&self, router: &Router, request: &RouteRequest) -> Result<RouteResult> {
        let distance_nm = great_circle_nm(&request.start, &request.end);
        let time_weight = router.weighting().time_cost_per_hour();

        let mut best = None;
        for speed in router.candidate_speeds(request) {
            let leg = router
                .model()
                .fuel_for(speed, request.is_laden, None, distance_nm)?;
            let cost = leg.fuel_mt + time_weight * leg.time_hours;
            if best.as_ref().map_or(true, |(best_cost, _, _)| cost < *best_cost) {
                best = Some((cost, speed, leg));
            }
        }

        let (_, speed, leg) =
            best.ok_or_else(|| Error::invalid("no candidate speeds configured"))?;

        let path = PlannedPath {
            waypoints: vec![request.start, request.end],
            speed_profile: vec![speed],
            distance_nm,
            time_hours: leg.time_hours,
            fuel_mt: leg.fuel_mt,
            expansions: 0,
        };
        RouteResult::new(request, self.method(), path)
    }
}

/// A* over a regular lat/lon grid with weather-dependent edge costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherGridPlanner;

impl RoutePlanner for WeatherGridPlanner {
    fn method(&self) -> RouteMethod {
        RouteMethod::WeatherAStar
    }

    fn plan(&self, router: &Router, request: &RouteRequest) -> Result<RouteResult> {
        for (label, point) in [("start", &request.start), ("end", &request.end)] {
            if point.lat.abs() > MAX_GRID_LAT {
                return Err(Error::invalid(format!(
                    "{label} {point} is beyond the {MAX_GRID_LAT} degree limit of the weather grid"
                )));
            }
        }

        let constraints = router.constraints();
        let grid = SearchGrid::new(
            request.start,
            request.end,
            constraints.grid_resolution_deg,
            constraints.grid_margin_deg,
        );
        debug!(
            cells = grid.cell_count(),
            lat_step = grid.steps().0,
            lon_step = grid.steps().1,
            "built search grid"
        );

        let speeds = router.candidate_speeds(request);
        let ctx = SearchContext {
            model: router.model(),
            weather: router.weather(),
            constraints,
            weighting: router.weighting(),
            is_laden: request.is_laden,
            departure: request.departure,
            speeds: &speeds,
        };
        let path = find_route_a_star(&grid, &ctx)?;
        RouteResult::new(request, self.method(), path)
    }
}

/// Select the planner for a weather capability.
pub fn select_planner(weather: &WeatherSource) -> Box<dyn RoutePlanner> {
    match weather {
        WeatherSource::Absent => Box::new(GreatCirclePlanner),
        _ => Box::new(WeatherGridPlanner),
    }
}
