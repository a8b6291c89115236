use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::GeoPosition;
use crate::pareto::ParetoSolution;
use crate::routing::{RouteMethod, RouteResult};

/// Presentation style for turning a summary into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    Markdown,
}

/// One leg between consecutive waypoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteLeg {
    pub index: usize,
    pub from: GeoPosition,
    pub to: GeoPosition,
    pub distance_nm: f64,
    pub bearing_deg: f64,
    pub speed_kts: f64,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub method: RouteMethod,
    pub start: GeoPosition,
    pub end: GeoPosition,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_distance_nm: f64,
    pub total_time_hours: f64,
    pub total_fuel_mt: f64,
    pub fuel_per_nm: f64,
    pub expansions: usize,
    pub legs: Vec<RouteLeg>,
}

impl RouteSummary {
    /// Convert a [`RouteResult`] into a structured summary with per-leg detail.
    pub fn from_result(result: &RouteResult) -> Result<Self> {
        let (Some(start), Some(end)) = (result.waypoints.first(), result.waypoints.last()) else {
            return Err(Error::invalid("route has no waypoints"));
        };

        let legs = result
            .waypoints
            .windows(2)
            .enumerate()
            .map(|(index, pair)| RouteLeg {
                index,
                from: pair[0],
                to: pair[1],
                distance_nm: pair[0].distance_nm(&pair[1]),
                bearing_deg: pair[0].bearing_to(&pair[1]),
                speed_kts: result.speed_profile_kts.get(index).copied().unwrap_or(0.0),
            })
            .collect();

        Ok(Self {
            method: result.method,
            start: *start,
            end: *end,
            departure_time: result.departure_time,
            arrival_time: result.arrival_time,
            total_distance_nm: result.total_distance_nm,
            total_time_hours: result.total_time_hours,
            total_fuel_mt: result.total_fuel_mt,
            fuel_per_nm: result.fuel_per_nm,
            expansions: result.expansions,
            legs,
        })
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::PlainText => self.render_plain(),
            RenderMode::Markdown => self.render_markdown(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} legs, method: {})",
            self.start,
            self.end,
            self.legs.len(),
            self.method
        );
        let _ = writeln!(
            buffer,
            "Distance: {:.1} nm  Time: {:.1} h  Fuel: {:.2} t ({:.4} t/nm)",
            self.total_distance_nm, self.total_time_hours, self.total_fuel_mt, self.fuel_per_nm
        );
        let _ = writeln!(
            buffer,
            "Departure: {}  Arrival: {}",
            self.departure_time.to_rfc3339(),
            self.arrival_time.to_rfc3339()
        );
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "{:>3}: {} -> {} {:>7.1} nm {:>5.1} deg {:>5.2} kn",
                leg.index, leg.from, leg.to, leg.distance_nm, leg.bearing_deg, leg.speed_kts
            );
        }
        buffer
    }

    fn render_markdown(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Route** `{}` -> `{}` ({} legs, method: `{}`)",
            self.start,
            self.end,
            self.legs.len(),
            self.method
        );
        let _ = writeln!(
            buffer,
            "* distance **{:.1} nm**, time **{:.1} h**, fuel **{:.2} t**",
            self.total_distance_nm, self.total_time_hours, self.total_fuel_mt
        );
        if !self.legs.is_empty() {
            let _ = writeln!(buffer);
            let _ = writeln!(buffer, "| # | from | to | nm | kn |");
            let _ = writeln!(buffer, "|---|------|----|----|----|");
            for leg in &self.legs {
                let _ = writeln!(
                    buffer,
                    "| {} | {} | {} | {:.1} | {:.2} |",
                    leg.index, leg.from, leg.to, leg.distance_nm, leg.speed_kts
                );
            }
        }
        buffer
    }
}

/// One row of a rendered Pareto front.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrontPoint {
    pub lambda_value: f64,
    pub fuel_mt: f64,
    pub time_hours: f64,
    pub distance_nm: f64,
    pub waypoint_count: usize,
    pub is_selected: bool,
}

/// Structured representation of a fuel/time front.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrontSummary {
    pub points: Vec<FrontPoint>,
    /// Index into `points` of the knee solution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
}

impl FrontSummary {
    pub fn from_solutions(solutions: &[ParetoSolution]) -> Self {
        let points: Vec<FrontPoint> = solutions
            .iter()
            .map(|solution| FrontPoint {
                lambda_value: solution.lambda_value,
                fuel_mt: solution.fuel_mt,
                time_hours: solution.time_hours,
                distance_nm: solution.distance_nm,
                waypoint_count: solution.waypoints.len(),
                is_selected: solution.is_selected,
            })
            .collect();
        let selected = points.iter().position(|point| point.is_selected);
        Self { points, selected }
    }

    pub fn render(&self, mode: RenderMode) -> String {
        let mut buffer = String::new();
        match mode {
            RenderMode::PlainText => {
                let _ = writeln!(buffer, "Pareto front: {} solutions", self.points.len());
                for point in &self.points {
                    let marker = if point.is_selected { '*' } else { ' ' };
                    let _ = writeln!(
                        buffer,
                        "{marker} lambda {:.3}: {:>8.2} t {:>7.1} h {:>8.1} nm",
                        point.lambda_value, point.fuel_mt, point.time_hours, point.distance_nm
                    );
                }
            }
            RenderMode::Markdown => {
                let _ = writeln!(buffer, "| lambda | fuel (t) | time (h) | distance (nm) | |");
                let _ = writeln!(buffer, "|--------|----------|----------|---------------|-|");
                for point in &self.points {
                    let marker = if point.is_selected { "knee" } else { "" };
                    let _ = writeln!(
                        buffer,
                        "| {:.3} | {:.2} | {:.1} | {:.1} | {marker} |",
                        point.lambda_value, point.fuel_mt, point.time_hours, point.distance_nm
                    );
                }
            }
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_route() -> RouteResult {
        let departure = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        RouteResult {
            waypoints: vec![
                GeoPosition::new(50.0, -5.0).unwrap(),
                GeoPosition::new(49.5, -6.0).unwrap(),
                GeoPosition::new(49.0, -7.0).unwrap(),
            ],
            speed_profile_kts: vec![14.5, 13.0],
            total_distance_nm: 90.0,
            total_time_hours: 6.5,
            total_fuel_mt: 7.2,
            fuel_per_nm: 0.08,
            departure_time: departure,
            arrival_time: departure + chrono::Duration::minutes(390),
            method: RouteMethod::WeatherAStar,
            expansions: 42,
        }
    }

    #[test]
    fn summary_has_one_leg_per_waypoint_pair() {
        let summary = RouteSummary::from_result(&sample_route()).unwrap();
        assert_eq!(summary.legs.len(), 2);
        assert_eq!(summary.legs[1].speed_kts, 13.0);
        assert_eq!(summary.end, GeoPosition::new(49.0, -7.0).unwrap());
    }

    #[test]
    fn plain_render_lists_legs() {
        let text = RouteSummary::from_result(&sample_route())
            .unwrap()
            .render(RenderMode::PlainText);
        assert!(text.contains("method: weather_a_star"));
        assert!(text.contains("2 legs"));
        assert!(text.lines().count() >= 5);
    }

    #[test]
    fn empty_route_is_rejected() {
        let mut route = sample_route();
        route.waypoints.clear();
        assert!(RouteSummary::from_result(&route).is_err());
    }

    #[test]
    fn front_marks_knee() {
        let mut knee = ParetoSolution::new(0.5, 20.0, 30.0, 400.0, vec![], vec![]);
        knee.is_selected = true;
        let solutions = vec![
            ParetoSolution::new(0.0, 18.0, 34.0, 400.0, vec![], vec![]),
            knee,
        ];
        let summary = FrontSummary::from_solutions(&solutions);
        assert_eq!(summary.selected, Some(1));
        let text = summary.render(RenderMode::PlainText);
        assert!(text.contains("* lambda 0.500"));
    }
}
