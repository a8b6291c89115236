//! Weather-constrained A* over a [`SearchGrid`].

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{great_circle_nm, initial_bearing_deg, midpoint, GeoPosition};
use crate::vessel::constants::MAX_CURRENT_FRACTION;
use crate::vessel::{LegConditions, VesselModel};
use crate::weather::{WeatherCache, WeatherSample, WeatherSource};

use super::grid::{GridCell, GridNode, SearchGrid};
use super::{CostWeighting, PlannedPath, RouteConstraints};

/// Deadline is checked once per this many expansions.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Everything one search needs; borrowed from the router for the duration of a call.
pub(crate) struct SearchContext<'a> {
    pub model: &'a VesselModel,
    pub weather: &'a WeatherSource,
    pub constraints: &'a RouteConstraints,
    pub weighting: CostWeighting,
    pub is_laden: bool,
    pub departure: DateTime<Utc>,
    /// Candidate speeds through the water tried on every edge.
    pub speeds: &'a [f64],
}

/// Cheapest way to traverse one edge.
#[derive(Debug, Clone, Copy)]
struct EdgeCost {
    cost: f64,
    speed_kts: f64,
    time_hours: f64,
    fuel_mt: f64,
    distance_nm: f64,
}

pub(crate) fn find_route_a_star(grid: &SearchGrid, ctx: &SearchContext<'_>) -> Result<PlannedPath> {
    let start = grid.start_cell();
    let goal = grid.goal_cell();
    let goal_position = grid.position(goal);
    let heuristic_rate = heuristic_rate(ctx)?;
    let heuristic = |cell: GridCell| {
        great_circle_nm(&grid.position(cell), &goal_position) * heuristic_rate
    };

    let deadline = ctx
        .constraints
        .deadline_ms
        .map(|ms| (Instant::now(), std::time::Duration::from_millis(ms)));
    let mut cache = WeatherCache::new(ctx.weather);
    let mut nodes: HashMap<GridCell, GridNode> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut expansions = 0usize;
    let mut pruned = 0usize;

    let start_node = GridNode::start(heuristic(start));
    queue.push(AStarEntry::new(start, 0.0, start_node.heuristic));
    nodes.insert(start, start_node);

    while let Some(entry) = queue.pop() {
        let current = match nodes.get_mut(&entry.node) {
            Some(node) if node.closed => continue,
            Some(node) if node.cost < entry.cost.0 => continue,
            Some(node) => {
                node.closed = true;
                *node
            }
            None => continue,
        };

        expansions += 1;
        if expansions > ctx.constraints.max_expansions {
            return Err(Error::SearchBudgetExceeded {
                expansions: ctx.constraints.max_expansions,
            });
        }
        if expansions % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some((started, limit)) = deadline {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    return Err(Error::SearchDeadlineExceeded {
                        elapsed_ms: elapsed.as_millis(),
                        expansions,
                    });
                }
            }
        }

        if entry.node == goal {
            debug!(
                expansions,
                pruned,
                cache_hits = cache.hits(),
                cache_misses = cache.misses(),
                "weather search reached goal"
            );
            return Ok(reconstruct(grid, &nodes, start, goal, expansions));
        }

        let from = grid.position(entry.node);
        for next in grid.neighbours(entry.node) {
            if nodes.get(&next).is_some_and(|node| node.closed) {
                continue;
            }
            let to = grid.position(next);
            let Some(edge) = cheapest_edge(ctx, &mut cache, &from, &to, current.elapsed_hours)?
            else {
                pruned += 1;
                continue;
            };

            let tentative = current.cost + edge.cost;
            let known = nodes.get(&next).map_or(f64::INFINITY, |node| node.cost);
            if tentative < known {
                let node = GridNode {
                    cost: tentative,
                    heuristic: heuristic(next),
                    parent: Some(entry.node),
                    speed_kts: edge.speed_kts,
                    elapsed_hours: current.elapsed_hours + edge.time_hours,
                    fuel_mt: current.fuel_mt + edge.fuel_mt,
                    distance_nm: current.distance_nm + edge.distance_nm,
                    closed: false,
                };
                queue.push(AStarEntry::new(next, tentative, node.heuristic));
                nodes.insert(next, node);
            }
        }
    }

    debug!(expansions, pruned, "weather search exhausted the grid");
    Err(Error::RouteUnreachable {
        start: grid.position(start).to_string(),
        end: goal_position.to_string(),
    })
}

/// Cost per nautical mile that no edge can undercut.
fn heuristic_rate(ctx: &SearchContext<'_>) -> Result<f64> {
    let time_weight = ctx.weighting.time_cost_per_hour();
    let mut best = f64::INFINITY;
    for &speed in ctx.speeds {
        let fuel = ctx.model.min_fuel_per_nm(speed, ctx.is_laden)?;
        let fastest = speed * (1.0 + MAX_CURRENT_FRACTION);
        best = best.min(fuel + time_weight / fastest);
    }
    Ok(if best.is_finite() { best } else { 0.0 })
}

fn cheapest_edge(
    ctx: &SearchContext<'_>,
    cache: &mut WeatherCache<'_>,
    from: &GeoPosition,
    to: &GeoPosition,
    elapsed_hours: f64,
) -> Result<Option<EdgeCost>> {
    let distance_nm = great_circle_nm(from, to);
    let heading = initial_bearing_deg(from, to);
    let centre = midpoint(from, to);
    let time_weight = ctx.weighting.time_cost_per_hour();

    let mut best: Option<EdgeCost> = None;
    for &speed in ctx.speeds {
        let sample_time = after_hours(ctx.departure, elapsed_hours + distance_nm / speed / 2.0)?;
        let weather = cache.sample(&centre, sample_time).unwrap_or_default();
        if exceeds_limits(&weather, ctx.constraints) {
            continue;
        }

        let conditions = LegConditions::new(heading, weather);
        let leg = ctx
            .model
            .fuel_for(speed, ctx.is_laden, Some(&conditions), distance_nm)?;
        let cost = leg.fuel_mt + time_weight * leg.time_hours;
        if best.map_or(true, |current| cost < current.cost) {
            best = Some(EdgeCost {
                cost,
                speed_kts: speed,
                time_hours: leg.time_hours,
                fuel_mt: leg.fuel_mt,
                distance_nm,
            });
        }
    }
    Ok(best)
}

fn exceeds_limits(weather: &WeatherSample, constraints: &RouteConstraints) -> bool {
    weather.wind_speed_ms > constraints.max_wind_speed_ms
        || weather.wave_height_m > constraints.max_wave_height_m
}

/// `start` moved forward by `value` hours, to the millisecond.
///
/// Fails with [`Error::InvalidInput`] when the result is outside chrono's range, which
/// a vanishingly small speed can cause.
pub(crate) fn after_hours(start: DateTime<Utc>, value: f64) -> Result<DateTime<Utc>> {
    let millis = (value * 3_600_000.0).round();
    let offset = if millis.is_finite() && millis.abs() < i64::MAX as f64 {
        Duration::try_milliseconds(millis as i64)
    } else {
        None
    };
    offset
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            Error::invalid(format!(
                "{value} h after {start} is outside the representable time range"
            ))
        })
}

fn reconstruct(
    grid: &SearchGrid,
    nodes: &HashMap<GridCell, GridNode>,
    start: GridCell,
    goal: GridCell,
    expansions: usize,
) -> PlannedPath {
    let mut cells = Vec::new();
    let mut current = Some(goal);
    while let Some(cell) = current {
        cells.push(cell);
        if cell == start {
            break;
        }
        current = nodes.get(&cell).and_then(|node| node.parent);
    }
    cells.reverse();

    let waypoints = cells.iter().map(|cell| grid.position(*cell)).collect();
    let speed_profile = cells
        .iter()
        .skip(1)
        .filter_map(|cell| nodes.get(cell).map(|node| node.speed_kts))
        .collect();
    let (distance_nm, time_hours, fuel_mt) = nodes
        .get(&goal)
        .map_or((0.0, 0.0, 0.0), |node| {
            (node.distance_nm, node.elapsed_hours, node.fuel_mt)
        });

    PlannedPath {
        waypoints,
        speed_profile,
        distance_nm,
        time_hours,
        fuel_mt,
        expansions,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: GridCell,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: GridCell, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
