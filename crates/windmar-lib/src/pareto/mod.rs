//! Fuel/time trade-off by sweeping the cost blend.
//!
//! Each swept `lambda` plans one route with edge cost
//! `fuel + lambda * time_weight * time`. Dominated results are removed and the
//! remaining front is sorted by fuel.
//!
//! - [`pareto_filter`] - pairwise dominance filter
//! - [`ParetoOptimizer`] - runs the sweep on a [`WorkerPool`]
//! - [`pool`] - Rayon pool sizing

pub mod pool;

use std::cmp::Ordering;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geo::GeoPosition;
use crate::routing::{
    CostWeighting, RouteConstraints, RouteRequest, RouteResult, Router, DEFAULT_TIME_WEIGHT,
};
use crate::vessel::VesselModel;
use crate::weather::WeatherSource;

pub use pool::WorkerPool;

/// One point of the fuel/time trade-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoSolution {
    pub lambda_value: f64,
    pub fuel_mt: f64,
    pub time_hours: f64,
    pub distance_nm: f64,
    pub waypoints: Vec<GeoPosition>,
    pub speed_profile: Vec<f64>,
    #[serde(default)]
    pub is_selected: bool,
}

impl ParetoSolution {
    pub fn new(
        lambda_value: f64,
        fuel_mt: f64,
        time_hours: f64,
        distance_nm: f64,
        waypoints: Vec<GeoPosition>,
        speed_profile: Vec<f64>,
    ) -> Self {
        Self {
            lambda_value,
            fuel_mt,
            time_hours,
            distance_nm,
            waypoints,
            speed_profile,
            is_selected: false,
        }
    }

    fn from_route(lambda_value: f64, route: RouteResult) -> Self {
        Self::new(
            lambda_value,
            route.total_fuel_mt,
            route.total_time_hours,
            route.total_distance_nm,
            route.waypoints,
            route.speed_profile_kts,
        )
    }

    /// `true` when `self` is no worse in both objectives and better in one.
    pub fn dominates(&self, other: &ParetoSolution) -> bool {
        self.fuel_mt <= other.fuel_mt
            && self.time_hours <= other.time_hours
            && (self.fuel_mt < other.fuel_mt || self.time_hours < other.time_hours)
    }
}

/// Remove every dominated solution and sort the rest by fuel, then time.
///
/// Solutions with identical fuel and time never dominate each other, so both are kept.
///
/// # Examples
/// ```
/// use windmar_lib::pareto::{pareto_filter, ParetoSolution};
///
/// let a = ParetoSolution::new(0.0, 50.0, 100.0, 300.0, vec![], vec![]);
/// let b = ParetoSolution::new(0.5, 60.0, 110.0, 300.0, vec![], vec![]);
/// let front = pareto_filter(vec![b, a.clone()]);
/// assert_eq!(front, vec![a]);
/// ```
pub fn pareto_filter(solutions: Vec<ParetoSolution>) -> Vec<ParetoSolution> {
    let keep: Vec<bool> = solutions
        .iter()
        .map(|candidate| !solutions.iter().any(|other| other.dominates(candidate)))
        .collect();

    let mut front: Vec<ParetoSolution> = solutions
        .into_iter()
        .zip(keep)
        .filter_map(|(solution, keep)| keep.then_some(solution))
        .collect();
    front.sort_by(compare_fuel_then_time);
    front
}

fn compare_fuel_then_time(a: &ParetoSolution, b: &ParetoSolution) -> Ordering {
    a.fuel_mt
        .total_cmp(&b.fuel_mt)
        .then_with(|| a.time_hours.total_cmp(&b.time_hours))
}

/// Mark the solution nearest the normalised (min fuel, min time) corner as selected.
pub fn select_knee(front: &mut [ParetoSolution]) {
    for solution in front.iter_mut() {
        solution.is_selected = false;
    }
    let Some(first) = front.first() else {
        return;
    };

    let (mut fuel_min, mut fuel_max) = (first.fuel_mt, first.fuel_mt);
    let (mut time_min, mut time_max) = (first.time_hours, first.time_hours);
    for solution in front.iter() {
        fuel_min = fuel_min.min(solution.fuel_mt);
        fuel_max = fuel_max.max(solution.fuel_mt);
        time_min = time_min.min(solution.time_hours);
        time_max = time_max.max(solution.time_hours);
    }
    let normalise = |value: f64, min: f64, max: f64| {
        if max > min {
            (value - min) / (max - min)
        } else {
            0.0
        }
    };

    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;
    for (index, solution) in front.iter().enumerate() {
        let fuel = normalise(solution.fuel_mt, fuel_min, fuel_max);
        let time = normalise(solution.time_hours, time_min, time_max);
        let distance = fuel.hypot(time);
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }
    front[best_index].is_selected = true;
}

/// `n` lambda values evenly spaced over `[0, 1]`.
pub fn evenly_spaced_lambdas(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParetoConfig {
    /// Number of evenly spaced lambda values when `lambda_values` is not given.
    pub points: usize,
    /// Explicit lambda values overriding `points`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_values: Option<Vec<f64>>,
    /// Tonnes of fuel one hour is worth at `lambda = 1`.
    pub time_weight: f64,
    /// Worker threads; 0 uses the global pool.
    pub workers: usize,
    /// Per-point search deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_timeout_ms: Option<u64>,
    /// Speed factors tried on every edge during the sweep.
    pub speed_factors: Vec<f64>,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            points: 5,
            lambda_values: None,
            time_weight: DEFAULT_TIME_WEIGHT,
            workers: 0,
            point_timeout_ms: None,
            speed_factors: vec![0.85, 0.9, 0.95, 1.0],
        }
    }
}

impl ParetoConfig {
    /// Lambda values this config sweeps.
    pub fn lambdas(&self) -> Vec<f64> {
        match &self.lambda_values {
            Some(values) => values.clone(),
            None => evenly_spaced_lambdas(self.points),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for lambda in self.lambdas() {
            validate_lambda(lambda)?;
        }
        CostWeighting::new(0.0, self.time_weight)?;
        Ok(())
    }
}

fn validate_lambda(lambda: f64) -> Result<()> {
    if !lambda.is_finite() || !(0.0..=1.0).contains(&lambda) {
        return Err(Error::invalid(format!(
            "lambda values must be within [0, 1], got {lambda}"
        )));
    }
    Ok(())
}

/// Runs one routing search per lambda and builds the front.
#[derive(Debug, Clone)]
pub struct ParetoOptimizer {
    router: Router,
    config: ParetoConfig,
}

impl ParetoOptimizer {
    /// Build an optimizer.
    ///
    /// When `constraints` carries the default speed factors they are replaced by the
    /// sweep's, which give lambda a speed lever. Factors the caller set explicitly are
    /// kept.
    pub fn new(
        model: VesselModel,
        weather: WeatherSource,
        mut constraints: RouteConstraints,
        config: ParetoConfig,
    ) -> Result<Self> {
        config.validate()?;
        if constraints.speed_factors == RouteConstraints::default().speed_factors {
            constraints.speed_factors = config.speed_factors.clone();
        } else {
            debug!(
                kept = ?constraints.speed_factors,
                ignored = ?config.speed_factors,
                "using caller speed factors for the sweep"
            );
        }
        let router = Router::new(model, weather, constraints)?;
        Ok(Self { router, config })
    }

    pub fn config(&self) -> &ParetoConfig {
        &self.config
    }

    /// Sweep the configured lambda values.
    pub fn run(&self, request: &RouteRequest) -> Result<Vec<ParetoSolution>> {
        self.sweep(request, &self.config.lambdas())
    }

    /// Plan one route per lambda and return the filtered front, selected knee marked.
    ///
    /// Failed or timed-out points are dropped. If every point fails the first error
    /// is returned.
    pub fn sweep(
        &self,
        request: &RouteRequest,
        lambda_values: &[f64],
    ) -> Result<Vec<ParetoSolution>> {
        request.validate()?;
        for &lambda in lambda_values {
            validate_lambda(lambda)?;
        }

        let pool = WorkerPool::with_workers(self.config.workers);
        let timeout = self.config.point_timeout_ms.map(Duration::from_millis);
        let outcomes: Vec<(f64, Result<RouteResult>)> = pool.install(|| {
            lambda_values
                .par_iter()
                .map(|&lambda| (lambda, self.solve_point(request, lambda, timeout)))
                .collect()
        });

        let mut solutions = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for (lambda, outcome) in outcomes {
            match outcome {
                Ok(route) => solutions.push(ParetoSolution::from_route(lambda, route)),
                Err(err) => {
                    warn!(lambda, error = %err, "dropping sweep point");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if solutions.is_empty() {
            if let Some(err) = first_error {
                return Err(err);
            }
        }

        let evaluated = solutions.len();
        let mut front = pareto_filter(solutions);
        select_knee(&mut front);
        info!(
            swept = lambda_values.len(),
            evaluated,
            front = front.len(),
            "pareto sweep complete"
        );
        Ok(front)
    }

    fn solve_point(
        &self,
        request: &RouteRequest,
        lambda: f64,
        timeout: Option<Duration>,
    ) -> Result<RouteResult> {
        let weighting = CostWeighting::new(lambda, self.config.time_weight)?;
        let mut router = self.router.clone().with_weighting(weighting)?;
        if timeout.is_some() {
            router = router.with_deadline(timeout);
        }
        router.plan(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(fuel: f64, time: f64) -> ParetoSolution {
        ParetoSolution::new(0.0, fuel, time, 100.0, vec![], vec![12.0])
    }

    #[test]
    fn default_speed_factors_take_the_sweep_values() {
        let optimizer = ParetoOptimizer::new(
            VesselModel::default(),
            WeatherSource::Absent,
            RouteConstraints::default(),
            ParetoConfig::default(),
        )
        .unwrap();
        assert_eq!(
            optimizer.router.constraints().speed_factors,
            ParetoConfig::default().speed_factors
        );
    }

    #[test]
    fn explicit_speed_factors_are_kept() {
        let constraints = RouteConstraints {
            speed_factors: vec![0.7, 1.1],
            ..RouteConstraints::default()
        };
        let optimizer = ParetoOptimizer::new(
            VesselModel::default(),
            WeatherSource::Absent,
            constraints,
            ParetoConfig::default(),
        )
        .unwrap();
        assert_eq!(optimizer.router.constraints().speed_factors, vec![0.7, 1.1]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(pareto_filter(Vec::new()).is_empty());
        let single = solution(50.0, 100.0);
        assert_eq!(pareto_filter(vec![single.clone()]), vec![single]);
    }

    #[test]
    fn dominated_solution_is_removed() {
        let front = pareto_filter(vec![solution(50.0, 100.0), solution(60.0, 110.0)]);
        assert_eq!(front.len(), 1);
        assert_eq!(front[0].fuel_mt, 50.0);
    }

    #[test]
    fn trade_offs_are_kept_and_sorted() {
        let front = pareto_filter(vec![
            solution(80.0, 85.0),
            solution(40.0, 130.0),
            solution(65.0, 110.0),
            solution(60.0, 100.0),
        ]);
        let fuels: Vec<f64> = front.iter().map(|s| s.fuel_mt).collect();
        assert_eq!(fuels, vec![40.0, 60.0, 80.0]);
    }

    #[test]
    fn identical_solutions_are_both_kept() {
        let front = pareto_filter(vec![solution(50.0, 100.0), solution(50.0, 100.0)]);
        assert_eq!(front.len(), 2);
    }

    #[test]
    fn lambdas_are_evenly_spaced() {
        assert!(evenly_spaced_lambdas(0).is_empty());
        assert_eq!(evenly_spaced_lambdas(1), vec![0.0]);
        assert_eq!(evenly_spaced_lambdas(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn knee_is_nearest_the_utopia_point() {
        let mut front = vec![
            solution(40.0, 130.0),
            solution(50.0, 95.0),
            solution(80.0, 85.0),
        ];
        select_knee(&mut front);
        let selected: Vec<bool> = front.iter().map(|s| s.is_selected).collect();
        assert_eq!(selected, vec![false, true, false]);
    }

    #[test]
    fn solution_defaults_to_unselected() {
        let parsed: ParetoSolution = serde_json::from_str(
            r#"{"lambda_value":0.3,"fuel_mt":50,"time_hours":100,"distance_nm":200,
                "waypoints":[],"speed_profile":[]}"#,
        )
        .expect("valid json");
        assert!(!parsed.is_selected);
    }

    #[test]
    fn rejects_out_of_range_lambda() {
        let config = ParetoConfig {
            lambda_values: Some(vec![0.0, 1.2]),
            ..ParetoConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
