//! Fit the vessel model's calibration factors to observed noon reports.
//!
//! The fit minimises the squared relative error between predicted and reported fuel
//! using a damped Gauss-Newton iteration over the three resistance multipliers. A
//! multiplier whose resistance term is zero in every report cannot be identified and
//! stays at its initial value.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use windmar_lib::calibration::{Calibrator, NoonReport};
//! use windmar_lib::geo::GeoPosition;
//! use windmar_lib::vessel::{CalibrationFactors, VesselModel};
//!
//! let model = VesselModel::default();
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let position = GeoPosition::new(45.0, -20.0).unwrap();
//! let reports: Vec<NoonReport> = [12.0, 13.5, 15.0]
//!     .into_iter()
//!     .map(|speed| {
//!         let fuel = model.fuel_for(speed, true, None, speed * 24.0).unwrap().fuel_mt;
//!         NoonReport::new(date, position, speed, fuel * 1.1, true, 90.0)
//!     })
//!     .collect();
//!
//! let outcome = Calibrator::new(model)
//!     .calibrate(&reports, CalibrationFactors::default())
//!     .unwrap();
//! assert!((outcome.factors.calm_water - 1.1).abs() < 1e-3);
//! ```

pub mod reports;
mod solver;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::vessel::{CalibrationFactors, VesselModel};

pub use reports::{
    load_noon_reports, read_noon_reports, NoonReport, WaveObservation, WindObservation,
    REPORT_HOURS,
};

use solver::solve_linear;

/// A resistance term below this magnitude (kN) counts as absent from a report.
const TERM_EPSILON_KN: f64 = 1e-9;

/// Tuning for the calibration fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub max_iterations: usize,
    /// Stop once the largest factor step falls below this.
    pub tolerance: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    pub min_reports: usize,
    /// Smallest spread between the slowest and fastest report (knots).
    pub min_speed_spread_kts: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
            min_factor: 0.2,
            max_factor: 5.0,
            min_reports: 3,
            min_speed_spread_kts: 0.1,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::invalid("max_iterations must be at least 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.min_factor > 0.0 && self.min_factor < self.max_factor)
            || !self.max_factor.is_finite()
        {
            return Err(Error::invalid(format!(
                "factor bounds must satisfy 0 < min < max, got [{}, {}]",
                self.min_factor, self.max_factor
            )));
        }
        if self.min_reports == 0 {
            return Err(Error::invalid("min_reports must be at least 1"));
        }
        if !self.min_speed_spread_kts.is_finite() || self.min_speed_spread_kts < 0.0 {
            return Err(Error::invalid("min_speed_spread_kts must be non-negative"));
        }
        Ok(())
    }
}

/// Fit quality before and after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub reports_used: usize,
    pub reports_skipped: usize,
    /// Mean absolute percentage error of predicted fuel.
    pub mape_before: f64,
    pub mape_after: f64,
    pub rmse_before_mt: f64,
    pub rmse_after_mt: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Result of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    pub factors: CalibrationFactors,
    pub metrics: QualityMetrics,
    /// Factors that no report could inform, left at their initial value.
    pub held_fixed: Vec<String>,
    pub report: String,
}

/// Fits calibration factors for one vessel.
#[derive(Debug, Clone)]
pub struct Calibrator {
    model: VesselModel,
    config: CalibrationConfig,
}

impl Calibrator {
    /// The model's own calibration factors are ignored; the fit starts from the
    /// factors passed to [`Calibrator::calibrate`].
    pub fn new(model: VesselModel) -> Self {
        Self {
            model,
            config: CalibrationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Fit factors to `reports`, starting from `initial`.
    ///
    /// # Errors
    /// [`Error::InsufficientData`] when fewer than `min_reports` usable reports remain
    /// or their speeds do not spread enough to separate the terms, and
    /// [`Error::InvalidInput`] when `initial` is not a valid set of factors.
    pub fn calibrate(
        &self,
        reports: &[NoonReport],
        initial: CalibrationFactors,
    ) -> Result<CalibrationOutcome> {
        initial.validate()?;

        let mut usable = Vec::with_capacity(reports.len());
        for report in reports {
            match report.unusable_reason() {
                Some(reason) => warn!(date = %report.date, %reason, "skipping noon report"),
                None => usable.push(*report),
            }
        }
        let skipped = reports.len() - usable.len();
        self.check_coverage(&usable)?;

        let free = self.identifiable_terms(&usable)?;
        let held_fixed: Vec<String> = CalibrationFactors::NAMES
            .iter()
            .enumerate()
            .filter(|(index, _)| !free.contains(index))
            .map(|(_, name)| name.to_string())
            .collect();
        if !held_fixed.is_empty() {
            info!(held = ?held_fixed, "holding unidentifiable factors fixed");
        }

        let start = self.clamp(initial.as_array(), &free);
        let before = self.errors(&usable, start)?;
        let (fitted, iterations, converged) = self.fit(&usable, start, &free)?;
        let after = self.errors(&usable, fitted)?;

        let metrics = QualityMetrics {
            reports_used: usable.len(),
            reports_skipped: skipped,
            mape_before: before.mape,
            mape_after: after.mape,
            rmse_before_mt: before.rmse,
            rmse_after_mt: after.rmse,
            iterations,
            converged,
        };
        let factors = CalibrationFactors::from_array(fitted);
        info!(
            calm_water = factors.calm_water,
            wind = factors.wind,
            waves = factors.waves,
            mape_before = metrics.mape_before,
            mape_after = metrics.mape_after,
            iterations,
            "calibration finished"
        );

        let report = render_report(&factors, &metrics, &held_fixed);
        Ok(CalibrationOutcome {
            factors,
            metrics,
            held_fixed,
            report,
        })
    }

    fn check_coverage(&self, usable: &[NoonReport]) -> Result<()> {
        if usable.len() < self.config.min_reports {
            return Err(Error::InsufficientData {
                message: format!(
                    "{} usable noon reports, at least {} required",
                    usable.len(),
                    self.config.min_reports
                ),
            });
        }
        let (low, high) = usable.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.speed_kts), hi.max(r.speed_kts))
        });
        if high - low < self.config.min_speed_spread_kts {
            return Err(Error::InsufficientData {
                message: format!(
                    "reported speeds span {:.3} kn, at least {} kn required",
                    high - low,
                    self.config.min_speed_spread_kts
                ),
            });
        }
        Ok(())
    }

    /// Indices of factors whose resistance term is non-zero in some report.
    fn identifiable_terms(&self, usable: &[NoonReport]) -> Result<Vec<usize>> {
        let unit = self.model.clone().with_calibration(CalibrationFactors::default())?;
        let mut seen = [true, false, false];
        for report in usable {
            let conditions = report.conditions();
            let terms = unit.resistance_kn(report.speed_kts, report.is_laden, Some(&conditions))?;
            seen[1] |= terms.wind.abs() > TERM_EPSILON_KN;
            seen[2] |= terms.waves.abs() > TERM_EPSILON_KN;
        }
        Ok((0..3).filter(|&i| seen[i]).collect())
    }

    fn clamp(&self, mut factors: [f64; 3], free: &[usize]) -> [f64; 3] {
        for &i in free {
            factors[i] = factors[i].clamp(self.config.min_factor, self.config.max_factor);
        }
        factors
    }

    fn predict(&self, report: &NoonReport, factors: [f64; 3]) -> Result<f64> {
        let model = self
            .model
            .clone()
            .with_calibration(CalibrationFactors::from_array(factors))?;
        let conditions = report.conditions();
        let estimate = model.fuel_for(
            report.speed_kts,
            report.is_laden,
            Some(&conditions),
            report.distance_nm,
        )?;
        Ok(estimate.fuel_mt)
    }

    /// Relative residuals (predicted - observed) / observed.
    fn residuals(&self, usable: &[NoonReport], factors: [f64; 3]) -> Result<Vec<f64>> {
        usable
            .iter()
            .map(|r| Ok((self.predict(r, factors)? - r.fuel_mt) / r.fuel_mt))
            .collect()
    }

    fn errors(&self, usable: &[NoonReport], factors: [f64; 3]) -> Result<FitErrors> {
        let mut abs_pct = 0.0;
        let mut sq = 0.0;
        for report in usable {
            let diff = self.predict(report, factors)? - report.fuel_mt;
            abs_pct += (diff / report.fuel_mt).abs();
            sq += diff * diff;
        }
        let n = usable.len() as f64;
        Ok(FitErrors {
            mape: 100.0 * abs_pct / n,
            rmse: (sq / n).sqrt(),
        })
    }

    /// Levenberg-Marquardt damped Gauss-Newton over the free factors.
    fn fit(
        &self,
        usable: &[NoonReport],
        start: [f64; 3],
        free: &[usize],
    ) -> Result<([f64; 3], usize, bool)> {
        let mut factors = start;
        let mut residuals = self.residuals(usable, factors)?;
        let mut cost = sum_sq(&residuals);
        let mut damping = 1e-3;

        for iteration in 1..=self.config.max_iterations {
            if cost < f64::EPSILON {
                return Ok((factors, iteration - 1, true));
            }

            let jacobian = self.jacobian(usable, factors, &residuals, free)?;
            let k = free.len();
            let mut jtj = vec![vec![0.0; k]; k];
            let mut jtr = vec![0.0; k];
            for (row, r) in jacobian.iter().zip(&residuals) {
                for a in 0..k {
                    jtr[a] -= row[a] * r;
                    for b in 0..k {
                        jtj[a][b] += row[a] * row[b];
                    }
                }
            }

            // Raise damping until a step lowers the cost or damping saturates.
            let mut accepted = None;
            while damping < 1e10 {
                let mut system = jtj.clone();
                for (a, row) in system.iter_mut().enumerate() {
                    row[a] += damping * jtj[a][a].max(1e-12);
                }
                let Some(step) = solve_linear(system, jtr.clone()) else {
                    damping *= 10.0;
                    continue;
                };

                let mut candidate = factors;
                for (&i, delta) in free.iter().zip(&step) {
                    candidate[i] += delta;
                }
                let candidate = self.clamp(candidate, free);
                let candidate_residuals = self.residuals(usable, candidate)?;
                let candidate_cost = sum_sq(&candidate_residuals);
                if candidate_cost <= cost {
                    accepted = Some((candidate, candidate_residuals, candidate_cost));
                    damping = (damping / 10.0).max(1e-12);
                    break;
                }
                damping *= 10.0;
            }

            let Some((candidate, candidate_residuals, candidate_cost)) = accepted else {
                debug!(iteration, cost, "no improving step; stopping");
                return Ok((factors, iteration, true));
            };

            let largest_step = free
                .iter()
                .map(|&i| (candidate[i] - factors[i]).abs())
                .fold(0.0, f64::max);
            factors = candidate;
            residuals = candidate_residuals;
            cost = candidate_cost;
            debug!(iteration, cost, largest_step, "calibration step");

            if largest_step < self.config.tolerance {
                return Ok((factors, iteration, true));
            }
        }

        Ok((factors, self.config.max_iterations, false))
    }

    fn jacobian(
        &self,
        usable: &[NoonReport],
        factors: [f64; 3],
        residuals: &[f64],
        free: &[usize],
    ) -> Result<Vec<Vec<f64>>> {
        let mut jacobian = vec![vec![0.0; free.len()]; usable.len()];
        for (col, &i) in free.iter().enumerate() {
            let h = 1e-6 * factors[i].abs().max(1.0);
            let mut shifted = factors;
            shifted[i] += h;
            let perturbed = self.residuals(usable, shifted)?;
            for (row, (p, r)) in perturbed.iter().zip(residuals).enumerate() {
                jacobian[row][col] = (p - r) / h;
            }
        }
        Ok(jacobian)
    }
}

struct FitErrors {
    mape: f64,
    rmse: f64,
}

fn sum_sq(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

fn render_report(
    factors: &CalibrationFactors,
    metrics: &QualityMetrics,
    held_fixed: &[String],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Calibration report");
    let _ = writeln!(
        out,
        "  reports used: {} (skipped {})",
        metrics.reports_used, metrics.reports_skipped
    );
    let _ = writeln!(out, "  calm water factor: {:.4}", factors.calm_water);
    let _ = writeln!(out, "  wind factor:       {:.4}", factors.wind);
    let _ = writeln!(out, "  waves factor:      {:.4}", factors.waves);
    let _ = writeln!(
        out,
        "  MAPE: {:.2}% -> {:.2}%",
        metrics.mape_before, metrics.mape_after
    );
    let _ = writeln!(
        out,
        "  RMSE: {:.3} t -> {:.3} t",
        metrics.rmse_before_mt, metrics.rmse_after_mt
    );
    let status = if metrics.converged {
        "converged"
    } else {
        "iteration limit reached"
    };
    let _ = writeln!(out, "  iterations: {} ({status})", metrics.iterations);
    if !held_fixed.is_empty() {
        let _ = writeln!(
            out,
            "  not identifiable (held at initial value): {}",
            held_fixed.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::geo::GeoPosition;

    fn report(speed: f64, heading: f64) -> NoonReport {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let position = GeoPosition::new(40.0, -30.0).unwrap();
        NoonReport::new(date, position, speed, 1.0, true, heading)
    }

    /// Reports whose fuel is exactly what `factors` predict.
    fn synthetic_reports(factors: CalibrationFactors) -> Vec<NoonReport> {
        let model = VesselModel::default().with_calibration(factors).unwrap();
        let base = [
            report(12.0, 90.0).with_wind(8.0, 60.0),
            report(13.0, 90.0).with_waves(2.0, Some(8.0), 100.0),
            report(14.0, 270.0)
                .with_wind(12.0, 250.0)
                .with_waves(3.0, Some(9.0), 240.0),
            report(14.5, 0.0),
            report(15.0, 180.0).with_wind(6.0, 200.0).with_waves(1.5, None, 170.0),
            report(13.5, 45.0).with_wind(15.0, 30.0),
            report(12.5, 300.0).with_waves(4.0, Some(10.0), 320.0),
        ];
        base.into_iter()
            .map(|mut r| {
                let conditions = r.conditions();
                r.fuel_mt = model
                    .fuel_for(r.speed_kts, r.is_laden, Some(&conditions), r.distance_nm)
                    .unwrap()
                    .fuel_mt;
                r
            })
            .collect()
    }

    #[test]
    fn exact_reports_keep_unit_factors() {
        let reports = synthetic_reports(CalibrationFactors::default());
        let outcome = Calibrator::new(VesselModel::default())
            .calibrate(&reports, CalibrationFactors::default())
            .unwrap();
        for value in outcome.factors.as_array() {
            assert!((value - 1.0).abs() < 1e-3, "factor drifted to {value}");
        }
        assert!(outcome.metrics.mape_after < 1e-3);
        assert!(outcome.metrics.converged);
    }

    #[test]
    fn recovers_known_factors() {
        let truth = CalibrationFactors::new(1.15, 0.9, 1.3);
        let reports = synthetic_reports(truth);
        let outcome = Calibrator::new(VesselModel::default())
            .calibrate(&reports, CalibrationFactors::default())
            .unwrap();

        assert!((outcome.factors.calm_water - 1.15).abs() < 0.01);
        assert!((outcome.factors.wind - 0.9).abs() < 0.05);
        assert!((outcome.factors.waves - 1.3).abs() < 0.05);
        assert!(outcome.metrics.mape_after < outcome.metrics.mape_before);
        assert!(outcome.report.contains("MAPE"));
    }

    #[test]
    fn calm_reports_hold_weather_factors() {
        let model = VesselModel::default();
        let reports: Vec<NoonReport> = [12.0, 13.0, 14.0]
            .into_iter()
            .map(|speed| {
                let mut r = report(speed, 90.0);
                r.fuel_mt = model.fuel_for(speed, true, None, r.distance_nm).unwrap().fuel_mt * 0.95;
                r
            })
            .collect();

        let initial = CalibrationFactors::new(1.0, 1.2, 0.8);
        let outcome = Calibrator::new(model).calibrate(&reports, initial).unwrap();
        assert_eq!(outcome.held_fixed, vec!["wind".to_string(), "waves".to_string()]);
        assert_eq!(outcome.factors.wind, 1.2);
        assert_eq!(outcome.factors.waves, 0.8);
        assert!((outcome.factors.calm_water - 0.95).abs() < 1e-3);
    }

    #[test]
    fn too_few_reports_is_insufficient() {
        let reports = vec![report(12.0, 0.0), report(14.0, 0.0)];
        let err = Calibrator::new(VesselModel::default())
            .calibrate(&reports, CalibrationFactors::default())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn identical_speeds_are_insufficient() {
        let reports = vec![report(13.0, 0.0), report(13.0, 90.0), report(13.0, 180.0)];
        let err = Calibrator::new(VesselModel::default())
            .calibrate(&reports, CalibrationFactors::default())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn invalid_reports_are_skipped() {
        let mut reports = synthetic_reports(CalibrationFactors::default());
        let mut broken = report(13.0, 0.0);
        broken.fuel_mt = -1.0;
        reports.push(broken);

        let outcome = Calibrator::new(VesselModel::default())
            .calibrate(&reports, CalibrationFactors::default())
            .unwrap();
        assert_eq!(outcome.metrics.reports_skipped, 1);
        assert_eq!(outcome.metrics.reports_used, reports.len() - 1);
    }

    #[test]
    fn config_rejects_inverted_bounds() {
        let config = CalibrationConfig {
            min_factor: 3.0,
            max_factor: 2.0,
            ..CalibrationConfig::default()
        };
        assert!(Calibrator::new(VesselModel::default()).with_config(config).is_err());
    }
}
