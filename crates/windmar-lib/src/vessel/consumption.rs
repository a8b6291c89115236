//! Brake power to fuel burn rate.
//!
//! Every curve must be non-decreasing in power. The router's heuristic relies on it:
//! a lower bound on resistance has to map to a lower bound on fuel.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::specs::VesselSpecs;

/// Maps required brake power to a fuel burn rate.
pub trait ConsumptionCurve: Send + Sync + fmt::Debug {
    /// Fuel burn in tonnes per hour at `power_kw`.
    fn burn_rate_t_per_h(&self, power_kw: f64, specs: &VesselSpecs) -> f64;

    /// Short identifier for reports.
    fn name(&self) -> &'static str;
}

/// Constant SFOC equal to the value at MCR. Burn rate is proportional to power.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearLoadCurve;

impl ConsumptionCurve for LinearLoadCurve {
    fn burn_rate_t_per_h(&self, power_kw: f64, specs: &VesselSpecs) -> f64 {
        // g/kWh * kW = g/h
        specs.sfoc_at_mcr * power_kw.max(0.0) / 1.0e6
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// SFOC with a parabolic penalty away from an optimum engine load.
///
/// `sfoc(load) = sfoc_at_mcr * (1 + curvature * (load - optimum_load)^2)`.
/// Burn rate stays monotone as long as `curvature < 3 / optimum_load^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticSfocCurve {
    pub optimum_load: f64,
    pub curvature: f64,
}

impl Default for QuadraticSfocCurve {
    fn default() -> Self {
        Self {
            optimum_load: 0.8,
            curvature: 0.35,
        }
    }
}

impl QuadraticSfocCurve {
    pub fn new(optimum_load: f64, curvature: f64) -> Result<Self> {
        if !optimum_load.is_finite() || optimum_load <= 0.0 || optimum_load > 1.2 {
            return Err(Error::invalid(format!(
                "optimum_load must be in (0, 1.2], got {optimum_load}"
            )));
        }
        let limit = 3.0 / (optimum_load * optimum_load);
        if !curvature.is_finite() || curvature < 0.0 || curvature >= limit {
            return Err(Error::invalid(format!(
                "curvature must be in [0, {limit:.3}) for a monotone burn rate, got {curvature}"
            )));
        }
        Ok(Self {
            optimum_load,
            curvature,
        })
    }

    pub fn sfoc(&self, load: f64) -> f64 {
        let offset = load - self.optimum_load;
        1.0 + self.curvature * offset * offset
    }
}

impl ConsumptionCurve for QuadraticSfocCurve {
    fn burn_rate_t_per_h(&self, power_kw: f64, specs: &VesselSpecs) -> f64 {
        let power = power_kw.max(0.0);
        let load = power / specs.mcr_kw;
        specs.sfoc_at_mcr * self.sfoc(load) * power / 1.0e6
    }

    fn name(&self) -> &'static str {
        "quadratic_sfoc"
    }
}

/// Serialisable choice of consumption curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsumptionModel {
    #[default]
    Linear,
    QuadraticSfoc {
        #[serde(default = "default_optimum_load")]
        optimum_load: f64,
        #[serde(default = "default_curvature")]
        curvature: f64,
    },
}

fn default_optimum_load() -> f64 {
    QuadraticSfocCurve::default().optimum_load
}

fn default_curvature() -> f64 {
    QuadraticSfocCurve::default().curvature
}

impl ConsumptionModel {
    pub fn build(&self) -> Result<Arc<dyn ConsumptionCurve>> {
        Ok(match *self {
            ConsumptionModel::Linear => Arc::new(LinearLoadCurve),
            ConsumptionModel::QuadraticSfoc {
                optimum_load,
                curvature,
            } => Arc::new(QuadraticSfocCurve::new(optimum_load, curvature)?),
        })
    }
}
