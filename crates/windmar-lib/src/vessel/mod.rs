//! Vessel particulars, resistance and fuel consumption.
//!
//! This module is organized into focused submodules:
//!
//! - [`specs`] - Principal particulars, derived hull geometry and calibration factors
//! - [`model`] - Resistance, power and fuel for a leg
//! - [`consumption`] - Brake power to burn rate curves
//! - [`state`] - Process-wide copy-on-write vessel profile
//! - [`constants`] - Physical constants and empirical coefficients
//!
//! # Example
//!
//! ```
//! use windmar_lib::vessel::{LegConditions, VesselModel, VesselSpecs};
//! use windmar_lib::weather::WeatherSample;
//!
//! let model = VesselModel::new(VesselSpecs::default()).unwrap();
//! let head_wind = LegConditions::new(0.0, WeatherSample::calm().with_wind(10.0, 0.0));
//! let calm = model.fuel_for(14.5, true, None, 348.0).unwrap();
//! let windy = model.fuel_for(14.5, true, Some(&head_wind), 348.0).unwrap();
//! assert!(windy.fuel_mt > calm.fuel_mt);
//! ```

pub mod constants;
pub mod consumption;
pub mod model;
pub mod specs;
pub mod state;

pub use consumption::{ConsumptionCurve, ConsumptionModel, LinearLoadCurve, QuadraticSfocCurve};
pub use model::{FuelBreakdown, FuelEstimate, LegConditions, ResistanceBreakdown, VesselModel};
pub use specs::{CalibrationFactors, HullCondition, VesselSpecs};
pub use state::{
    current_profile, set_calibration, set_profile, set_specs, ProfileStore, VesselProfile,
    VesselProfileView,
};
