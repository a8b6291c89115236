//! WINDMAR library entry points.
//!
//! This crate plans fuel-aware ship routes under forecast weather. It exposes the
//! vessel physics model, the weather-constrained A* router, the fuel/time Pareto
//! sweep and the noon-report calibrator. Higher-level consumers (the CLI) should
//! only depend on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod calibration;
pub mod config;
pub mod error;
pub mod geo;
pub mod output;
pub mod pareto;
pub mod routing;
pub mod scenarios;
pub mod vessel;
pub mod weather;

pub use calibration::{
    load_noon_reports, CalibrationConfig, CalibrationOutcome, Calibrator, NoonReport,
    QualityMetrics,
};
pub use config::{load_config, resolve_config, WindmarConfig};
pub use error::{Error, ErrorKind, ErrorReport, Result};
pub use geo::GeoPosition;
pub use output::{FrontSummary, RenderMode, RouteSummary};
pub use pareto::{pareto_filter, ParetoConfig, ParetoOptimizer, ParetoSolution};
pub use routing::{
    CostWeighting, RouteConstraints, RouteMethod, RouteRequest, RouteResult, Router,
};
pub use scenarios::{fuel_scenarios, FuelScenario};
pub use vessel::{
    CalibrationFactors, FuelEstimate, LegConditions, VesselModel, VesselProfile, VesselProfileView,
    VesselSpecs,
};
pub use weather::{GriddedWeather, SyntheticWeather, WeatherSample, WeatherSource};
