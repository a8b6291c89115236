//! Physical constants and empirical coefficients used by the vessel model.

/// Knots to metres per second.
pub const KNOTS_TO_MS: f64 = 0.514_444;

/// Sea water density (kg/m³).
pub const SEAWATER_DENSITY: f64 = 1025.0;

/// Air density at sea level (kg/m³).
pub const AIR_DENSITY: f64 = 1.225;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Kinematic viscosity of sea water at 15 °C (m²/s).
pub const KINEMATIC_VISCOSITY: f64 = 1.19e-6;

/// Lightship weight as a fraction of deadweight.
pub const LIGHTSHIP_FRACTION: f64 = 0.22;

/// Ballast water, bunkers and stores carried in ballast, as a fraction of deadweight.
pub const BALLAST_FRACTION: f64 = 0.33;

/// Hull form factor `k` applied to the ITTC-57 friction line.
pub const FORM_FACTOR: f64 = 0.2;

/// Residuary resistance coefficient at the reference Froude number.
pub const RESIDUARY_COEFFICIENT: f64 = 5.0e-4;

/// Froude number at which [`RESIDUARY_COEFFICIENT`] applies.
pub const REFERENCE_FROUDE: f64 = 0.18;

/// Power-law exponent of residuary resistance in Froude number.
pub const RESIDUARY_EXPONENT: f64 = 4.0;

/// Longitudinal wind drag coefficient for a tanker superstructure.
pub const WIND_DRAG_COEFFICIENT: f64 = 0.8;

/// Height of accommodation and funnel above the main deck (m).
pub const SUPERSTRUCTURE_HEIGHT_M: f64 = 15.0;

/// Moulded depth as a fraction of length.
pub const DEPTH_TO_LENGTH: f64 = 0.1;

/// Leading coefficient of the Kreitner added-resistance-in-waves formula.
pub const WAVE_RESISTANCE_COEFFICIENT: f64 = 0.64;

/// Overall propulsive efficiency (effective power / brake power).
pub const PROPULSIVE_EFFICIENCY: f64 = 0.65;

/// Largest share of calm-water resistance a following wind may cancel.
pub const MAX_WIND_ASSIST: f64 = 0.3;

/// Largest along-track current, as a fraction of speed through water.
pub const MAX_CURRENT_FRACTION: f64 = 0.25;
