//! Vessel particulars and calibration multipliers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::constants::{
    BALLAST_FRACTION, DEPTH_TO_LENGTH, LIGHTSHIP_FRACTION, SEAWATER_DENSITY,
    SUPERSTRUCTURE_HEIGHT_M,
};

/// Principal particulars of the vessel.
///
/// Defaults describe a 49 000 dwt MR product tanker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselSpecs {
    /// Deadweight (t).
    pub dwt: f64,
    /// Length overall (m).
    pub loa: f64,
    /// Beam (m).
    pub beam: f64,
    /// Draft when laden (m).
    pub draft_laden: f64,
    /// Draft in ballast (m).
    pub draft_ballast: f64,
    /// Maximum continuous rating (kW).
    pub mcr_kw: f64,
    /// Specific fuel oil consumption at MCR (g/kWh).
    pub sfoc_at_mcr: f64,
    /// Service speed laden (kn).
    pub service_speed_laden: f64,
    /// Service speed in ballast (kn).
    pub service_speed_ballast: f64,
}

impl Default for VesselSpecs {
    fn default() -> Self {
        Self {
            dwt: 49_000.0,
            loa: 183.0,
            beam: 32.0,
            draft_laden: 11.8,
            draft_ballast: 6.5,
            mcr_kw: 8_840.0,
            sfoc_at_mcr: 171.0,
            service_speed_laden: 14.5,
            service_speed_ballast: 15.0,
        }
    }
}

impl VesselSpecs {
    /// Validate specs for correctness.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (self.dwt, "dwt"),
            (self.loa, "loa"),
            (self.beam, "beam"),
            (self.draft_laden, "draft_laden"),
            (self.draft_ballast, "draft_ballast"),
            (self.mcr_kw, "mcr_kw"),
            (self.sfoc_at_mcr, "sfoc_at_mcr"),
            (self.service_speed_laden, "service_speed_laden"),
            (self.service_speed_ballast, "service_speed_ballast"),
        ];

        for (value, field) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid(format!(
                    "{field} must be a finite positive number"
                )));
            }
        }

        if self.draft_ballast > self.draft_laden {
            return Err(Error::invalid(
                "draft_ballast must not exceed draft_laden",
            ));
        }

        Ok(())
    }

    /// Service speed for the loading condition.
    pub fn service_speed(&self, is_laden: bool) -> f64 {
        if is_laden {
            self.service_speed_laden
        } else {
            self.service_speed_ballast
        }
    }

    /// Derived hull geometry for the loading condition.
    pub fn hull(&self, is_laden: bool) -> HullCondition {
        let draft = if is_laden {
            self.draft_laden
        } else {
            self.draft_ballast
        };
        let load_fraction = if is_laden { 1.0 } else { BALLAST_FRACTION };
        let displacement_t = self.dwt * (LIGHTSHIP_FRACTION + load_fraction);
        let volume_m3 = displacement_t * 1000.0 / SEAWATER_DENSITY;
        let block_coefficient = (volume_m3 / (self.loa * self.beam * draft)).clamp(0.45, 0.95);
        // Mumford's approximation.
        let wetted_surface_m2 = 1.7 * self.loa * draft + volume_m3 / draft;
        let depth = (self.loa * DEPTH_TO_LENGTH).max(self.draft_laden + 2.0);
        let windage_area_m2 = self.beam * (depth - draft + SUPERSTRUCTURE_HEIGHT_M);

        HullCondition {
            draft_m: draft,
            displacement_t,
            block_coefficient,
            wetted_surface_m2,
            windage_area_m2,
        }
    }
}

/// Hull quantities that depend on the loading condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HullCondition {
    pub draft_m: f64,
    pub displacement_t: f64,
    pub block_coefficient: f64,
    pub wetted_surface_m2: f64,
    /// Transverse projected area above the waterline (m²).
    pub windage_area_m2: f64,
}

/// Multipliers applied to each resistance term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationFactors {
    pub calm_water: f64,
    pub wind: f64,
    pub waves: f64,
}

impl Default for CalibrationFactors {
    fn default() -> Self {
        Self {
            calm_water: 1.0,
            wind: 1.0,
            waves: 1.0,
        }
    }
}

impl CalibrationFactors {
    pub fn new(calm_water: f64, wind: f64, waves: f64) -> Self {
        Self {
            calm_water,
            wind,
            waves,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (value, field) in self.as_array().into_iter().zip(Self::NAMES) {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid(format!(
                    "calibration factor {field} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub(crate) const NAMES: [&'static str; 3] = ["calm_water", "wind", "waves"];

    pub(crate) fn as_array(&self) -> [f64; 3] {
        [self.calm_water, self.wind, self.waves]
    }

    pub(crate) fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}
