//! Process-wide vessel profile.
//!
//! Readers take a snapshot ([`Arc`]) and keep using it for the whole request, so a
//! concurrent update never changes a calculation half-way through. Writers build a
//! new profile and swap it in.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

use super::consumption::ConsumptionModel;
use super::model::VesselModel;
use super::specs::{CalibrationFactors, HullCondition, VesselSpecs};

/// Specs, calibration and consumption curve for the active vessel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselProfile {
    pub specs: VesselSpecs,
    pub factors: CalibrationFactors,
    pub consumption: ConsumptionModel,
}

impl VesselProfile {
    pub fn validate(&self) -> Result<()> {
        self.specs.validate()?;
        self.factors.validate()?;
        self.consumption.build()?;
        Ok(())
    }

    /// Fuel model built from this profile.
    pub fn model(&self) -> Result<VesselModel> {
        Ok(VesselModel::new(self.specs)?
            .with_calibration(self.factors)?
            .with_curve(self.consumption.build()?))
    }

    /// Profile plus derived hull geometry, for display.
    pub fn view(&self) -> Result<VesselProfileView> {
        let curve = self.consumption.build()?;
        Ok(VesselProfileView {
            specs: self.specs,
            factors: self.factors,
            consumption: self.consumption,
            consumption_curve: curve.name().to_string(),
            laden: self.specs.hull(true),
            ballast: self.specs.hull(false),
        })
    }
}

/// Serialisable snapshot of a profile with its derived hull quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselProfileView {
    pub specs: VesselSpecs,
    pub factors: CalibrationFactors,
    pub consumption: ConsumptionModel,
    pub consumption_curve: String,
    pub laden: HullCondition,
    pub ballast: HullCondition,
}

/// Copy-on-write holder for a [`VesselProfile`].
#[derive(Debug, Default)]
pub struct ProfileStore {
    current: RwLock<Arc<VesselProfile>>,
}

impl ProfileStore {
    pub fn new(profile: VesselProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(profile)),
        })
    }

    pub fn snapshot(&self) -> Arc<VesselProfile> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Validate and install `profile`, returning the new snapshot.
    pub fn replace(&self, profile: VesselProfile) -> Result<Arc<VesselProfile>> {
        profile.validate()?;
        let next = Arc::new(profile);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&next);
        Ok(next)
    }

    pub fn update_specs(&self, specs: VesselSpecs) -> Result<Arc<VesselProfile>> {
        self.update(|profile| profile.specs = specs)
    }

    pub fn update_calibration(&self, factors: CalibrationFactors) -> Result<Arc<VesselProfile>> {
        self.update(|profile| profile.factors = factors)
    }

    fn update(&self, change: impl FnOnce(&mut VesselProfile)) -> Result<Arc<VesselProfile>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = **guard;
        change(&mut next);
        next.validate()?;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}

static GLOBAL_PROFILE: Lazy<ProfileStore> = Lazy::new(ProfileStore::default);

/// Snapshot of the process-wide profile.
pub fn current_profile() -> Arc<VesselProfile> {
    GLOBAL_PROFILE.snapshot()
}

/// Replace the process-wide profile.
pub fn set_profile(profile: VesselProfile) -> Result<Arc<VesselProfile>> {
    let next = GLOBAL_PROFILE.replace(profile)?;
    info!(dwt = next.specs.dwt, "vessel profile replaced");
    Ok(next)
}

/// Replace the process-wide specs, keeping calibration.
pub fn set_specs(specs: VesselSpecs) -> Result<Arc<VesselProfile>> {
    let next = GLOBAL_PROFILE.update_specs(specs)?;
    info!(dwt = next.specs.dwt, loa = next.specs.loa, "vessel specs updated");
    Ok(next)
}

/// Replace the process-wide calibration factors, keeping specs.
pub fn set_calibration(factors: CalibrationFactors) -> Result<Arc<VesselProfile>> {
    let next = GLOBAL_PROFILE.update_calibration(factors)?;
    info!(
        calm_water = factors.calm_water,
        wind = factors.wind,
        waves = factors.waves,
        "calibration factors updated"
    );
    Ok(next)
}
