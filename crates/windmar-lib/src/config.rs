//! JSON configuration: vessel profile, route constraints, sweep and calibration
//! settings.
//!
//! Every section has defaults, so a file only needs the values it changes:
//!
//! ```json
//! {
//!   "vessel": { "specs": { "dwt": 52000.0 } },
//!   "constraints": { "grid_resolution_deg": 1.0 }
//! }
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calibration::CalibrationConfig;
use crate::error::{Error, Result};
use crate::pareto::ParetoConfig;
use crate::routing::RouteConstraints;
use crate::vessel::VesselProfile;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "WINDMAR_CONFIG";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindmarConfig {
    pub vessel: VesselProfile,
    pub constraints: RouteConstraints,
    pub pareto: ParetoConfig,
    pub calibration: CalibrationConfig,
}

impl WindmarConfig {
    pub fn validate(&self) -> Result<()> {
        self.vessel.validate()?;
        self.constraints.validate()?;
        self.pareto.validate()?;
        self.calibration.validate()?;
        Ok(())
    }
}

/// Parse and validate a configuration file.
///
/// # Errors
/// [`Error::Io`] when the file cannot be read, [`Error::Json`] when it is not valid
/// JSON for the schema, and [`Error::InvalidConfig`] when a value fails validation.
pub fn load_config(path: &Path) -> Result<WindmarConfig> {
    let raw = fs::read_to_string(path)?;
    let config: WindmarConfig = serde_json::from_str(&raw)?;
    config.validate().map_err(|err| Error::InvalidConfig {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Resolve the configuration file: explicit path first, then [`CONFIG_ENV_VAR`].
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)
}

/// Load the resolved configuration, or the defaults when no file is named.
pub fn resolve_config(explicit: Option<&Path>) -> Result<WindmarConfig> {
    match config_path(explicit) {
        Some(path) => load_config(&path),
        None => {
            debug!("no configuration file; using defaults");
            Ok(WindmarConfig::default())
        }
    }
}
