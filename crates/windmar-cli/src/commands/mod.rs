// Module exports for CLI subcommands
//
// Each module handles one subcommand. main.rs parses arguments, loads the
// configuration once, and dispatches to these handlers.

pub mod calibrate;
pub mod fuel;
pub mod pareto;
pub mod route;
pub mod scenarios;
pub mod vessel;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use windmar_lib::vessel::{current_profile, set_profile};
use windmar_lib::{resolve_config, VesselModel, WindmarConfig};

use crate::output::{print_json, OutputFormat};

/// State shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: WindmarConfig,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load configuration from `--config` / `WINDMAR_CONFIG` and install its vessel
    /// profile as the process-wide profile.
    pub fn load(config_path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = resolve_config(config_path).context("failed to load configuration")?;
        set_profile(config.vessel).context("configured vessel profile is invalid")?;
        Ok(Self { config, format })
    }

    /// Fuel model for the active vessel profile.
    pub fn model(&self) -> Result<VesselModel> {
        current_profile()
            .model()
            .context("failed to build vessel model")
    }

    /// Print `value` as JSON or through `render` as text.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Json => print_json(value).context("failed to write JSON output"),
            OutputFormat::Text => {
                print!("{}", render(value));
                Ok(())
            }
        }
    }
}
