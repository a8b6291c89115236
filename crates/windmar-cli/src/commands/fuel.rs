//! Fuel command handler: one leg under given conditions.

use anyhow::{Context, Result};
use clap::Args;

use windmar_lib::{LegConditions, WeatherSample};

use super::CommandContext;
use crate::output::render_fuel;

/// Arguments for the fuel command.
#[derive(Debug, Clone, Args)]
pub struct FuelArgs {
    /// Speed through the water (knots).
    #[arg(long)]
    pub speed: f64,
    /// Ballast instead of laden.
    #[arg(long)]
    pub ballast: bool,
    /// Leg distance (nautical miles).
    #[arg(long, default_value_t = 348.0)]
    pub distance: f64,
    /// Course steered, degrees true.
    #[arg(long, default_value_t = 0.0)]
    pub heading: f64,
    /// True wind speed (m/s).
    #[arg(long, default_value_t = 0.0)]
    pub wind_speed: f64,
    /// Direction the wind blows from, degrees true.
    #[arg(long, default_value_t = 0.0)]
    pub wind_dir: f64,
    /// Significant wave height (m).
    #[arg(long, default_value_t = 0.0)]
    pub wave_height: f64,
    /// Peak wave period (s).
    #[arg(long)]
    pub wave_period: Option<f64>,
    /// Direction the waves come from, degrees true.
    #[arg(long, default_value_t = 0.0)]
    pub wave_dir: f64,
}

impl FuelArgs {
    /// Leg conditions, or `None` for calm water.
    pub fn conditions(&self) -> Option<LegConditions> {
        if self.wind_speed == 0.0 && self.wave_height == 0.0 {
            return None;
        }
        let weather = WeatherSample::calm()
            .with_wind(self.wind_speed, self.wind_dir)
            .with_waves(self.wave_height, self.wave_period, self.wave_dir);
        Some(LegConditions::new(self.heading, weather))
    }
}

/// Handle the fuel subcommand.
pub fn handle_fuel(ctx: &CommandContext, args: &FuelArgs) -> Result<()> {
    let model = ctx.model()?;
    let estimate = model
        .fuel_for(
            args.speed,
            !args.ballast,
            args.conditions().as_ref(),
            args.distance,
        )
        .context("fuel estimate failed")?;
    ctx.emit(&estimate, render_fuel)
}
