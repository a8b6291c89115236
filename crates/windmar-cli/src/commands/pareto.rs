//! Pareto command handler for the fuel/time trade-off sweep.

use anyhow::{Context, Result};
use clap::Args;

use windmar_lib::{FrontSummary, ParetoConfig, ParetoOptimizer, RenderMode};

use super::route::RouteArgs;
use super::CommandContext;

/// Arguments for the pareto command.
#[derive(Debug, Clone, Args)]
pub struct ParetoArgs {
    #[command(flatten)]
    pub route: RouteArgs,
    /// Number of evenly spaced lambda values in [0, 1].
    #[arg(long)]
    pub points: Option<usize>,
    /// Explicit lambda value; repeat for several. Overrides --points.
    #[arg(long = "lambda")]
    pub lambdas: Vec<f64>,
    /// Tonnes of fuel one hour is worth at lambda = 1.
    #[arg(long)]
    pub time_weight: Option<f64>,
    /// Worker threads for the sweep (0 = all cores).
    #[arg(long)]
    pub workers: Option<usize>,
}

impl ParetoArgs {
    /// Configured sweep settings with command-line overrides applied.
    pub fn config(&self, base: &ParetoConfig) -> ParetoConfig {
        let mut config = base.clone();
        if let Some(points) = self.points {
            config.points = points;
            config.lambda_values = None;
        }
        if !self.lambdas.is_empty() {
            config.lambda_values = Some(self.lambdas.clone());
        }
        if let Some(time_weight) = self.time_weight {
            config.time_weight = time_weight;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
    }
}

/// Handle the pareto subcommand.
pub fn handle_pareto(ctx: &CommandContext, args: &ParetoArgs) -> Result<()> {
    let request = args.route.to_request()?;
    let optimizer = ParetoOptimizer::new(
        ctx.model()?,
        args.route.weather()?,
        args.route.constraints(&ctx.config.constraints),
        args.config(&ctx.config.pareto),
    )?;
    let front = optimizer.run(&request).context("pareto sweep failed")?;
    ctx.emit(&front, |front| {
        FrontSummary::from_solutions(front).render(RenderMode::PlainText)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::route::WeatherChoice;

    fn args() -> ParetoArgs {
        ParetoArgs {
            route: RouteArgs {
                from: "0,0".to_string(),
                to: "1,1".to_string(),
                departure: None,
                ballast: false,
                speed: None,
                weather: WeatherChoice::None,
                weather_file: None,
                resolution: None,
                max_wind: None,
                max_wave: None,
                require_weather: false,
            },
            points: None,
            lambdas: Vec::new(),
            time_weight: None,
            workers: None,
        }
    }

    #[test]
    fn explicit_lambdas_win_over_points() {
        let mut cli = args();
        cli.points = Some(9);
        cli.lambdas = vec![0.0, 1.0];
        let config = cli.config(&ParetoConfig::default());
        assert_eq!(config.lambdas(), vec![0.0, 1.0]);
    }

    #[test]
    fn defaults_come_from_configuration() {
        let config = args().config(&ParetoConfig::default());
        assert_eq!(config, ParetoConfig::default());
    }
}
