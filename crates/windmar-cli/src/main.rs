use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use windmar_cli::commands::calibrate::{handle_calibrate, CalibrateArgs};
use windmar_cli::commands::fuel::{handle_fuel, FuelArgs};
use windmar_cli::commands::pareto::{handle_pareto, ParetoArgs};
use windmar_cli::commands::route::{handle_route, RouteArgs};
use windmar_cli::commands::scenarios::handle_scenarios;
use windmar_cli::commands::vessel::handle_vessel;
use windmar_cli::commands::CommandContext;
use windmar_cli::output::{ErrorOutput, OutputFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather routing and fuel optimisation for merchant ships")]
struct Cli {
    /// Configuration file (JSON). Falls back to $WINDMAR_CONFIG, then defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a weather-aware route between two positions.
    Route(RouteArgs),
    /// Sweep the fuel/time trade-off and print the Pareto front.
    Pareto(ParetoArgs),
    /// Estimate fuel for one leg under given conditions.
    Fuel(FuelArgs),
    /// Compare fuel across the standard weather scenarios.
    Scenarios,
    /// Show the active vessel profile.
    Vessel,
    /// Fit calibration factors to noon reports.
    Calibrate(CalibrateArgs),
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let format = cli.format;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorOutput::from_error(&err).render(format));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = CommandContext::load(cli.config.as_deref(), cli.format)?;

    match &cli.command {
        Command::Route(args) => handle_route(&ctx, args),
        Command::Pareto(args) => handle_pareto(&ctx, args),
        Command::Fuel(args) => handle_fuel(&ctx, args),
        Command::Scenarios => handle_scenarios(&ctx),
        Command::Vessel => handle_vessel(&ctx),
        Command::Calibrate(args) => handle_calibrate(&ctx, args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
