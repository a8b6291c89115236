//! Scenarios command handler: the standard comparison set for the active vessel.

use anyhow::{Context, Result};

use windmar_lib::fuel_scenarios;

use super::CommandContext;
use crate::output::render_scenarios;

/// Handle the scenarios subcommand.
pub fn handle_scenarios(ctx: &CommandContext) -> Result<()> {
    let scenarios = fuel_scenarios(&ctx.model()?).context("failed to evaluate scenarios")?;
    ctx.emit(&scenarios, |scenarios| render_scenarios(scenarios))
}
