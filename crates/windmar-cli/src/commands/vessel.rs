//! Vessel command handler: show the active profile.

use anyhow::{Context, Result};

use windmar_lib::vessel::current_profile;

use super::CommandContext;
use crate::output::render_profile;

/// Handle the vessel subcommand.
pub fn handle_vessel(ctx: &CommandContext) -> Result<()> {
    let view = current_profile()
        .view()
        .context("failed to describe vessel profile")?;
    ctx.emit(&view, render_profile)
}
