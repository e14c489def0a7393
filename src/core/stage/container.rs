//! Docker-backed build and test.

use crate::docker;
use crate::error::{Error, Result};

use super::{Stage, StageContext, StageOutcome};

pub(super) fn build(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Build.banner());
    let image_ref = ctx.config.image_ref()?;

    docker::build_image(ctx.runner, &image_ref, &ctx.base_dir)?;

    let message = format!("Build successful: {}", image_ref);
    ctx.console.success(&message);
    tracing::info!("{}", message);
    Ok(StageOutcome::completed(&Stage::Build, message))
}

pub(super) fn test(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Test.banner());
    let image_ref = ctx.config.image_ref()?;
    let command = ctx.config.container_test_command();
    if command.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "stages.test.command",
            Some(command.to_string()),
            "command is empty",
        ));
    }
    tracing::info!("Running tests in {} with: {}", image_ref, command);

    docker::run_in_container(ctx.runner, &image_ref, command, &ctx.base_dir)?;

    ctx.console.success("Tests passed successfully!");
    tracing::info!("Tests passed successfully.");
    Ok(StageOutcome::completed(
        &Stage::Test,
        "Tests passed successfully!",
    ))
}

/// Deploy and rollback have no container implementation.
pub(super) fn unsupported(ctx: &StageContext<'_>, stage: &Stage) -> StageOutcome {
    let message = format!("Stage '{}' not implemented yet in docker mode.", stage);
    ctx.console.warn(&message);
    tracing::warn!("{}", message);
    StageOutcome::skipped(stage, message)
}
