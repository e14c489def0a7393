use super::{Stage, StageContext, StageOutcome};

pub(super) const BUILD: &str = "Simulated build completed successfully.";
pub(super) const TEST: &str = "Simulated tests passed.";
pub(super) const DEPLOY: &str = "Simulated deploy completed.";
pub(super) const ROLLBACK: &str = "Simulated rollback completed.";
pub(super) const EXAMPLE: &str = "Example stage ran successfully.";

/// Print a fixed message. Never touches the filesystem or spawns processes.
pub(super) fn run(ctx: &StageContext<'_>, stage: &Stage, message: &str) -> StageOutcome {
    ctx.console.info(stage.banner());
    ctx.console.success(message);
    tracing::info!("{}", message);
    StageOutcome::completed(stage, message)
}
