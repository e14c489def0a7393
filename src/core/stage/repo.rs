//! Git-backed stage handlers operating on the cloned repository.

use crate::error::{Error, Result};
use crate::git;
use crate::utils::command::run_cmd;
use crate::utils::shell;

use super::{display_relative, Stage, StageContext, StageOutcome};

pub(super) fn clone(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Clone.banner());

    let url = ctx.config.repo_url().ok_or_else(|| {
        Error::config_missing_key("repo.url", Some(ctx.config_path.display().to_string()))
            .with_hint("Add the repository to clone under 'repo.url' in pipeline.yml")
    })?;
    let target = ctx.config.repo_target();
    let target_dir = ctx.target_dir();

    if target_dir.exists() {
        ctx.console.info(format!(
            "Repository already exists at {}. Pulling latest changes...",
            display_relative(&target_dir, &ctx.base_dir)
        ));
        git::pull_repo(ctx.runner, &target_dir)?;
    } else {
        ctx.console
            .info(format!("Cloning repository from {} into {}...", url, target));
        git::clone_repo(ctx.runner, url, target, &ctx.base_dir)?;
    }

    ctx.console.success("Repository ready.");
    tracing::info!("Clone stage finished for {}", url);
    Ok(StageOutcome::completed(&Stage::Clone, "Repository ready."))
}

pub(super) fn build(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Build.banner());
    let repo_dir = ctx.require_target(&Stage::Build)?;

    git::add_all(ctx.runner, &repo_dir)?;
    let message = format!(
        "Build commit at {}",
        ctx.started.format("%Y-%m-%dT%H:%M:%S%.6f")
    );
    git::commit(ctx.runner, &repo_dir, &message)?;

    ctx.console.success("Build (commit) completed successfully.");
    Ok(StageOutcome::completed(&Stage::Build, message))
}

pub(super) fn test(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Test.banner());
    let repo_dir = ctx.require_target(&Stage::Test)?;

    let command = ctx.config.test_command();
    ctx.console.info(format!("Running tests using: {}", command));
    tracing::info!("Running tests with: {}", command);

    let argv = shell::split_command("test.command", command)?;
    let (program, rest) = argv
        .split_first()
        .ok_or_else(|| Error::config_invalid_value("test.command", None, "command is empty"))?;
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    run_cmd(ctx.runner, program, &args, Some(&repo_dir))?;

    ctx.console.success("All tests passed.");
    Ok(StageOutcome::completed(&Stage::Test, "All tests passed."))
}

pub(super) fn deploy(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.info(Stage::Deploy.banner());
    let repo_dir = ctx.require_target(&Stage::Deploy)?;
    let branch = ctx.config.deploy_branch();

    git::pull_rebase(ctx.runner, &repo_dir, branch)?;
    git::push(ctx.runner, &repo_dir, branch)?;

    let message = format!("Code deployed to branch '{}'.", branch);
    ctx.console.success(&message);
    Ok(StageOutcome::completed(&Stage::Deploy, message))
}

pub(super) fn rollback(ctx: &StageContext<'_>) -> Result<StageOutcome> {
    ctx.console.warn(Stage::Rollback.banner());
    let repo_dir = ctx.require_target(&Stage::Rollback)?;
    let branch = ctx.config.deploy_branch();

    git::revert_head(ctx.runner, &repo_dir)?;
    git::push(ctx.runner, &repo_dir, branch)?;

    ctx.console.success("Rollback completed and pushed.");
    Ok(StageOutcome::completed(
        &Stage::Rollback,
        format!("Reverted HEAD and pushed to '{}'.", branch),
    ))
}
