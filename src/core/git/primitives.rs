use std::path::Path;

use crate::error::Result;
use crate::utils::command::{run_cmd, CommandRunner};

/// Clone a git repository into `target`, relative to `cwd`.
pub fn clone_repo(runner: &dyn CommandRunner, url: &str, target: &str, cwd: &Path) -> Result<()> {
    run_cmd(runner, "git", &["clone", url, target], Some(cwd))?;
    Ok(())
}

/// Pull latest changes in a git repository.
pub fn pull_repo(runner: &dyn CommandRunner, repo_dir: &Path) -> Result<()> {
    run_cmd(runner, "git", &["pull"], Some(repo_dir))?;
    Ok(())
}

/// Stage every change in the working tree.
pub fn add_all(runner: &dyn CommandRunner, repo_dir: &Path) -> Result<()> {
    run_cmd(runner, "git", &["add", "."], Some(repo_dir))?;
    Ok(())
}

/// Commit staged changes. Fails when there is nothing to commit.
pub fn commit(runner: &dyn CommandRunner, repo_dir: &Path, message: &str) -> Result<String> {
    run_cmd(runner, "git", &["commit", "-m", message], Some(repo_dir))
}

/// Rebase local commits onto `origin/<branch>`.
pub fn pull_rebase(runner: &dyn CommandRunner, repo_dir: &Path, branch: &str) -> Result<()> {
    run_cmd(
        runner,
        "git",
        &["pull", "origin", branch, "--rebase"],
        Some(repo_dir),
    )?;
    Ok(())
}

pub fn push(runner: &dyn CommandRunner, repo_dir: &Path, branch: &str) -> Result<()> {
    run_cmd(runner, "git", &["push", "origin", branch], Some(repo_dir))?;
    Ok(())
}

/// Create a commit that reverts HEAD, without opening an editor.
pub fn revert_head(runner: &dyn CommandRunner, repo_dir: &Path) -> Result<()> {
    run_cmd(runner, "git", &["revert", "--no-edit", "HEAD"], Some(repo_dir))?;
    Ok(())
}
