use std::path::Path;

use crate::error::Result;
use crate::utils::command::{run_cmd, CommandRunner};

/// `docker build -t <image_ref> .` with `context_dir` as the build context.
pub fn build_image(runner: &dyn CommandRunner, image_ref: &str, context_dir: &Path) -> Result<()> {
    run_cmd(
        runner,
        "docker",
        &["build", "-t", image_ref, "."],
        Some(context_dir),
    )?;
    Ok(())
}

/// Run `command` through `bash -c` in a throwaway container.
pub fn run_in_container(
    runner: &dyn CommandRunner,
    image_ref: &str,
    command: &str,
    cwd: &Path,
) -> Result<String> {
    run_cmd(
        runner,
        "docker",
        &["run", "--rm", image_ref, "bash", "-c", command],
        Some(cwd),
    )
}
