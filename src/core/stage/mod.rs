//! Stage kinds and dispatch.
//!
//! A stage name from the command line resolves to exactly one [`Stage`]
//! variant. Names outside the known set become [`Stage::Unknown`] and are
//! reported as skipped rather than failing the run.

mod container;
mod repo;
mod simulated;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::{Mode, PipelineConfig};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::logs::RunLog;
use crate::utils::command::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Clone,
    Build,
    Test,
    Deploy,
    Rollback,
    Example,
    Unknown(String),
}

impl Stage {
    pub const NAMES: [&'static str; 6] = ["clone", "build", "test", "deploy", "rollback", "example"];

    pub fn parse(name: &str) -> Self {
        match name {
            "clone" => Stage::Clone,
            "build" => Stage::Build,
            "test" => Stage::Test,
            "deploy" => Stage::Deploy,
            "rollback" => Stage::Rollback,
            "example" => Stage::Example,
            other => Stage::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Stage::Clone => "clone",
            Stage::Build => "build",
            Stage::Test => "test",
            Stage::Deploy => "deploy",
            Stage::Rollback => "rollback",
            Stage::Example => "example",
            Stage::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Stage::Unknown(_))
    }

    /// Execute this stage. External command failures abort immediately.
    pub fn run(&self, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        let outcome = match (self, ctx.mode) {
            (Stage::Unknown(name), _) => return Ok(skip_unknown(ctx, name)),
            (Stage::Clone, _) => repo::clone(ctx)?,
            (Stage::Example, _) => simulated::run(ctx, self, simulated::EXAMPLE),
            (Stage::Build, Mode::Simulate) => simulated::run(ctx, self, simulated::BUILD),
            (Stage::Test, Mode::Simulate) => simulated::run(ctx, self, simulated::TEST),
            (Stage::Deploy, Mode::Simulate) => simulated::run(ctx, self, simulated::DEPLOY),
            (Stage::Rollback, Mode::Simulate) => simulated::run(ctx, self, simulated::ROLLBACK),
            (Stage::Build, Mode::Git) => repo::build(ctx)?,
            (Stage::Test, Mode::Git) => repo::test(ctx)?,
            (Stage::Deploy, Mode::Git) => repo::deploy(ctx)?,
            (Stage::Rollback, Mode::Git) => repo::rollback(ctx)?,
            (Stage::Build, Mode::Docker) => container::build(ctx)?,
            (Stage::Test, Mode::Docker) => container::test(ctx)?,
            (Stage::Deploy | Stage::Rollback, Mode::Docker) => container::unsupported(ctx, self),
        };

        if let StageOutcome::Completed { .. } = &outcome {
            tracing::info!(
                "{} stage finished successfully (log: {})",
                self.name(),
                ctx.log.path().display()
            );
        }
        Ok(outcome)
    }

    fn banner(&self) -> String {
        format!("=== Starting {} stage ===", self.name().to_uppercase())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Completed { stage: String, message: String },
    Skipped { stage: String, reason: String },
}

impl StageOutcome {
    fn completed(stage: &Stage, message: impl Into<String>) -> Self {
        StageOutcome::Completed {
            stage: stage.name().to_string(),
            message: message.into(),
        }
    }

    fn skipped(stage: &Stage, reason: impl Into<String>) -> Self {
        StageOutcome::Skipped {
            stage: stage.name().to_string(),
            reason: reason.into(),
        }
    }

    pub fn stage(&self) -> &str {
        match self {
            StageOutcome::Completed { stage, .. } | StageOutcome::Skipped { stage, .. } => stage,
        }
    }
}

/// Everything a stage handler may touch.
pub struct StageContext<'a> {
    /// Directory holding the config, the `logs/` directory and the target repo.
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: PipelineConfig,
    pub mode: Mode,
    pub started: DateTime<Local>,
    pub runner: &'a dyn CommandRunner,
    pub console: Console,
    pub log: &'a RunLog,
}

impl StageContext<'_> {
    pub fn target_dir(&self) -> PathBuf {
        self.base_dir.join(self.config.repo_target())
    }

    /// The cloned repository, or a precondition error if it is missing.
    fn require_target(&self, stage: &Stage) -> Result<PathBuf> {
        let dir = self.target_dir();
        if dir.is_dir() {
            return Ok(dir);
        }
        Err(Error::stage_precondition_failed(
            stage.name(),
            "Repository not cloned yet. Run 'clone' first.",
        )
        .with_hint(format!(
            "Run 'deployer clone' to fetch repo.url into {}",
            display_relative(&dir, &self.base_dir)
        )))
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn skip_unknown(ctx: &StageContext<'_>, name: &str) -> StageOutcome {
    let message = format!("Stage '{}' not implemented yet.", name);
    ctx.console.warn(&message);
    tracing::warn!("{}", message);
    StageOutcome::Skipped {
        stage: name.to_string(),
        reason: message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_every_known_name() {
        for name in Stage::NAMES {
            let stage = Stage::parse(name);
            assert!(stage.is_known(), "{} should be known", name);
            assert_eq!(stage.name(), name);
        }
    }

    #[test]
    fn parse_keeps_unknown_names() {
        let stage = Stage::parse("bogus");
        assert_eq!(stage, Stage::Unknown("bogus".to_string()));
        assert!(!stage.is_known());
        assert_eq!(stage.name(), "bogus");
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Stage::parse("Build"), Stage::Unknown("Build".to_string()));
    }

    #[test]
    fn banner_uses_upper_case_name() {
        assert_eq!(Stage::Rollback.banner(), "=== Starting ROLLBACK stage ===");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = StageOutcome::completed(&Stage::Build, "done");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["stage"], "build");
        assert_eq!(outcome.stage(), "build");
    }
}
