//! Single-stage run: config, run log, log retention, dispatch.

use std::path::PathBuf;

use chrono::Local;

use crate::config::{Mode, PipelineConfig, CONFIG_FILE};
use crate::console::Console;
use crate::error::{Error, ErrorCode, Result};
use crate::logs::{self, RunLog, LOG_DIR, LOG_RETENTION};
use crate::stage::{Stage, StageContext, StageOutcome};
use crate::utils::command::CommandRunner;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stage name as typed by the user; unknown names are allowed.
    pub stage: String,
    pub base_dir: PathBuf,
    /// Explicit config file. When absent, `<base_dir>/pipeline.yml` is used
    /// and may be missing.
    pub config_path: Option<PathBuf>,
    /// Overrides `mode` from the config file.
    pub mode: Option<Mode>,
    /// Mirror log records to stdout.
    pub echo: bool,
    pub console: Console,
}

impl RunOptions {
    pub fn new(stage: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            stage: stage.into(),
            base_dir: base_dir.into(),
            config_path: None,
            mode: None,
            echo: true,
            console: Console::detect(),
        }
    }
}

/// Run one stage to completion.
///
/// Opens the run log, loads configuration, prunes old logs for known stages,
/// then executes the stage. Any error is logged before it is returned.
pub fn run(options: &RunOptions, runner: &dyn CommandRunner) -> Result<StageOutcome> {
    let started = Local::now();
    let log = RunLog::open(
        &options.base_dir.join(LOG_DIR),
        started,
        options.echo,
        options.console.colored(),
    )?;

    execute(options, runner, &log, started).map_err(|err| {
        tracing::error!("{}", err);
        if err.code == ErrorCode::CommandFailed {
            err.with_hint(format!("Captured output is in {}", log.path().display()))
        } else {
            err
        }
    })
}

fn execute(
    options: &RunOptions,
    runner: &dyn CommandRunner,
    log: &RunLog,
    started: chrono::DateTime<Local>,
) -> Result<StageOutcome> {
    let console = options.console;
    let (config_path, config) = load_config(options, &console)?;

    let stage = Stage::parse(&options.stage);
    let mode = options.mode.or(config.mode).unwrap_or_default();

    // An unknown stage leaves existing logs alone.
    if stage.is_known() {
        logs::clean_old_logs(log.dir(), LOG_RETENTION)?;
        tracing::info!("Running stage '{}' in {} mode", stage, mode);
    }

    let ctx = StageContext {
        base_dir: options.base_dir.clone(),
        config_path,
        config,
        mode,
        started,
        runner,
        console,
        log,
    };
    stage.run(&ctx)
}

/// A missing default `pipeline.yml` is tolerated; a missing explicit
/// `--config` file is not.
fn load_config(options: &RunOptions, console: &Console) -> Result<(PathBuf, PipelineConfig)> {
    let (path, explicit) = match &options.config_path {
        Some(path) => (path.clone(), true),
        None => (options.base_dir.join(CONFIG_FILE), false),
    };

    match PipelineConfig::load(&path)? {
        Some(config) => {
            tracing::info!("Loaded configuration from {}", path.display());
            Ok((path, config))
        }
        None if explicit => Err(Error::config_not_found(path.display().to_string())),
        None => {
            let message = format!("{} not found, continuing with defaults.", CONFIG_FILE);
            console.warn(&message);
            tracing::warn!("{}", message);
            Ok((path, PipelineConfig::default()))
        }
    }
}
