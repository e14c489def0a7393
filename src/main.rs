use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use deployer::console::Console;
use deployer::utils::command::SystemRunner;
use deployer::{Mode, RunOptions, Stage};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "deployer")]
#[command(version = VERSION)]
#[command(about = "Run a single local deployment pipeline stage")]
struct Cli {
    #[arg(value_name = "STAGE", help = stage_help())]
    stage: String,

    /// Config file (default: <DIR>/pipeline.yml; missing default is not an error)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base directory for pipeline.yml, logs/ and the target repository
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Stage backend: git, docker or simulate (overrides `mode` in the config)
    #[arg(short, long, value_name = "MODE")]
    mode: Option<Mode>,
}

fn stage_help() -> String {
    format!("Stage to run: {}", Stage::NAMES.join(", "))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = Console::detect();

    let base_dir = match cli.dir {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                console.error(format!("Cannot determine working directory: {}", e));
                return ExitCode::FAILURE;
            }
        },
    };

    let options = RunOptions {
        stage: cli.stage,
        base_dir,
        config_path: cli.config,
        mode: cli.mode,
        echo: true,
        console,
    };

    match deployer::run(&options, &SystemRunner) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            console.error(&err);
            if let Some(stderr) = err.stderr() {
                console.error(stderr);
            }
            for hint in &err.hints {
                console.warn(format!("  hint: {}", hint.message));
            }
            ExitCode::FAILURE
        }
    }
}
