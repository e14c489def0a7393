//! Pipeline configuration loaded from `pipeline.yml`.
//!
//! Every key is optional. Accessors apply the documented defaults so stage
//! handlers never look at raw `Option`s.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "pipeline.yml";
pub const DEFAULT_TARGET: &str = "target_repo";
pub const DEFAULT_TEST_COMMAND: &str = "pytest -v";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Backend that build, test, deploy and rollback stages use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Commit, test, push and revert against the cloned repository.
    #[default]
    Git,
    /// Build and test inside containers.
    Docker,
    /// Print what would happen and succeed.
    Simulate,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Git => "git",
            Mode::Docker => "docker",
            Mode::Simulate => "simulate",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(Mode::Git),
            "docker" => Ok(Mode::Docker),
            "simulate" | "simulated" => Ok(Mode::Simulate),
            _ => Err(Error::config_invalid_value(
                "mode",
                Some(s.to_string()),
                "expected one of: git, docker, simulate",
            )),
        }
    }
}

// `mode:` in YAML accepts the same spellings as `--mode`.
impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accept any YAML scalar for a string key, so `tag: 2` and `branch: 2024`
/// read the same as their quoted forms.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string, number or boolean",
        )),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildStageConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub image_name: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    pub build: BuildStageConfig,
    pub test: CommandConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: Option<Mode>,
    pub repo: RepoConfig,
    pub stages: StagesConfig,
    pub test: CommandConfig,
    pub deploy: DeployConfig,
}

impl PipelineConfig {
    /// Load config from a YAML file. Returns `Ok(None)` when the file does
    /// not exist; callers decide whether that is fatal.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
        })?;
        Self::parse(&contents)
            .map(Some)
            .map_err(|e| Error::config_invalid_yaml(path.display().to_string(), e))
    }

    /// Parse a YAML document. Empty and null documents yield the defaults.
    pub fn parse(contents: &str) -> std::result::Result<Self, serde_yml::Error> {
        let value: serde_yml::Value = serde_yml::from_str(contents)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yml::from_value(value)
    }

    pub fn repo_url(&self) -> Option<&str> {
        non_empty(self.repo.url.as_deref())
    }

    pub fn repo_target(&self) -> &str {
        non_empty(self.repo.target.as_deref()).unwrap_or(DEFAULT_TARGET)
    }

    /// Command run against the cloned repository.
    pub fn test_command(&self) -> &str {
        self.test.command.as_deref().unwrap_or(DEFAULT_TEST_COMMAND)
    }

    /// Command run inside the test container; falls back to `test.command`.
    pub fn container_test_command(&self) -> &str {
        self.stages
            .test
            .command
            .as_deref()
            .unwrap_or_else(|| self.test_command())
    }

    pub fn deploy_branch(&self) -> &str {
        non_empty(self.deploy.branch.as_deref()).unwrap_or(DEFAULT_BRANCH)
    }

    /// `image:tag` reference for container stages.
    pub fn image_ref(&self) -> Result<String> {
        let image = non_empty(self.stages.build.image_name.as_deref())
            .ok_or_else(|| Error::config_missing_key("stages.build.image_name", None))?;
        let tag = non_empty(self.stages.build.tag.as_deref()).unwrap_or(DEFAULT_IMAGE_TAG);
        Ok(format!("{}:{}", image, tag))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
