use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidValue,
    ConfigInvalidYaml,
    ConfigNotFound,

    StagePreconditionFailed,

    CommandFailed,
    CommandSpawnFailed,

    InternalIoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",
            ErrorCode::ConfigInvalidYaml => "config.invalid_yaml",
            ErrorCode::ConfigNotFound => "config.not_found",

            ErrorCode::StagePreconditionFailed => "stage.precondition_failed",

            ErrorCode::CommandFailed => "command.failed",
            ErrorCode::CommandSpawnFailed => "command.spawn_failed",

            ErrorCode::InternalIoError => "internal.io_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidYamlDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: hint.into(),
        });
        self
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let key = key.into();
        let message = format!("No '{}' specified in pipeline configuration", key);
        Self::new(
            ErrorCode::ConfigMissingKey,
            message,
            to_details(ConfigMissingKeyDetails { key, path }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let problem = problem.into();
        let message = format!("Invalid value for '{}': {}", key, problem);
        Self::new(
            ErrorCode::ConfigInvalidValue,
            message,
            to_details(ConfigInvalidValueDetails {
                key,
                value,
                problem,
            }),
        )
    }

    pub fn config_invalid_yaml(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ConfigInvalidYaml,
            format!("Invalid YAML in {}", path),
            to_details(ConfigInvalidYamlDetails {
                path,
                error: err.to_string(),
            }),
        )
    }

    pub fn config_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("{} not found", path),
            serde_json::json!({ "path": path }),
        )
    }

    pub fn stage_precondition_failed(stage: &str, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StagePreconditionFailed,
            problem,
            serde_json::json!({ "stage": stage }),
        )
    }

    pub fn command_failed(details: CommandFailedDetails) -> Self {
        let message = format!("Command failed: {}", details.command);
        Self::new(ErrorCode::CommandFailed, message, to_details(details))
    }

    pub fn command_spawn_failed(command: impl Into<String>, err: impl std::fmt::Display) -> Self {
        let command = command.into();
        Self::new(
            ErrorCode::CommandSpawnFailed,
            format!("Failed to run {}: {}", command, err),
            serde_json::json!({ "command": command, "error": err.to_string() }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match &context {
            Some(ctx) => format!("I/O error ({}): {}", ctx, error),
            None => format!("I/O error: {}", error),
        };
        Self::new(
            ErrorCode::InternalIoError,
            message,
            to_details(InternalIoErrorDetails { error, context }),
        )
    }

    /// Captured stderr for a failed command, if any.
    pub fn stderr(&self) -> Option<&str> {
        if self.code != ErrorCode::CommandFailed {
            return None;
        }
        self.details
            .get("stderr")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render_as_dotted_strings() {
        assert_eq!(ErrorCode::ConfigMissingKey.as_str(), "config.missing_key");
        assert_eq!(ErrorCode::CommandFailed.as_str(), "command.failed");
        assert_eq!(ErrorCode::InternalIoError.as_str(), "internal.io_error");
    }

    #[test]
    fn missing_key_names_the_key() {
        let err = Error::config_missing_key("repo.url", Some("pipeline.yml".to_string()));
        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
        assert!(err.message.contains("repo.url"));
        assert_eq!(err.details["key"], "repo.url");
        assert_eq!(err.details["path"], "pipeline.yml");
    }

    #[test]
    fn command_failed_carries_captured_output() {
        let err = Error::command_failed(CommandFailedDetails {
            command: "git push origin main".to_string(),
            cwd: None,
            exit_code: Some(128),
            stdout: String::new(),
            stderr: "rejected".to_string(),
        });
        assert_eq!(err.to_string(), "Command failed: git push origin main");
        assert_eq!(err.details["exitCode"], 128);
        assert_eq!(err.stderr(), Some("rejected"));
    }

    #[test]
    fn stderr_is_none_for_other_errors() {
        let err = Error::internal_io("disk full", None);
        assert!(err.stderr().is_none());
    }

    #[test]
    fn hints_accumulate_in_order() {
        let err = Error::stage_precondition_failed("build", "Repository not cloned yet.")
            .with_hint("Run 'deployer clone' first")
            .with_hint("Check repo.target");
        assert_eq!(err.hints.len(), 2);
        assert_eq!(err.hints[0].message, "Run 'deployer clone' first");
    }
}
