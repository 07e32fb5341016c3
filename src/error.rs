use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    IdentityInvalid,

    ToolLaunchFailed,
    ToolTimeout,
    ToolExit,
    ChainExhausted,

    BomNormalizeFailed,
    PackageFailed,

    RemoteFetchFailed,
    RemoteRejected,
    RemoteNetwork,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::IdentityInvalid => "identity.invalid",

            ErrorCode::ToolLaunchFailed => "tool.launch_failed",
            ErrorCode::ToolTimeout => "tool.timeout",
            ErrorCode::ToolExit => "tool.exit",
            ErrorCode::ChainExhausted => "chain.exhausted",

            ErrorCode::BomNormalizeFailed => "bom.normalize_failed",
            ErrorCode::PackageFailed => "package.failed",

            ErrorCode::RemoteFetchFailed => "remote.fetch_failed",
            ErrorCode::RemoteRejected => "remote.rejected",
            ErrorCode::RemoteNetwork => "remote.network",

            ErrorCode::InternalIoError => "internal.io",
            ErrorCode::InternalJsonError => "internal.json",
        }
    }

    /// Configuration and validation errors abort a run before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConfigMissingKey
                | ErrorCode::ConfigInvalidJson
                | ErrorCode::ConfigInvalidValue
                | ErrorCode::ValidationInvalidArgument
                | ErrorCode::IdentityInvalid
        )
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
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolFailureDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExhaustedDetails {
    pub operation: String,
    pub attempts: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRejectedDetails {
    pub status: u16,
    pub body: String,
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

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let details = serde_json::to_value(ConfigMissingKeyDetails {
            key: key.into(),
            path,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            serde_json::json!({ "path": path.into(), "error": err.to_string() }),
        )
    }

    pub fn config_invalid_value(key: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            serde_json::json!({ "key": key.into(), "problem": problem.into() }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn identity_invalid(part_number: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::IdentityInvalid,
            "Invalid design identity",
            serde_json::json!({ "partNumber": part_number.into(), "problem": problem.into() }),
        )
    }

    pub fn tool_launch_failed(command: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ToolLaunchFailed,
            "External tool could not be launched",
            serde_json::json!({ "command": command.into(), "error": error.into() }),
        )
    }

    pub fn tool_timeout(command: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new(
            ErrorCode::ToolTimeout,
            "External tool timed out",
            serde_json::json!({ "command": command.into(), "timeoutSecs": timeout_secs }),
        )
    }

    pub fn tool_exit(details: ToolFailureDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::ToolExit, "External tool failed", details)
    }

    pub fn chain_exhausted(operation: impl Into<String>, attempts: Vec<String>) -> Self {
        let operation = operation.into();
        let details = serde_json::to_value(ChainExhaustedDetails {
            operation: operation.clone(),
            attempts,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ChainExhausted,
            format!("Every command variant for {} failed", operation),
            details,
        )
    }

    pub fn bom_normalize_failed(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::BomNormalizeFailed,
            "BOM normalization failed",
            serde_json::json!({ "path": path.into(), "problem": problem.into() }),
        )
    }

    pub fn package_failed(dest: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PackageFailed,
            "Archive packaging failed",
            serde_json::json!({ "dest": dest.into(), "problem": problem.into() }),
        )
    }

    pub fn remote_fetch_failed(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RemoteFetchFailed,
            "Could not resolve the design against the remote service",
            serde_json::json!({ "status": status, "body": body.into() }),
        )
    }

    pub fn remote_rejected(status: u16, body: impl Into<String>) -> Self {
        let details = serde_json::to_value(RemoteRejectedDetails {
            status,
            body: body.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::RemoteRejected,
            format!("Remote service rejected the request: HTTP {}", status),
            details,
        )
    }

    pub fn remote_network(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RemoteNetwork,
            "Network request failed",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            serde_json::json!({ "error": error.into(), "context": context }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            serde_json::json!({ "error": error.into(), "context": context }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dotted_strings() {
        assert_eq!(ErrorCode::ChainExhausted.as_str(), "chain.exhausted");
        assert_eq!(ErrorCode::RemoteRejected.as_str(), "remote.rejected");
    }

    #[test]
    fn configuration_family_is_flagged() {
        assert!(ErrorCode::IdentityInvalid.is_configuration());
        assert!(ErrorCode::ConfigMissingKey.is_configuration());
        assert!(!ErrorCode::ToolExit.is_configuration());
        assert!(!ErrorCode::RemoteNetwork.is_configuration());
    }

    #[test]
    fn with_hint_appends() {
        let err = Error::config_missing_key("api_key", None)
            .with_hint("Set FABHAND_API_KEY or add api_key to config.json");
        assert_eq!(err.hints.len(), 1);
    }

    #[test]
    fn remote_rejected_carries_status() {
        let err = Error::remote_rejected(403, "forbidden");
        assert_eq!(err.details["status"], 403);
    }
}
