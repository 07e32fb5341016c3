//! JSON response envelope for stdout.
//!
//! Every command funnels through here: one pretty-printed JSON document,
//! `{success: true, data}` or `{success: false, error}`, plus the process
//! exit code derived from the error family.

use std::io::{self, Write};

use serde::Serialize;

use fabhand::error::Hint;
use fabhand::{Error, ErrorCode, Result};

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl From<&Error> for Envelope<serde_json::Value> {
    fn from(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: (!err.hints.is_empty()).then(|| err.hints.clone()),
            }),
        }
    }
}

/// Map a command's `(data, exit_code)` result to the envelope value and the
/// process exit code. Errors pick their exit code by family; data that will
/// not serialize degrades to an internal error with exit 1.
pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(e) => {
                let err =
                    Error::internal_json(e.to_string(), Some("serialize envelope".to_string()));
                (Err(err), 1)
            }
        },
        Err(err) => {
            let exit_code = error_exit_code(err.code);
            (Err(err), exit_code)
        }
    }
}

/// Print one envelope to stdout. A broken pipe is silent; any other write
/// failure surfaces so main can report it on stderr.
pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    let envelope = match result {
        Ok(data) => Envelope::ok(data),
        Err(err) => Envelope::from(&err),
    };
    let payload = serde_json::to_string_pretty(&envelope)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize envelope".to_string())))?;

    match writeln!(io::stdout().lock(), "{}", payload) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        )),
    }
}

fn error_exit_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::IdentityInvalid => 2,

        ErrorCode::ToolLaunchFailed
        | ErrorCode::ToolTimeout
        | ErrorCode::ToolExit
        | ErrorCode::ChainExhausted
        | ErrorCode::BomNormalizeFailed
        | ErrorCode::PackageFailed
        | ErrorCode::RemoteFetchFailed
        | ErrorCode::RemoteRejected
        | ErrorCode::RemoteNetwork => 20,

        ErrorCode::InternalIoError | ErrorCode::InternalJsonError => 1,
    }
}
