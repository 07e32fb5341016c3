//! Locating the exporter binary.
//!
//! Resolution order: explicit environment override, well-known install
//! locations for the platform, then a PATH probe.

use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result, ToolFailureDetails};
use crate::utils::command;

pub const DEFAULT_PROGRAM: &str = "kicad-cli";
pub const ENV_PROGRAM: &str = "FABHAND_KICAD_CLI";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve the tool binary to invoke, or `None` when nothing answers.
pub fn locate() -> Option<String> {
    locate_from(std::env::var(ENV_PROGRAM).ok())
}

fn locate_from(explicit: Option<String>) -> Option<String> {
    if let Some(explicit) = explicit {
        if !explicit.trim().is_empty() {
            return Some(explicit);
        }
    }

    for candidate in well_known_paths() {
        if Path::new(candidate).is_file() {
            return Some(candidate.to_string());
        }
    }

    let probe = command::invoke(DEFAULT_PROGRAM, &["--version".to_string()], PROBE_TIMEOUT).ok()?;
    probe.exited_ok().then(|| DEFAULT_PROGRAM.to_string())
}

/// Like [`locate`] but an error when the tool is absent.
pub fn require() -> Result<String> {
    locate().ok_or_else(|| {
        Error::tool_launch_failed(DEFAULT_PROGRAM, "not found").with_hint(format!(
            "Install KiCad 7 or newer, or point {} at the binary",
            ENV_PROGRAM
        ))
    })
}

/// `--version` probe for a resolved binary.
pub fn version(program: &str) -> Result<String> {
    let args = vec!["--version".to_string()];
    let probe = command::invoke(program, &args, PROBE_TIMEOUT)?;
    if probe.exited_ok() {
        return Ok(probe.stdout.trim().to_string());
    }
    if probe.launch_error.is_some() {
        return Err(Error::tool_launch_failed(program, probe.failure_text()));
    }
    if probe.timed_out {
        return Err(Error::tool_timeout(program, PROBE_TIMEOUT.as_secs()));
    }
    Err(Error::tool_exit(ToolFailureDetails {
        command: command::command_line(program, &args),
        exit_code: probe.exit_code,
        stderr: probe.stderr.trim().to_string(),
    }))
}

fn well_known_paths() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &[
            r"C:\Program Files\KiCad\9.0\bin\kicad-cli.exe",
            r"C:\Program Files\KiCad\8.0\bin\kicad-cli.exe",
            r"C:\Program Files\KiCad\7.0\bin\kicad-cli.exe",
        ]
    }
    #[cfg(target_os = "macos")]
    {
        &[
            "/Applications/KiCad/KiCad.app/Contents/MacOS/kicad-cli",
            "/usr/local/bin/kicad-cli",
        ]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        &["/usr/bin/kicad-cli", "/usr/local/bin/kicad-cli"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let resolved = locate_from(Some("/opt/kicad/bin/kicad-cli".to_string()));
        assert_eq!(resolved.as_deref(), Some("/opt/kicad/bin/kicad-cli"));
    }

    #[test]
    fn blank_override_is_ignored() {
        // falls through to path probing, which may or may not find anything
        let resolved = locate_from(Some("  ".to_string()));
        assert_ne!(resolved.as_deref(), Some("  "));
    }

    #[test]
    fn version_probe_uses_stdout() {
        let version = version("echo").unwrap();
        assert_eq!(version, "--version");
    }

    #[test]
    fn version_probe_reports_broken_binary() {
        let exit = version("false").unwrap_err();
        assert_eq!(exit.code, crate::error::ErrorCode::ToolExit);

        let launch = version("definitely-not-a-real-binary-7f3a").unwrap_err();
        assert_eq!(launch.code, crate::error::ErrorCode::ToolLaunchFailed);
    }
}
