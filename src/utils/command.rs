//! External command execution with timeout and full output capture.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Outcome of one external tool invocation.
///
/// A non-zero exit, a missing executable, and a timeout are all states of
/// the result, never errors: many exporters exit non-zero while still
/// producing a complete output file, so the caller owns the success verdict.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Exit code when the process ran to completion. `None` after a kill
    /// (timeout) or when the process never launched.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub launch_error: Option<String>,
}

impl Invocation {
    pub fn exited_ok(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable failure text: stderr, falling back to stdout,
    /// falling back to the launch/timeout state.
    pub fn failure_text(&self) -> String {
        if let Some(err) = &self.launch_error {
            return format!("launch failed: {}", err);
        }
        if self.timed_out {
            return "timed out".to_string();
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated without exit code".to_string(),
        }
    }

    fn launch_failure(error: String) -> Self {
        Self {
            launch_error: Some(error),
            ..Self::default()
        }
    }
}

/// Render a program + argument list for error messages and logs.
pub fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Run a command to completion with a deadline, capturing both streams.
///
/// The child is killed once the deadline passes. Output pipes are drained on
/// separate threads so a chatty child cannot deadlock against a full pipe
/// buffer while we poll its exit state.
pub fn invoke(program: &str, args: &[String], timeout: Duration) -> Result<Invocation> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return Ok(Invocation::launch_failure(e.to_string())),
    };

    let stdout_reader = child.stdout.take().map(spawn_drain);
    let stderr_reader = child.stderr.take().map(spawn_drain);

    let started = Instant::now();
    let mut timed_out = false;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() >= timeout {
                    timed_out = true;
                    let _ = child.kill();
                    break child.wait().map_err(|e| {
                        Error::internal_io(e.to_string(), Some(format!("wait {}", program)))
                    })?;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                return Err(Error::internal_io(
                    e.to_string(),
                    Some(format!("poll {}", program)),
                ));
            }
        }
    };

    let stdout = drain_result(stdout_reader);
    let stderr = drain_result(stderr_reader);

    Ok(Invocation {
        exit_code: status.code(),
        stdout,
        stderr,
        timed_out,
        launch_error: None,
    })
}

fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn drain_result(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
