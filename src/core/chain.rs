//! Fallback command chains.
//!
//! Exporter flags differ across tool releases, so each operation carries an
//! ordered list of command variants from most- to least-specific. Variants
//! run one at a time until one passes the operation's success check; the
//! rest are never invoked. A chain that runs dry is a single error carrying
//! every attempt.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::log_status;
use crate::utils::command::{self, Invocation};

/// One way of invoking the tool for an operation.
#[derive(Debug, Clone)]
pub struct CommandVariant {
    /// Short tag for logs and the exhaustion report.
    pub label: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandVariant {
    pub fn new(label: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            label: label.into(),
            args,
            timeout,
        }
    }
}

/// The winning invocation plus which variant produced it.
#[derive(Debug)]
pub struct ChainOutcome {
    pub invocation: Invocation,
    pub variant_label: String,
    /// Variants invoked, including the winner.
    pub attempts: usize,
}

/// Run variants in order until `succeeded` accepts one.
///
/// The success check owns the verdict entirely: exporters that exit non-zero
/// while writing a complete output file still count as a success when the
/// check says so. Launch failures and timeouts flow into the same check and
/// simply read as failed attempts.
pub fn run(
    operation: &str,
    program: &str,
    variants: &[CommandVariant],
    succeeded: impl Fn(&Invocation) -> bool,
) -> Result<ChainOutcome> {
    let mut failures: Vec<String> = Vec::new();

    for (index, variant) in variants.iter().enumerate() {
        log_status!(
            "chain",
            "{}: trying '{}' ({}/{})",
            operation,
            variant.label,
            index + 1,
            variants.len()
        );

        let invocation = command::invoke(program, &variant.args, variant.timeout)?;

        if succeeded(&invocation) {
            return Ok(ChainOutcome {
                invocation,
                variant_label: variant.label.clone(),
                attempts: index + 1,
            });
        }

        let failure = invocation.failure_text();
        log_status!("chain", "{}: '{}' failed: {}", operation, variant.label, failure);
        failures.push(format!("{}: {}", variant.label, failure));
    }

    Err(Error::chain_exhausted(operation, failures).with_hint(format!(
        "Command was: {} {} ...",
        program,
        variants
            .first()
            .and_then(|v| v.args.first().cloned())
            .unwrap_or_default()
    )))
}
