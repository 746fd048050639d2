/*!
shared.rs - helpers reused across subcommands.

Focus:
  - block_on: run one async dispatcher operation on a fresh runtime
    (main stays sync, one in-flight invocation at a time)
  - print_json / print_outcome: pretty JSON (2-space indent) on stdout
  - missing_arg: required-flag failure, message + exit 1
*/

use anyhow::{Context, Result};
use serde::Serialize;

use crate::dispatcher::DispatchError;

/// Run an async dispatcher operation to completion on a fresh Tokio runtime.
pub fn block_on<F: std::future::Future>(fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    Ok(rt.block_on(fut))
}

/// Pretty-print any serializable value to stdout (2-space indentation).
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

/// Print a dispatcher outcome: the success value as-is, or the structured
/// error shape. Dispatcher failures are surfaced as JSON, not process
/// failures, so both arms return Ok.
pub fn print_outcome<T: Serialize>(outcome: Result<T, DispatchError>) -> Result<()> {
    match outcome {
        Ok(value) => print_json(&value),
        Err(err) => print_json(&err.to_json()),
    }
}

/// Report a missing required flag and terminate with exit code 1.
pub fn missing_arg(flag: &str, command: &str) -> ! {
    eprintln!("Error: {flag} is required for the {command} command");
    std::process::exit(1);
}
