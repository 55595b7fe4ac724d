//! Retrying dispatch of source packages to the build agent.
//!
//! An agent reporting success is not trusted unconditionally: the produced
//! build log is re-validated for its embedded completion marker, and an
//! attempt whose log says the check did not exit cleanly is downgraded to a
//! failure. Validation failures retry exactly like agent failures.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::agent::{AgentOutput, BuildAgent};
use crate::error::ExecutorError;
use crate::retry;

/// Marker printed by the packaged %check stage on completion.
const CHECK_DONE_MARKER: &str = "CHECK DONE";
/// Marker present on the same line when the check exited cleanly.
const CHECK_SUCCESS_MARKER: &str = "EXIT STATUS 0";

/// Outcome of dispatching one source package, after all retries.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Artifacts produced by the successful attempt, empty on failure.
    pub built_files: Vec<Utf8PathBuf>,
    /// Build log of the last attempt that produced one.
    pub log_path: Option<Utf8PathBuf>,
    /// Error of the final attempt when all attempts failed.
    pub error: Option<ExecutorError>,
}

/// Send a source package to the build agent, retrying up to `attempts` times
/// with a fixed `delay` between attempts.
pub fn build_srpm(
    agent: &dyn BuildAgent,
    attempts: usize,
    delay: Duration,
    srpm_path: &Utf8Path,
    architecture: &str,
    dependencies: &[Utf8PathBuf],
) -> ExecutionReport {
    let log_name = format!(
        "{}.log",
        srpm_path.file_name().unwrap_or(srpm_path.as_str())
    );

    let mut log_path = None;

    let outcome = retry::run(
        || {
            let output = agent
                .build_package(srpm_path, &log_name, architecture, dependencies)
                .map_err(ExecutorError::Agent)?;

            log_path = Some(output.log_path.clone());
            validate_build_log(&output.log_path)?;

            Ok::<AgentOutput, ExecutorError>(output)
        },
        attempts,
        delay,
    );

    match outcome {
        Ok(output) => ExecutionReport {
            built_files: output.built_files,
            log_path: Some(output.log_path),
            error: None,
        },
        Err(err) => ExecutionReport {
            built_files: Vec::new(),
            log_path,
            error: Some(err),
        },
    }
}

/// Scan the build log for the completion marker.
///
/// A line containing the check-done marker without the clean-exit marker
/// fails the attempt with that line's text. A log that cannot be opened is
/// tolerated; the agent's own report stands.
pub fn validate_build_log(log_path: &Utf8Path) -> Result<(), ExecutorError> {
    debug!("validating build log {log_path}");

    let file = match File::open(log_path) {
        Ok(file) => file,
        Err(err) => {
            warn!("could not open build log {log_path}: {err}");
            return Ok(());
        }
    };

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };

        if line.contains(CHECK_DONE_MARKER) && !line.contains(CHECK_SUCCESS_MARKER) {
            return Err(ExecutorError::CheckFailed(line));
        }
    }

    Ok(())
}
