//! The pluggable build agent interface.

use camino::{Utf8Path, Utf8PathBuf};

/// Files and log produced by one successful agent invocation.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    /// Artifacts the build produced.
    pub built_files: Vec<Utf8PathBuf>,
    /// Plain-text build log written by the agent.
    pub log_path: Utf8PathBuf,
}

/// External executor performing the actual compilation of a source package.
///
/// Implementations may target different build backends; the worker pool only
/// requires this contract plus a readable plain-text log at the returned
/// path. Implementations must be safe to share across worker threads.
pub trait BuildAgent: Send + Sync {
    /// Build one source package with the given runtime dependencies
    /// available, writing the build log under `log_name`.
    fn build_package(
        &self,
        srpm_path: &Utf8Path,
        log_name: &str,
        architecture: &str,
        dependencies: &[Utf8PathBuf],
    ) -> anyhow::Result<AgentOutput>;
}
