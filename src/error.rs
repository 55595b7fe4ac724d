use thiserror::Error;

use crate::graph::NodeType;

/// Failure of a single build attempt inside the retry loop.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The build agent itself reported a failure.
    #[error("build agent failed: {0}")]
    Agent(anyhow::Error),

    /// The agent reported success, but the build log's completion marker
    /// says otherwise. Carries the offending log line.
    #[error("build check failed: {0}")]
    CheckFailed(String),
}

/// Failure of one processed build request, carried in its result.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid node type {0:?} on node {1}")]
    InvalidNodeType(NodeType, String),

    #[error(transparent)]
    Build(#[from] ExecutorError),
}
