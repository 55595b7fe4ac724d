#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod agent;
mod cache;
mod config;
mod error;
mod executor;
mod graph;
mod resolve;
pub mod retry;
mod select;
mod signal;
mod worker;

pub use crate::agent::{AgentOutput, BuildAgent};
pub use crate::cache::{ArtifactQuery, ArtifactStore, CacheStatus, FsArtifactStore, check_cache};
pub use crate::config::WorkerConfig;
pub use crate::error::{ExecutorError, WorkerError};
pub use crate::executor::{ExecutionReport, build_srpm, validate_build_log};
pub use crate::graph::{
    NO_RPM_PATH, NodeIndex, NodeState, NodeType, PkgGraph, PkgNode, SharedGraph,
};
pub use crate::resolve::runtime_dependencies;
pub use crate::signal::{Signal, SignalSender, signal};
pub use crate::worker::{
    BuildChannels, BuildRequest, BuildResult, WorkerPool, build_node_worker,
};

/// Install a default tracing subscriber honoring `RUST_LOG`.
#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
