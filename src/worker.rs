//! The build worker control loop and worker pool.
//!
//! Each worker repeatedly pulls the next [`BuildRequest`] via the selector,
//! dispatches on the node's type, and publishes exactly one [`BuildResult`]
//! per accepted request. A failing package never stops a worker; only the
//! cancel or done signal does.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use camino::Utf8PathBuf;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::agent::BuildAgent;
use crate::cache::{self, ArtifactStore};
use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::executor::{self, ExecutionReport};
use crate::graph::{NodeIndex, NodeState, NodeType, SharedGraph};
use crate::resolve;
use crate::select::select_next_request;
use crate::signal::Signal;

/// One unit of work for a build worker.
pub struct BuildRequest {
    /// The node to process.
    pub node: NodeIndex,
    /// The build graph shared with every other worker.
    pub graph: SharedGraph,
    /// Nodes whose build status is tied to this request's outcome, such as
    /// sibling output packages of the same source build.
    pub ancillary_nodes: Vec<NodeIndex>,
    /// Whether cached artifacts may stand in for a build.
    pub can_use_cache: bool,
}

/// The outcome of processing one [`BuildRequest`].
pub struct BuildResult {
    pub node: NodeIndex,
    pub ancillary_nodes: Vec<NodeIndex>,
    /// Artifacts produced by the build, empty when nothing was built.
    pub built_files: Vec<Utf8PathBuf>,
    /// Build log location, when an attempt produced one.
    pub log_path: Option<Utf8PathBuf>,
    /// Absent on success.
    pub error: Option<WorkerError>,
    /// The package was administratively excluded from building.
    pub skipped: bool,
    /// Cached artifacts stood in for a build.
    pub used_cache: bool,
}

impl BuildResult {
    fn of_request(req: &BuildRequest) -> Self {
        Self {
            node: req.node,
            ancillary_nodes: req.ancillary_nodes.clone(),
            built_files: Vec::new(),
            log_path: None,
            error: None,
            skipped: false,
            used_cache: false,
        }
    }
}

/// Channel endpoints connecting a worker to the scheduling driver.
#[derive(Clone)]
pub struct BuildChannels {
    pub requests: Receiver<BuildRequest>,
    pub priority_requests: Receiver<BuildRequest>,
    pub results: Sender<BuildResult>,
    pub cancel: Signal,
    pub done: Signal,
}

/// Process build requests until the selector signals stop. Safe to run
/// concurrently from any number of threads sharing the same channels.
pub fn build_node_worker(
    channels: &BuildChannels,
    agent: &dyn BuildAgent,
    store: &dyn ArtifactStore,
    config: &WorkerConfig,
) {
    while let Some(req) = select_next_request(channels) {
        let mut res = BuildResult::of_request(&req);

        let node_type = req.graph.read().unwrap().node(req.node).node_type;

        match node_type {
            NodeType::Build => {
                build_build_node(&req, agent, store, config, &mut res);

                let outcome = if res.error.is_none() {
                    NodeState::UpToDate
                } else {
                    NodeState::BuildError
                };
                set_build_nodes_status(&req, outcome);
            }

            NodeType::Run
            | NodeType::Goal
            | NodeType::Remote
            | NodeType::PureMeta
            | NodeType::PreBuilt => {
                res.used_cache = req.can_use_cache;
            }

            NodeType::Unknown => {
                let node = req.graph.read().unwrap().node(req.node).to_string();
                res.error = Some(WorkerError::InvalidNodeType(node_type, node));
            }
        }

        // Publishing may block when the results channel is bounded and
        // full; that backpressure is intentional. A disconnected consumer
        // means the run is over.
        if channels.results.send(res).is_err() {
            break;
        }
    }

    debug!("Worker done");
}

/// Process a Build-type node: skip check, cache check, then resolve and
/// dispatch to the agent.
fn build_build_node(
    req: &BuildRequest,
    agent: &dyn BuildAgent,
    store: &dyn ArtifactStore,
    config: &WorkerConfig,
    res: &mut BuildResult,
) {
    let (srpm_file_name, srpm_path, architecture, spec_name) = {
        let graph = req.graph.read().unwrap();
        let node = graph.node(req.node);
        (
            node.srpm_file_name().to_owned(),
            node.srpm_path.clone(),
            node.architecture.clone(),
            node.spec_name.clone(),
        )
    };

    if cache::is_excluded(&spec_name, &config.ignored_packages) {
        debug!("{srpm_file_name} explicitly marked to be skipped.");
        res.skipped = true;
        return;
    }

    let status = cache::check_cache(req.node, &req.graph, store);
    if req.can_use_cache && status.prebuilt {
        debug!("{srpm_file_name} is prebuilt, skipping");
        res.used_cache = true;
        res.built_files = status.built;
        return;
    }

    let dependencies = {
        let graph = req.graph.read().unwrap();
        let mut deps: Vec<_> = resolve::runtime_dependencies(req.node, &graph)
            .into_iter()
            .collect();
        deps.sort();
        deps
    };

    info!("Building {srpm_file_name}");
    let ExecutionReport {
        built_files,
        log_path,
        error,
    } = executor::build_srpm(
        agent,
        config.build_attempts,
        config.retry_delay,
        &srpm_path,
        &architecture,
        &dependencies,
    );

    res.built_files = built_files;
    res.log_path = log_path;
    res.error = error.map(WorkerError::Build);
}

/// Apply the request's outcome to the graph: the requested node and every
/// ancillary node of Build type take the given state. Runs under the write
/// guard so concurrent traversals never observe a partial update.
fn set_build_nodes_status(req: &BuildRequest, state: NodeState) {
    let mut graph = req.graph.write().unwrap();

    for &index in std::iter::once(&req.node).chain(&req.ancillary_nodes) {
        let node = graph.node_mut(index);
        if node.node_type == NodeType::Build {
            node.state = state;
        }
    }
}

/// A set of concurrently running build workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `config.workers` threads, each running the worker loop against
    /// the same channels, agent and artifact store.
    pub fn spawn(
        channels: BuildChannels,
        agent: Arc<dyn BuildAgent>,
        store: Arc<dyn ArtifactStore>,
        config: WorkerConfig,
    ) -> Self {
        let handles = (0..config.workers.max(1))
            .map(|id| {
                let channels = channels.clone();
                let agent = agent.clone();
                let store = store.clone();
                let config = config.clone();

                thread::Builder::new()
                    .name(format!("build-worker-{id}"))
                    .spawn(move || build_node_worker(&channels, &*agent, &*store, &config))
                    .expect("failed to spawn build worker thread")
            })
            .collect();

        Self { handles }
    }

    /// Wait for every worker to stop. Workers stop once the cancel or done
    /// signal fires, or once both request producers disconnect.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
