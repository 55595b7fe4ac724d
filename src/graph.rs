//! The shared package build graph.
//!
//! Every vertex is a [`PkgNode`] describing one buildable unit, one runnable
//! artifact, or a purely logical grouping. An edge A → B means A requires B's
//! artifact to build or run. The graph is constructed up front by the
//! scheduling driver and then shared by every worker for the whole run; the
//! only field mutated afterwards is the per-node [`NodeState`].
//!
//! Concurrency contract: the graph is shared as [`SharedGraph`]. Any read-only
//! walk must hold the read guard for its full duration, and any state write
//! must hold the write guard, so a traversal never observes a half-applied
//! status transition.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use petgraph::Direction;
use petgraph::graph::DiGraph;

pub use petgraph::graph::NodeIndex;

/// Sentinel artifact path for nodes which produce no package.
pub const NO_RPM_PATH: &str = "<NO_RPM_PATH>";

/// The role a node plays in the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A node that must be compiled from its source package.
    Build,
    /// A runnable artifact produced by some build.
    Run,
    /// A synthetic goal node grouping a set of targets.
    Goal,
    /// An artifact satisfied from a remote repository.
    Remote,
    /// A purely logical node carrying no artifact of its own.
    PureMeta,
    /// An artifact that already exists and is never rebuilt.
    PreBuilt,
    /// A node whose role could not be determined.
    Unknown,
}

/// Build status of a node, ordered by lifecycle progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeState {
    Unknown,
    NotStarted,
    Building,
    UpToDate,
    BuildError,
    DoNotBuild,
}

/// A vertex in the package build graph.
#[derive(Debug, Clone)]
pub struct PkgNode {
    pub node_type: NodeType,
    pub state: NodeState,
    /// Target architecture of the produced package.
    pub architecture: String,
    /// Path to the source package this node is built from. Several nodes may
    /// share one source package when a single build produces multiple
    /// artifacts.
    pub srpm_path: Utf8PathBuf,
    /// Path to the produced package, or [`NO_RPM_PATH`].
    pub rpm_path: Utf8PathBuf,
    /// Logical package name, independent of version and architecture. Used
    /// for exclusion matching.
    pub spec_name: String,
}

impl PkgNode {
    /// Base file name of the node's source package.
    pub fn srpm_file_name(&self) -> &str {
        self.srpm_path.file_name().unwrap_or(self.srpm_path.as_str())
    }

    /// Whether the node carries a real artifact path.
    pub fn has_artifact(&self) -> bool {
        !self.rpm_path.as_str().is_empty() && self.rpm_path != NO_RPM_PATH
    }
}

impl fmt::Display for PkgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {})",
            self.spec_name, self.architecture, self.srpm_path
        )
    }
}

/// Directed graph of [`PkgNode`]s, edges pointing at dependencies.
#[derive(Debug, Default)]
pub struct PkgGraph {
    inner: DiGraph<PkgNode, ()>,
}

/// The graph handle shared between all workers and the driver.
pub type SharedGraph = Arc<RwLock<PkgGraph>>;

impl PkgGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the graph for sharing across worker threads.
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    pub fn add_node(&mut self, node: PkgNode) -> NodeIndex {
        self.inner.add_node(node)
    }

    /// Record that `from` depends on the artifact of `to`.
    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex) {
        self.inner.add_edge(from, to, ());
    }

    pub fn node(&self, index: NodeIndex) -> &PkgNode {
        &self.inner[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut PkgNode {
        &mut self.inner[index]
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    /// Deduplicated artifact paths expected from building the given source
    /// package: the artifacts of every node sharing that `srpm_path`.
    pub fn expected_artifacts(&self, srpm_path: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut seen = HashSet::new();
        let mut expected = Vec::new();

        for index in self.inner.node_indices() {
            let node = &self.inner[index];
            if node.srpm_path == srpm_path
                && node.has_artifact()
                && seen.insert(node.rpm_path.clone())
            {
                expected.push(node.rpm_path.clone());
            }
        }

        expected
    }

    /// Breadth-first walk over outgoing dependency edges.
    ///
    /// Every discovered node is passed to `visit` exactly once, the start
    /// node included. The `expand` predicate decides whether the walk may
    /// descend past a discovered node; a node rejected by the predicate is
    /// still visited, but its own dependencies are not. The predicate must be
    /// a pure function of the node it is given. The start node is always
    /// expanded.
    pub fn walk_dependencies(
        &self,
        start: NodeIndex,
        expand: impl Fn(&PkgNode) -> bool,
        mut visit: impl FnMut(NodeIndex, &PkgNode),
    ) {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(index) = queue.pop_front() {
            let node = &self.inner[index];
            visit(index, node);

            if index != start && !expand(node) {
                continue;
            }

            for next in self.inner.neighbors_directed(index, Direction::Outgoing) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
}
