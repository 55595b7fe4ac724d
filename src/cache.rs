//! Cache reuse decisions for build nodes.
//!
//! Before dispatching a build, a worker asks the artifact store whether the
//! expected outputs of the node's source package already exist. A node is
//! cache-eligible only when every expected output is present; a partial set
//! is diagnostic only and still forces a rebuild.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::graph::{NodeIndex, SharedGraph};

/// Which of a node's expected artifacts already exist.
#[derive(Debug, Default)]
pub struct ArtifactQuery {
    pub built: Vec<Utf8PathBuf>,
    pub missing: Vec<Utf8PathBuf>,
}

/// Lookup into the shared artifact store. Implementations must be safe for
/// concurrent access; lookups run outside the graph lock.
pub trait ArtifactStore: Send + Sync {
    /// Partition `expected` into artifacts that exist and artifacts that
    /// are missing.
    fn query(&self, expected: &[Utf8PathBuf]) -> ArtifactQuery;
}

/// Artifact store backed by the local filesystem.
#[derive(Debug, Default)]
pub struct FsArtifactStore;

impl ArtifactStore for FsArtifactStore {
    fn query(&self, expected: &[Utf8PathBuf]) -> ArtifactQuery {
        let mut query = ArtifactQuery::default();

        for path in expected {
            if path.exists() {
                query.built.push(path.clone());
            } else {
                query.missing.push(path.clone());
            }
        }

        query
    }
}

/// Outcome of a cache check for one build node.
#[derive(Debug)]
pub struct CacheStatus {
    /// Every expected artifact already exists.
    pub prebuilt: bool,
    pub built: Vec<Utf8PathBuf>,
    pub missing: Vec<Utf8PathBuf>,
}

/// Check whether the node's source package is already fully built.
///
/// The expected artifact set is gathered under the graph read lock; the
/// store lookup itself runs with the lock released.
pub fn check_cache(node: NodeIndex, graph: &SharedGraph, store: &dyn ArtifactStore) -> CacheStatus {
    let (srpm_path, expected) = {
        let graph = graph.read().unwrap();
        let srpm_path = graph.node(node).srpm_path.clone();
        let expected = graph.expected_artifacts(&srpm_path);
        (srpm_path, expected)
    };

    let ArtifactQuery { built, missing } = store.query(&expected);

    if !missing.is_empty() && !built.is_empty() {
        info!(
            "SRPM '{srpm_path}' is being rebuilt due to partially missing components: {missing:?}"
        );
    }

    CacheStatus {
        prebuilt: missing.is_empty(),
        built,
        missing,
    }
}

/// Whether the package is administratively excluded from building. Matching
/// is case-sensitive and takes precedence over any cache decision.
pub fn is_excluded(spec_name: &str, ignored_packages: &[String]) -> bool {
    ignored_packages.iter().any(|name| name == spec_name)
}
