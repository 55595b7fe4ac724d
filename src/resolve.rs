//! Runtime dependency resolution for build nodes.

use std::collections::HashSet;

use camino::Utf8PathBuf;

use crate::graph::{NodeIndex, NodeType, PkgGraph};

/// Collect the artifact paths that must be present before the node can be
/// built: the artifacts of its transitive runtime closure.
///
/// The walk refuses to descend past any Build-type dependency, since another
/// package's build-time requirements are not this node's concern; the Build
/// node itself is still visited so its own artifact is captured. Skipped
/// while collecting: empty paths, the no-artifact sentinel, and the
/// requesting node's own artifact.
///
/// The caller is expected to hold the graph read guard for the duration of
/// the call; taking `&PkgGraph` makes that hold structural.
pub fn runtime_dependencies(node: NodeIndex, graph: &PkgGraph) -> HashSet<Utf8PathBuf> {
    let own_rpm = graph.node(node).rpm_path.clone();
    let mut dependencies = HashSet::new();

    graph.walk_dependencies(
        node,
        |target| target.node_type != NodeType::Build,
        |_, dependency| {
            if dependency.has_artifact() && dependency.rpm_path != own_rpm {
                dependencies.insert(dependency.rpm_path.clone());
            }
        },
    );

    dependencies
}
