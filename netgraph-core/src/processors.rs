//! Built-in background processing routines.

use std::collections::HashSet;

use tracing::debug;

use crate::config::WorkerTarget;
use crate::model::GraphData;

pub const BUILTIN_NAMES: &[&str] = &["prune", "identity"];

pub fn builtin(name: &str) -> Option<WorkerTarget> {
    match name {
        "prune" => Some(WorkerTarget::new("prune", |data| Ok(prune(data)))),
        "identity" => Some(WorkerTarget::new("identity", |data| Ok(data))),
        _ => None,
    }
}

/// Drop duplicate nodes, links to unknown nodes, and repeated links.
///
/// First occurrence wins. Nodes without a string or numeric id are kept as
/// they are. Links are treated as undirected when checking for repeats, so
/// `a -> b` and `b -> a` collapse into one.
pub fn prune(mut data: GraphData) -> GraphData {
    let before = (data.node_count(), data.link_count());

    let mut ids = HashSet::new();
    data.nodes.retain(|node| match node.id_key() {
        Some(id) => ids.insert(id),
        None => true,
    });

    let mut seen = HashSet::new();
    data.links.retain(|link| {
        let (Some(source), Some(target)) = (link.source_key(), link.target_key()) else {
            return false;
        };
        if !ids.contains(&source) || !ids.contains(&target) {
            return false;
        }
        let key = if source <= target {
            (source, target)
        } else {
            (target, source)
        };
        seen.insert(key)
    });

    debug!(
        "Pruned {} nodes and {} links",
        before.0 - data.node_count(),
        before.1 - data.link_count()
    );
    data
}
