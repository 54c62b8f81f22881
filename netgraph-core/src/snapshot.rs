use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::model::GraphData;

/// A published, frozen topology document.
///
/// Holders only get shared access. Code that wants a modified copy goes
/// through `Arc::make_mut`, which clones and leaves the published value alone.
pub type Snapshot = Arc<GraphData>;

/// Owner of the single "current data" reference.
///
/// Replacement is one pointer swap under the write lock, so readers see either
/// the previous snapshot or the new one, never a partially built document.
/// There is no ordering protection: whichever `publish` runs last wins.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    current: RwLock<Option<Snapshot>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze `data` and install it as the current snapshot.
    pub fn publish(&self, data: GraphData) -> Snapshot {
        let snapshot = Arc::new(data);
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(snapshot.clone());

        debug!(
            "Published snapshot ({} nodes, {} links), replaced previous: {}",
            snapshot.node_count(),
            snapshot.link_count(),
            previous.is_some()
        );
        snapshot
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
