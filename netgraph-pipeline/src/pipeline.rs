use crate::error::{Result, UpdateError};
use crate::hooks::{LoadHook, MetadataDisplay, NoopHook, Renderer};
use crate::source::{DataSource, Normalizer};
use crate::worker::{OffloadHandle, WorkerOffloadChannel};
use netgraph_core::{GraphConfig, GraphData, MetadataView, Snapshot, SnapshotSlot};
use std::sync::Arc;
use tracing::{debug, error, info};

/// State of one graph instance: configuration, the current snapshot and the
/// collaborators every publish goes through.
pub struct GraphState {
    config: GraphConfig,
    snapshot: SnapshotSlot,
    renderer: Arc<dyn Renderer>,
    metadata: Arc<dyn MetadataDisplay>,
    hook: Arc<dyn LoadHook>,
}

impl GraphState {
    pub fn new(
        config: GraphConfig,
        renderer: Arc<dyn Renderer>,
        metadata: Arc<dyn MetadataDisplay>,
    ) -> Self {
        Self {
            config,
            snapshot: SnapshotSlot::new(),
            renderer,
            metadata,
            hook: Arc::new(NoopHook),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn LoadHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The snapshot the renderer currently draws from.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.current()
    }

    pub(crate) fn refresh_metadata(&self, data: &GraphData) {
        if self.config.metadata {
            self.metadata.show(MetadataView::of(data));
        }
    }

    pub(crate) fn commit(&self, data: GraphData) -> Snapshot {
        self.snapshot.publish(data)
    }

    pub(crate) fn render(&self, snapshot: &Snapshot) {
        self.renderer.render(snapshot);
    }
}

/// How an [`DataUpdatePipeline::update`] call ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Published directly and rendered
    Published(Snapshot),
    /// Handed to a background unit, which publishes when it replies
    Offloaded(OffloadHandle),
    /// Normalization or the load hook failed; nothing changed
    Rejected,
}

impl UpdateOutcome {
    /// Wait for an offloaded update to settle and return the published
    /// snapshot, if any.
    pub async fn settled(self) -> Option<Snapshot> {
        match self {
            UpdateOutcome::Published(snapshot) => Some(snapshot),
            UpdateOutcome::Offloaded(handle) => handle.settled().await.snapshot(),
            UpdateOutcome::Rejected => None,
        }
    }
}

/// Ingestion path shared by initial loads, reloads and search results.
pub struct DataUpdatePipeline {
    state: Arc<GraphState>,
    normalizer: Arc<dyn Normalizer>,
    offload: WorkerOffloadChannel,
}

impl DataUpdatePipeline {
    pub fn new(state: Arc<GraphState>, normalizer: Arc<dyn Normalizer>) -> Self {
        let offload = WorkerOffloadChannel::new(state.clone());
        Self {
            state,
            normalizer,
            offload,
        }
    }

    pub fn state(&self) -> &Arc<GraphState> {
        &self.state
    }

    /// Load `source` and publish it, directly or through the configured worker.
    ///
    /// Failures are logged and reported as [`UpdateOutcome::Rejected`]; the
    /// current snapshot stays in place and nothing is rendered.
    pub async fn update(&self, source: DataSource) -> UpdateOutcome {
        match self.try_update(source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Data update failed: {}", e);
                UpdateOutcome::Rejected
            }
        }
    }

    async fn try_update(&self, source: DataSource) -> Result<UpdateOutcome> {
        debug!("Updating from {:?}", source);
        let mut data = self.normalizer.parse(source).await?;

        let hook = &self.state.hook;
        hook.on_load().map_err(UpdateError::Hook)?;
        hook.prepare_data(&mut data).map_err(UpdateError::Hook)?;

        self.state.refresh_metadata(&data);

        match &self.state.config.worker {
            Some(target) => {
                info!(
                    "Offloading {} nodes, {} links to worker '{}'",
                    data.node_count(),
                    data.link_count(),
                    target.name()
                );
                Ok(UpdateOutcome::Offloaded(self.offload.offload(data, target)))
            }
            None => {
                let snapshot = self.state.commit(data);
                self.state.render(&snapshot);
                Ok(UpdateOutcome::Published(snapshot))
            }
        }
    }
}
