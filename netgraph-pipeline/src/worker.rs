use crate::error::UpdateError;
use crate::pipeline::GraphState;
use netgraph_core::{GraphData, Snapshot, WorkerTarget};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Terminal event reported by a background unit.
#[derive(Debug)]
pub enum WorkerEvent {
    Message(GraphData),
    Error(String),
}

#[derive(Debug, Clone)]
pub enum OffloadOutcome {
    Published(Snapshot),
    Failed,
}

impl OffloadOutcome {
    pub fn snapshot(self) -> Option<Snapshot> {
        match self {
            OffloadOutcome::Published(snapshot) => Some(snapshot),
            OffloadOutcome::Failed => None,
        }
    }
}

/// Handle to one in-flight offload.
///
/// Dropping it detaches the task; the unit still runs and may still publish.
#[derive(Debug)]
pub struct OffloadHandle {
    worker: String,
    task: JoinHandle<OffloadOutcome>,
}

impl OffloadHandle {
    pub fn worker(&self) -> &str {
        &self.worker
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn settled(self) -> OffloadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Offload task for '{}' failed: {}", self.worker, e);
                OffloadOutcome::Failed
            }
        }
    }
}

/// Runs heavy processing off the async workers and publishes the result.
#[derive(Clone)]
pub struct WorkerOffloadChannel {
    state: Arc<GraphState>,
}

impl WorkerOffloadChannel {
    pub fn new(state: Arc<GraphState>) -> Self {
        Self { state }
    }

    /// Spawn a fresh unit for `target`, post `data` to it and publish its reply.
    ///
    /// Units are never reused or torn down by the channel. An error reply, a
    /// panic, or a unit that exits without replying is logged and leaves the
    /// snapshot and metadata untouched.
    pub fn offload(&self, data: GraphData, target: &WorkerTarget) -> OffloadHandle {
        let (inbox, mut inbox_rx) = mpsc::unbounded_channel::<GraphData>();
        let (outbox, mut events) = mpsc::unbounded_channel::<WorkerEvent>();
        let process = target.process();
        let worker = target.name().to_string();

        let unit = tokio::task::spawn_blocking(move || {
            let Some(data) = inbox_rx.blocking_recv() else {
                return;
            };
            let event = match process(data) {
                Ok(processed) => WorkerEvent::Message(processed),
                Err(reason) => WorkerEvent::Error(reason),
            };
            let _ = outbox.send(event);
        });

        if inbox.send(data).is_err() {
            debug!("Worker '{}' exited before receiving data", worker);
        }

        let state = self.state.clone();
        let name = worker.clone();
        let task = tokio::spawn(async move {
            let event = match events.recv().await {
                Some(event) => event,
                None => WorkerEvent::Error(match unit.await {
                    Err(e) => e.to_string(),
                    Ok(()) => "exited without a reply".to_string(),
                }),
            };

            match event {
                WorkerEvent::Message(processed) => {
                    let snapshot = state.commit(processed);
                    state.refresh_metadata(&snapshot);
                    state.render(&snapshot);
                    OffloadOutcome::Published(snapshot)
                }
                WorkerEvent::Error(reason) => {
                    error!(
                        "Error in dealing graph data: {}",
                        UpdateError::Worker(name, reason)
                    );
                    OffloadOutcome::Failed
                }
            }
        });

        OffloadHandle { worker, task }
    }
}
