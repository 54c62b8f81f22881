use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::model::GraphData;
use crate::processors;

/// Processing routine run inside a background unit.
pub type WorkerFn = Arc<dyn Fn(GraphData) -> Result<GraphData, String> + Send + Sync>;

/// A named background processing routine that updates are offloaded to.
#[derive(Clone)]
pub struct WorkerTarget {
    name: String,
    process: WorkerFn,
}

impl WorkerTarget {
    pub fn new<F>(name: impl Into<String>, process: F) -> Self
    where
        F: Fn(GraphData) -> Result<GraphData, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            process: Arc::new(process),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the routine, for moving into a spawned unit.
    pub fn process(&self) -> WorkerFn {
        self.process.clone()
    }
}

impl fmt::Debug for WorkerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerTarget")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Read-only settings of a graph instance.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Show node/link counters after each update
    pub metadata: bool,
    /// Offload processing of new data to this routine instead of publishing directly
    pub worker: Option<WorkerTarget>,
}

impl GraphConfig {
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_worker(mut self, worker: WorkerTarget) -> Self {
        self.worker = Some(worker);
        self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown worker '{0}' (available: {1})")]
    UnknownWorker(String, String),
}

/// On-disk form of [`GraphConfig`]. Workers are referenced by built-in name.
///
/// ```json
/// { "metadata": true, "worker": "prune" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub metadata: bool,
    #[serde(default)]
    pub worker: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_config(self) -> Result<GraphConfig, ConfigError> {
        let worker = match self.worker {
            Some(name) => Some(resolve_worker(&name)?),
            None => None,
        };
        Ok(GraphConfig {
            metadata: self.metadata,
            worker,
        })
    }
}

/// Look up a built-in worker by name.
pub fn resolve_worker(name: &str) -> Result<WorkerTarget, ConfigError> {
    processors::builtin(name).ok_or_else(|| {
        ConfigError::UnknownWorker(name.to_string(), processors::BUILTIN_NAMES.join(", "))
    })
}
