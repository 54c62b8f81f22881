pub mod config;
pub mod model;
pub mod processors;
pub mod snapshot;

pub use config::{ConfigError, ConfigFile, GraphConfig, WorkerFn, WorkerTarget};
pub use model::{GraphData, Link, MetadataView, Node, SearchState};
pub use snapshot::{Snapshot, SnapshotSlot};
