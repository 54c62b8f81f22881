pub mod error;
pub mod history;
pub mod hooks;
pub mod pipeline;
pub mod search;
pub mod source;
pub mod worker;

pub use error::UpdateError;
pub use history::{NavigationHistory, Traversal};
pub use hooks::{LoadHook, MetadataDisplay, MetadataPanel, NoopHook, Renderer};
pub use pipeline::{DataUpdatePipeline, GraphState, UpdateOutcome};
pub use search::{PendingFetch, SearchSyncController};
pub use source::{DataSource, JsonSourceParser, Normalizer, build_client};
pub use worker::{OffloadHandle, OffloadOutcome, WorkerOffloadChannel};
