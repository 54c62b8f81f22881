//! Narrow interfaces to the parts of the viewer the pipeline drives but does
//! not own: the renderer, the metadata panel and the load hook.

use netgraph_core::{GraphData, MetadataView, Snapshot};
use std::sync::{PoisonError, RwLock};

/// Element ids of the metadata panel.
pub const METADATA_NODES_ID: &str = "metadataNodesLength";
pub const METADATA_LINKS_ID: &str = "metadataLinksLength";
pub const METADATA_PANEL_ID: &str = "njg-metadata";

/// Redraw signal. Called once after every publish.
pub trait Renderer: Send + Sync {
    fn render(&self, snapshot: &Snapshot);
}

/// Surface showing node/link counters.
pub trait MetadataDisplay: Send + Sync {
    fn show(&self, view: MetadataView);
}

/// Runs before new data is applied.
pub trait LoadHook: Send + Sync {
    fn on_load(&self) -> anyhow::Result<()>;

    /// Adjust the incoming document before it gets frozen.
    fn prepare_data(&self, _data: &mut GraphData) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl LoadHook for NoopHook {
    fn on_load(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-memory metadata panel. Holds the last view shown.
#[derive(Debug, Default)]
pub struct MetadataPanel {
    view: RwLock<MetadataView>,
}

impl MetadataPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> MetadataView {
        *self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Text content of the element with the given id, if it exists. The
    /// panel itself reads `visible` or `hidden`.
    pub fn element_text(&self, id: &str) -> Option<String> {
        let view = self.view();
        match id {
            METADATA_NODES_ID => Some(view.nodes.to_string()),
            METADATA_LINKS_ID => Some(view.links.to_string()),
            METADATA_PANEL_ID if view.visible => Some("visible".to_string()),
            METADATA_PANEL_ID => Some("hidden".to_string()),
            _ => None,
        }
    }
}

impl MetadataDisplay for MetadataPanel {
    fn show(&self, view: MetadataView) {
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = view;
    }
}
