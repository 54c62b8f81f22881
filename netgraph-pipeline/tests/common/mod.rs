// Shared fixtures for pipeline integration tests

#![allow(dead_code)]

use netgraph_core::{GraphConfig, GraphData, Link, Node, Snapshot};
use netgraph_pipeline::{
    DataUpdatePipeline, GraphState, JsonSourceParser, LoadHook, MetadataPanel, Renderer,
    build_client,
};
use std::io;
use std::sync::{Arc, Mutex};

/// Renderer that remembers every snapshot it was asked to draw.
#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Mutex<Vec<Snapshot>>,
}

impl RecordingRenderer {
    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, snapshot: &Snapshot) {
        self.frames.lock().unwrap().push(snapshot.clone());
    }
}

/// Collects WARN and ERROR log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hook whose `on_load` always fails.
pub struct FailingHook;

impl LoadHook for FailingHook {
    fn on_load(&self) -> anyhow::Result<()> {
        anyhow::bail!("loading overlay unavailable")
    }
}

/// Hook that tags every node with a `prepared` property.
pub struct TaggingHook;

impl LoadHook for TaggingHook {
    fn on_load(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn prepare_data(&self, data: &mut GraphData) -> anyhow::Result<()> {
        for node in &mut data.nodes {
            node.insert("prepared", serde_json::Value::Bool(true));
        }
        Ok(())
    }
}

pub struct Harness {
    pub pipeline: Arc<DataUpdatePipeline>,
    pub renderer: Arc<RecordingRenderer>,
    pub panel: Arc<MetadataPanel>,
}

impl Harness {
    pub fn new(config: GraphConfig) -> Self {
        Self::with_hook(config, None)
    }

    pub fn with_hook(config: GraphConfig, hook: Option<Arc<dyn LoadHook>>) -> Self {
        let renderer = Arc::new(RecordingRenderer::default());
        let panel = Arc::new(MetadataPanel::new());
        let mut state = GraphState::new(config, renderer.clone(), panel.clone());
        if let Some(hook) = hook {
            state = state.with_hook(hook);
        }
        let normalizer = Arc::new(JsonSourceParser::new(build_client().unwrap()));
        let pipeline = Arc::new(DataUpdatePipeline::new(Arc::new(state), normalizer));
        Self {
            pipeline,
            renderer,
            panel,
        }
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.pipeline.state().snapshot()
    }
}

/// Chain graph `n0 - n1 - ... - n{count-1}`.
pub fn chain(prefix: &str, count: usize) -> GraphData {
    let nodes = (0..count)
        .map(|i| Node::new(format!("{}{}", prefix, i)))
        .collect();
    let links = (1..count)
        .map(|i| Link::new(format!("{}{}", prefix, i - 1), format!("{}{}", prefix, i)))
        .collect();
    GraphData::new(nodes, links)
}

pub fn chain_json(prefix: &str, count: usize) -> String {
    serde_json::to_string(&chain(prefix, count)).unwrap()
}
