use colored::Colorize;
use netgraph_core::{MetadataView, Snapshot};
use netgraph_pipeline::Renderer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Renders snapshots as text. Frames are buffered so the caller can print
/// them once any spinner has been cleared.
pub struct TerminalRenderer {
    max_nodes: usize,
    rendered: AtomicUsize,
    pending: Mutex<Option<String>>,
}

impl TerminalRenderer {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            rendered: AtomicUsize::new(0),
            pending: Mutex::new(None),
        }
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> usize {
        self.rendered.load(Ordering::SeqCst)
    }

    /// Latest frame not yet taken. Older untaken frames are dropped.
    pub fn take_frame(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, snapshot: &Snapshot) {
        let frame = format_snapshot(snapshot, self.max_nodes);
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
        self.rendered.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn format_snapshot(snapshot: &Snapshot, max_nodes: usize) -> String {
    let mut out = String::new();
    let title = snapshot
        .extra
        .get("label")
        .and_then(|v| v.as_str())
        .unwrap_or("Network graph");

    out.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));
    out.push_str(&format!("  {}\n", title.bright_white().bold()));
    out.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));

    for node in snapshot.nodes.iter().take(max_nodes) {
        let degree = match node.id_key() {
            Some(id) => snapshot
                .links
                .iter()
                .filter(|l| {
                    l.source_key().as_ref() == Some(&id) || l.target_key().as_ref() == Some(&id)
                })
                .count(),
            None => 0,
        };
        out.push_str(&format!(
            "  {} {} {}\n",
            "•".cyan(),
            node.display_name(),
            format!("({} links)", degree).dimmed()
        ));
    }
    if snapshot.node_count() > max_nodes {
        out.push_str(&format!(
            "  {}\n",
            format!("… {} more", snapshot.node_count() - max_nodes).dimmed()
        ));
    }
    out
}

pub fn format_metadata(view: &MetadataView) -> String {
    if !view.visible {
        return String::new();
    }
    format!(
        "{} Nodes: {}  Links: {}",
        "ℹ".blue(),
        view.nodes.to_string().cyan(),
        view.links.to_string().cyan()
    )
}
