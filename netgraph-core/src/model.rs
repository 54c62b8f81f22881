use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A topology document: the nodes and links the viewer draws.
///
/// Only the lengths of `nodes` and `links` are interpreted. Their entries and
/// every other top-level field (NetJSON `type`, `label`, `protocol`, ...) are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `nodes`, kept as the JSON it arrived as.
///
/// Nothing inside is required: ids may be strings or numbers, or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node {
    pub raw: Value,
}

/// One entry of `links`, kept as the JSON it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Link {
    pub raw: Value,
}

/// Identity of a JSON scalar. Strings are taken as-is and numbers in their
/// decimal form, so `1` and `"1"` name the same node.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn insert_field(raw: &mut Value, key: String, value: Value) {
    if let Some(map) = raw.as_object_mut() {
        map.insert(key, value);
    }
}

/// State attached to one navigation-history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    #[serde(rename = "searchValue")]
    pub search_value: String,
}

/// Counters shown in the metadata panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataView {
    pub nodes: usize,
    pub links: usize,
    pub visible: bool,
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            nodes,
            links,
            extra: Map::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Decode a document from raw JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self {
            raw: json!({ "id": id }),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.insert("label", Value::String(label.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Set a field. Entries that are not JSON objects are left alone.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        insert_field(&mut self.raw, key.into(), value);
    }

    pub fn id_key(&self) -> Option<String> {
        self.get("id").and_then(scalar_key)
    }

    pub fn label(&self) -> Option<&str> {
        self.get("label").and_then(Value::as_str)
    }

    /// Label, then id, then a placeholder.
    pub fn display_name(&self) -> String {
        self.get("label")
            .and_then(scalar_key)
            .or_else(|| self.id_key())
            .unwrap_or_else(|| "(unnamed)".to_string())
    }
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let (source, target): (String, String) = (source.into(), target.into());
        Self {
            raw: json!({ "source": source, "target": target }),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.insert("cost", json!(cost));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        insert_field(&mut self.raw, key.into(), value);
    }

    pub fn source_key(&self) -> Option<String> {
        self.get("source").and_then(scalar_key)
    }

    pub fn target_key(&self) -> Option<String> {
        self.get("target").and_then(scalar_key)
    }

    pub fn cost(&self) -> Option<f64> {
        self.get("cost").and_then(Value::as_f64)
    }
}

impl SearchState {
    pub fn new(search_value: impl Into<String>) -> Self {
        Self {
            search_value: search_value.into(),
        }
    }
}

impl MetadataView {
    /// Visible panel showing the counts of `data`.
    pub fn of(data: &GraphData) -> Self {
        Self {
            nodes: data.node_count(),
            links: data.link_count(),
            visible: true,
        }
    }
}
