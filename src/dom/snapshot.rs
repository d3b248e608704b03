use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::SnapshotError;

/// One node of a serialized page snapshot, as produced by a DOM extraction
/// step or written by hand for fixtures. Nested rather than flat so a
/// fixture reads like the markup it stands for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

/// Build a live document from a snapshot root. A `body` root contributes
/// its children; any other root becomes a child of the implicit body.
pub fn instantiate(root: &SnapshotNode) -> Document {
    let mut doc = Document::new();
    if root.tag.eq_ignore_ascii_case("body") {
        for child in &root.children {
            let id = build(&mut doc, child);
            doc.append_child(doc.body(), id);
        }
    } else {
        let id = build(&mut doc, root);
        doc.append_child(doc.body(), id);
    }
    doc
}

fn build(doc: &mut Document, node: &SnapshotNode) -> NodeId {
    let id = doc.create_element(&node.tag);
    for (name, value) in &node.attrs {
        doc.set_attribute(id, name, value);
    }
    if let Some(text) = &node.text {
        doc.set_text(id, text);
    }
    if let Some(value) = &node.value {
        doc.set_value(id, value);
    }
    if node.hidden {
        doc.set_hidden(id, true);
    }
    for child in &node.children {
        let child_id = build(doc, child);
        doc.append_child(id, child_id);
    }
    id
}

pub fn load_str(json: &str) -> Result<Document, SnapshotError> {
    let root: SnapshotNode = serde_json::from_str(json)?;
    Ok(instantiate(&root))
}

pub fn load_file(path: &Path) -> Result<Document, SnapshotError> {
    let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&json)
}
