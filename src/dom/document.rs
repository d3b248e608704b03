use std::collections::HashMap;

use crate::dom::event::{SyntheticEvent, SyntheticKind};
use crate::dom::node::{Node, NodeId};

/// Arena-backed model of the host page the engine runs against.
///
/// The host (test harness, CLI scenario runner, embedder) owns the document
/// and mutates it; the engine only ever reads it, except for marker
/// attributes, autofill writes, and the synthetic events those dispatch.
/// Every mutation bumps `revision`, standing in for a mutation-observer
/// delivery the host forwards to the engine.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    revision: u64,
    synthetic: Vec<SyntheticEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut body = Node::new("body");
        body.connected = true;
        Document {
            nodes: vec![body],
            body: NodeId(0),
            revision: 0,
            synthetic: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // -------------------------------------------------------------------
    // Construction and mutation
    // -------------------------------------------------------------------

    /// Create a detached element. It joins the document once appended
    /// under a connected parent.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag));
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.node(child).parent.is_none(), "node already parented");
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        if self.node(parent).connected {
            self.set_connected(child, true);
        }
        self.bump();
    }

    /// Detach `node` (and its whole subtree) from the document. Removed
    /// nodes keep their arena slot but report as disconnected; the engine
    /// must treat surviving handles to them as stale.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(parent) = self.node(node).parent {
            let siblings = &mut self.node_mut(parent).children;
            siblings.retain(|&c| c != node);
        }
        self.node_mut(node).parent = None;
        self.set_connected(node, false);
        self.bump();
    }

    fn set_connected(&mut self, node: NodeId, connected: bool) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.node_mut(id).connected = connected;
            stack.extend(self.node(id).children.iter().copied());
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.node_mut(node)
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        self.bump();
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.node_mut(node).attrs.remove(&name.to_ascii_lowercase());
        self.bump();
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.node_mut(node).value = value.to_string();
        self.bump();
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.node_mut(node).text = Some(text.to_string());
        self.bump();
    }

    /// Toggle the `display:none`-style flag. Hiding an ancestor hides the
    /// whole subtree for visibility purposes.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.node_mut(node).hidden = hidden;
        self.bump();
    }

    /// Journal a synthetic event aimed at the page's own scripts.
    pub fn dispatch_synthetic(&mut self, target: NodeId, kind: SyntheticKind) {
        self.synthetic.push(SyntheticEvent { target, kind });
    }

    pub fn synthetic_events(&self) -> &[SyntheticEvent] {
        &self.synthetic
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> &str {
        &self.node(node).tag
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn value(&self, node: NodeId) -> &str {
        &self.node(node).value
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).text.as_deref()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).connected
    }

    /// True iff `node` is `ancestor` or a descendant of it, walking the
    /// live parent chain.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.node(id).parent;
        }
        false
    }

    /// Visibility proxy: connected, no hidden flag on self or any ancestor,
    /// and not an `<input type="hidden">`.
    pub fn is_visible(&self, node: NodeId) -> bool {
        if !self.node(node).connected {
            return false;
        }
        if self.attribute(node, "type") == Some("hidden") {
            return false;
        }
        let mut cur = Some(node);
        while let Some(id) = cur {
            if self.node(id).hidden {
                return false;
            }
            cur = self.node(id).parent;
        }
        true
    }

    /// Depth-first descendants of `node`, in document order, excluding the
    /// node itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(node).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// All connected `<input>`/`<textarea>` elements, in document order.
    pub fn inputs(&self) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|&id| matches!(self.tag(id), "input" | "textarea"))
            .collect()
    }

    /// Document-order rank for every connected node; used as a stable
    /// tie-breaker when scores are equal.
    pub fn document_order(&self) -> HashMap<NodeId, usize> {
        let mut order = HashMap::new();
        order.insert(self.body, 0);
        for (rank, id) in self.descendants(self.body).into_iter().enumerate() {
            order.insert(id, rank + 1);
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_disconnects_subtree() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let input = doc.create_element("input");
        doc.append_child(doc.body(), div);
        doc.append_child(div, input);
        assert!(doc.is_connected(input));

        doc.remove(div);
        assert!(!doc.is_connected(div));
        assert!(!doc.is_connected(input));
        assert!(!doc.contains(doc.body(), input));
    }

    #[test]
    fn hidden_ancestor_masks_visibility() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let input = doc.create_element("input");
        doc.append_child(doc.body(), div);
        doc.append_child(div, input);
        assert!(doc.is_visible(input));

        doc.set_hidden(div, true);
        assert!(!doc.is_visible(input));
        doc.set_hidden(div, false);
        assert!(doc.is_visible(input));
    }

    #[test]
    fn hidden_input_type_is_never_visible() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        doc.append_child(doc.body(), input);
        doc.set_attribute(input, "type", "hidden");
        assert!(!doc.is_visible(input));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut doc = Document::new();
        let before = doc.revision();
        let input = doc.create_element("input");
        doc.append_child(doc.body(), input);
        doc.set_value(input, "x");
        assert!(doc.revision() > before);
    }
}
