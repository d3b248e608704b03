use std::collections::HashMap;

use crate::dom::NodeId;
use crate::track::form::FormId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Focus,
    Input,
    KeyDown,
    Click,
    Submit,
}

/// Engine-side registry of DOM listener bindings. At most one binding per
/// (node, kind) can exist — binding is an overwrite, so repeated
/// attach/detach cycles can never stack duplicate handlers.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    bound: HashMap<NodeId, HashMap<ListenerKind, FormId>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, node: NodeId, kind: ListenerKind, owner: FormId) {
        self.bound.entry(node).or_default().insert(kind, owner);
    }

    pub fn unbind(&mut self, node: NodeId, kind: ListenerKind) {
        if let Some(kinds) = self.bound.get_mut(&node) {
            kinds.remove(&kind);
            if kinds.is_empty() {
                self.bound.remove(&node);
            }
        }
    }

    pub fn unbind_node(&mut self, node: NodeId) {
        self.bound.remove(&node);
    }

    pub fn owner_of(&self, node: NodeId, kind: ListenerKind) -> Option<FormId> {
        self.bound.get(&node).and_then(|kinds| kinds.get(&kind)).copied()
    }

    /// Number of bindings of `kind` on `node`; structurally 0 or 1.
    pub fn count(&self, node: NodeId, kind: ListenerKind) -> usize {
        usize::from(self.owner_of(node, kind).is_some())
    }

    pub fn bindings_on(&self, node: NodeId) -> usize {
        self.bound.get(&node).map_or(0, HashMap::len)
    }

    pub fn total(&self) -> usize {
        self.bound.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.bound.clear();
    }
}
