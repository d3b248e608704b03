use std::collections::BTreeMap;

/// Arena handle for one DOM node. Copyable; identity is the arena slot,
/// so two handles compare equal iff they name the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub tag: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub attrs: BTreeMap<String, String>,
    pub value: String,
    pub text: Option<String>,
    pub hidden: bool,
    pub connected: bool,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Node {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            value: String::new(),
            text: None,
            hidden: false,
            connected: false,
        }
    }
}
