use crate::dom::node::NodeId;

/// Events the host page forwards into the engine. Only the kinds the
/// tracked-field listeners care about are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Focus { target: NodeId },
    Input { target: NodeId },
    KeyDown { target: NodeId, key: KeyCode },
    Click { target: NodeId },
    Submit { target: NodeId },
}

impl PageEvent {
    pub fn target(&self) -> NodeId {
        match *self {
            PageEvent::Focus { target }
            | PageEvent::Input { target }
            | PageEvent::KeyDown { target, .. }
            | PageEvent::Click { target }
            | PageEvent::Submit { target } => target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Enter,
    Escape,
    Other,
}

/// A synthetic event dispatched back at the page (e.g. after an autofill
/// write) so page scripts observe the value change. The document journals
/// these instead of routing them anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticEvent {
    pub target: NodeId,
    pub kind: SyntheticKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticKind {
    Input,
    Change,
}
