pub mod document;
pub mod event;
pub mod node;
pub mod snapshot;

pub use document::Document;
pub use event::{KeyCode, PageEvent, SyntheticEvent, SyntheticKind};
pub use node::NodeId;
