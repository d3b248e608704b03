pub mod field;
pub mod form;
pub mod listeners;
pub mod tracker;

pub use field::{FieldAction, FieldHandle};
pub use form::{FORM_ID_ATTR, FormHandle, FormId, FormIdGen, PROCESSED_ATTR};
pub use listeners::{ListenerKind, ListenerRegistry};
pub use tracker::{FormTracker, TrackerState};
