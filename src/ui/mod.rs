pub mod recording;

pub use recording::{RecordingUi, UiCall};

use crate::dom::NodeId;
use crate::track::field::FieldAction;
use crate::worker::messages::{LoginItem, SubmissionRecord};

/// Handle to one injected inline icon. Opaque; the visual sub-app owns the
/// node it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownRequest {
    pub field: NodeId,
    pub action: FieldAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub submission: SubmissionRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    AutosavePrompt,
}

/// Capability boundary to the visual sub-apps (inline icons, dropdown,
/// notification). The engine only triggers them; positioning math and
/// rendering live on the other side. Implementations must tolerate calls
/// against already-gone affordances (remove twice, close when closed).
pub trait UiPort {
    /// Whether the visual layer is ready to take open requests. Dropdown
    /// opens against an unready layer are retried a bounded number of
    /// times by the caller, then dropped.
    fn ready(&self) -> bool;

    fn inject_icon(&mut self, field: NodeId, action: FieldAction) -> IconHandle;
    fn update_icon_action(&mut self, icon: IconHandle, action: FieldAction);
    fn remove_icon(&mut self, icon: IconHandle);

    /// Returns false when the layer was not ready to open.
    fn open_dropdown(&mut self, request: DropdownRequest) -> bool;
    fn close_dropdown(&mut self);
    fn dropdown_field(&self) -> Option<NodeId>;
    fn show_dropdown_items(&mut self, items: &[LoginItem]);

    fn open_notification(&mut self, request: NotificationRequest);

    /// Close everything transient (dropdown, notification) but keep icons.
    fn reset(&mut self);

    /// Tear down every affordance; used on content-script destroy.
    fn destroy(&mut self);
}
