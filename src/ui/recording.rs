use std::collections::HashMap;

use crate::dom::NodeId;
use crate::track::field::FieldAction;
use crate::ui::{DropdownRequest, IconHandle, NotificationRequest, UiPort};
use crate::worker::messages::LoginItem;

/// Journal entry for one call into the visual layer. Tests and the CLI
/// assert on these instead of on pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    InjectIcon { field: NodeId, action: FieldAction },
    UpdateIconAction { icon: IconHandle, action: FieldAction },
    RemoveIcon { icon: IconHandle },
    OpenDropdown(DropdownRequest),
    CloseDropdown,
    ShowDropdownItems { count: usize },
    OpenNotification(NotificationRequest),
    Reset,
    Destroy,
}

/// In-memory `UiPort` that records every call and models just enough state
/// (live icons, the open dropdown) for the engine's invariants to be
/// observable.
#[derive(Debug, Default)]
pub struct RecordingUi {
    unready: bool,
    next_icon: u64,
    icons: HashMap<IconHandle, (NodeId, FieldAction)>,
    dropdown: Option<DropdownRequest>,
    pub journal: Vec<UiCall>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A UI layer whose iframe never signals readiness.
    pub fn never_ready() -> Self {
        RecordingUi {
            unready: true,
            ..Self::default()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.unready = !ready;
    }

    pub fn live_icons(&self) -> usize {
        self.icons.len()
    }

    pub fn icons_on(&self, field: NodeId) -> usize {
        self.icons.values().filter(|(f, _)| *f == field).count()
    }

    pub fn icon_action_on(&self, field: NodeId) -> Option<FieldAction> {
        self.icons
            .values()
            .find(|(f, _)| *f == field)
            .map(|&(_, action)| action)
    }

    pub fn open_dropdown_request(&self) -> Option<DropdownRequest> {
        self.dropdown
    }

    pub fn notifications(&self) -> impl Iterator<Item = &NotificationRequest> {
        self.journal.iter().filter_map(|call| match call {
            UiCall::OpenNotification(req) => Some(req),
            _ => None,
        })
    }
}

impl UiPort for RecordingUi {
    fn ready(&self) -> bool {
        !self.unready
    }

    fn inject_icon(&mut self, field: NodeId, action: FieldAction) -> IconHandle {
        self.next_icon += 1;
        let icon = IconHandle(self.next_icon);
        self.icons.insert(icon, (field, action));
        self.journal.push(UiCall::InjectIcon { field, action });
        icon
    }

    fn update_icon_action(&mut self, icon: IconHandle, action: FieldAction) {
        if let Some(entry) = self.icons.get_mut(&icon) {
            entry.1 = action;
        }
        self.journal.push(UiCall::UpdateIconAction { icon, action });
    }

    fn remove_icon(&mut self, icon: IconHandle) {
        self.icons.remove(&icon);
        self.journal.push(UiCall::RemoveIcon { icon });
    }

    fn open_dropdown(&mut self, request: DropdownRequest) -> bool {
        if self.unready {
            return false;
        }
        self.dropdown = Some(request);
        self.journal.push(UiCall::OpenDropdown(request));
        true
    }

    fn close_dropdown(&mut self) {
        if self.dropdown.take().is_some() {
            self.journal.push(UiCall::CloseDropdown);
        }
    }

    fn dropdown_field(&self) -> Option<NodeId> {
        self.dropdown.map(|d| d.field)
    }

    fn show_dropdown_items(&mut self, items: &[LoginItem]) {
        self.journal.push(UiCall::ShowDropdownItems { count: items.len() });
    }

    fn open_notification(&mut self, request: NotificationRequest) {
        self.journal.push(UiCall::OpenNotification(request));
    }

    fn reset(&mut self) {
        self.dropdown = None;
        self.journal.push(UiCall::Reset);
    }

    fn destroy(&mut self) {
        self.dropdown = None;
        self.icons.clear();
        self.journal.push(UiCall::Destroy);
    }
}
