use serde::{Deserialize, Serialize};

use crate::detect::FieldKind;
use crate::dom::{Document, NodeId, SyntheticKind};
use crate::track::form::FormId;
use crate::track::listeners::{ListenerKind, ListenerRegistry};
use crate::ui::{IconHandle, UiPort};

/// UI affordance assigned to a field; at most one at a time, reassigned
/// whenever the owning tracker recomputes field roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    Autofill,
    AutosuggestAlias,
    AutosuggestPassword,
}

/// Tracking wrapper around one input/button element. Owned by exactly one
/// form handle; the back-reference is a plain id, so a field can never
/// extend its form's lifetime. All DOM access is guarded — elements can be
/// ripped out of the document between an event firing and the handler
/// running, and that is a no-op here, never an error.
#[derive(Debug)]
pub struct FieldHandle {
    element: NodeId,
    kind: FieldKind,
    form: FormId,
    value: String,
    action: Option<FieldAction>,
    icon: Option<IconHandle>,
}

impl FieldHandle {
    pub fn new(element: NodeId, kind: FieldKind, form: FormId) -> Self {
        FieldHandle {
            element,
            kind,
            form,
            value: String::new(),
            action: None,
            icon: None,
        }
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn form_id(&self) -> FormId {
        self.form
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn action(&self) -> Option<FieldAction> {
        self.action
    }

    pub fn icon(&self) -> Option<IconHandle> {
        self.icon
    }

    /// Pure state update; the DOM is not written.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// Mirror the live element's value into the tracked copy.
    pub fn sync_value(&mut self, doc: &Document) {
        if doc.is_connected(self.element) {
            self.value = doc.value(self.element).to_string();
        }
    }

    pub fn set_action(&mut self, action: Option<FieldAction>) {
        self.action = action;
    }

    /// Write the element's value and dispatch synthetic input/change events
    /// so page scripts observe the change. No-op on a detached element.
    pub fn autofill(&mut self, doc: &mut Document, value: &str) {
        if !doc.is_connected(self.element) {
            return;
        }
        doc.set_value(self.element, value);
        doc.dispatch_synthetic(self.element, SyntheticKind::Input);
        doc.dispatch_synthetic(self.element, SyntheticKind::Change);
        self.value = value.to_string();
    }

    /// Idempotent: an existing icon only has its action updated. Skips
    /// construction for elements that are currently not visible (hidden
    /// decoys are common).
    pub fn attach_icon(&mut self, doc: &Document, ui: &mut dyn UiPort, action: FieldAction) {
        if let Some(icon) = self.icon {
            ui.update_icon_action(icon, action);
            return;
        }
        if !doc.is_visible(self.element) {
            return;
        }
        self.icon = Some(ui.inject_icon(self.element, action));
    }

    /// Safe to call with no icon attached.
    pub fn detach_icon(&mut self, ui: &mut dyn UiPort) {
        if let Some(icon) = self.icon.take() {
            ui.remove_icon(icon);
        }
    }

    fn listener_kinds(&self) -> &'static [ListenerKind] {
        match self.kind {
            FieldKind::Submit => &[ListenerKind::Click],
            _ => &[ListenerKind::Focus, ListenerKind::Input, ListenerKind::KeyDown],
        }
    }

    /// Detach-then-bind, so re-attachment across SPA re-renders can never
    /// stack duplicate handlers.
    pub fn attach_listeners(&mut self, registry: &mut ListenerRegistry) {
        self.detach_listeners(registry);
        for &kind in self.listener_kinds() {
            registry.bind(self.element, kind, self.form);
        }
    }

    pub fn detach_listeners(&mut self, registry: &mut ListenerRegistry) {
        for &kind in self.listener_kinds() {
            registry.unbind(self.element, kind);
        }
    }
}
