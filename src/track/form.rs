use std::fmt;

use crate::detect::adapter::DetectedForm;
use crate::detect::{FieldKind, FormKind};
use crate::dom::{Document, NodeId};
use crate::engine::context::ScriptContext;
use crate::track::field::FieldHandle;
use crate::track::listeners::ListenerRegistry;
use crate::track::tracker::{FieldMap, FormTracker};
use crate::ui::UiPort;
use crate::worker::port::BackgroundPort;

/// Marker set on every input inspected by a detection assessment, cleared
/// on form detach. Purely an amortization device: a marked input is never
/// re-counted as "new" by the cheap pre-check.
pub const PROCESSED_ATTR: &str = "data-formwatch-processed";

/// Marker carrying the handle id on an attached form's root element.
/// Observability only; no logic reads it back.
pub const FORM_ID_ATTR: &str = "data-formwatch-form";

/// Opaque handle id, stable for the handle's lifetime. A DOM element that
/// reappears after its handle was discarded gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(u64);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fw-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct FormIdGen {
    next: u64,
}

impl FormIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> FormId {
        self.next += 1;
        FormId(self.next)
    }
}

/// Tracking wrapper around one detected form element. Owns its field
/// handles and (lazily) its tracker. Never resurrected: once detached and
/// discarded, a re-detected element gets a brand-new handle.
#[derive(Debug)]
pub struct FormHandle {
    id: FormId,
    element: NodeId,
    kind: FormKind,
    score: f32,
    fields: FieldMap,
    tracker: Option<FormTracker>,
    attached: bool,
}

impl FormHandle {
    pub fn new(id: FormId, detected: DetectedForm) -> Self {
        let mut fields: FieldMap = FieldMap::new();
        for (kind, elements) in detected.fields {
            let handles = elements
                .into_iter()
                .map(|el| FieldHandle::new(el, kind, id))
                .collect();
            fields.insert(kind, handles);
        }
        FormHandle {
            id,
            element: detected.element,
            kind: detected.kind,
            score: detected.score,
            fields,
            tracker: None,
            attached: false,
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn fields_of(&self, kind: FieldKind) -> &[FieldHandle] {
        self.fields.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn fields_of_mut(&mut self, kind: FieldKind) -> Option<&mut Vec<FieldHandle>> {
        self.fields.get_mut(&kind)
    }

    pub fn all_fields(&self) -> impl Iterator<Item = &FieldHandle> {
        self.fields.values().flatten()
    }

    pub fn all_fields_mut(&mut self) -> impl Iterator<Item = &mut FieldHandle> {
        self.fields.values_mut().flatten()
    }

    pub fn field_by_element(&mut self, element: NodeId) -> Option<&mut FieldHandle> {
        self.all_fields_mut().find(|f| f.element() == element)
    }

    pub fn tracker(&self) -> Option<&FormTracker> {
        self.tracker.as_ref()
    }

    /// True iff the form's element is no longer in the document body.
    pub fn should_remove(&self, doc: &Document) -> bool {
        !doc.is_connected(self.element)
    }

    /// True iff a tracked input field escaped the form element (framework
    /// re-parenting without a full removal). Submit fields are exempt —
    /// an adopted dangling button legitimately lives outside the form.
    pub fn should_update(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .filter(|(kind, _)| **kind != FieldKind::Submit)
            .flat_map(|(_, list)| list)
            .any(|field| !doc.contains(self.element, field.element()))
    }

    /// Lazily create the tracker and wire it up. Idempotent beyond the
    /// field-role recomputation.
    pub fn attach(
        &mut self,
        doc: &mut Document,
        ctx: &ScriptContext,
        registry: &mut ListenerRegistry,
        ui: &mut dyn UiPort,
    ) {
        if doc.is_connected(self.element) {
            doc.set_attribute(self.element, FORM_ID_ATTR, &self.id.to_string());
        }
        let tracker = self.tracker.get_or_insert_with(FormTracker::new);
        tracker.attach(
            self.kind,
            self.id,
            self.element,
            &mut self.fields,
            doc,
            ctx,
            registry,
            ui,
        );
        self.attached = true;
    }

    /// Symmetric counterpart of `attach`: unbind listeners, drop icons,
    /// and clear every marker so a future detection pass treats these
    /// elements as untracked again.
    pub fn detach(&mut self, doc: &mut Document, registry: &mut ListenerRegistry, ui: &mut dyn UiPort) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.detach(self.element, &mut self.fields, registry, ui);
        }
        doc.remove_attribute(self.element, FORM_ID_ATTR);
        for input in doc.descendants(self.element) {
            if matches!(doc.tag(input), "input" | "textarea") {
                doc.remove_attribute(input, PROCESSED_ATTR);
            }
        }
        self.attached = false;
    }

    /// Route a submit trigger to the tracker.
    pub fn handle_submit(
        &mut self,
        doc: &Document,
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        now: u64,
    ) {
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };
        tracker.handle_submit_trigger(
            self.kind,
            self.element,
            &mut self.fields,
            doc,
            ctx,
            ui,
            port,
            now,
        );
    }
}
