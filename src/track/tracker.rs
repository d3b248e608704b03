use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::detect::{FieldKind, FormKind};
use crate::dom::{Document, NodeId};
use crate::engine::context::ScriptContext;
use crate::track::field::{FieldAction, FieldHandle};
use crate::track::form::FormId;
use crate::track::listeners::{ListenerKind, ListenerRegistry};
use crate::ui::UiPort;
use crate::worker::messages::{CredentialPair, WorkerRequest};
use crate::worker::port::BackgroundPort;

pub type FieldMap = BTreeMap<FieldKind, Vec<FieldHandle>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Submitting,
}

/// Per-form submission-capture state machine. Created once per form handle
/// on first attach and reused across attach/detach cycles; the cooldown
/// window coalesces the burst of submit events a single user action
/// typically fires (click + Enter + native submit) into one staged
/// submission.
#[derive(Debug, Default)]
pub struct FormTracker {
    cooldown_until: Option<u64>,
}

impl FormTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, now: u64) -> TrackerState {
        if self.is_submitting(now) {
            TrackerState::Submitting
        } else {
            TrackerState::Idle
        }
    }

    pub fn is_submitting(&self, now: u64) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Wire listeners and recompute field roles. Runs on every attach, so
    /// an already-attached form re-running this is only a role refresh.
    pub(crate) fn attach(
        &mut self,
        kind: FormKind,
        form_id: FormId,
        form_element: NodeId,
        fields: &mut FieldMap,
        doc: &Document,
        ctx: &ScriptContext,
        registry: &mut ListenerRegistry,
        ui: &mut dyn UiPort,
    ) {
        set_field_actions(kind, fields, doc, ctx, ui);

        for list in fields.values_mut() {
            for field in list.iter_mut() {
                field.attach_listeners(registry);
            }
        }
        registry.bind(form_element, ListenerKind::Submit, form_id);
    }

    /// Unbind everything `attach` wired and drop the icons. The cooldown
    /// survives: a detach mid-window must not re-open the staging gate.
    pub(crate) fn detach(
        &mut self,
        form_element: NodeId,
        fields: &mut FieldMap,
        registry: &mut ListenerRegistry,
        ui: &mut dyn UiPort,
    ) {
        for list in fields.values_mut() {
            for field in list.iter_mut() {
                field.detach_listeners(registry);
                field.detach_icon(ui);
                field.set_action(None);
            }
        }
        registry.unbind(form_element, ListenerKind::Submit);
    }

    /// A submit trigger fired (native submit, submit-button click, or
    /// Enter in a tracked field). Coalesced by the cooldown; stages a
    /// submission only when a username value is present. Fire-and-forget:
    /// staging failures are logged, never surfaced.
    pub(crate) fn handle_submit_trigger(
        &mut self,
        kind: FormKind,
        form_element: NodeId,
        fields: &mut FieldMap,
        doc: &Document,
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        now: u64,
    ) {
        if self.is_submitting(now) {
            return;
        }
        self.cooldown_until = Some(now + ctx.settings.tuning.submit_cooldown_ms);

        ui.close_dropdown();

        for list in fields.values_mut() {
            for field in list.iter_mut() {
                field.sync_value(doc);
            }
        }

        let username = first_value(fields, FieldKind::is_username_like);
        let password = first_value(fields, FieldKind::is_password_like);

        let Some(username) = username else {
            debug!(form = %form_element.index(), "submit without username value, nothing to stage");
            return;
        };

        let action = doc
            .attribute(form_element, "action")
            .unwrap_or(&ctx.frame.url)
            .to_string();

        let request = WorkerRequest::FormEntryStage {
            form_kind: kind,
            action,
            reason: "FormSubmit".to_string(),
            data: CredentialPair {
                username,
                password: password.unwrap_or_default(),
            },
        };
        match port.request(request) {
            Ok(id) => debug!(?id, "staged submission attempt"),
            Err(err) => warn!(%err, "failed to stage submission attempt"),
        }
    }
}

// Field-map iteration order is the kind declaration order, which doubles
// as the staging priority (Username before Email, current before new).
fn first_value(fields: &FieldMap, accept: fn(FieldKind) -> bool) -> Option<String> {
    fields
        .iter()
        .filter(|(kind, _)| accept(**kind))
        .flat_map(|(_, list)| list)
        .find(|field| !field.value().is_empty())
        .map(|field| field.value().to_string())
}

/// Recompute every field's assigned action and icons for the form's
/// classification. Exhaustive over the closed kind set so new kinds can't
/// silently fall through.
fn set_field_actions(
    kind: FormKind,
    fields: &mut FieldMap,
    doc: &Document,
    ctx: &ScriptContext,
    ui: &mut dyn UiPort,
) {
    for list in fields.values_mut() {
        for field in list.iter_mut() {
            field.set_action(None);
        }
    }

    match kind {
        FormKind::Login => {
            // Multi-step forms show one field at a time: autofill every
            // visible credential field, icon only on the first of them.
            let mut icon_placed = false;
            for k in [
                FieldKind::Username,
                FieldKind::Email,
                FieldKind::PasswordCurrent,
                FieldKind::PasswordNew,
            ] {
                if let Some(list) = fields.get_mut(&k) {
                    for field in list.iter_mut() {
                        if !doc.is_visible(field.element()) {
                            continue;
                        }
                        field.set_action(Some(FieldAction::Autofill));
                        if !icon_placed {
                            field.attach_icon(doc, ui, FieldAction::Autofill);
                            icon_placed = true;
                        }
                    }
                }
            }
        }

        FormKind::Register => {
            // No alias offer on the user's own mail provider.
            let alias_allowed = !ctx.settings.is_email_provider(&ctx.frame.domain);
            if alias_allowed {
                if let Some(field) = first_field_mut(fields, &[FieldKind::Email, FieldKind::Username])
                {
                    field.set_action(Some(FieldAction::AutosuggestAlias));
                    field.attach_icon(doc, ui, FieldAction::AutosuggestAlias);
                }
            }
            if let Some(field) =
                first_field_mut(fields, &[FieldKind::PasswordNew, FieldKind::PasswordCurrent])
            {
                field.set_action(Some(FieldAction::AutosuggestPassword));
                field.attach_icon(doc, ui, FieldAction::AutosuggestPassword);
            }
        }

        FormKind::Recovery | FormKind::PasswordChange | FormKind::Mfa | FormKind::Noop => {}
    }
}

fn first_field_mut<'a>(fields: &'a mut FieldMap, kinds: &[FieldKind]) -> Option<&'a mut FieldHandle> {
    let target = kinds
        .iter()
        .find(|k| fields.get(k).is_some_and(|l| !l.is_empty()))?;
    fields.get_mut(target)?.first_mut()
}
