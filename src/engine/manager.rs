use tracing::{debug, warn};

use crate::detect::predictor::FormPredictor;
use crate::detect::scheduler::{assess, run_detection};
use crate::detect::{DetectionTuning, FormKind};
use crate::dom::{Document, KeyCode, PageEvent};
use crate::engine::autosave::Autosave;
use crate::engine::context::ScriptContext;
use crate::engine::timers::Debouncer;
use crate::track::field::FieldAction;
use crate::track::form::{FormHandle, FormId, FormIdGen};
use crate::track::listeners::{ListenerKind, ListenerRegistry};
use crate::ui::{DropdownRequest, UiPort};
use crate::worker::messages::{WorkerRequest, WorkerResponse};
use crate::worker::port::{BackgroundPort, RequestId};

/// Why a detection pass is running; logged, never branched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectReason {
    InitialLoad,
    DomMutation,
    Resume,
    WakeUp,
}

/// How many ticks a dropdown-open request waits for an unready visual
/// layer before it is dropped.
const DROPDOWN_RETRY_LIMIT: u8 = 3;

/// Top-level owner of the tracked-forms set for one document/frame. Wires
/// the mutation-observer debounce to the detection scheduler, routes page
/// events to trackers, and owns the autosave reconciliation round.
pub struct FormManager {
    tracked: Vec<FormHandle>,
    ids: FormIdGen,
    registry: ListenerRegistry,
    mutation_debounce: Debouncer,
    observing: bool,
    pending_dropdown: Option<(DropdownRequest, u8)>,
    autosave: Autosave,
}

impl FormManager {
    pub fn new(tuning: &DetectionTuning) -> Self {
        FormManager {
            tracked: Vec::new(),
            ids: FormIdGen::new(),
            registry: ListenerRegistry::new(),
            mutation_debounce: Debouncer::new(tuning.mutation_debounce_ms),
            observing: false,
            pending_dropdown: None,
            autosave: Autosave::new(),
        }
    }

    pub fn tracked(&self) -> &[FormHandle] {
        &self.tracked
    }

    pub fn tracked_kinds(&self) -> Vec<FormKind> {
        self.tracked.iter().map(FormHandle::kind).collect()
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Start watching for mutations. Idempotent; re-attaches anything
    /// already tracked, which covers the resume-after-sleep case.
    pub fn observe(&mut self, doc: &mut Document, ctx: &ScriptContext, ui: &mut dyn UiPort) {
        self.observing = true;
        for form in self.tracked.iter_mut() {
            form.attach(doc, ctx, &mut self.registry, ui);
        }
    }

    /// Stop observing and release everything: pending timers, listener
    /// bindings, icons, tracked handles. Used when the tab goes hidden.
    pub fn sleep(&mut self, doc: &mut Document, ui: &mut dyn UiPort) {
        self.observing = false;
        self.mutation_debounce.cancel();
        self.pending_dropdown = None;
        for form in self.tracked.iter_mut() {
            form.detach(doc, &mut self.registry, ui);
        }
        self.tracked.clear();
        self.registry.clear();
    }

    /// Mutation-observer callback: coalesce bursts into one assessment.
    pub fn on_dom_mutation(&mut self, now: u64) {
        if self.observing {
            self.mutation_debounce.schedule(now);
        }
    }

    /// Drive due timers. The debounced assessment runs the expensive
    /// classifier only when the cheap pre-check says new untracked inputs
    /// exist or tracked forms went stale.
    pub fn tick(
        &mut self,
        doc: &mut Document,
        ctx: &ScriptContext,
        predictor: &dyn FormPredictor,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        now: u64,
    ) {
        if self.mutation_debounce.fire_due(now) {
            let assessment = assess(doc, &self.tracked);
            if !assessment.is_noop() {
                self.detect(doc, ctx, predictor, ui, port, DetectReason::DomMutation, now);
            }
        }

        if let Some((request, retries)) = self.pending_dropdown.take() {
            if ui.open_dropdown(request) {
                // Same gate as the focus path: suggestion dropdowns have
                // no candidates to fetch.
                if request.action == FieldAction::Autofill {
                    self.query_autofill(ctx, port);
                }
            } else if retries > 1 {
                self.pending_dropdown = Some((request, retries - 1));
            } else {
                debug!("dropping dropdown request, visual layer never became ready");
            }
        }
    }

    /// Garbage-collect stale handles, then run a fresh classifier pass and
    /// track what it found. GC strictly precedes detection so a moved form
    /// is removed first and freshly re-created, never duplicated. A
    /// classifier failure abandons the pass with the tracked set unchanged.
    pub fn detect(
        &mut self,
        doc: &mut Document,
        ctx: &ScriptContext,
        predictor: &dyn FormPredictor,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        reason: DetectReason,
        now: u64,
    ) -> usize {
        self.collect_garbage(doc, ui);

        let fresh = match run_detection(doc, predictor, &ctx.settings.tuning, &mut self.ids) {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!(%err, ?reason, "detection pass failed, keeping tracked set");
                return self.tracked.len();
            }
        };

        let mut added = 0usize;
        for mut form in fresh {
            let already = self.tracked.iter().any(|t| t.element() == form.element());
            if already {
                continue;
            }
            form.attach(doc, ctx, &mut self.registry, ui);
            self.tracked.push(form);
            added += 1;
        }
        debug!(?reason, added, tracked = self.tracked.len(), now, "detection pass");

        // Reconciliation is kicked off after tracking and resolved later
        // from the port's event stream; detection never waits on it.
        self.autosave.reconcile(port);

        self.tracked.len()
    }

    fn collect_garbage(&mut self, doc: &mut Document, ui: &mut dyn UiPort) {
        let stale: Vec<FormId> = self
            .tracked
            .iter()
            .filter(|form| {
                form.should_remove(doc)
                    || form.should_update(doc)
                    || !doc.is_visible(form.element())
            })
            .map(FormHandle::id)
            .collect();
        if stale.is_empty() {
            return;
        }
        for form in self.tracked.iter_mut() {
            if stale.contains(&form.id()) {
                form.detach(doc, &mut self.registry, ui);
            }
        }
        self.tracked.retain(|form| !stale.contains(&form.id()));
        debug!(removed = stale.len(), "garbage-collected stale forms");
    }

    /// Route a page event through the listener registry to the owning
    /// form. Events on nodes nothing is bound to fall through silently.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        event: PageEvent,
        now: u64,
    ) {
        match event {
            PageEvent::Focus { target } => {
                let Some(owner) = self.registry.owner_of(target, ListenerKind::Focus) else {
                    return;
                };
                if !ctx.settings.open_on_focus {
                    return;
                }
                // Never steal an open dropdown from another field.
                if ui.dropdown_field().is_some_and(|field| field != target) {
                    return;
                }
                let Some(form) = self.form_mut(owner) else {
                    return;
                };
                let Some(action) = form
                    .field_by_element(target)
                    .and_then(|field| field.action())
                else {
                    return;
                };
                let request = DropdownRequest {
                    field: target,
                    action,
                };
                if ui.open_dropdown(request) {
                    if action == FieldAction::Autofill {
                        self.query_autofill(ctx, port);
                    }
                } else {
                    self.pending_dropdown = Some((request, DROPDOWN_RETRY_LIMIT));
                }
            }

            PageEvent::Input { target } => {
                let Some(owner) = self.registry.owner_of(target, ListenerKind::Input) else {
                    return;
                };
                ui.close_dropdown();
                if let Some(form) = self.form_mut(owner) {
                    if let Some(field) = form.field_by_element(target) {
                        field.sync_value(doc);
                    }
                }
            }

            PageEvent::KeyDown { target, key } => {
                if key != KeyCode::Enter {
                    return;
                }
                if let Some(owner) = self.registry.owner_of(target, ListenerKind::KeyDown) {
                    self.submit(owner, doc, ctx, ui, port, now);
                }
            }

            PageEvent::Click { target } => {
                if let Some(owner) = self.registry.owner_of(target, ListenerKind::Click) {
                    self.submit(owner, doc, ctx, ui, port, now);
                }
            }

            PageEvent::Submit { target } => {
                if let Some(owner) = self.registry.owner_of(target, ListenerKind::Submit) {
                    self.submit(owner, doc, ctx, ui, port, now);
                }
            }
        }
    }

    fn submit(
        &mut self,
        owner: FormId,
        doc: &Document,
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
        now: u64,
    ) {
        if let Some(form) = self.tracked.iter_mut().find(|f| f.id() == owner) {
            form.handle_submit(doc, ctx, ui, port, now);
        }
    }

    fn form_mut(&mut self, id: FormId) -> Option<&mut FormHandle> {
        self.tracked.iter_mut().find(|f| f.id() == id)
    }

    fn query_autofill(&mut self, ctx: &ScriptContext, port: &mut dyn BackgroundPort) {
        if let Err(err) = port.request(WorkerRequest::AutofillQuery {
            main_frame: ctx.frame.main_frame,
        }) {
            debug!(%err, "autofill query failed");
        }
    }

    /// Feed a worker response to the reconciliation round. Returns true if
    /// it was consumed.
    pub fn handle_worker_response(
        &mut self,
        id: RequestId,
        response: &WorkerResponse,
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
    ) -> bool {
        let kinds = self.tracked_kinds();
        self.autosave.handle_response(id, response, &kinds, ctx, ui, port)
    }

    /// Kick a reconciliation round outside a detection pass (used when an
    /// initial detection found nothing but a submission may still be
    /// pending from the page we navigated from).
    pub fn reconcile(&mut self, port: &mut dyn BackgroundPort) {
        self.autosave.reconcile(port);
    }
}
