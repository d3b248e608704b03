use tracing::{debug, warn};

use crate::detect::predictor::FormPredictor;
use crate::dom::{Document, PageEvent};
use crate::engine::context::ScriptContext;
use crate::engine::manager::{DetectReason, FormManager};
use crate::ui::UiPort;
use crate::worker::messages::{WorkerPush, WorkerRequest, WorkerResponse};
use crate::worker::port::{BackgroundPort, RequestId, WorkerEvent};

/// Content-script lifecycle. Transitions only move forward or between
/// Active and Inactive; Destroyed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    Uninitialized,
    Active,
    Inactive,
    Destroyed,
}

/// Lifecycle controller for one injected instance: owns the manager, the
/// worker port and the visual layer, and gates every entry point on the
/// current state. Concrete port and UI types are kept visible so harnesses
/// can reach through to their journals; the classifier stays behind its
/// trait object since nothing ever needs the concrete type back.
pub struct ContentScript<U: UiPort, P: BackgroundPort> {
    ctx: ScriptContext,
    state: ScriptState,
    manager: Option<FormManager>,
    predictor: Box<dyn FormPredictor>,
    port: P,
    ui: U,
    pending_wakeup: Option<RequestId>,
}

impl<U: UiPort, P: BackgroundPort> ContentScript<U, P> {
    pub fn new(ctx: ScriptContext, predictor: Box<dyn FormPredictor>, port: P, ui: U) -> Self {
        ContentScript {
            ctx,
            state: ScriptState::Uninitialized,
            manager: None,
            predictor,
            port,
            ui,
            pending_wakeup: None,
        }
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub fn ctx(&self) -> &ScriptContext {
        &self.ctx
    }

    pub fn instance_id(&self) -> &str {
        &self.ctx.instance_id
    }

    pub fn manager(&self) -> Option<&FormManager> {
        self.manager.as_ref()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Visibility change from the host page. Becoming visible starts (or
    /// resumes) the engine; going hidden releases everything the page can
    /// observe and drops the worker connection.
    pub fn on_visibility(&mut self, doc: &mut Document, visible: bool, now: u64) {
        if self.state == ScriptState::Destroyed {
            return;
        }

        if !visible {
            if self.state == ScriptState::Active {
                if let Some(manager) = self.manager.as_mut() {
                    manager.sleep(doc, &mut self.ui);
                }
                self.port.disconnect();
                self.state = ScriptState::Inactive;
                debug!(instance = %self.ctx.instance_id, "content script inactive");
            }
            return;
        }

        if self.state == ScriptState::Active {
            return;
        }

        if let Err(err) = self.port.connect() {
            warn!(%err, "worker connection failed, tearing down");
            self.destroy(doc);
            return;
        }

        // A failed wake-up means the background worker is unreachable;
        // the engine never runs detached from its backend.
        match self.port.request(WorkerRequest::WorkerWakeup {
            endpoint: self.ctx.instance_id.clone(),
        }) {
            Ok(id) => self.pending_wakeup = Some(id),
            Err(err) => {
                warn!(%err, "worker wake-up failed, tearing down");
                self.destroy(doc);
                return;
            }
        }

        let reason = if self.state == ScriptState::Uninitialized {
            DetectReason::InitialLoad
        } else {
            DetectReason::Resume
        };
        let manager = self
            .manager
            .get_or_insert_with(|| FormManager::new(&self.ctx.settings.tuning));
        manager.observe(doc, &self.ctx, &mut self.ui);
        manager.detect(
            doc,
            &self.ctx,
            self.predictor.as_ref(),
            &mut self.ui,
            &mut self.port,
            reason,
            now,
        );
        self.state = ScriptState::Active;
        debug!(instance = %self.ctx.instance_id, ?reason, "content script active");
    }

    /// Drain the worker event stream, apply every response and push, then
    /// drive any due timers. One call per task-queue turn.
    pub fn pump(&mut self, doc: &mut Document, now: u64) {
        if self.state == ScriptState::Destroyed {
            return;
        }
        for event in self.port.poll() {
            match event {
                WorkerEvent::Response { id, response } => self.on_response(id, response),
                WorkerEvent::Push(push) => {
                    if self.on_push(push, doc) {
                        return;
                    }
                }
            }
        }
        self.tick(doc, now);
    }

    fn on_response(&mut self, id: RequestId, response: WorkerResponse) {
        if self.pending_wakeup == Some(id) {
            self.pending_wakeup = None;
            if let WorkerResponse::WokenUp {
                status,
                logged_in,
                settings,
            } = response
            {
                self.ctx.worker_status = status;
                self.ctx.logged_in = logged_in;
                if let Some(settings) = settings {
                    self.ctx.settings = settings;
                }
            }
            return;
        }

        if let Some(manager) = self.manager.as_mut() {
            if manager.handle_worker_response(id, &response, &self.ctx, &mut self.ui, &mut self.port)
            {
                return;
            }
        }

        match response {
            WorkerResponse::Autofill { items, .. } => {
                // Only meaningful while a dropdown is open; the visual
                // layer ignores it otherwise.
                self.ui.show_dropdown_items(&items);
            }
            WorkerResponse::Ack => {}
            other => debug!(kind = other.kind(), "unmatched worker response dropped"),
        }
    }

    /// Returns true when the push destroyed this instance.
    fn on_push(&mut self, push: WorkerPush, doc: &mut Document) -> bool {
        match push {
            WorkerPush::WorkerStatus { status, logged_in } => {
                self.ctx.worker_status = status;
                self.ctx.logged_in = logged_in;
                if !logged_in {
                    self.ui.reset();
                }
            }
            WorkerPush::SettingsUpdate { settings } => {
                self.ctx.settings = settings;
            }
            WorkerPush::AutofillSync { count } => {
                debug!(count, "autofill item cache refreshed");
            }
            WorkerPush::UnloadContentScript => {
                debug!(instance = %self.ctx.instance_id, "unload requested by worker");
                self.destroy(doc);
                return true;
            }
        }
        false
    }

    /// Another injection announced itself on this page. The established
    /// instance yields so the page never runs two engines at once.
    pub fn on_page_broadcast(&mut self, doc: &mut Document, other_instance: &str) {
        if self.state == ScriptState::Destroyed {
            return;
        }
        if other_instance != self.ctx.instance_id {
            debug!(
                instance = %self.ctx.instance_id,
                other = %other_instance,
                "yielding to competing injection"
            );
            self.destroy(doc);
        }
    }

    pub fn on_dom_mutation(&mut self, now: u64) {
        if self.state != ScriptState::Active {
            return;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.on_dom_mutation(now);
        }
    }

    pub fn tick(&mut self, doc: &mut Document, now: u64) {
        if self.state != ScriptState::Active {
            return;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.tick(
                doc,
                &self.ctx,
                self.predictor.as_ref(),
                &mut self.ui,
                &mut self.port,
                now,
            );
        }
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: PageEvent, now: u64) {
        if self.state != ScriptState::Active {
            return;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.handle_event(doc, &self.ctx, &mut self.ui, &mut self.port, event, now);
        }
    }

    /// Terminal teardown. Safe to call more than once.
    pub fn destroy(&mut self, doc: &mut Document) {
        if self.state == ScriptState::Destroyed {
            return;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.sleep(doc, &mut self.ui);
        }
        self.ui.destroy();
        self.port.disconnect();
        self.state = ScriptState::Destroyed;
        debug!(instance = %self.ctx.instance_id, "content script destroyed");
    }
}
