#![allow(dead_code)]

use formwatch::detect::predictor::{FieldScore, FormPredictor, FormScore};
use formwatch::detect::{FieldKind, RulesetPredictor};
use formwatch::dom::{Document, NodeId};
use formwatch::engine::context::{FrameInfo, ScriptContext};
use formwatch::engine::lifecycle::ContentScript;
use formwatch::engine::manager::FormManager;
use formwatch::engine::settings::Settings;
use formwatch::error::{ChannelError, DetectError};
use formwatch::ui::RecordingUi;
use formwatch::worker::messages::{
    CredentialPair, LoginItem, SubmissionRecord, SubmissionStatus, WorkerRequest,
};
use formwatch::worker::port::{BackgroundPort, InProcessPort, RequestId, WorkerEvent};
use formwatch::worker::store::MemoryStore;
use formwatch::FormKind;

pub const PAGE_URL: &str = "https://example.com/login";
pub const PAGE_DOMAIN: &str = "example.com";

// =========================================================================
// Page builders
// =========================================================================

pub struct LoginPage {
    pub form: NodeId,
    pub email: NodeId,
    pub password: NodeId,
    pub submit: NodeId,
}

/// A straightforward email + password sign-in form.
pub fn login_page() -> (Document, LoginPage) {
    let mut doc = Document::new();
    let form = doc.create_element("form");
    doc.set_attribute(form, "id", "login-form");
    doc.set_attribute(form, "action", "/login");

    let email = doc.create_element("input");
    doc.set_attribute(email, "type", "email");
    doc.set_attribute(email, "name", "email");
    doc.set_attribute(email, "id", "email");

    let password = doc.create_element("input");
    doc.set_attribute(password, "type", "password");
    doc.set_attribute(password, "name", "password");
    doc.set_attribute(password, "id", "password");

    let submit = doc.create_element("button");
    doc.set_attribute(submit, "type", "submit");
    doc.set_attribute(submit, "id", "submit");
    doc.set_text(submit, "Log in");

    doc.append_child(form, email);
    doc.append_child(form, password);
    doc.append_child(form, submit);
    doc.append_child(doc.body(), form);

    (
        doc,
        LoginPage {
            form,
            email,
            password,
            submit,
        },
    )
}

pub struct RegisterPage {
    pub form: NodeId,
    pub email: NodeId,
    pub password: NodeId,
    pub confirm: NodeId,
    pub submit: NodeId,
}

/// A sign-up form with email and a new-password pair.
pub fn register_page() -> (Document, RegisterPage) {
    let mut doc = Document::new();
    let form = doc.create_element("form");
    doc.set_attribute(form, "id", "signup-form");
    doc.set_attribute(form, "action", "/register");

    let email = doc.create_element("input");
    doc.set_attribute(email, "type", "email");
    doc.set_attribute(email, "name", "email");
    doc.set_attribute(email, "id", "email");

    let password = doc.create_element("input");
    doc.set_attribute(password, "type", "password");
    doc.set_attribute(password, "name", "new-password");
    doc.set_attribute(password, "id", "new-password");

    let confirm = doc.create_element("input");
    doc.set_attribute(confirm, "type", "password");
    doc.set_attribute(confirm, "name", "confirm-password");
    doc.set_attribute(confirm, "id", "confirm-password");

    let submit = doc.create_element("button");
    doc.set_attribute(submit, "type", "submit");
    doc.set_attribute(submit, "id", "submit");
    doc.set_text(submit, "Create account");

    doc.append_child(form, email);
    doc.append_child(form, password);
    doc.append_child(form, confirm);
    doc.append_child(form, submit);
    doc.append_child(doc.body(), form);

    (
        doc,
        RegisterPage {
            form,
            email,
            password,
            confirm,
            submit,
        },
    )
}

// =========================================================================
// Engine harnesses
// =========================================================================

pub type TestPort = InProcessPort<MemoryStore>;
pub type TestScript = ContentScript<RecordingUi, TestPort>;

/// A fully wired content script against the in-memory store, not yet
/// visible.
pub fn script(url: &str) -> TestScript {
    script_with(url, Settings::default(), Vec::new())
}

pub fn script_with(url: &str, settings: Settings, items: Vec<LoginItem>) -> TestScript {
    let frame = FrameInfo::new(url, true);
    let store = MemoryStore::with_items(&frame.domain, items);
    let ctx = ScriptContext::new(settings, frame);
    ContentScript::new(
        ctx,
        Box::new(RulesetPredictor),
        store.into_port(),
        RecordingUi::new(),
    )
}

/// Lower-level harness for exercising the manager without the lifecycle
/// layer.
pub struct ManagerHarness {
    pub ctx: ScriptContext,
    pub manager: FormManager,
    pub predictor: RulesetPredictor,
    pub ui: RecordingUi,
    pub port: TestPort,
}

impl ManagerHarness {
    pub fn new(url: &str) -> Self {
        Self::with_settings(url, Settings::default())
    }

    pub fn with_settings(url: &str, settings: Settings) -> Self {
        let frame = FrameInfo::new(url, true);
        let mut port = MemoryStore::new(&frame.domain).into_port();
        port.connect().expect("in-process connect");
        let ctx = ScriptContext::new(settings, frame);
        let manager = FormManager::new(&ctx.settings.tuning);
        ManagerHarness {
            ctx,
            manager,
            predictor: RulesetPredictor,
            ui: RecordingUi::new(),
            port,
        }
    }

    pub fn observe_and_detect(&mut self, doc: &mut Document, now: u64) {
        self.manager.observe(doc, &self.ctx, &mut self.ui);
        self.manager.detect(
            doc,
            &self.ctx,
            &self.predictor,
            &mut self.ui,
            &mut self.port,
            formwatch::engine::manager::DetectReason::InitialLoad,
            now,
        );
    }

    pub fn tick(&mut self, doc: &mut Document, now: u64) {
        self.manager.tick(
            doc,
            &self.ctx,
            &self.predictor,
            &mut self.ui,
            &mut self.port,
            now,
        );
    }

    pub fn event(&mut self, doc: &mut Document, event: formwatch::dom::PageEvent, now: u64) {
        self.manager
            .handle_event(doc, &self.ctx, &mut self.ui, &mut self.port, event, now);
    }

    /// Drain the port and route responses back, as the lifecycle pump
    /// would.
    pub fn pump(&mut self) -> Vec<WorkerEvent> {
        let events = self.port.poll();
        for event in &events {
            if let WorkerEvent::Response { id, response } = event {
                self.manager.handle_worker_response(
                    *id,
                    response,
                    &self.ctx,
                    &mut self.ui,
                    &mut self.port,
                );
            }
        }
        events
    }

    /// Count staged-submission requests acknowledged in an event batch.
    pub fn stage_acks(events: &[WorkerEvent]) -> usize {
        events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    WorkerEvent::Response {
                        response: formwatch::worker::messages::WorkerResponse::Ack,
                        ..
                    }
                )
            })
            .count()
    }
}

// =========================================================================
// Test doubles
// =========================================================================

/// Predictor that always fails, for classifier-failure paths.
pub struct FailingPredictor;

impl FormPredictor for FailingPredictor {
    fn score_forms(&self, _doc: &Document) -> Result<Vec<FormScore>, DetectError> {
        Err(DetectError::Predictor("model unavailable".to_string()))
    }

    fn score_fields(
        &self,
        _doc: &Document,
        _kinds: &[FieldKind],
    ) -> Result<Vec<FieldScore>, DetectError> {
        Err(DetectError::Predictor("model unavailable".to_string()))
    }
}

/// Port whose extension context is already gone: connecting works but
/// every request fails with an invalidation error.
#[derive(Debug, Default)]
pub struct InvalidatedPort {
    connected: bool,
}

impl BackgroundPort for InvalidatedPort {
    fn connect(&mut self) -> Result<(), ChannelError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn request(&mut self, _request: WorkerRequest) -> Result<RequestId, ChannelError> {
        Err(ChannelError::Invalidated("extension reloaded".to_string()))
    }

    fn poll(&mut self) -> Vec<WorkerEvent> {
        Vec::new()
    }
}

/// Port that connects but whose worker never answers: every request
/// fails with a plain disconnect.
#[derive(Debug, Default)]
pub struct UnreachablePort {
    connected: bool,
}

impl BackgroundPort for UnreachablePort {
    fn connect(&mut self) -> Result<(), ChannelError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn request(&mut self, _request: WorkerRequest) -> Result<RequestId, ChannelError> {
        Err(ChannelError::Disconnected)
    }

    fn poll(&mut self) -> Vec<WorkerEvent> {
        Vec::new()
    }
}

// =========================================================================
// Record builders
// =========================================================================

pub fn staged_record(form_kind: FormKind, domain: &str, partial: bool) -> SubmissionRecord {
    SubmissionRecord {
        status: SubmissionStatus::Staging,
        partial,
        domain: domain.to_string(),
        form_kind,
        data: CredentialPair {
            username: "alice@example.com".to_string(),
            password: if partial {
                String::new()
            } else {
                "hunter2".to_string()
            },
        },
        prompt_eligible: true,
    }
}

pub fn login_item(name: &str) -> LoginItem {
    LoginItem {
        item_id: format!("item-{name}"),
        name: name.to_string(),
        username: format!("{name}@example.com"),
    }
}
