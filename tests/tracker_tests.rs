mod common;

use common::{ManagerHarness, PAGE_URL, login_page, register_page};
use formwatch::detect::{DetectionTuning, FieldKind, RulesetPredictor, classify};
use formwatch::dom::{KeyCode, PageEvent, SyntheticEvent, SyntheticKind};
use formwatch::track::form::{FormHandle, FormIdGen};
use formwatch::track::listeners::ListenerKind;
use formwatch::worker::messages::SubmissionStatus;
use formwatch::worker::port::BackgroundPort;

// =========================================================================
// Submit capture and cooldown
// =========================================================================

#[test]
fn submit_burst_stages_exactly_once() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    doc.set_value(page.email, "alice@example.com");
    doc.set_value(page.password, "hunter2");

    // One user action typically fires click + Enter + native submit.
    h.event(&mut doc, PageEvent::Click { target: page.submit }, 10);
    h.event(
        &mut doc,
        PageEvent::KeyDown {
            target: page.password,
            key: KeyCode::Enter,
        },
        20,
    );
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 30);

    let events = h.port.poll();
    assert_eq!(
        ManagerHarness::stage_acks(&events),
        1,
        "the burst collapses into a single staged submission"
    );

    let staged = h.port.backend().staged().expect("a record is staged");
    assert_eq!(staged.status, SubmissionStatus::Staging);
    assert_eq!(staged.data.username, "alice@example.com");
    assert_eq!(staged.data.password, "hunter2");
    assert!(!staged.partial);
}

#[test]
fn submits_after_cooldown_stage_again() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    doc.set_value(page.email, "alice@example.com");
    doc.set_value(page.password, "first-try");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 0);
    h.port.poll();

    doc.set_value(page.password, "second-try");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 600);

    let events = h.port.poll();
    assert_eq!(ManagerHarness::stage_acks(&events), 1, "cooldown expired at 500ms");
    assert_eq!(
        h.port.backend().staged().unwrap().data.password,
        "second-try",
        "fresh field values are re-read on the second attempt"
    );
}

#[test]
fn submit_without_username_stages_nothing() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    doc.set_value(page.password, "hunter2");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 0);

    let events = h.port.poll();
    assert_eq!(ManagerHarness::stage_acks(&events), 0);
    assert!(h.port.backend().staged().is_none(), "no username, no record");
}

#[test]
fn partial_submission_is_marked_partial() {
    // Multi-step login: the username page has no password field value.
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    doc.set_value(page.email, "alice@example.com");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 0);

    let staged = h.port.backend().staged().expect("username-only record staged");
    assert!(staged.partial, "missing password marks the record partial");
}

#[test]
fn submit_closes_an_open_dropdown() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    h.event(&mut doc, PageEvent::Focus { target: page.email }, 0);
    assert_eq!(h.ui.open_dropdown_request().map(|r| r.field), Some(page.email));

    doc.set_value(page.email, "alice@example.com");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 10);
    assert!(h.ui.open_dropdown_request().is_none(), "dropdown closed on submit");
}

// =========================================================================
// Listener bindings
// =========================================================================

#[test]
fn reattachment_never_stacks_listeners() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);

    // A second observe re-attaches every tracked form.
    h.manager.observe(&mut doc, &h.ctx, &mut h.ui);
    h.manager.observe(&mut doc, &h.ctx, &mut h.ui);

    let registry = h.manager.registry();
    assert_eq!(registry.count(page.email, ListenerKind::Focus), 1);
    assert_eq!(registry.count(page.email, ListenerKind::Input), 1);
    assert_eq!(registry.count(page.email, ListenerKind::KeyDown), 1);
    assert_eq!(registry.count(page.submit, ListenerKind::Click), 1);
    assert_eq!(registry.count(page.form, ListenerKind::Submit), 1);
}

#[test]
fn submit_buttons_bind_click_only() {
    let (mut doc, page) = login_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);

    let registry = h.manager.registry();
    assert_eq!(registry.bindings_on(page.submit), 1, "click binding only");
    assert_eq!(registry.count(page.submit, ListenerKind::Focus), 0);
}

// =========================================================================
// Autofill writes
// =========================================================================

fn login_form_handle(doc: &formwatch::dom::Document) -> FormHandle {
    let detected = classify(doc, &RulesetPredictor, &DetectionTuning::default())
        .unwrap()
        .remove(0);
    FormHandle::new(FormIdGen::new().next(), detected)
}

#[test]
fn autofill_writes_value_and_dispatches_synthetic_events() {
    let (mut doc, page) = login_page();
    let mut form = login_form_handle(&doc);

    let field = &mut form.fields_of_mut(FieldKind::Email).unwrap()[0];
    field.autofill(&mut doc, "alice@example.com");

    assert_eq!(doc.value(page.email), "alice@example.com");
    assert_eq!(field.value(), "alice@example.com", "tracked copy follows");
    assert_eq!(
        doc.synthetic_events(),
        &[
            SyntheticEvent {
                target: page.email,
                kind: SyntheticKind::Input
            },
            SyntheticEvent {
                target: page.email,
                kind: SyntheticKind::Change
            },
        ],
        "page scripts must observe the write"
    );
}

#[test]
fn autofill_into_detached_element_is_a_noop() {
    let (mut doc, page) = login_page();
    let mut form = login_form_handle(&doc);

    doc.remove(page.email);
    let field = &mut form.fields_of_mut(FieldKind::Email).unwrap()[0];
    field.autofill(&mut doc, "alice@example.com");

    assert_eq!(doc.value(page.email), "", "detached element untouched");
    assert!(doc.synthetic_events().is_empty(), "no events for a dead node");
}

#[test]
fn sync_value_keeps_last_known_value_after_detach() {
    let (mut doc, page) = login_page();
    let mut form = login_form_handle(&doc);

    doc.set_value(page.email, "alice@example.com");
    let field = &mut form.fields_of_mut(FieldKind::Email).unwrap()[0];
    field.sync_value(&doc);
    assert_eq!(field.value(), "alice@example.com");

    doc.remove(page.email);
    field.sync_value(&doc);
    assert_eq!(
        field.value(),
        "alice@example.com",
        "a ripped-out field keeps its last synced value for staging"
    );
}

// =========================================================================
// Log hygiene
// =========================================================================

#[test]
fn staged_credentials_never_reach_the_logs() {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || Capture(writer.clone()))
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (mut doc, page) = login_page();
        let mut h = ManagerHarness::new(PAGE_URL);
        h.observe_and_detect(&mut doc, 0);
        h.pump();

        doc.set_value(page.email, "alice@example.com");
        doc.set_value(page.password, "hunter2-secret");
        h.event(&mut doc, PageEvent::Submit { target: page.form }, 0);
    });

    let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(!logs.is_empty(), "staging produced log output");
    assert!(
        !logs.contains("hunter2-secret"),
        "password must never appear in log output"
    );
    assert!(
        !logs.contains("alice@example.com"),
        "username must never appear in log output"
    );
}

// =========================================================================
// Register form submissions
// =========================================================================

#[test]
fn register_submission_stages_the_new_password() {
    let (mut doc, page) = register_page();
    let mut h = ManagerHarness::new(PAGE_URL);
    h.observe_and_detect(&mut doc, 0);
    h.pump();

    doc.set_value(page.email, "alice@example.com");
    doc.set_value(page.password, "fresh-secret");
    doc.set_value(page.confirm, "fresh-secret");
    h.event(&mut doc, PageEvent::Submit { target: page.form }, 0);

    let staged = h.port.backend().staged().expect("register attempt staged");
    assert_eq!(staged.form_kind, formwatch::FormKind::Register);
    assert_eq!(staged.data.password, "fresh-secret");
}
