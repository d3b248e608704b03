mod common;

use common::{PAGE_URL, login_item, login_page, register_page, script_with};
use formwatch::Settings;
use formwatch::dom::{KeyCode, PageEvent};
use formwatch::engine::lifecycle::ScriptState;
use formwatch::track::field::FieldAction;
use formwatch::ui::UiCall;
use formwatch::worker::messages::SubmissionStatus;

// =========================================================================
// Full login journey: detect, fill, submit, navigate, save prompt
// =========================================================================

#[test]
fn login_journey_ends_with_a_save_prompt() {
    let (mut doc, page) = login_page();
    let mut script = script_with(PAGE_URL, Settings::default(), vec![login_item("work")]);

    // Page becomes visible: engine wakes up and finds the form.
    script.on_visibility(&mut doc, true, 0);
    script.pump(&mut doc, 0);
    assert_eq!(script.state(), ScriptState::Active);
    assert_eq!(script.manager().unwrap().tracked().len(), 1);
    assert_eq!(
        script.ui().icon_action_on(page.email),
        Some(FieldAction::Autofill)
    );

    // User focuses the email field: dropdown with the saved item.
    script.handle_event(&mut doc, PageEvent::Focus { target: page.email }, 100);
    script.pump(&mut doc, 100);
    assert!(
        script
            .ui()
            .journal
            .contains(&UiCall::ShowDropdownItems { count: 1 })
    );

    // User types credentials instead of picking an item.
    doc.set_value(page.email, "alice@example.com");
    script.handle_event(&mut doc, PageEvent::Input { target: page.email }, 200);
    doc.set_value(page.password, "hunter2");
    script.handle_event(&mut doc, PageEvent::Input { target: page.password }, 300);

    // Enter stages the submission.
    script.handle_event(
        &mut doc,
        PageEvent::KeyDown {
            target: page.password,
            key: KeyCode::Enter,
        },
        400,
    );
    script.pump(&mut doc, 400);
    {
        let staged = script.port().backend().staged().expect("attempt staged");
        assert_eq!(staged.status, SubmissionStatus::Staging);
        assert_eq!(staged.data.username, "alice@example.com");
    }

    // The app accepts the login and swaps the form out of the page.
    doc.remove(page.form);
    script.on_dom_mutation(500);
    script.tick(&mut doc, 800);
    script.pump(&mut doc, 800); // entry fetched, commit requested
    script.pump(&mut doc, 800); // commit confirmed, prompt opened

    assert!(
        script.manager().unwrap().tracked().is_empty(),
        "form handle garbage-collected after navigation"
    );
    assert!(
        script.port().backend().staged().is_none(),
        "record committed out of staging"
    );
    let prompts: Vec<_> = script.ui().notifications().collect();
    assert_eq!(prompts.len(), 1, "exactly one save prompt");
    assert_eq!(prompts[0].submission.data.username, "alice@example.com");
    assert_eq!(prompts[0].submission.data.password, "hunter2");
}

// =========================================================================
// Failed attempt: form still present, no prompt
// =========================================================================

#[test]
fn rejected_login_produces_no_prompt() {
    let (mut doc, page) = login_page();
    let mut script = script_with(PAGE_URL, Settings::default(), Vec::new());
    script.on_visibility(&mut doc, true, 0);
    script.pump(&mut doc, 0);

    doc.set_value(page.email, "alice@example.com");
    doc.set_value(page.password, "wrong-password");
    script.handle_event(&mut doc, PageEvent::Submit { target: page.form }, 100);
    script.pump(&mut doc, 100);
    assert!(script.port().backend().staged().is_some());

    // The page keeps the login form (error banner re-render); the next
    // reconciliation round runs on resume.
    script.on_visibility(&mut doc, false, 600);
    script.on_visibility(&mut doc, true, 700);
    script.pump(&mut doc, 700);
    script.pump(&mut doc, 700);

    assert!(
        script.port().backend().staged().is_none(),
        "stale attempt dropped while the form persists"
    );
    assert_eq!(
        script.ui().notifications().count(),
        0,
        "no save prompt for a failed attempt"
    );
}

// =========================================================================
// Registration journey
// =========================================================================

#[test]
fn register_journey_offers_suggestions_and_stages() {
    let (mut doc, page) = register_page();
    let mut script = script_with(PAGE_URL, Settings::default(), Vec::new());
    script.on_visibility(&mut doc, true, 0);
    script.pump(&mut doc, 0);

    assert_eq!(
        script.ui().icon_action_on(page.email),
        Some(FieldAction::AutosuggestAlias)
    );
    assert_eq!(
        script.ui().icon_action_on(page.password),
        Some(FieldAction::AutosuggestPassword)
    );

    doc.set_value(page.email, "alice@example.com");
    doc.set_value(page.password, "generated-secret");
    doc.set_value(page.confirm, "generated-secret");
    script.handle_event(&mut doc, PageEvent::Click { target: page.submit }, 100);
    script.pump(&mut doc, 100);

    let staged = script.port().backend().staged().expect("register staged");
    assert_eq!(staged.form_kind, formwatch::FormKind::Register);
    assert_eq!(staged.data.password, "generated-secret");

    // Account created, page navigates to the app shell.
    doc.remove(page.form);
    script.on_dom_mutation(200);
    script.tick(&mut doc, 500);
    script.pump(&mut doc, 500);
    script.pump(&mut doc, 500);

    assert!(script.port().backend().staged().is_none());
    assert_eq!(script.ui().notifications().count(), 1);
}
