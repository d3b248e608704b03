use tracing::debug;

use crate::detect::FormKind;
use crate::engine::context::ScriptContext;
use crate::ui::{NotificationKind, NotificationRequest, UiPort};
use crate::worker::messages::{SubmissionStatus, WorkerRequest, WorkerResponse};
use crate::worker::port::{BackgroundPort, RequestId};

const STASH_REASON_FORM_PRESENT: &str = "FormStillPresent";
const COMMIT_REASON_FORM_GONE: &str = "FormRemoved";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Fetch(RequestId),
    Commit(RequestId),
}

/// Reconciles the background-held submission record against the page after
/// every detection pass: a staged, complete submission whose form has
/// disappeared on the matching domain is committed (and may surface a save
/// prompt); a form still present means a likely failed attempt, so the
/// record is dropped; a domain mismatch is never committed.
///
/// Entirely asynchronous: requests are queued and answers matched by id,
/// so a response to a superseded pass is ignored rather than misapplied.
/// Failures are swallowed — worst case is a missed prompt.
#[derive(Debug, Default)]
pub struct Autosave {
    pending: Option<Pending>,
}

impl Autosave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kick off a reconciliation round. Never blocks; the answer arrives
    /// through `handle_response`.
    pub fn reconcile(&mut self, port: &mut dyn BackgroundPort) {
        // A commit answer is still owed; starting a fresh fetch here
        // would orphan its id and lose the prompt.
        if matches!(self.pending, Some(Pending::Commit(_))) {
            debug!("commit in flight, skipping reconciliation round");
            return;
        }
        match port.request(WorkerRequest::FormEntryRequest) {
            Ok(id) => self.pending = Some(Pending::Fetch(id)),
            Err(err) => debug!(%err, "reconciliation request failed, skipping round"),
        }
    }

    /// Returns true when the event belonged to this reconciliation round.
    pub fn handle_response(
        &mut self,
        id: RequestId,
        response: &WorkerResponse,
        tracked_kinds: &[FormKind],
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
    ) -> bool {
        match self.pending {
            Some(Pending::Fetch(pending_id)) if pending_id == id => {
                self.pending = None;
                if let WorkerResponse::Entry { submission } = response {
                    self.resolve_fetch(submission.as_ref(), tracked_kinds, ctx, ui, port);
                }
                true
            }
            Some(Pending::Commit(pending_id)) if pending_id == id => {
                self.pending = None;
                if let WorkerResponse::Committed {
                    submission: Some(record),
                } = response
                {
                    if record.prompt_eligible && ctx.settings.autosave_prompt {
                        ui.open_notification(NotificationRequest {
                            kind: NotificationKind::AutosavePrompt,
                            submission: record.clone(),
                        });
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn resolve_fetch(
        &mut self,
        submission: Option<&crate::worker::messages::SubmissionRecord>,
        tracked_kinds: &[FormKind],
        ctx: &ScriptContext,
        ui: &mut dyn UiPort,
        port: &mut dyn BackgroundPort,
    ) {
        let Some(record) = submission else {
            return;
        };

        match record.status {
            SubmissionStatus::Committed => {
                if record.prompt_eligible && ctx.settings.autosave_prompt {
                    ui.open_notification(NotificationRequest {
                        kind: NotificationKind::AutosavePrompt,
                        submission: record.clone(),
                    });
                }
            }

            SubmissionStatus::Staging => {
                if tracked_kinds.contains(&record.form_kind) {
                    // Same-type form still on the page: the attempt most
                    // likely failed and the user is retrying, so the stale
                    // record is discarded rather than committed.
                    if let Err(err) = port.request(WorkerRequest::FormEntryStash {
                        reason: STASH_REASON_FORM_PRESENT.to_string(),
                    }) {
                        debug!(%err, "stash request failed");
                    }
                    return;
                }
                if record.partial {
                    return;
                }
                if record.domain != ctx.frame.domain {
                    debug!(
                        record_domain = %record.domain,
                        page_domain = %ctx.frame.domain,
                        "staged submission from another domain, not committing"
                    );
                    return;
                }
                match port.request(WorkerRequest::FormEntryCommit {
                    reason: COMMIT_REASON_FORM_GONE.to_string(),
                }) {
                    Ok(id) => self.pending = Some(Pending::Commit(id)),
                    Err(err) => debug!(%err, "commit request failed"),
                }
            }
        }
    }
}
