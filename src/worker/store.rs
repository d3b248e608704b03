use crate::worker::messages::{
    LoginItem, SubmissionRecord, SubmissionStatus, WorkerPush, WorkerRequest, WorkerResponse,
    WorkerStatus,
};
use crate::worker::port::{InProcessPort, WorkerBackend};

/// Reference background store implementing the form-entry protocol over a
/// single staged record. Stands in for the real vault-backed worker in
/// tests and the CLI; holds no credentials beyond the staged attempt.
#[derive(Debug)]
pub struct MemoryStore {
    /// Realm the worker attributes staged submissions to (the sender tab's
    /// domain, which the real worker derives from the port sender).
    domain: String,
    staged: Option<SubmissionRecord>,
    items: Vec<LoginItem>,
    status: WorkerStatus,
}

impl MemoryStore {
    pub fn new(domain: &str) -> Self {
        MemoryStore {
            domain: domain.to_string(),
            staged: None,
            items: Vec::new(),
            status: WorkerStatus::Ready,
        }
    }

    pub fn with_items(domain: &str, items: Vec<LoginItem>) -> Self {
        MemoryStore {
            items,
            ..Self::new(domain)
        }
    }

    pub fn staged(&self) -> Option<&SubmissionRecord> {
        self.staged.as_ref()
    }

    /// Seed a record directly, as if staged by an earlier page.
    pub fn seed(&mut self, record: SubmissionRecord) {
        self.staged = Some(record);
    }

    pub fn into_port(self) -> InProcessPort<MemoryStore> {
        InProcessPort::new(self)
    }
}

impl WorkerBackend for MemoryStore {
    fn handle(&mut self, request: &WorkerRequest) -> WorkerResponse {
        match request {
            WorkerRequest::FormEntryStage {
                form_kind, data, ..
            } => {
                self.staged = Some(SubmissionRecord {
                    status: SubmissionStatus::Staging,
                    partial: data.password.is_empty(),
                    domain: self.domain.clone(),
                    form_kind: *form_kind,
                    data: data.clone(),
                    prompt_eligible: true,
                });
                WorkerResponse::Ack
            }

            WorkerRequest::FormEntryRequest => WorkerResponse::Entry {
                submission: self.staged.clone(),
            },

            WorkerRequest::FormEntryCommit { .. } => match self.staged.take() {
                Some(mut record) if record.status == SubmissionStatus::Staging => {
                    record.status = SubmissionStatus::Committed;
                    WorkerResponse::Committed {
                        submission: Some(record),
                    }
                }
                other => {
                    self.staged = other;
                    WorkerResponse::Committed { submission: None }
                }
            },

            WorkerRequest::FormEntryStash { .. } => {
                self.staged = None;
                WorkerResponse::Ack
            }

            WorkerRequest::AutofillQuery { .. } => WorkerResponse::Autofill {
                items: self.items.clone(),
                needs_upgrade: false,
            },

            WorkerRequest::WorkerWakeup { .. } => WorkerResponse::WokenUp {
                status: self.status,
                logged_in: true,
                settings: None,
            },
        }
    }
}

/// Convenience for tests: a push the store-side would emit on extension
/// update.
pub fn unload_push() -> WorkerPush {
    WorkerPush::UnloadContentScript
}
