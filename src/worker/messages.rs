use serde::{Deserialize, Serialize};

use crate::detect::FormKind;
use crate::engine::settings::Settings;

/// Requests from the content script to the background worker. Every
/// request is answered asynchronously; none of them block the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Record a tentative form submission before the page navigates.
    FormEntryStage {
        form_kind: FormKind,
        action: String,
        reason: String,
        data: CredentialPair,
    },
    /// Read the currently staged/committed submission, if any.
    FormEntryRequest,
    /// Promote the staged submission to committed.
    FormEntryCommit { reason: String },
    /// Discard the staged submission.
    FormEntryStash { reason: String },
    /// Fetch autofill candidates for the current realm.
    AutofillQuery { main_frame: bool },
    /// Announce this content script and fetch worker state.
    WorkerWakeup { endpoint: String },
}

impl WorkerRequest {
    /// Variant name for log lines. Payloads can carry plaintext
    /// credentials and must never be formatted into log output.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerRequest::FormEntryStage { .. } => "form_entry_stage",
            WorkerRequest::FormEntryRequest => "form_entry_request",
            WorkerRequest::FormEntryCommit { .. } => "form_entry_commit",
            WorkerRequest::FormEntryStash { .. } => "form_entry_stash",
            WorkerRequest::AutofillQuery { .. } => "autofill_query",
            WorkerRequest::WorkerWakeup { .. } => "worker_wakeup",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    Ack,
    Entry { submission: Option<SubmissionRecord> },
    Committed { submission: Option<SubmissionRecord> },
    Autofill {
        items: Vec<LoginItem>,
        needs_upgrade: bool,
    },
    WokenUp {
        status: WorkerStatus,
        logged_in: bool,
        settings: Option<Settings>,
    },
}

impl WorkerResponse {
    /// Variant name for log lines; see [`WorkerRequest::kind`].
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerResponse::Ack => "ack",
            WorkerResponse::Entry { .. } => "entry",
            WorkerResponse::Committed { .. } => "committed",
            WorkerResponse::Autofill { .. } => "autofill",
            WorkerResponse::WokenUp { .. } => "woken_up",
        }
    }
}

/// Unsolicited messages pushed by the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerPush {
    WorkerStatus { status: WorkerStatus, logged_in: bool },
    SettingsUpdate { settings: Settings },
    AutofillSync { count: usize },
    UnloadContentScript,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Ready,
    Locked,
    LoggedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginItem {
    pub item_id: String,
    pub name: String,
    pub username: String,
}

/// One staged or committed form-submission attempt. The background store
/// holds the authoritative copy; the engine only ever reads snapshots of
/// it and asks for transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionRecord {
    pub status: SubmissionStatus,
    /// Username captured without a password (multi-step forms).
    pub partial: bool,
    pub domain: String,
    pub form_kind: FormKind,
    pub data: CredentialPair,
    /// Whether committing this record should surface a save prompt.
    pub prompt_eligible: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Staging,
    Committed,
}
