//! Form detection and autofill engine for login, registration and related
//! credential forms.
//!
//! The crate is organized as a pipeline: `dom` models the host page,
//! `detect` turns it into classified form candidates, `track` wires the
//! accepted candidates up with listeners and inline icons, and `engine`
//! owns the lifecycle around all of it (mutation-driven re-detection,
//! submit capture, autosave reconciliation against the background
//! `worker`). The `ui` and `worker` ports are trait boundaries; the real
//! visual layer and vault-backed worker live on the other side of them.

pub mod cli;
pub mod detect;
pub mod dom;
pub mod engine;
pub mod error;
pub mod track;
pub mod ui;
pub mod worker;

pub use detect::{DetectionTuning, FieldKind, FormKind, FormPredictor, RulesetPredictor};
pub use dom::{Document, PageEvent};
pub use engine::{ContentScript, FormManager, ScriptContext, ScriptState, Settings};
