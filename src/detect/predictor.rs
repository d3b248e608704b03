use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::error::DetectError;

/// Closed set of form classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Login,
    Register,
    Recovery,
    PasswordChange,
    Mfa,
    Noop,
}

/// Closed set of field roles within a detected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Username,
    UsernameHidden,
    Email,
    PasswordCurrent,
    PasswordNew,
    Submit,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Username,
        FieldKind::UsernameHidden,
        FieldKind::Email,
        FieldKind::PasswordCurrent,
        FieldKind::PasswordNew,
        FieldKind::Submit,
    ];

    /// Kinds that can carry a username value when staging a submission.
    pub fn is_username_like(self) -> bool {
        matches!(
            self,
            FieldKind::Username | FieldKind::UsernameHidden | FieldKind::Email
        )
    }

    pub fn is_password_like(self) -> bool {
        matches!(self, FieldKind::PasswordCurrent | FieldKind::PasswordNew)
    }
}

/// A form-level candidate with its per-kind confidence scores, each in
/// [0, 1]. Kinds the predictor has no opinion on are simply absent.
#[derive(Debug, Clone)]
pub struct FormScore {
    pub element: NodeId,
    pub scores: Vec<(FormKind, f32)>,
}

/// A field-level candidate scored for one role.
#[derive(Debug, Clone)]
pub struct FieldScore {
    pub element: NodeId,
    pub kind: FieldKind,
    pub score: f32,
}

/// The external scoring ruleset, consumed as a black box: given a document,
/// yields scored candidates per form/field type. Implementations must not
/// mutate the DOM and must be safely re-invocable.
pub trait FormPredictor {
    fn score_forms(&self, doc: &Document) -> Result<Vec<FormScore>, DetectError>;

    /// Score field candidates document-wide for the requested roles.
    /// Association with a form is the adapter's job, not the predictor's.
    fn score_fields(
        &self,
        doc: &Document,
        kinds: &[FieldKind],
    ) -> Result<Vec<FieldScore>, DetectError>;
}
