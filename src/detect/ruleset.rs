use crate::detect::predictor::{FieldKind, FieldScore, FormKind, FormPredictor, FormScore};
use crate::dom::{Document, NodeId};
use crate::error::DetectError;

/// Built-in keyword/attribute scoring ruleset. The engine treats every
/// predictor as a black box; this one exists so the CLI and end-to-end
/// tests run without an external model, and its weights are deliberately
/// coarse — additive signals clamped to [0, 1].
#[derive(Debug, Default)]
pub struct RulesetPredictor;

const LOGIN_WORDS: [&str; 4] = ["log in", "login", "sign in", "signin"];
const REGISTER_WORDS: [&str; 5] = ["register", "sign up", "signup", "create account", "join"];
const RECOVERY_WORDS: [&str; 4] = ["forgot", "reset", "recover", "trouble"];
const USERNAME_WORDS: [&str; 4] = ["user", "login", "account", "nick"];
const OTP_WORDS: [&str; 3] = ["one-time", "otp", "totp"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn label_of(doc: &Document, node: NodeId) -> String {
    doc.attribute(node, "aria-label")
        .map(str::to_string)
        .or_else(|| doc.text(node).map(str::to_string))
        .unwrap_or_else(|| doc.value(node).to_string())
        .to_lowercase()
}

fn name_blob(doc: &Document, node: NodeId) -> String {
    let mut blob = String::new();
    for attr in ["name", "id", "placeholder", "autocomplete"] {
        if let Some(v) = doc.attribute(node, attr) {
            blob.push_str(&v.to_lowercase());
            blob.push(' ');
        }
    }
    blob
}

fn input_type<'a>(doc: &'a Document, node: NodeId) -> &'a str {
    doc.attribute(node, "type").unwrap_or("text")
}

fn is_submit_like(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        "button" => true,
        "input" => input_type(doc, node) == "submit",
        _ => false,
    }
}

/// Signals gathered from one form candidate's subtree.
struct FormSignals {
    passwords: usize,
    new_passwords: usize,
    current_passwords: usize,
    has_email: bool,
    has_text: bool,
    has_otp: bool,
    button_text: String,
}

fn gather(doc: &Document, form: NodeId) -> FormSignals {
    let mut s = FormSignals {
        passwords: 0,
        new_passwords: 0,
        current_passwords: 0,
        has_email: false,
        has_text: false,
        has_otp: false,
        button_text: String::new(),
    };
    for node in doc.descendants(form) {
        match doc.tag(node) {
            "input" | "textarea" => {
                let ty = input_type(doc, node);
                let blob = name_blob(doc, node);
                match ty {
                    "password" => {
                        s.passwords += 1;
                        if blob.contains("new-password") || blob.contains("confirm") {
                            s.new_passwords += 1;
                        }
                        if blob.contains("current-password") {
                            s.current_passwords += 1;
                        }
                    }
                    "email" => s.has_email = true,
                    "text" => {
                        s.has_text = true;
                        if blob.contains("mail") {
                            s.has_email = true;
                        }
                        if contains_any(&blob, &OTP_WORDS) || blob.contains("code") {
                            s.has_otp = true;
                        }
                    }
                    _ => {}
                }
            }
            "button" => {
                s.button_text.push_str(&label_of(doc, node));
                s.button_text.push(' ');
            }
            _ => {}
        }
        if doc.tag(node) == "input" && input_type(doc, node) == "submit" {
            s.button_text.push_str(&label_of(doc, node));
            s.button_text.push(' ');
        }
    }
    s
}

impl FormPredictor for RulesetPredictor {
    fn score_forms(&self, doc: &Document) -> Result<Vec<FormScore>, DetectError> {
        let mut out = Vec::new();
        for node in doc.descendants(doc.body()) {
            if doc.tag(node) != "form" || !doc.is_connected(node) {
                continue;
            }
            let s = gather(doc, node);
            let mut scores = Vec::new();

            let mut login: f32 = 0.0;
            if s.passwords >= 1 {
                login += 0.45;
            }
            if s.has_email || s.has_text {
                login += 0.2;
            }
            if contains_any(&s.button_text, &LOGIN_WORDS) {
                login += 0.25;
            }
            if s.current_passwords > 0 {
                login += 0.1;
            }

            let mut register: f32 = 0.0;
            if s.passwords >= 1 {
                register += 0.3;
            }
            if s.passwords >= 2 {
                register += 0.25;
            }
            if contains_any(&s.button_text, &REGISTER_WORDS) {
                register += 0.3;
            }
            if s.new_passwords > 0 {
                register += 0.25;
            }
            if s.has_email {
                register += 0.1;
            }

            let mut recovery: f32 = 0.0;
            if contains_any(&s.button_text, &RECOVERY_WORDS) && s.passwords == 0 {
                recovery += 0.55;
                if s.has_email {
                    recovery += 0.15;
                }
            }

            let mut change: f32 = 0.0;
            if s.new_passwords > 0 && s.current_passwords > 0 {
                change += 0.65;
            }

            let mut mfa: f32 = 0.0;
            if s.has_otp && s.passwords == 0 {
                mfa += 0.7;
            }

            for (kind, score) in [
                (FormKind::Login, login),
                (FormKind::Register, register),
                (FormKind::Recovery, recovery),
                (FormKind::PasswordChange, change),
                (FormKind::Mfa, mfa),
            ] {
                let score = score.clamp(0.0, 1.0);
                if score > 0.0 {
                    scores.push((kind, score));
                }
            }
            if !scores.is_empty() {
                out.push(FormScore {
                    element: node,
                    scores,
                });
            }
        }
        Ok(out)
    }

    fn score_fields(
        &self,
        doc: &Document,
        kinds: &[FieldKind],
    ) -> Result<Vec<FieldScore>, DetectError> {
        let mut out = Vec::new();
        let mut push = |element: NodeId, kind: FieldKind, score: f32| {
            if kinds.contains(&kind) {
                out.push(FieldScore {
                    element,
                    kind,
                    score,
                });
            }
        };

        for node in doc.descendants(doc.body()) {
            if !doc.is_connected(node) {
                continue;
            }
            if is_submit_like(doc, node) {
                let label = label_of(doc, node);
                let mut score: f32 = 0.6;
                if contains_any(&label, &LOGIN_WORDS)
                    || contains_any(&label, &REGISTER_WORDS)
                    || label.contains("submit")
                    || label.contains("continue")
                {
                    score += 0.3;
                }
                if label.contains("cancel") || label.contains("back") {
                    score = 0.2;
                }
                push(node, FieldKind::Submit, score.clamp(0.0, 1.0));
                continue;
            }
            if !matches!(doc.tag(node), "input" | "textarea") {
                continue;
            }

            let ty = input_type(doc, node);
            let blob = name_blob(doc, node);
            match ty {
                "password" => {
                    let newish = blob.contains("new-password")
                        || blob.contains("new")
                        || blob.contains("confirm")
                        || blob.contains("signup");
                    if newish {
                        push(node, FieldKind::PasswordNew, 0.9);
                        push(node, FieldKind::PasswordCurrent, 0.4);
                    } else {
                        push(node, FieldKind::PasswordCurrent, 0.85);
                        push(node, FieldKind::PasswordNew, 0.55);
                    }
                }
                "email" => {
                    push(node, FieldKind::Email, 0.9);
                    push(node, FieldKind::Username, 0.55);
                }
                "hidden" => {
                    if blob.contains("user") || blob.contains("mail") || blob.contains("login") {
                        push(node, FieldKind::UsernameHidden, 0.7);
                    }
                }
                "text" => {
                    if blob.contains("mail") {
                        push(node, FieldKind::Email, 0.75);
                    } else if contains_any(&blob, &USERNAME_WORDS) {
                        push(node, FieldKind::Username, 0.85);
                    } else {
                        // Generic text input: weak username signal, below
                        // the default cutoff on its own.
                        push(node, FieldKind::Username, 0.4);
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }
}
