use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::detect::DetectionTuning;
use crate::detect::predictor::{FieldKind, FormKind, FormPredictor, FormScore};
use crate::dom::{Document, NodeId};
use crate::error::DetectError;

/// One accepted form-level candidate together with the field candidates
/// associated to it. Handles are constructed from this; the adapter itself
/// never touches the DOM.
#[derive(Debug, Clone)]
pub struct DetectedForm {
    pub element: NodeId,
    pub kind: FormKind,
    pub score: f32,
    pub fields: BTreeMap<FieldKind, Vec<NodeId>>,
}

/// Run the predictor over the document and resolve its raw scores into
/// detected forms: confidence cutoff, stable ordering, the login bias, and
/// field-to-form association by containment.
pub fn classify(
    doc: &Document,
    predictor: &dyn FormPredictor,
    tuning: &DetectionTuning,
) -> Result<Vec<DetectedForm>, DetectError> {
    let order = doc.document_order();
    let rank = |id: NodeId| order.get(&id).copied().unwrap_or(usize::MAX);

    let mut forms: Vec<DetectedForm> = predictor
        .score_forms(doc)?
        .into_iter()
        .filter_map(|candidate| resolve_form(&candidate, tuning))
        .filter(|form| form.kind != FormKind::Noop)
        .collect();

    // Descending score, document order on ties.
    forms.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank(a.element).cmp(&rank(b.element)))
    });

    let mut fields = predictor.score_fields(doc, &FieldKind::ALL)?;
    fields.retain(|f| f.score > tuning.confidence);
    fields.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank(a.element).cmp(&rank(b.element)))
    });

    // Best match per element: an element scored for several roles keeps
    // only its highest-scoring one.
    let mut claimed: HashSet<NodeId> = HashSet::new();
    for field in fields {
        if !claimed.insert(field.element) {
            continue;
        }
        let target = forms
            .iter()
            .position(|form| doc.contains(form.element, field.element));

        match target {
            Some(idx) => {
                forms[idx]
                    .fields
                    .entry(field.kind)
                    .or_default()
                    .push(field.element);
            }
            None => associate_dangling(doc, &mut forms, field.kind, field.element),
        }
    }

    Ok(forms)
}

/// Apply the cutoff and the form-kind tie-break to one candidate.
fn resolve_form(candidate: &FormScore, tuning: &DetectionTuning) -> Option<DetectedForm> {
    let retained: Vec<(FormKind, f32)> = candidate
        .scores
        .iter()
        .copied()
        .filter(|&(_, score)| score > tuning.confidence)
        .collect();

    let &(mut kind, mut score) = retained.iter().max_by(|a, b| {
        a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
    })?;

    // Bias toward the less destructive classification: REGISTER must beat
    // LOGIN by more than the configured delta to win.
    if kind == FormKind::Register {
        if let Some(&(_, login_score)) = retained.iter().find(|(k, _)| *k == FormKind::Login) {
            if score - login_score <= tuning.register_bias {
                kind = FormKind::Login;
                score = login_score;
            }
        }
    }

    Some(DetectedForm {
        element: candidate.element,
        kind,
        score,
        fields: BTreeMap::new(),
    })
}

/// A field not contained by any detected form. Buttons are adopted by the
/// nearest sibling form candidate, walking up the ancestor chain; anything
/// else stays dangling and is excluded from tracking.
fn associate_dangling(
    doc: &Document,
    forms: &mut [DetectedForm],
    kind: FieldKind,
    element: NodeId,
) {
    if kind == FieldKind::Submit {
        let mut cur = element;
        while let Some(parent) = doc.parent(cur) {
            let sibling_form = doc
                .children(parent)
                .iter()
                .copied()
                .filter(|&s| s != cur)
                .find_map(|s| forms.iter().position(|f| f.element == s));
            if let Some(idx) = sibling_form {
                forms[idx].fields.entry(kind).or_default().push(element);
                return;
            }
            cur = parent;
        }
    }
    debug!(?kind, node = element.index(), "dropping dangling field candidate");
}
