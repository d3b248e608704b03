use tracing::debug;

use crate::detect::DetectionTuning;
use crate::detect::adapter::classify;
use crate::detect::predictor::FormPredictor;
use crate::dom::Document;
use crate::error::DetectError;
use crate::track::form::{FormHandle, FormId, FormIdGen, PROCESSED_ATTR};

/// Outcome of the cheap pre-check run on every (debounced) mutation tick.
#[derive(Debug, Default)]
pub struct Assessment {
    /// A visible, unprocessed, untracked input exists — worth paying for a
    /// full classifier pass.
    pub run_detection: bool,
    /// Tracked forms whose element left the document or is no longer
    /// visible.
    pub remove: Vec<FormId>,
    /// Remaining tracked forms whose fields escaped the form element.
    pub update: Vec<FormId>,
}

impl Assessment {
    pub fn is_noop(&self) -> bool {
        !self.run_detection && self.remove.is_empty() && self.update.is_empty()
    }
}

/// Decide whether re-detection is warranted and which tracked forms are
/// stale. Every input inspected here is marked processed regardless of the
/// outcome, so the same element is never re-scanned on a later tick.
pub fn assess(doc: &mut Document, tracked: &[FormHandle]) -> Assessment {
    let mut run_detection = false;

    if doc.is_visible(doc.body()) {
        for input in doc.inputs() {
            if doc.has_attribute(input, PROCESSED_ATTR) {
                continue;
            }
            doc.set_attribute(input, PROCESSED_ATTR, "true");
            if !doc.is_visible(input) {
                continue;
            }
            if tracked.iter().any(|form| doc.contains(form.element(), input)) {
                continue;
            }
            run_detection = true;
        }
    }

    let remove: Vec<FormId> = tracked
        .iter()
        .filter(|form| form.should_remove(doc) || !doc.is_visible(form.element()))
        .map(FormHandle::id)
        .collect();

    let update: Vec<FormId> = tracked
        .iter()
        .filter(|form| !remove.contains(&form.id()) && form.should_update(doc))
        .map(FormHandle::id)
        .collect();

    Assessment {
        run_detection,
        remove,
        update,
    }
}

/// One full classifier pass. Constructs fresh, unattached handles for every
/// accepted candidate; attachment and diffing against the tracked set are
/// the caller's responsibility.
pub fn run_detection(
    doc: &Document,
    predictor: &dyn FormPredictor,
    tuning: &DetectionTuning,
    ids: &mut FormIdGen,
) -> Result<Vec<FormHandle>, DetectError> {
    let detected = classify(doc, predictor, tuning)?;
    debug!(candidates = detected.len(), "classifier pass complete");
    Ok(detected
        .into_iter()
        .map(|form| FormHandle::new(ids.next(), form))
        .collect())
}
