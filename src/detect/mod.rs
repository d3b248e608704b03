pub mod adapter;
pub mod predictor;
pub mod ruleset;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use adapter::{DetectedForm, classify};
pub use predictor::{FieldKind, FieldScore, FormKind, FormPredictor, FormScore};
pub use ruleset::RulesetPredictor;

/// Product-tuned detection constants. Carried as configuration rather than
/// re-derived; the defaults match the shipped tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionTuning {
    /// Candidates scoring at or below this are discarded.
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// A register score must beat the login score by more than this for
    /// REGISTER to win when both clear the confidence cutoff.
    #[serde(default = "default_register_bias")]
    pub register_bias: f32,

    /// Coalescing window for mutation-observer bursts.
    #[serde(default = "default_mutation_debounce")]
    pub mutation_debounce_ms: u64,

    /// Window during which repeated submit triggers collapse into one
    /// staged submission.
    #[serde(default = "default_submit_cooldown")]
    pub submit_cooldown_ms: u64,
}

impl Default for DetectionTuning {
    fn default() -> Self {
        DetectionTuning {
            confidence: default_confidence(),
            register_bias: default_register_bias(),
            mutation_debounce_ms: default_mutation_debounce(),
            submit_cooldown_ms: default_submit_cooldown(),
        }
    }
}

fn default_confidence() -> f32 {
    0.5
}

fn default_register_bias() -> f32 {
    0.1
}

fn default_mutation_debounce() -> u64 {
    250
}

fn default_submit_cooldown() -> u64 {
    500
}
