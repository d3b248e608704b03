use serde::{Deserialize, Serialize};

use crate::detect::DetectionTuning;

/// Per-instance settings. Seeded from the config file or wake-up response
/// and replaced wholesale by a `SettingsUpdate` push from the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Open the dropdown when a tracked field gains focus.
    #[serde(default = "default_true")]
    pub open_on_focus: bool,

    /// Domains of the user's own mail providers; registration forms on
    /// these never get an alias suggestion.
    #[serde(default)]
    pub email_providers: Vec<String>,

    /// Whether reconciliation may surface a save prompt at all.
    #[serde(default = "default_true")]
    pub autosave_prompt: bool,

    #[serde(default)]
    pub tuning: DetectionTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            open_on_focus: true,
            email_providers: Vec::new(),
            autosave_prompt: true,
            tuning: DetectionTuning::default(),
        }
    }
}

impl Settings {
    pub fn is_email_provider(&self, domain: &str) -> bool {
        self.email_providers.iter().any(|d| d == domain)
    }
}

fn default_true() -> bool {
    true
}
