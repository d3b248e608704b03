use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::engine::settings::Settings;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "formwatch",
    version,
    about = "Form detection and autofill engine for page snapshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: formwatch.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the forms in a page snapshot and print the result
    Scan {
        /// Path to a page snapshot JSON file
        #[arg(long)]
        page: String,

        /// URL the page is assumed to be served from
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        /// Emit the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Drive the full engine through a scripted scenario
    Simulate {
        /// Path to a scenario YAML file
        #[arg(long)]
        script: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `formwatch.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("formwatch.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
