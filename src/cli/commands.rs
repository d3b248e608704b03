use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::config::AppConfig;
use crate::detect::{RulesetPredictor, classify};
use crate::dom::{Document, KeyCode, NodeId, PageEvent, snapshot};
use crate::engine::context::{FrameInfo, ScriptContext};
use crate::engine::lifecycle::ContentScript;
use crate::ui::RecordingUi;
use crate::worker::messages::LoginItem;
use crate::worker::store::MemoryStore;

// ============================================================================
// scan subcommand
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub url: String,
    pub domain: String,
    pub forms: Vec<FormReport>,
}

#[derive(Debug, Serialize)]
pub struct FormReport {
    pub kind: String,
    pub score: f32,
    pub element: String,
    pub fields: BTreeMap<String, Vec<String>>,
}

/// Classify a snapshot once and print what the engine would track.
pub fn cmd_scan(
    page: &str,
    url: &str,
    json: bool,
    verbose: u8,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = snapshot::load_file(Path::new(page))?;
    let frame = FrameInfo::new(url, true);

    if verbose > 0 {
        eprintln!("Scanning {} as {}...", page, frame.domain);
    }

    let predictor = RulesetPredictor;
    let detected = classify(&doc, &predictor, &config.settings.tuning)?;

    let forms: Vec<FormReport> = detected
        .iter()
        .map(|form| FormReport {
            kind: format!("{:?}", form.kind),
            score: form.score,
            element: describe(&doc, form.element),
            fields: form
                .fields
                .iter()
                .map(|(kind, elements)| {
                    let described = elements.iter().map(|&el| describe(&doc, el)).collect();
                    (format!("{:?}", kind), described)
                })
                .collect(),
        })
        .collect();

    let report = ScanReport {
        url: url.to_string(),
        domain: frame.domain,
        forms,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Detected {} forms on {}", report.forms.len(), report.domain);
        for form in &report.forms {
            println!("  {} ({:.2}) {}", form.kind, form.score, form.element);
            for (kind, elements) in &form.fields {
                for element in elements {
                    println!("    {:<16} {}", kind, element);
                }
            }
        }
    }

    Ok(())
}

/// Short human-readable node descriptor: `tag#id` or `tag[name=..]`.
fn describe(doc: &Document, node: NodeId) -> String {
    if let Some(id) = doc.attribute(node, "id") {
        format!("{}#{}", doc.tag(node), id)
    } else if let Some(name) = doc.attribute(node, "name") {
        format!("{}[name={}]", doc.tag(node), name)
    } else {
        doc.tag(node).to_string()
    }
}

// ============================================================================
// simulate subcommand
// ============================================================================

/// Scripted scenario driving the full engine against a snapshot. Steps
/// reference page elements by their `id` attribute.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Path to the page snapshot, relative to the scenario file.
    pub page: String,

    #[serde(default = "default_url")]
    pub url: String,

    /// Autofill candidates the background store starts with.
    #[serde(default)]
    pub items: Vec<LoginItem>,

    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Focus { target: String },
    Fill { target: String, value: String },
    PressEnter { target: String },
    Click { target: String },
    Submit { target: String },
    Remove { target: String },
    Hide { target: String },
    Advance { ms: u64 },
    Visibility { visible: bool },
}

fn default_url() -> String {
    "https://example.com/".to_string()
}

pub fn cmd_simulate(
    script: &str,
    verbose: u8,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(script)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;

    let page_path = Path::new(script)
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&scenario.page);
    let mut doc = snapshot::load_file(&page_path)?;

    let frame = FrameInfo::new(&scenario.url, true);
    let ctx = ScriptContext::new(config.settings.clone(), frame);
    let store = MemoryStore::with_items(&ctx.frame.domain, scenario.items.clone());
    let mut script_instance = ContentScript::new(
        ctx,
        Box::new(RulesetPredictor),
        store.into_port(),
        RecordingUi::new(),
    );

    let mut now: u64 = 0;
    script_instance.on_visibility(&mut doc, true, now);
    script_instance.pump(&mut doc, now);

    for step in &scenario.steps {
        if verbose > 1 {
            eprintln!("[{:>6}ms] {:?}", now, step);
        }
        match step {
            Step::Focus { target } => {
                let node = resolve(&doc, target)?;
                script_instance.handle_event(&mut doc, PageEvent::Focus { target: node }, now);
            }
            Step::Fill { target, value } => {
                let node = resolve(&doc, target)?;
                doc.set_value(node, value);
                script_instance.handle_event(&mut doc, PageEvent::Input { target: node }, now);
            }
            Step::PressEnter { target } => {
                let node = resolve(&doc, target)?;
                script_instance.handle_event(
                    &mut doc,
                    PageEvent::KeyDown {
                        target: node,
                        key: KeyCode::Enter,
                    },
                    now,
                );
            }
            Step::Click { target } => {
                let node = resolve(&doc, target)?;
                script_instance.handle_event(&mut doc, PageEvent::Click { target: node }, now);
            }
            Step::Submit { target } => {
                let node = resolve(&doc, target)?;
                script_instance.handle_event(&mut doc, PageEvent::Submit { target: node }, now);
            }
            Step::Remove { target } => {
                let node = resolve(&doc, target)?;
                doc.remove(node);
                script_instance.on_dom_mutation(now);
            }
            Step::Hide { target } => {
                let node = resolve(&doc, target)?;
                doc.set_hidden(node, true);
                script_instance.on_dom_mutation(now);
            }
            Step::Advance { ms } => {
                now += ms;
                script_instance.tick(&mut doc, now);
            }
            Step::Visibility { visible } => {
                script_instance.on_visibility(&mut doc, *visible, now);
            }
        }
        script_instance.pump(&mut doc, now);
    }
    // One extra drain so requests queued by the last step settle.
    script_instance.pump(&mut doc, now);

    // ---- Outcome summary ----
    println!("State: {:?}", script_instance.state());
    if let Some(manager) = script_instance.manager() {
        println!("Tracked forms: {}", manager.tracked().len());
        for form in manager.tracked() {
            println!("  {} {:?} ({:.2})", form.id(), form.kind(), form.score());
        }
    }
    match script_instance.port().backend().staged() {
        Some(record) => println!(
            "Submission: {:?} {:?} user={} partial={}",
            record.status, record.form_kind, record.data.username, record.partial
        ),
        None => println!("Submission: none"),
    }
    let ui = script_instance.ui();
    println!(
        "UI: {} live icons, {} notifications",
        ui.live_icons(),
        ui.notifications().count()
    );
    if verbose > 0 {
        for call in &ui.journal {
            println!("  ui: {:?}", call);
        }
    }

    Ok(())
}

/// Look a scenario target up by its `id` attribute.
fn resolve(doc: &Document, id: &str) -> Result<NodeId, String> {
    doc.descendants(doc.body())
        .into_iter()
        .find(|&node| doc.attribute(node, "id") == Some(id))
        .ok_or_else(|| format!("no element with id '{}' in snapshot", id))
}
