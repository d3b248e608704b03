use clap::Parser;
use formwatch::cli::commands::{Scenario, cmd_scan, cmd_simulate};
use formwatch::cli::config::{Cli, Commands, load_config};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_scan_minimal() {
    let cli = Cli::parse_from(["formwatch", "scan", "--page", "page.json"]);
    match cli.command {
        Commands::Scan { page, url, json } => {
            assert_eq!(page, "page.json");
            assert_eq!(url, "https://example.com/");
            assert!(!json);
        }
        _ => panic!("Expected Scan command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_scan_all_args() {
    let cli = Cli::parse_from([
        "formwatch",
        "-vv",
        "scan",
        "--page",
        "page.json",
        "--url",
        "https://test.com/login",
        "--json",
    ]);
    match cli.command {
        Commands::Scan { page, url, json } => {
            assert_eq!(page, "page.json");
            assert_eq!(url, "https://test.com/login");
            assert!(json);
        }
        _ => panic!("Expected Scan command"),
    }
    assert_eq!(cli.verbose, 2);
}

#[test]
fn cli_parse_simulate() {
    let cli = Cli::parse_from([
        "formwatch",
        "simulate",
        "--script",
        "flow.yaml",
        "--config",
        "custom.yaml",
    ]);
    match cli.command {
        Commands::Simulate { script } => assert_eq!(script, "flow.yaml"),
        _ => panic!("Expected Simulate command"),
    }
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
fn missing_config_file_yields_defaults() {
    let config = load_config(Some("/nonexistent/formwatch.yaml"));
    assert!(config.settings.open_on_focus);
    assert!(config.settings.autosave_prompt);
    assert!((config.settings.tuning.confidence - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.settings.tuning.mutation_debounce_ms, 250);
    assert_eq!(config.settings.tuning.submit_cooldown_ms, 500);
}

#[test]
fn partial_config_file_fills_in_defaults() {
    let yaml = "settings:\n  open_on_focus: false\n";
    let config: formwatch::cli::config::AppConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(!config.settings.open_on_focus);
    assert!(config.settings.autosave_prompt, "unset keys keep defaults");
    assert_eq!(config.settings.tuning.mutation_debounce_ms, 250);
}

// ============================================================================
// Scenario Parsing Tests
// ============================================================================

#[test]
fn scenario_yaml_round_trips_every_step_kind() {
    let yaml = r#"
page: page.json
url: https://test.com/
steps:
  - action: focus
    target: email
  - action: fill
    target: email
    value: a@b.c
  - action: press_enter
    target: email
  - action: click
    target: submit
  - action: submit
    target: form
  - action: remove
    target: form
  - action: hide
    target: form
  - action: advance
    ms: 300
  - action: visibility
    visible: false
"#;
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(scenario.page, "page.json");
    assert_eq!(scenario.steps.len(), 9);
    assert!(scenario.items.is_empty());
}

// ============================================================================
// Command Smoke Tests (against the checked-in fixtures)
// ============================================================================

#[test]
fn scan_reports_the_fixture_login_form() {
    let config = load_config(None);
    cmd_scan(
        "tests/fixtures/login_page.json",
        "https://example.com/login",
        true,
        0,
        &config,
    )
    .expect("scan succeeds on the fixture page");
}

#[test]
fn simulate_runs_the_fixture_flow() {
    let config = load_config(None);
    cmd_simulate("tests/fixtures/login_flow.yaml", 0, &config)
        .expect("scripted flow runs to completion");
}

#[test]
fn scan_fails_cleanly_on_a_missing_page() {
    let config = load_config(None);
    assert!(cmd_scan("/nonexistent/page.json", "https://example.com/", false, 0, &config).is_err());
}
