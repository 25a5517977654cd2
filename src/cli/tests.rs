//! Unit tests for CLI commands

use crate::cli::{run_cli_with_writer, Cli, Commands, DocFormat};
use clap::Parser;
use std::io::Write;

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_cli_with_writer(cli, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_openapi_command_defaults_to_json() {
    let cli = Cli::try_parse_from(["oprouter", "openapi"]).unwrap();
    match cli.command {
        Commands::Openapi { format } => assert_eq!(format, DocFormat::Json),
        _ => panic!("Expected Openapi command"),
    }
}

#[test]
fn test_call_command_with_headers() {
    let cli = Cli::try_parse_from([
        "oprouter",
        "call",
        "POST",
        "/pets",
        "--body",
        "{}",
        "-H",
        "Authorization: Bearer x",
        "--header",
        "X-Trace: 1",
    ])
    .unwrap();
    match cli.command {
        Commands::Call {
            method,
            target,
            body,
            headers,
        } => {
            assert_eq!(method, "POST");
            assert_eq!(target, "/pets");
            assert_eq!(body.as_deref(), Some("{}"));
            assert_eq!(headers.len(), 2);
        }
        _ => panic!("Expected Call command"),
    }
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["oprouter", "serve"]).is_err());
}

#[test]
fn test_openapi_json_output() {
    let out = run(&["oprouter", "openapi"]);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"]["title"], "Pet Store");
    assert!(doc["paths"]["/pets/{pet_id}"]["get"].is_object());
}

#[test]
fn test_openapi_yaml_output() {
    let out = run(&["oprouter", "openapi", "--format", "yaml"]);
    let doc: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
    assert_eq!(doc["openapi"].as_str(), Some("3.1.0"));
}

#[test]
fn test_routes_output_lists_auth() {
    let out = run(&["oprouter", "routes"]);
    let create = out
        .lines()
        .find(|l| l.starts_with("POST"))
        .expect("create route listed");
    assert!(create.contains("/pets"));
    assert!(create.contains("bearerTokenAuth"));
    assert!(create.contains("createPet"));
    let health = out.lines().find(|l| l.contains("/health")).unwrap();
    assert!(health.contains(" - "));
}

#[test]
fn test_call_prints_status_and_body() {
    let out = run(&["oprouter", "call", "get", "/pets/1"]);
    assert!(out.starts_with("200 OK"));
    assert!(out.contains("\"Whiskers\""));
}

#[test]
fn test_call_rejects_malformed_header() {
    let cli = Cli::try_parse_from(["oprouter", "call", "GET", "/pets", "-H", "nocolon"]).unwrap();
    let mut out = Vec::new();
    let err = run_cli_with_writer(cli, &mut out).unwrap_err();
    assert!(err.to_string().contains("Name: value"));
}

#[test]
fn test_config_file_changes_prefix() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "title: Shelter\nprefix: /v2").unwrap();
    let path = file.path().to_str().unwrap();
    let out = run(&["oprouter", "--config", path, "routes"]);
    assert!(out.contains("/v2/pets"));
    assert!(out.contains("/v2/health"));
}
