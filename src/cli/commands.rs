use crate::config::ApiConfig;
use crate::demo::{default_config, pet_store_api, PetStore};
use crate::server::RawRequest;
use crate::Api;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for the oprouter pet store.
#[derive(Parser, Debug)]
#[command(name = "oprouter", version)]
#[command(about = "Inspect and exercise the oprouter pet store API", long_about = None)]
pub struct Cli {
    /// YAML file with title, version, prefix, and docs settings
    #[arg(short, long, global = true, env = "OPROUTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the OpenAPI document
    Openapi {
        #[arg(short, long, value_enum, default_value_t = DocFormat::Json)]
        format: DocFormat,
    },
    /// List every operation after router flattening
    Routes,
    /// Dispatch a single request in-process
    Call {
        /// HTTP method, e.g. GET
        method: String,

        /// Request target including the query string
        target: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// `Name: value` header; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DocFormat {
    Json,
    Yaml,
}

fn load_config(path: Option<&Path>) -> Result<ApiConfig> {
    let config = match path {
        Some(path) => ApiConfig::from_yaml_file(path)?,
        None => default_config(),
    };
    Ok(config.apply_env())
}

fn build_api(path: Option<&Path>) -> Result<Api> {
    let config = load_config(path)?;
    Ok(pet_store_api(config, Arc::new(PetStore::seeded()))?)
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header must look like `Name: value`, got `{raw}`"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

/// Parse process arguments and run, writing to stdout.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run_cli_with_writer(cli, &mut stdout.lock())
}

pub fn run_cli_with_writer(cli: Cli, out: &mut impl Write) -> Result<()> {
    let api = build_api(cli.config.as_deref())?;
    match cli.command {
        Commands::Openapi { format } => {
            let document = api.openapi()?;
            let rendered = match format {
                DocFormat::Json => serde_json::to_string_pretty(&document)?,
                DocFormat::Yaml => serde_yaml::to_string(&document)?,
            };
            writeln!(out, "{rendered}")?;
        }
        Commands::Routes => {
            for op in api.operations()? {
                let auth = op.auth().scheme_name().unwrap_or("-");
                let id = op.docs().operation_id.as_deref().unwrap_or("-");
                writeln!(out, "{:<7} {:<28} {:<18} {}", op.method(), op.path(), auth, id)?;
            }
        }
        Commands::Call {
            method,
            target,
            body,
            headers,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid method `{method}`"))?;
            let mut request = RawRequest::new(method, target);
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                request = request.header(name, value);
            }
            if let Some(body) = body {
                request = request
                    .header("content-type", "application/json")
                    .body(body.into_bytes());
            }
            let service = api.build()?;
            let response = service.handle(request);
            writeln!(out, "{} {}", response.status, response.reason())?;
            for (name, value) in &response.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
            out.write_all(&response.body_bytes())?;
            writeln!(out)?;
        }
    }
    Ok(())
}
