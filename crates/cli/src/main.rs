use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_core::{message_text, CoreConfig, HttpRepository, SyncOrchestrator};
use bridge_types::BearerToken;
use clap::{Parser, Subcommand};
use fhir::ResourceType;
use hl7::{Message, ValidationIssue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "HL7 v2 to FHIR bridge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the structure of a message file and list every issue found
    Validate {
        /// HL7 v2 text, or a JSON file holding the segment object form
        file: PathBuf,
    },
    /// Map a message to FHIR resources and print them, without contacting any server
    Map {
        file: PathBuf,
        /// Comma-separated resource types, e.g. "Patient,Coverage"
        #[arg(long)]
        resource_type: String,
    },
    /// Map a message and synchronise it with the FHIR server named by OAUTH2_SERVER_URL
    Convert {
        file: PathBuf,
        #[arg(long)]
        resource_type: String,
        /// Bearer token forwarded to the FHIR server
        #[arg(long, env = "BRIDGE_TOKEN")]
        token: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => {
            let raw = message_text(&read_message(&file)?)?;
            let issues = hl7::validate(&raw);
            if issues.is_empty() {
                println!("{}: valid", file.display());
            } else {
                report(&issues);
                std::process::exit(1);
            }
        }
        Commands::Map {
            file,
            resource_type,
        } => {
            let raw = checked_message(&file)?;
            let types = ResourceType::parse_list(&resource_type)?;
            let records = bridge_core::map_all(&Message::parse(&raw), &types)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Convert {
            file,
            resource_type,
            token,
        } => {
            dotenvy::dotenv().ok();
            let cfg = Arc::new(CoreConfig::from_lookup(|name| std::env::var(name).ok())?);
            let sync = SyncOrchestrator::new(Arc::new(HttpRepository::new(cfg)?));
            let token = BearerToken::new(&token)?;
            let message = read_message(&file)?;

            let runtime = tokio::runtime::Runtime::new()?;
            let outcomes = match runtime.block_on(sync.convert(&message, &resource_type, &token)) {
                Ok(outcomes) => outcomes,
                Err(bridge_core::CoreError::Validation(issues)) => {
                    report(&issues);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            if outcomes.iter().any(|o| !o.success) {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

/// Files starting with `{` are read as the JSON object form; anything else is raw HL7 text.
fn read_message(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim_start().starts_with('{') {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(Value::String(contents))
    }
}

fn checked_message(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let raw = message_text(&read_message(path)?)?;
    let issues = hl7::validate(&raw);
    if !issues.is_empty() {
        report(&issues);
        std::process::exit(1);
    }
    Ok(raw)
}

fn report(issues: &[ValidationIssue]) {
    for issue in issues {
        eprintln!("{}: {}", issue.field, issue.message);
    }
}
