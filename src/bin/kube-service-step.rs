//! kube-service-step CLI
//!
//! Serves the plugin over standard streams: `schema` prints the callable
//! schema for external tooling, `run` reads a request document, dispatches
//! it and prints the response.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kube_service_step::{callable_schema, CallableSchema, KubeClient};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "kube-service-step")]
#[command(about = "Create a Kubernetes service from a validated request document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the callable schema as JSON
    Schema {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Dispatch a step from a request document
    Run {
        /// Request file ({"step": ..., "input": ...}); stdin if omitted
        input: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let schema = match callable_schema(Arc::new(KubeClient::new())) {
        Ok(schema) => schema,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    let result = match cli.command {
        Commands::Schema { pretty } => print_document(&schema.describe(), pretty),
        Commands::Run { input, pretty } => run_step(&schema, input, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_step(schema: &CallableSchema, input: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let text = read_request(input)?;
    let request: Value = serde_json::from_str(&text).map_err(|err| {
        eprintln!("Error: invalid JSON request: {}", err);
        2u8
    })?;

    let Some(step_name) = request.get("step").and_then(Value::as_str) else {
        eprintln!("Error: request is missing the \"step\" field");
        return Err(2);
    };
    let step_input = request.get("input").cloned().unwrap_or_else(|| json!({}));

    let (variant, output) = schema.dispatch(step_name, &step_input).map_err(|err| {
        eprintln!("Error: {}", err);
        err.exit_code() as u8
    })?;

    let is_error_variant = schema
        .get(step_name)
        .and_then(|step| step.get_output(&variant))
        .is_some_and(|output| output.is_error());

    let response = json!({"output_id": variant, "output_data": output});
    print_document(&response, pretty)?;

    if is_error_variant {
        Err(1)
    } else {
        Ok(())
    }
}

fn read_request(input: Option<PathBuf>) -> Result<String, u8> {
    match input {
        Some(path) => std::fs::read_to_string(&path).map_err(|err| {
            eprintln!("Error: cannot read {}: {}", path.display(), err);
            3u8
        }),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(|err| {
                eprintln!("Error: cannot read stdin: {}", err);
                3u8
            })?;
            Ok(text)
        }
    }
}

fn print_document(document: &Value, pretty: bool) -> Result<(), u8> {
    let text = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
    .map_err(|err| {
        eprintln!("Error serializing output: {}", err);
        2u8
    })?;
    println!("{}", text);
    Ok(())
}
