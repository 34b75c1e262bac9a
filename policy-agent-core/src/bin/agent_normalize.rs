//! Agent Normalize CLI - Recover structured JSON from agent output
//!
//! Reads an agent payload from a file or stdin and prints the normalized
//! value as pretty JSON.
//!
//! Usage:
//!     agent-normalize response.txt
//!     cat response.txt | agent-normalize --outcome
//!     agent-normalize --value body.json --digest

use clap::Parser;
use policy_agent_core::{normalize, normalize_text, Normalized, PolicyDigest};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agent-normalize")]
#[command(about = "Recover structured JSON from an agent response")]
#[command(version)]
struct Args {
    /// File to read (default: stdin)
    input: Option<PathBuf>,

    /// Treat the input as a JSON value rather than raw text
    #[arg(long)]
    value: bool,

    /// Print the recovery outcome to stderr
    #[arg(long)]
    outcome: bool,

    /// Print the policy digest instead of the normalized value
    #[arg(long)]
    digest: bool,
}

fn main() {
    let args = Args::parse();

    let input = match read_input(&args.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };

    let (raw, normalized) = if args.value {
        let raw: Value = match serde_json::from_str(&input) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error parsing --value input: {}", e);
                std::process::exit(1);
            }
        };
        let normalized = normalize(&raw);
        (raw, normalized)
    } else {
        let normalized = normalize_text(&input);
        (Value::String(input), normalized)
    };

    if args.outcome {
        report_outcome(&normalized);
    }

    let output = if args.digest {
        let digest = PolicyDigest::from_values(&normalized.value, &raw);
        serde_json::to_string_pretty(&digest)
    } else {
        serde_json::to_string_pretty(&normalized.value)
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error rendering output: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String, String> {
    if let Some(p) = path {
        return std::fs::read_to_string(p)
            .map_err(|e| format!("Failed to read {}: {}", p.display(), e));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}

fn report_outcome(normalized: &Normalized) {
    eprintln!("Outcome: {}", normalized.outcome);
    if normalized.unwrapped {
        eprintln!("Unwrapped nested response envelope");
    }
    if !normalized.is_structured() {
        eprintln!("Recovered value is not an object or array");
    }
}
