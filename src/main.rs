use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sql_write_guard::parser::DEFAULT_MAX_DEPTH;
use sql_write_guard::{CteScan, DetectorOptions, WriteAnalysis, WriteDetector};

/// Exit status when the input may write.
const EXIT_WRITE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// SQL to classify (read from stdin when omitted)
    #[arg(long, short)]
    query: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// How the text after a top-level WITH is searched for writes
    #[arg(long, value_enum, default_value_t = CteScan::Substring)]
    cte_scan: CteScan,

    /// Deepest parenthesis nesting accepted before the input is rejected
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn render_text(analysis: &WriteAnalysis) -> String {
    if analysis.is_read_only() {
        return "read-only".to_string();
    }
    let operations: Vec<&str> = analysis
        .write_operations
        .iter()
        .map(|op| op.as_str())
        .collect();
    format!("write: {}", operations.join(", "))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let input = match cli.query {
        Some(query) => query,
        None => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            input
        }
    };

    if input.trim().is_empty() {
        eprintln!("Error: no SQL input provided");
        return ExitCode::FAILURE;
    }

    let detector = WriteDetector::with_options(DetectorOptions {
        cte_scan: cli.cte_scan,
        max_depth: cli.max_depth,
    });

    let analysis = match detector.analyze(&input) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("Error: {}; write status unknown", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.format {
        OutputFormat::Text => println!("{}", render_text(&analysis)),
        OutputFormat::Json => match serde_json::to_string_pretty(&analysis) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    if analysis.contains_write {
        ExitCode::from(EXIT_WRITE)
    } else {
        ExitCode::SUCCESS
    }
}
