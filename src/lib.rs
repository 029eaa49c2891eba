pub mod config;
pub mod detector;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{CteScan, DetectorOptions};
pub use detector::{WRITE_KEYWORDS, WriteAnalysis, WriteCategory, WriteDetector, WriteOperation};
pub use error::{AnalysisError, ParseError};

/// Classify `sql` with the default options.
pub fn analyze_sql(sql: &str) -> Result<WriteAnalysis, AnalysisError> {
    WriteDetector::new().analyze(sql)
}
