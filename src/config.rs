use std::fmt;

use crate::parser::DEFAULT_MAX_DEPTH;

/// How the region after a top-level `WITH` is searched for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CteScan {
    /// Exact keyword tokens, plus any write keyword appearing inside the
    /// text of a token or group (`created_at` matches CREATE).
    #[default]
    Substring,
    /// Exact keyword tokens only.
    Keyword,
}

impl CteScan {
    /// Parse a mode name, falling back to the default for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "keyword" => CteScan::Keyword,
            _ => CteScan::Substring,
        }
    }
}

impl fmt::Display for CteScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CteScan::Substring => write!(f, "substring"),
            CteScan::Keyword => write!(f, "keyword"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOptions {
    pub cte_scan: CteScan,
    /// Deepest parenthesis nesting accepted before input is rejected.
    pub max_depth: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            cte_scan: CteScan::Substring,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
