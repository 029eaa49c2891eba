//! Write detection over parsed statements.
//!
//! A statement is a write when any keyword token anywhere in it, at any
//! parenthesis depth, is one of [`WRITE_KEYWORDS`]. Statements with a
//! top-level `WITH` get a second pass over everything after the `WITH`, which
//! reports writes hidden in CTE bodies as [`WriteOperation::CteWrite`].

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
#[cfg(feature = "tracing")]
use tracing::{debug, debug_span, trace, warn};

use crate::config::{CteScan, DetectorOptions};
use crate::error::AnalysisError;
use crate::parser::{Node, NodeClass, Statement, parse};
use crate::token::TokenClass;

/// A write keyword, or the marker for a write found inside a WITH clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteOperation {
    Insert,
    Update,
    Delete,
    Merge,
    Upsert,
    Replace,
    Create,
    Alter,
    Drop,
    Truncate,
    Rename,
    Grant,
    Revoke,
    CteWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WriteCategory {
    /// Row writes.
    Dml,
    /// Schema changes.
    Ddl,
    /// Permission changes.
    Dcl,
}

const DML_WRITE_KEYWORDS: &[WriteOperation] = &[
    WriteOperation::Insert,
    WriteOperation::Update,
    WriteOperation::Delete,
    WriteOperation::Merge,
    WriteOperation::Upsert,
    WriteOperation::Replace,
];

const DDL_KEYWORDS: &[WriteOperation] = &[
    WriteOperation::Create,
    WriteOperation::Alter,
    WriteOperation::Drop,
    WriteOperation::Truncate,
    WriteOperation::Rename,
];

const DCL_KEYWORDS: &[WriteOperation] = &[WriteOperation::Grant, WriteOperation::Revoke];

/// Every keyword whose presence marks a statement as a write.
pub const WRITE_KEYWORDS: [WriteOperation; 13] = [
    WriteOperation::Insert,
    WriteOperation::Update,
    WriteOperation::Delete,
    WriteOperation::Merge,
    WriteOperation::Upsert,
    WriteOperation::Replace,
    WriteOperation::Create,
    WriteOperation::Alter,
    WriteOperation::Drop,
    WriteOperation::Truncate,
    WriteOperation::Rename,
    WriteOperation::Grant,
    WriteOperation::Revoke,
];

impl WriteCategory {
    pub const ALL: [WriteCategory; 3] = [WriteCategory::Dml, WriteCategory::Ddl, WriteCategory::Dcl];

    pub fn keywords(self) -> &'static [WriteOperation] {
        match self {
            WriteCategory::Dml => DML_WRITE_KEYWORDS,
            WriteCategory::Ddl => DDL_KEYWORDS,
            WriteCategory::Dcl => DCL_KEYWORDS,
        }
    }
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Insert => "INSERT",
            WriteOperation::Update => "UPDATE",
            WriteOperation::Delete => "DELETE",
            WriteOperation::Merge => "MERGE",
            WriteOperation::Upsert => "UPSERT",
            WriteOperation::Replace => "REPLACE",
            WriteOperation::Create => "CREATE",
            WriteOperation::Alter => "ALTER",
            WriteOperation::Drop => "DROP",
            WriteOperation::Truncate => "TRUNCATE",
            WriteOperation::Rename => "RENAME",
            WriteOperation::Grant => "GRANT",
            WriteOperation::Revoke => "REVOKE",
            WriteOperation::CteWrite => "CTE_WRITE",
        }
    }

    /// The write keyword spelled exactly `normalized` (upper case).
    pub fn from_keyword(normalized: &str) -> Option<Self> {
        WRITE_KEYWORDS
            .into_iter()
            .find(|op| op.as_str() == normalized)
    }

    /// `None` for the CTE marker.
    pub fn category(&self) -> Option<WriteCategory> {
        WriteCategory::ALL
            .into_iter()
            .find(|category| category.keywords().contains(self))
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WriteAnalysis {
    pub contains_write: bool,
    pub write_operations: BTreeSet<WriteOperation>,
    pub has_cte_write: bool,
}

impl WriteAnalysis {
    pub fn is_read_only(&self) -> bool {
        !self.contains_write
    }

    pub fn contains(&self, operation: WriteOperation) -> bool {
        self.write_operations.contains(&operation)
    }
}

/// Classifies SQL text as read-only or potentially writing.
///
/// The detector holds no per-call state; one instance can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteDetector {
    options: DetectorOptions,
}

impl WriteDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DetectorOptions) -> Self {
        Self { options }
    }

    /// Classify every statement in `sql` and merge the findings.
    ///
    /// Malformed SQL is classified on a best-effort basis. The only error is
    /// nesting deeper than [`DetectorOptions::max_depth`], reported as
    /// [`AnalysisError::Unparsable`]; treat it as a write.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn analyze(&self, sql: &str) -> Result<WriteAnalysis, AnalysisError> {
        #[cfg(feature = "tracing")]
        let _span = debug_span!("analyze", len = sql.len()).entered();

        let statements = parse(sql, self.options.max_depth).map_err(|err| {
            #[cfg(feature = "tracing")]
            warn!(%err, "rejecting unparsable input");
            AnalysisError::from(err)
        })?;

        let mut operations = BTreeSet::new();
        let mut has_cte_write = false;

        for (index, statement) in statements.iter().enumerate() {
            if has_cte(statement) && self.cte_has_write(statement) {
                #[cfg(feature = "tracing")]
                debug!(index, "write inside WITH clause");
                has_cte_write = true;
                operations.insert(WriteOperation::CteWrite);
            }

            let found = find_write_operations(statement.nodes());
            #[cfg(feature = "tracing")]
            trace!(index, found = found.len(), "classified statement");
            operations.extend(found);
        }

        Ok(WriteAnalysis {
            contains_write: !operations.is_empty() || has_cte_write,
            write_operations: operations,
            has_cte_write,
        })
    }

    /// Whether anything after the statement's top-level `WITH` writes.
    fn cte_has_write(&self, statement: &Statement<'_>) -> bool {
        let Some(region) = cte_region(statement) else {
            return false;
        };

        match self.options.cte_scan {
            CteScan::Keyword => !find_write_operations(region).is_empty(),
            // A group's text spans all of its descendants, so matching the
            // region's top-level nodes covers every nested token as well.
            CteScan::Substring => region.iter().any(|node| {
                let text = node.normalized();
                WRITE_KEYWORDS.iter().any(|op| text.contains(op.as_str()))
            }),
        }
    }
}

fn is_with_keyword(node: &Node<'_>) -> bool {
    node.is_keyword() && node.normalized() == "WITH"
}

/// Whether the statement's own nodes (not nested groups) include `WITH`.
fn has_cte(statement: &Statement<'_>) -> bool {
    statement.nodes().iter().any(is_with_keyword)
}

/// Everything after the first top-level `WITH`.
fn cte_region<'s, 'a>(statement: &'s Statement<'a>) -> Option<&'s [Node<'a>]> {
    let nodes = statement.nodes();
    let position = nodes.iter().position(is_with_keyword)?;
    Some(&nodes[position + 1..])
}

/// Collect the write keywords among `nodes` and all their descendants.
///
/// Walks depth-first in source order with an explicit stack; comments and
/// whitespace are skipped.
fn find_write_operations(nodes: &[Node<'_>]) -> BTreeSet<WriteOperation> {
    let mut found = BTreeSet::new();
    let mut stack: Vec<&Node<'_>> = nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        match node.class() {
            NodeClass::Container => stack.extend(node.children().iter().rev()),
            NodeClass::Token(TokenClass::Comment | TokenClass::Whitespace) => {}
            NodeClass::Token(TokenClass::Keyword) => {
                if let Some(op) = WriteOperation::from_keyword(&node.normalized()) {
                    found.insert(op);
                }
            }
            NodeClass::Token(
                TokenClass::Identifier
                | TokenClass::Literal
                | TokenClass::Punctuation
                | TokenClass::Other,
            ) => {}
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DEFAULT_MAX_DEPTH;

    fn first_statement(sql: &str) -> Statement<'_> {
        parse(sql, DEFAULT_MAX_DEPTH)
            .expect("parse should succeed")
            .into_iter()
            .next()
            .expect("at least one statement")
    }

    #[test]
    fn test_write_keywords_are_union_of_categories() {
        let union: BTreeSet<_> = WriteCategory::ALL
            .into_iter()
            .flat_map(|c| c.keywords().iter().copied())
            .collect();
        let all: BTreeSet<_> = WRITE_KEYWORDS.into_iter().collect();
        assert_eq!(union, all);
        assert_eq!(all.len(), 13);
        assert!(!all.contains(&WriteOperation::CteWrite));
    }

    #[test]
    fn test_category() {
        assert_eq!(WriteOperation::Upsert.category(), Some(WriteCategory::Dml));
        assert_eq!(WriteOperation::Rename.category(), Some(WriteCategory::Ddl));
        assert_eq!(WriteOperation::Revoke.category(), Some(WriteCategory::Dcl));
        assert_eq!(WriteOperation::CteWrite.category(), None);
    }

    #[test]
    fn test_from_keyword_is_exact() {
        assert_eq!(
            WriteOperation::from_keyword("TRUNCATE"),
            Some(WriteOperation::Truncate)
        );
        assert_eq!(WriteOperation::from_keyword("truncate"), None);
        assert_eq!(WriteOperation::from_keyword("UPDATED"), None);
        assert_eq!(WriteOperation::from_keyword("CTE_WRITE"), None);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(WriteOperation::CteWrite.to_string(), "CTE_WRITE");
        assert_eq!(
            serde_json::to_string(&WriteOperation::CteWrite).unwrap(),
            "\"CTE_WRITE\""
        );
        assert_eq!(
            serde_json::to_string(&WriteOperation::Insert).unwrap(),
            "\"INSERT\""
        );
    }

    #[test]
    fn test_has_cte() {
        let with = first_statement("WITH cte AS (SELECT * FROM users) SELECT * FROM cte");
        assert!(has_cte(&with));

        let without = first_statement("SELECT * FROM users");
        assert!(!has_cte(&without));
    }

    #[test]
    fn test_has_cte_ignores_nested_with() {
        let nested = first_statement("SELECT * FROM (WITH x AS (SELECT 1) SELECT * FROM x)");
        assert!(!has_cte(&nested));
    }

    #[test]
    fn test_cte_region_starts_after_with() {
        let statement = first_statement("/* c */ WITH a AS (SELECT 1) SELECT 2");
        let region = cte_region(&statement).expect("region");
        assert_eq!(region[0].class(), NodeClass::Token(TokenClass::Whitespace));
        assert_eq!(region[1].normalized(), "A");
    }

    #[test]
    fn test_find_write_operations() {
        let insert = first_statement("INSERT INTO users VALUES (1, 'John')");
        let ops = find_write_operations(insert.nodes());
        assert!(ops.contains(&WriteOperation::Insert));

        let select = first_statement("SELECT * FROM users");
        assert!(find_write_operations(select.nodes()).is_empty());
    }

    #[test]
    fn test_find_write_operations_skips_comments_and_literals() {
        let statement = first_statement("SELECT 'DROP' /* delete */ FROM t -- update");
        assert!(find_write_operations(statement.nodes()).is_empty());
    }

    #[test]
    fn test_find_write_operations_nested() {
        let statement = first_statement("SELECT * FROM (SELECT * FROM ((DELETE FROM t)))");
        let ops = find_write_operations(statement.nodes());
        assert_eq!(ops, BTreeSet::from([WriteOperation::Delete]));
    }

    #[test]
    fn test_cte_has_write() {
        let detector = WriteDetector::new();

        let write = first_statement(
            "WITH updated AS (UPDATE users SET status = 'active' RETURNING *) SELECT * FROM updated",
        );
        assert!(detector.cte_has_write(&write));

        let read = first_statement(
            "WITH user_stats AS (SELECT user_id, COUNT(*) as count FROM orders GROUP BY user_id) \
             SELECT * FROM user_stats",
        );
        assert!(!detector.cte_has_write(&read));
    }

    #[test]
    fn test_cte_substring_mode_matches_identifiers() {
        let statement = first_statement("WITH x AS (SELECT created_at FROM t) SELECT * FROM x");

        assert!(WriteDetector::new().cte_has_write(&statement));

        let keyword_only = WriteDetector::with_options(DetectorOptions {
            cte_scan: CteScan::Keyword,
            ..DetectorOptions::default()
        });
        assert!(!keyword_only.cte_has_write(&statement));
    }

    #[test]
    fn test_cte_substring_mode_matches_comments() {
        let statement = first_statement("WITH x AS (SELECT 1) -- never drop\nSELECT * FROM x");
        assert!(WriteDetector::new().cte_has_write(&statement));
    }

    #[test]
    fn test_analysis_helpers() {
        let analysis = WriteAnalysis::default();
        assert!(analysis.is_read_only());
        assert!(!analysis.contains(WriteOperation::Insert));
    }
}
