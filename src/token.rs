macro_rules! define_keywords {
    ( $( $variant:ident => $text:expr ),* $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KeywordKind {
            $( $variant, )*
        }

        impl KeywordKind {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( KeywordKind::$variant => $text, )*
                }
            }
        }

        impl std::fmt::Display for KeywordKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for KeywordKind {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $( if s.eq_ignore_ascii_case($text) { return Ok(KeywordKind::$variant); } )*
                Err(())
            }
        }

        /// Lookup a keyword (case-insensitive).
        pub fn lookup_keyword(word: &str) -> Option<KeywordKind> {
            word.parse().ok()
        }
    };
}

define_keywords! {
    // Queries
    Select => "SELECT",
    From => "FROM",
    Where => "WHERE",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    In => "IN",
    Between => "BETWEEN",
    Like => "LIKE",
    Ilike => "ILIKE",
    Is => "IS",
    Null => "NULL",
    As => "AS",
    On => "ON",
    Join => "JOIN",
    Left => "LEFT",
    Right => "RIGHT",
    Inner => "INNER",
    Outer => "OUTER",
    Full => "FULL",
    Cross => "CROSS",
    Natural => "NATURAL",
    Lateral => "LATERAL",
    Order => "ORDER",
    Group => "GROUP",
    By => "BY",
    Having => "HAVING",
    Qualify => "QUALIFY",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Fetch => "FETCH",
    Union => "UNION",
    Intersect => "INTERSECT",
    Except => "EXCEPT",
    Minus => "MINUS",
    Distinct => "DISTINCT",
    All => "ALL",
    Asc => "ASC",
    Desc => "DESC",
    Case => "CASE",
    When => "WHEN",
    Then => "THEN",
    Else => "ELSE",
    End => "END",
    Exists => "EXISTS",
    Any => "ANY",
    With => "WITH",
    Recursive => "RECURSIVE",
    Returning => "RETURNING",
    Using => "USING",
    Over => "OVER",
    Partition => "PARTITION",
    Window => "WINDOW",
    Rows => "ROWS",
    Range => "RANGE",
    Pivot => "PIVOT",
    Unpivot => "UNPIVOT",
    True => "TRUE",
    False => "FALSE",

    // Row writes
    Insert => "INSERT",
    Into => "INTO",
    Overwrite => "OVERWRITE",
    Values => "VALUES",
    Update => "UPDATE",
    Set => "SET",
    Delete => "DELETE",
    Merge => "MERGE",
    Matched => "MATCHED",
    Upsert => "UPSERT",
    Replace => "REPLACE",
    Copy => "COPY",

    // Schema
    Create => "CREATE",
    Alter => "ALTER",
    Drop => "DROP",
    Truncate => "TRUNCATE",
    Rename => "RENAME",
    Table => "TABLE",
    View => "VIEW",
    Index => "INDEX",
    Column => "COLUMN",
    Add => "ADD",
    Schema => "SCHEMA",
    Database => "DATABASE",
    Warehouse => "WAREHOUSE",
    Stage => "STAGE",
    Sequence => "SEQUENCE",
    Function => "FUNCTION",
    Procedure => "PROCEDURE",
    Temporary => "TEMPORARY",
    Transient => "TRANSIENT",
    If => "IF",
    Cascade => "CASCADE",
    Comment => "COMMENT",

    // Permissions
    Grant => "GRANT",
    Revoke => "REVOKE",
    Role => "ROLE",
    To => "TO",

    // Session and control
    Show => "SHOW",
    Describe => "DESCRIBE",
    Explain => "EXPLAIN",
    Use => "USE",
    Call => "CALL",
    Execute => "EXECUTE",
    Immediate => "IMMEDIATE",
    Begin => "BEGIN",
    Commit => "COMMIT",
    Rollback => "ROLLBACK",
    Transaction => "TRANSACTION",
}

impl KeywordKind {
    /// Keywords that keep their keyword meaning directly before `(`,
    /// where any other word is read as a function name.
    pub fn keeps_meaning_before_paren(&self) -> bool {
        matches!(
            self,
            KeywordKind::As
                | KeywordKind::Case
                | KeywordKind::From
                | KeywordKind::In
                | KeywordKind::Using
                | KeywordKind::Values
        )
    }
}

/// Coarse lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Identifier,
    Literal,
    Punctuation,
    Comment,
    Whitespace,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Keyword(KeywordKind),
    Identifier(&'a str),
    QuotedIdentifier(&'a str),
    StringLiteral(&'a str),
    NumberLiteral(&'a str),
    Variable(&'a str),
    Operator(&'a str),
    Comma,
    Semicolon,
    Dot,
    OpenParen,
    CloseParen,
    LineComment(&'a str),
    BlockComment(&'a str),
    Whitespace(&'a str),
}

impl Token<'_> {
    pub fn class(&self) -> TokenClass {
        match self {
            Token::Keyword(_) => TokenClass::Keyword,
            Token::Identifier(_) | Token::QuotedIdentifier(_) => TokenClass::Identifier,
            Token::StringLiteral(_) | Token::NumberLiteral(_) => TokenClass::Literal,
            Token::Comma | Token::Semicolon | Token::Dot | Token::OpenParen | Token::CloseParen => {
                TokenClass::Punctuation
            }
            Token::LineComment(_) | Token::BlockComment(_) => TokenClass::Comment,
            Token::Whitespace(_) => TokenClass::Whitespace,
            Token::Variable(_) | Token::Operator(_) => TokenClass::Other,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Keyword(_))
    }

    /// Comments and whitespace carry no statement structure.
    pub fn is_trivia(&self) -> bool {
        matches!(self.class(), TokenClass::Comment | TokenClass::Whitespace)
    }
}

/// A token together with the exact source text it was lexed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub text: &'a str,
    /// Byte offset of `text` in the input.
    pub offset: usize,
}

impl Spanned<'_> {
    /// Upper-cased, trimmed source text.
    pub fn normalized(&self) -> String {
        self.text.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_keyword_uppercase() {
        assert_eq!(lookup_keyword("SELECT"), Some(KeywordKind::Select));
        assert_eq!(lookup_keyword("WITH"), Some(KeywordKind::With));
        assert_eq!(lookup_keyword("MERGE"), Some(KeywordKind::Merge));
        assert_eq!(lookup_keyword("CREATE"), Some(KeywordKind::Create));
    }

    #[test]
    fn test_lookup_keyword_mixed_case() {
        assert_eq!(lookup_keyword("Select"), Some(KeywordKind::Select));
        assert_eq!(lookup_keyword("uPsErT"), Some(KeywordKind::Upsert));
        assert_eq!(lookup_keyword("DeLeTe"), Some(KeywordKind::Delete));
        assert_eq!(lookup_keyword("revoke"), Some(KeywordKind::Revoke));
    }

    #[test]
    fn test_lookup_keyword_not_found() {
        assert_eq!(lookup_keyword("foobar"), None);
        assert_eq!(lookup_keyword(""), None);
        assert_eq!(lookup_keyword("UPDATED"), None);
        assert_eq!(lookup_keyword("ORDER BY"), None);
    }

    #[test]
    fn test_every_write_keyword_is_in_table() {
        for word in [
            "INSERT", "UPDATE", "DELETE", "MERGE", "UPSERT", "REPLACE", "CREATE", "ALTER", "DROP",
            "TRUNCATE", "RENAME", "GRANT", "REVOKE",
        ] {
            let kind = lookup_keyword(word).unwrap_or_else(|| panic!("{word} missing"));
            assert_eq!(kind.as_str(), word);
        }
    }

    #[test]
    fn test_keeps_meaning_before_paren() {
        assert!(KeywordKind::Values.keeps_meaning_before_paren());
        assert!(KeywordKind::In.keeps_meaning_before_paren());
        assert!(KeywordKind::As.keeps_meaning_before_paren());

        assert!(!KeywordKind::Replace.keeps_meaning_before_paren());
        assert!(!KeywordKind::Left.keeps_meaning_before_paren());
    }

    #[test]
    fn test_token_class() {
        assert_eq!(Token::Keyword(KeywordKind::Drop).class(), TokenClass::Keyword);
        assert_eq!(Token::QuotedIdentifier("x").class(), TokenClass::Identifier);
        assert_eq!(Token::StringLiteral("x").class(), TokenClass::Literal);
        assert_eq!(Token::NumberLiteral("1").class(), TokenClass::Literal);
        assert_eq!(Token::OpenParen.class(), TokenClass::Punctuation);
        assert_eq!(Token::BlockComment("x").class(), TokenClass::Comment);
        assert_eq!(Token::Whitespace(" ").class(), TokenClass::Whitespace);
        assert_eq!(Token::Variable("$1").class(), TokenClass::Other);
    }

    #[test]
    fn test_is_trivia() {
        assert!(Token::Whitespace("\n").is_trivia());
        assert!(Token::LineComment(" x").is_trivia());
        assert!(!Token::Identifier("x").is_trivia());
        assert!(!Token::Keyword(KeywordKind::Insert).is_trivia());
    }

    #[test]
    fn test_spanned_normalized() {
        let spanned = Spanned {
            token: Token::Keyword(KeywordKind::Insert),
            text: "insert",
            offset: 0,
        };
        assert_eq!(spanned.normalized(), "INSERT");
    }
}
