//! Groups the flat token stream into statements and parenthesized groups.
//!
//! Statements end at a `;` outside any parentheses. Groups are built with an
//! explicit stack, so nesting depth is limited only by `max_depth`. Unbalanced
//! input never fails: an unmatched `)` stays a plain token and groups left
//! open at the end of a statement are closed there.

use crate::error::ParseError;
use crate::lexer::tokenize_spanned;
use crate::token::{Spanned, Token, TokenClass};

/// Nesting bound used when the caller does not choose one.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    Token(Spanned<'a>),
    Group(Group<'a>),
}

/// The class of a node, with groups reported as containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Token(TokenClass),
    Container,
}

/// A parenthesized group, including its opening and closing parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub text: &'a str,
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    /// Upper-cased, trimmed source text. For a group this is the whole span.
    pub fn normalized(&self) -> String {
        match self {
            Node::Token(spanned) => spanned.normalized(),
            Node::Group(group) => group.text.trim().to_uppercase(),
        }
    }

    pub fn class(&self) -> NodeClass {
        match self {
            Node::Token(spanned) => NodeClass::Token(spanned.token.class()),
            Node::Group(_) => NodeClass::Container,
        }
    }

    pub fn is_keyword(&self) -> bool {
        match self {
            Node::Token(spanned) => spanned.token.is_keyword(),
            Node::Group(_) => false,
        }
    }

    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Token(_) => &[],
            Node::Group(group) => &group.children,
        }
    }

    fn is_trivia(&self) -> bool {
        matches!(self, Node::Token(spanned) if spanned.token.is_trivia())
    }

    fn is_filler(&self) -> bool {
        self.is_trivia() || matches!(self, Node::Token(spanned) if spanned.token == Token::Semicolon)
    }
}

/// One SQL statement, including its terminating `;` if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Statement<'a> {
    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }
}

struct OpenGroup<'a> {
    offset: usize,
    end: usize,
    children: Vec<Node<'a>>,
}

struct StatementBuilder<'a> {
    input: &'a str,
    max_depth: usize,
    nodes: Vec<Node<'a>>,
    open: Vec<OpenGroup<'a>>,
}

impl<'a> StatementBuilder<'a> {
    fn new(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            max_depth,
            nodes: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Feed one token; returns a statement when `spanned` terminates one.
    fn push(&mut self, spanned: Spanned<'a>) -> Result<Option<Statement<'a>>, ParseError> {
        let end = spanned.offset + spanned.text.len();

        match spanned.token {
            Token::OpenParen => {
                if self.open.len() >= self.max_depth {
                    return Err(ParseError::NestingTooDeep {
                        limit: self.max_depth,
                        offset: spanned.offset,
                    });
                }
                self.open.push(OpenGroup {
                    offset: spanned.offset,
                    end,
                    children: vec![Node::Token(spanned)],
                });
            }
            Token::CloseParen if !self.open.is_empty() => {
                self.attach(Node::Token(spanned), end);
                self.close_group();
            }
            Token::Semicolon if self.open.is_empty() => {
                self.nodes.push(Node::Token(spanned));
                return Ok(self.take_statement());
            }
            _ => self.attach(Node::Token(spanned), end),
        }
        Ok(None)
    }

    fn attach(&mut self, node: Node<'a>, end: usize) {
        match self.open.last_mut() {
            Some(group) => {
                group.children.push(node);
                group.end = end;
            }
            None => self.nodes.push(node),
        }
    }

    fn close_group(&mut self) {
        if let Some(group) = self.open.pop() {
            let end = group.end;
            let node = Node::Group(Group {
                text: &self.input[group.offset..end],
                children: group.children,
            });
            self.attach(node, end);
        }
    }

    fn take_statement(&mut self) -> Option<Statement<'a>> {
        while !self.open.is_empty() {
            self.close_group();
        }
        let nodes = std::mem::take(&mut self.nodes);
        if nodes.iter().all(Node::is_filler) {
            return None;
        }
        Some(Statement { nodes })
    }
}

/// Split `input` into statements.
///
/// Statements made only of whitespace, comments and `;` are dropped, so empty
/// or comment-only input yields no statements.
pub fn parse(input: &str, max_depth: usize) -> Result<Vec<Statement<'_>>, ParseError> {
    let mut builder = StatementBuilder::new(input, max_depth);
    let mut statements = Vec::new();

    for spanned in tokenize_spanned(input) {
        if let Some(statement) = builder.push(spanned)? {
            statements.push(statement);
        }
    }
    statements.extend(builder.take_statement());

    Ok(statements)
}
