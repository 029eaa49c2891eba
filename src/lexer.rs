use crate::token::{Spanned, Token, lookup_keyword};

const THREE_CHAR_OPS: &[&[u8]] = &[b"->>"];
const TWO_CHAR_OPS: &[&[u8]] = &[b"<>", b"!=", b"<=", b">=", b"||", b"::", b"->", b"=>"];

/// Letters outside ASCII are word characters; Unicode spaces are not.
fn is_non_ascii_word(c: char) -> bool {
    !c.is_ascii() && !c.is_whitespace()
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_non_ascii_word(c)
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || is_non_ascii_word(c)
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset..)?.chars().next()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    fn next_spanned(&mut self) -> Option<Spanned<'a>> {
        let start = self.pos;
        let token = self.next_token()?;
        Some(Spanned {
            token,
            text: self.slice(start, self.pos),
            offset: start,
        })
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let b = self.peek()?;

        match b {
            _ if self.char_at(0).is_some_and(char::is_whitespace) => Some(self.lex_whitespace()),

            // Line comments: -- and //
            b'-' if self.peek_at(1) == Some(b'-') => Some(self.lex_line_comment()),
            b'/' if self.peek_at(1) == Some(b'/') => Some(self.lex_line_comment()),

            b'/' if self.peek_at(1) == Some(b'*') => Some(self.lex_block_comment()),

            b'\'' => Some(self.lex_string_literal()),

            // Dollar-quoted body: $$...$$
            b'$' if self.peek_at(1) == Some(b'$') => Some(self.lex_dollar_string()),

            b'"' | b'`' => Some(self.lex_quoted_identifier(b)),

            b'0'..=b'9' => Some(self.lex_number()),
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => Some(self.lex_number()),

            b',' | b';' | b'.' | b'(' | b')' => {
                self.advance();
                Some(match b {
                    b',' => Token::Comma,
                    b';' => Token::Semicolon,
                    b'.' => Token::Dot,
                    b'(' => Token::OpenParen,
                    _ => Token::CloseParen,
                })
            }

            // Bind and session variables: $1, $name, :name, @stage
            b'$' | b'@' if self.char_at(1).is_some_and(is_word_continue) => {
                Some(self.lex_variable())
            }
            b':' if self.char_at(1).is_some_and(is_word_start) => Some(self.lex_variable()),

            b'<' | b'>' | b'!' | b'=' | b'|' | b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'^'
            | b'~' | b':' => Some(self.lex_operator()),

            _ if self.char_at(0).is_some_and(is_word_start) => Some(self.lex_word()),

            // Anything else becomes a single-character operator.
            _ => {
                let start = self.pos;
                let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
                self.pos += width;
                Some(Token::Operator(self.slice(start, self.pos)))
            }
        }
    }

    fn lex_whitespace(&mut self) -> Token<'a> {
        let start = self.pos;
        while let Some(c) = self.char_at(0).filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
        Token::Whitespace(self.slice(start, self.pos))
    }

    fn lex_line_comment(&mut self) -> Token<'a> {
        // Skip the two-byte marker
        self.pos += 2;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.advance();
        }
        Token::LineComment(self.slice(start, self.pos))
    }

    fn lex_block_comment(&mut self) -> Token<'a> {
        self.pos += 2;
        let start = self.pos;
        loop {
            match self.peek() {
                None => break, // unclosed: consume to end
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    let end = self.pos;
                    self.pos += 2;
                    return Token::BlockComment(self.slice(start, end));
                }
                _ => {
                    self.advance();
                }
            }
        }
        Token::BlockComment(self.slice(start, self.pos))
    }

    fn lex_string_literal(&mut self) -> Token<'a> {
        self.advance();
        let start = self.pos;
        loop {
            match self.peek() {
                None => break, // unclosed: consume to end
                Some(b'\\') => {
                    self.advance();
                    self.advance();
                }
                Some(b'\'') => {
                    if self.peek_at(1) == Some(b'\'') {
                        self.pos += 2;
                    } else {
                        let end = self.pos;
                        self.advance();
                        return Token::StringLiteral(self.slice(start, end));
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        Token::StringLiteral(self.slice(start, self.pos))
    }

    fn lex_dollar_string(&mut self) -> Token<'a> {
        self.pos += 2;
        let start = self.pos;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos..].starts_with(b"$$") {
                let end = self.pos;
                self.pos += 2;
                return Token::StringLiteral(self.slice(start, end));
            }
            self.advance();
        }
        Token::StringLiteral(self.slice(start, self.pos))
    }

    fn lex_quoted_identifier(&mut self, quote: u8) -> Token<'a> {
        self.advance();
        let start = self.pos;
        loop {
            match self.peek() {
                None => break, // unclosed: consume to end
                Some(b) if b == quote => {
                    if self.peek_at(1) == Some(quote) {
                        self.pos += 2;
                        continue;
                    }
                    let end = self.pos;
                    self.advance();
                    return Token::QuotedIdentifier(self.slice(start, end));
                }
                _ => {
                    self.advance();
                }
            }
        }
        Token::QuotedIdentifier(self.slice(start, self.pos))
    }

    fn lex_number(&mut self) -> Token<'a> {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }
        // Exponent: 1e10, 2.5E-3
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digits_at = match self.peek_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digits_at), Some(b'0'..=b'9')) {
                self.pos += digits_at;
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
        }
        Token::NumberLiteral(self.slice(start, self.pos))
    }

    fn lex_variable(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();
        self.skip_word_chars();
        Token::Variable(self.slice(start, self.pos))
    }

    fn lex_operator(&mut self) -> Token<'a> {
        let remaining = &self.bytes[self.pos..];
        let start = self.pos;

        let width = THREE_CHAR_OPS
            .iter()
            .chain(TWO_CHAR_OPS)
            .find(|&&op| remaining.starts_with(op))
            .map_or(1, |op| op.len());

        self.pos += width;
        Token::Operator(self.slice(start, self.pos))
    }

    fn skip_word_chars(&mut self) {
        while let Some(c) = self.char_at(0).filter(|&c| is_word_continue(c)) {
            self.pos += c.len_utf8();
        }
    }

    fn lex_word(&mut self) -> Token<'a> {
        let start = self.pos;
        self.skip_word_chars();
        let word = self.slice(start, self.pos);

        let Some(kind) = lookup_keyword(word) else {
            return Token::Identifier(word);
        };

        // Parts of a dotted name (`audit.update`) are names, not keywords.
        let after_dot = start > 0 && self.bytes[start - 1] == b'.';
        let before_dot = self.peek() == Some(b'.');
        // A keyword written as a call (`REPLACE(...)`) is a function name.
        let called = self.peek() == Some(b'(') && !kind.keeps_meaning_before_paren();

        if after_dot || before_dot || called {
            Token::Identifier(word)
        } else {
            Token::Keyword(kind)
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_spanned()
    }
}

/// Tokenize `input`, keeping each token's source text and offset.
pub fn tokenize_spanned(input: &str) -> Vec<Spanned<'_>> {
    Lexer::new(input).collect()
}
