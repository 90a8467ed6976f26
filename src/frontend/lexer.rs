use std::{
    collections::{BTreeMap, VecDeque},
    str::Chars,
};

use itertools::{PeekNth, peek_nth};
use once_cell::sync::Lazy;
use strum::{Display, EnumString};

use super::error::SyntaxError;
use crate::frontend::SourceFile;

#[derive(Debug)]
pub struct Lexer<'source> {
    source: &'source SourceFile,
    position: usize,
    chars: PeekNth<Chars<'source>>,
    peek_buffer: VecDeque<Token>,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /* Words */
    Keyword(Keyword), // order
    Identifier,       // yoda

    /* Literals */
    BooleanLiteral, // light
    IntegerLiteral, // 1
    FloatLiteral,   // 1.0
    StringLiteral,  // "hello there"

    /* Delimiters */
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [
    CloseBracket, // ]
    OpenBrace,    // {
    CloseBrace,   // }
    Semicolon,    // ;
    Comma,        // ,

    /* Other */
    Colon,     // :
    Arrow,     // ->
    Increment, // ++
    Decrement, // --
    Equals,    // =

    /* Unary + Binary Ops */
    Minus, // -

    /* Binary Ops */
    Plus,                 // +
    Asterisk,             // *
    DoubleAsterisk,       // **
    Divide,               // /
    Modulus,              // %
    DoubleEquals,         // ==
    NotEquals,            // !=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=
}

impl TokenKind {
    pub fn is_equality_operator(&self) -> bool {
        matches!(
            self,
            Self::DoubleEquals | Self::NotEquals | Self::Keyword(Keyword::Onewith)
        )
    }

    pub fn is_relational_operator(&self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::LessThanOrEqualTo
                | Self::GreaterThan
                | Self::GreaterThanOrEqualTo
        )
    }

    pub fn is_term_operator(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    pub fn is_factor_operator(&self) -> bool {
        matches!(self, Self::Asterisk | Self::Divide | Self::Modulus)
    }

    pub fn is_unary_operator(&self) -> bool {
        matches!(self, Self::Minus | Self::Keyword(Keyword::Darth))
    }

    /// Keywords which name a type and can therefore begin a declaration
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Self::Keyword(
                Keyword::Cred
                    | Keyword::Ket
                    | Keyword::Absolute
                    | Keyword::Transmission
                    | Keyword::Void
                    | Keyword::Tome
                    | Keyword::Holocron
            )
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    Cred,
    Ket,
    Absolute,
    Transmission,
    Void,
    Tome,
    Holocron,
    Order,
    Const,
    Should,
    Altshould,
    Elseshould,
    As,
    Force,
    In,
    Execute,
    Unleash,
    Endure,
    Emit,
    And,
    Or,
    Darth,
    Onewith,
}

/// Table of single char tokens (matched after longer sequences are checked for)
static SINGLE_TOKENS: Lazy<BTreeMap<char, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ('(', TokenKind::OpenParen),
        (')', TokenKind::CloseParen),
        ('[', TokenKind::OpenBracket),
        (']', TokenKind::CloseBracket),
        ('{', TokenKind::OpenBrace),
        ('}', TokenKind::CloseBrace),
        (';', TokenKind::Semicolon),
        (',', TokenKind::Comma),
        (':', TokenKind::Colon),
        ('*', TokenKind::Asterisk),
        ('-', TokenKind::Minus),
        ('=', TokenKind::Equals),
        ('+', TokenKind::Plus),
        ('/', TokenKind::Divide),
        ('%', TokenKind::Modulus),
        ('<', TokenKind::LessThan),
        ('>', TokenKind::GreaterThan),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source SourceFile) -> Self {
        Self {
            source,
            chars: peek_nth(source.contents.chars()),
            position: 0,
            peek_buffer: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &'source SourceFile {
        self.source
    }

    /// Builds an error pointing at a byte offset in the source
    pub fn error_at(&self, position: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(
            message,
            self.source.row_for_position(position),
            self.source.column_for_position(position),
        )
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn next_is(&mut self, n: usize, expected: char) -> bool {
        self.chars.peek_nth(n).is_some_and(|c| *c == expected)
    }

    fn ignore_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn ignore_line(&mut self) {
        while self.chars.peek().is_some_and(|c| *c != '\n') {
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<Token, SyntaxError> {
        let start_position = self.position;

        // Consume opening quote
        self.advance();

        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                return Err(self.error_at(
                    start_position,
                    "Reached end of line while reading string literal",
                ));
            }

            self.advance();

            // Skip whatever was escaped so an escaped quote doesn't terminate
            if c == '\\' && self.chars.peek().is_some_and(|c| *c != '\n') {
                self.advance();
                continue;
            }

            if c == '"' {
                return Ok(Token {
                    span: self.new_span(start_position),
                    kind: TokenKind::StringLiteral,
                });
            }
        }

        Err(self.error_at(
            start_position,
            "Reached end of file while reading string literal",
        ))
    }

    // Keyword, identifier, or boolean literal
    fn read_word(&mut self) -> Token {
        let start_position = self.position;

        while self
            .chars
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
        {
            self.advance();
        }

        let span = self.new_span(start_position);
        let value = self.source.value_of_span(span);

        let kind = if let Ok(keyword) = value.parse() {
            TokenKind::Keyword(keyword)
        } else {
            match value {
                "light" | "dark" => TokenKind::BooleanLiteral,
                _ => TokenKind::Identifier,
            }
        };

        Token { kind, span }
    }

    fn read_number(&mut self) -> Token {
        let start_position = self.position;
        let mut kind = TokenKind::IntegerLiteral;

        while let Some(c) = self.chars.peek().copied() {
            // Only treat the dot as a decimal point when digits follow it
            if c == '.' && self.chars.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                kind = TokenKind::FloatLiteral;
                self.advance();
                continue;
            }

            if !c.is_ascii_digit() {
                break;
            }

            self.advance();
        }

        Token {
            kind,
            span: self.new_span(start_position),
        }
    }

    fn read_sequence(&mut self, length: usize, kind: TokenKind) -> Token {
        let start_position = self.position;

        for _ in 0..length {
            self.advance();
        }

        Token {
            kind,
            span: self.new_span(start_position),
        }
    }

    fn new_span(&self, start: usize) -> Span {
        Span {
            start,
            end: self.position,
        }
    }

    pub fn peek(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.peek_nth(0)
    }

    /// Looks `n` tokens ahead without consuming anything
    pub fn peek_nth(&mut self, n: usize) -> Result<Option<Token>, SyntaxError> {
        while self.peek_buffer.len() <= n {
            match self.lex_token()? {
                Some(token) => self.peek_buffer.push_back(token),
                None => break,
            }
        }

        Ok(self.peek_buffer.get(n).cloned())
    }

    pub fn next(&mut self) -> Result<Option<Token>, SyntaxError> {
        if let Some(token) = self.peek_buffer.pop_front() {
            return Ok(Some(token));
        }

        self.lex_token()
    }

    fn lex_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        while let Some(c) = self.chars.peek().copied() {
            let token = match c {
                // Ignore whitespace
                c if c.is_whitespace() => {
                    self.ignore_whitespace();
                    continue;
                }
                // Ignore comments
                '>' if self.next_is(1, '<') => {
                    self.ignore_line();
                    continue;
                }

                // String literals
                '"' => self.read_string()?,

                // Integer and float literals
                n if n.is_ascii_digit() => self.read_number(),

                // Identifiers, keywords, and boolean literals
                a if a.is_ascii_alphabetic() || a == '_' => self.read_word(),

                '*' if self.next_is(1, '*') => self.read_sequence(2, TokenKind::DoubleAsterisk),
                '+' if self.next_is(1, '+') => self.read_sequence(2, TokenKind::Increment),
                '-' if self.next_is(1, '-') => self.read_sequence(2, TokenKind::Decrement),
                '-' if self.next_is(1, '>') => self.read_sequence(2, TokenKind::Arrow),
                '=' if self.next_is(1, '=') => self.read_sequence(2, TokenKind::DoubleEquals),
                '!' if self.next_is(1, '=') => self.read_sequence(2, TokenKind::NotEquals),
                '<' if self.next_is(1, '=') => {
                    self.read_sequence(2, TokenKind::LessThanOrEqualTo)
                }
                '>' if self.next_is(1, '=') => {
                    self.read_sequence(2, TokenKind::GreaterThanOrEqualTo)
                }

                s if SINGLE_TOKENS.contains_key(&s) => self.read_sequence(1, SINGLE_TOKENS[&s]),
                c => {
                    return Err(self.error_at(
                        self.position,
                        format!("Unexpected character in stream: `{c}`"),
                    ));
                }
            };

            return Ok(Some(token));
        }

        Ok(None)
    }
}
