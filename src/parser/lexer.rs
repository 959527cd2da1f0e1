//! Logos-based lexer for SQuery
//!
//! Fast single-pass tokenization using the logos crate. The lexer never
//! fails: unknown characters become [`TokenKind::Error`] tokens, which
//! [`lex`] converts into warnings and drops.

use logos::Logos;

use crate::base::{TextRange, TextSize};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

use super::keywords::Keyword;

/// Comparison and reserved operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// `%=` — contains match
    Like,
    /// `%=%` — contains match
    LikeBoth,
    /// Bare `%` (reserved)
    Percent,
    /// Bare `!` (reserved; only valid as part of `!=`)
    Bang,
}

impl Op {
    /// SQL spelling for the comparison operators.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like | Self::LikeBoth => "LIKE",
            Self::Percent => "%",
            Self::Bang => "!",
        }
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident,
    Number,
    Str,
    Bool,
    Null,
    Op(Op),
    LParen,
    RParen,
    Comma,
    Dot,
    /// Unknown character
    Error,
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl<'a> Token<'a> {
    /// Source range covered by this token.
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }

    /// String literal content with the surrounding quotes removed.
    ///
    /// Only meaningful for [`TokenKind::Str`] tokens. No escape processing:
    /// the closing quote terminates the literal.
    pub fn unquoted(&self) -> &'a str {
        if self.text.len() >= 2 {
            &self.text[1..self.text.len() - 1]
        } else {
            self.text
        }
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            Ok(t) => t.classify(text),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec, error tokens included.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Tokenize for the parser: error tokens are dropped and reported as
/// warnings.
pub fn lex(input: &str) -> (Vec<Token<'_>>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    for token in Lexer::new(input) {
        if token.kind == TokenKind::Error {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::E0101,
                    format!("unknown character '{}' was skipped", token.text),
                )
                .with_span(token.range()),
            );
        } else {
            tokens.push(token);
        }
    }
    (tokens, diagnostics)
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum LogosToken {
    // =========================================================================
    // MULTI-CHARACTER OPERATORS (must come before single-char)
    // =========================================================================
    #[token("%=%")]
    LikeBoth,

    #[token("%=")]
    Like,

    #[token("!=")]
    Ne,

    #[token(">=")]
    Ge,

    #[token("<=")]
    Le,

    // =========================================================================
    // SINGLE-CHARACTER OPERATORS AND PUNCTUATION
    // =========================================================================
    #[token("=")]
    Eq,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// A minus sign immediately before a digit starts a signed number
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Single- or double-quoted, no escape processing
    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// The colon appears in polymorphic-type syntax (`Owner:Directory_FR_User`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_:]*")]
    Ident,
}

impl LogosToken {
    fn classify(self, text: &str) -> TokenKind {
        match self {
            Self::LikeBoth => TokenKind::Op(Op::LikeBoth),
            Self::Like => TokenKind::Op(Op::Like),
            Self::Ne => TokenKind::Op(Op::Ne),
            Self::Ge => TokenKind::Op(Op::Ge),
            Self::Le => TokenKind::Op(Op::Le),
            Self::Eq => TokenKind::Op(Op::Eq),
            Self::Gt => TokenKind::Op(Op::Gt),
            Self::Lt => TokenKind::Op(Op::Lt),
            Self::Percent => TokenKind::Op(Op::Percent),
            Self::Bang => TokenKind::Op(Op::Bang),
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
            Self::Comma => TokenKind::Comma,
            Self::Dot => TokenKind::Dot,
            Self::Number => TokenKind::Number,
            Self::SingleQuoted | Self::DoubleQuoted => TokenKind::Str,
            Self::Ident => classify_ident(text),
        }
    }
}

/// Keywords and the boolean/null literals are case-insensitive.
fn classify_ident(text: &str) -> TokenKind {
    if text.eq_ignore_ascii_case("null") {
        return TokenKind::Null;
    }
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        return TokenKind::Bool;
    }
    match Keyword::from_ident(text) {
        Some(keyword) => TokenKind::Keyword(keyword),
        None => TokenKind::Ident,
    }
}
