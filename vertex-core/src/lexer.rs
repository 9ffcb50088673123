//! Lexer for Vertex source text.
//!
//! Tokens are produced lazily: `tokenize` returns an iterator that scans
//! one token per call and ends with a single `Eof` token. The iterator is
//! single pass and stops for good after the first error.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::LexError;
use crate::span::Position;

/// Kind of a token produced by the lexer.
///
/// Type names such as `int` are plain identifiers here; the parser
/// decides whether an identifier names a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    StringLiteral,
    IntLiteral,
    Operator(Operator),
    Punctuation(Punctuation),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Print,
    // Reserved so that later language versions cannot break programs
    // that would otherwise use them as identifiers.
    If,
    Else,
    For,
    While,
    Fn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    Colon,     // :
    Equal,     // =
    LParen,    // (
    RParen,    // )
    Semicolon, // ;
}

impl Keyword {
    pub fn lookup(text: &str) -> Option<Keyword> {
        let keyword = match text {
            "let" => Keyword::Let,
            "print" => Keyword::Print,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "for" => Keyword::For,
            "while" => Keyword::While,
            "fn" => Keyword::Fn,
            _ => return None,
        };
        Some(keyword)
    }
}

/// A single token.
///
/// `lexeme` is the exact source text of the token; for string literals
/// it includes the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn eof(position: Position) -> Self {
        Token::new(TokenKind::Eof, "", position)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// How the token is named in error messages.
    pub fn describe(&self) -> String {
        if self.is_eof() {
            "end of input".to_string()
        } else {
            self.lexeme.clone()
        }
    }
}

/// Decode the body of a string literal, i.e. its lexeme without quotes.
///
/// `\"` and `\\` stand for a quote and a backslash. Any other backslash
/// is kept as written.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('"' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Start lexing `source`.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer {
        source,
        chars: source.char_indices().peekable(),
        line: 1,
        column: 1,
        finished: false,
    }
}

/// Lazy token stream over a borrowed source string.
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    line: usize,
    column: usize,
    finished: bool,
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_token();
        if !matches!(&item, Ok(token) if !token.is_eof()) {
            self.finished = true;
        }
        Some(item)
    }
}

impl<'src> Lexer<'src> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let position = self.current_position();
        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(Token::eof(position));
        };

        let kind = match ch {
            '+' => TokenKind::Operator(Operator::Plus),
            '-' => TokenKind::Operator(Operator::Minus),
            '*' => TokenKind::Operator(Operator::Star),
            '/' => TokenKind::Operator(Operator::Slash),
            ':' => TokenKind::Punctuation(Punctuation::Colon),
            '=' => TokenKind::Punctuation(Punctuation::Equal),
            '(' => TokenKind::Punctuation(Punctuation::LParen),
            ')' => TokenKind::Punctuation(Punctuation::RParen),
            ';' => TokenKind::Punctuation(Punctuation::Semicolon),
            '"' => return self.lex_string(start, position),
            '0'..='9' => return Ok(self.lex_number(start, position)),
            c if is_ident_start(c) => return Ok(self.lex_ident_or_keyword(start, position)),
            other => return Err(LexError::UnknownCharacter(other, position)),
        };

        self.bump();
        Ok(Token::new(kind, &self.source[start..start + ch.len_utf8()], position))
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '#' => {
                    while let Some(&(_, ch)) = self.chars.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self, start: usize, position: Position) -> Result<Token, LexError> {
        // opening quote
        self.bump();

        while let Some(&(index, ch)) = self.chars.peek() {
            match ch {
                '"' => {
                    self.bump();
                    let lexeme = &self.source[start..index + 1];
                    return Ok(Token::new(TokenKind::StringLiteral, lexeme, position));
                }
                '\n' => break,
                '\\' => {
                    self.bump();
                    // the escaped character, which may be a quote
                    match self.chars.peek().map(|&(_, ch)| ch) {
                        Some('\n') | None => break,
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }

        Err(LexError::UnterminatedString { position })
    }

    fn lex_number(&mut self, start: usize, position: Position) -> Token {
        while self.chars.peek().is_some_and(|&(_, ch)| ch.is_ascii_digit()) {
            self.bump();
        }
        let end = self.offset();
        let source = self.source;
        Token::new(TokenKind::IntLiteral, &source[start..end], position)
    }

    fn lex_ident_or_keyword(&mut self, start: usize, position: Position) -> Token {
        while self.chars.peek().is_some_and(|&(_, ch)| is_ident_continue(ch)) {
            self.bump();
        }
        let end = self.offset();
        let source = self.source;
        let text = &source[start..end];
        let kind = match Keyword::lookup(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };
        Token::new(kind, text, position)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source.len(), |&(index, _)| index)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
