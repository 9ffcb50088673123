use thiserror::Error;

use crate::span::Position;
use crate::types::Type;

/// Failures raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },
    #[error("unknown character {0:?} at {1}")]
    UnknownCharacter(char, Position),
}

/// Failures raised while building the AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found `{found}` at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("expected {expected}, found end of input at {position}")]
    UnexpectedEof { expected: String, position: Position },
    #[error("unknown type `{name}` at {position}")]
    UnknownType { name: String, position: Position },
    #[error("integer literal `{lexeme}` is out of range at {position}")]
    IntegerOutOfRange { lexeme: String, position: Position },
    #[error("expression nested more than {limit} levels deep at {position}")]
    NestingTooDeep { limit: usize, position: Position },
}

/// Failures raised while emitting the target program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("type mismatch at {position}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        position: Position,
    },
    #[error("unknown identifier `{name}` at {position}")]
    UnknownIdentifier { name: String, position: Position },
    #[error("`{name}` is already declared at {previous} (redeclared at {position})")]
    Redeclaration {
        name: String,
        position: Position,
        previous: Position,
    },
    #[error("division by zero at {position}")]
    DivisionByZero { position: Position },
    #[error("`{name}` is reserved in generated code at {position}")]
    ReservedName { name: String, position: Position },
    #[error("generated Python would nest more than {limit} brackets at {position}")]
    TooManyBrackets { limit: usize, position: Position },
}

/// Any error the compilation pipeline can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString { position } => *position,
            LexError::UnknownCharacter(_, position) => *position,
        }
    }

    /// The message without its trailing location.
    pub fn summary(&self) -> String {
        match self {
            LexError::UnterminatedString { .. } => "unterminated string literal".to_string(),
            LexError::UnknownCharacter(ch, _) => format!("unknown character {ch:?}"),
        }
    }
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::UnknownType { position, .. }
            | ParseError::IntegerOutOfRange { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => format!("expected {expected}, found `{found}`"),
            ParseError::UnexpectedEof { expected, .. } => {
                format!("expected {expected}, found end of input")
            }
            ParseError::UnknownType { name, .. } => format!("unknown type `{name}`"),
            ParseError::IntegerOutOfRange { lexeme, .. } => {
                format!("integer literal `{lexeme}` is out of range")
            }
            ParseError::NestingTooDeep { limit, .. } => {
                format!("expression nested more than {limit} levels deep")
            }
        }
    }
}

impl CodegenError {
    pub fn position(&self) -> Position {
        match self {
            CodegenError::TypeMismatch { position, .. }
            | CodegenError::UnknownIdentifier { position, .. }
            | CodegenError::Redeclaration { position, .. }
            | CodegenError::DivisionByZero { position }
            | CodegenError::ReservedName { position, .. }
            | CodegenError::TooManyBrackets { position, .. } => *position,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            CodegenError::TypeMismatch {
                expected, found, ..
            } => format!("type mismatch: expected {expected}, found {found}"),
            CodegenError::UnknownIdentifier { name, .. } => {
                format!("unknown identifier `{name}`")
            }
            CodegenError::Redeclaration { name, previous, .. } => {
                format!("`{name}` is already declared at {previous}")
            }
            CodegenError::DivisionByZero { .. } => "division by zero".to_string(),
            CodegenError::ReservedName { name, .. } => {
                format!("`{name}` is reserved in generated code")
            }
            CodegenError::TooManyBrackets { limit, .. } => {
                format!("generated Python would nest more than {limit} brackets")
            }
        }
    }
}

impl CoreError {
    /// Source position the error points at.
    pub fn position(&self) -> Position {
        match self {
            CoreError::Lex(err) => err.position(),
            CoreError::Parse(err) => err.position(),
            CoreError::Codegen(err) => err.position(),
        }
    }

    /// The message without its trailing location, for diagnostics that
    /// print the location separately.
    pub fn summary(&self) -> String {
        match self {
            CoreError::Lex(err) => err.summary(),
            CoreError::Parse(err) => err.summary(),
            CoreError::Codegen(err) => err.summary(),
        }
    }

    /// Short machine-readable name of the error kind, e.g. `UnexpectedToken`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CoreError::Lex(LexError::UnterminatedString { .. }) => "UnterminatedString",
            CoreError::Lex(LexError::UnknownCharacter(..)) => "UnknownCharacter",
            CoreError::Parse(ParseError::UnexpectedToken { .. }) => "UnexpectedToken",
            CoreError::Parse(ParseError::UnexpectedEof { .. }) => "UnexpectedEOF",
            CoreError::Parse(ParseError::UnknownType { .. }) => "UnknownType",
            CoreError::Parse(ParseError::IntegerOutOfRange { .. }) => "IntegerOutOfRange",
            CoreError::Parse(ParseError::NestingTooDeep { .. }) => "NestingTooDeep",
            CoreError::Codegen(CodegenError::TypeMismatch { .. }) => "TypeMismatch",
            CoreError::Codegen(CodegenError::UnknownIdentifier { .. }) => "UnknownIdentifier",
            CoreError::Codegen(CodegenError::Redeclaration { .. }) => "Redeclaration",
            CoreError::Codegen(CodegenError::DivisionByZero { .. }) => "DivisionByZero",
            CoreError::Codegen(CodegenError::ReservedName { .. }) => "ReservedName",
            CoreError::Codegen(CodegenError::TooManyBrackets { .. }) => "TooManyBrackets",
        }
    }
}
