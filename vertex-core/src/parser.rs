//! Recursive-descent parser for Vertex.
//!
//! Grammar:
//!
//! ```text
//! program     = { ";" } { statement { ";" } } EOF
//! statement   = declaration | print
//! declaration = "let" IDENT [ ":" TYPE ] "=" expression
//! print       = "print" expression
//! expression  = term { ("+" | "-") term }
//! term        = unary { ("*" | "/") unary }
//! unary       = ("+" | "-") unary | primary
//! primary     = INT | STRING | IDENT | "(" expression ")"
//! ```
//!
//! The parser pulls tokens on demand with one token of lookahead and
//! stops at the first error.
//!
//! Expression trees are bounded: at most [`MAX_NESTING`] parentheses and
//! prefix operators may be open at once, and no tree may be taller than
//! [`MAX_EXPRESSION_HEIGHT`]. Later stages walk the tree recursively.

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, StmtKind, UnaryOp};
use crate::error::{CoreError, LexError, ParseError};
use crate::lexer::{self, Keyword, Operator, Punctuation, Token, TokenKind};
use crate::span::Position;
use crate::types::Type;

/// Parentheses and prefix operators open at the same time.
pub const MAX_NESTING: usize = 200;

/// Operators on the longest path from an expression's root to a leaf.
pub const MAX_EXPRESSION_HEIGHT: usize = 512;

/// Parse a token stream into a `Program`.
///
/// Accepts the lexer directly, or any other sequence of lexing results.
/// A stream that ends without an `Eof` token is treated as if one
/// followed the last token.
pub fn parse<I>(tokens: I) -> Result<Program, CoreError>
where
    I: IntoIterator<Item = Result<Token, LexError>>,
{
    let mut parser = Parser::new(tokens.into_iter())?;
    parser.parse_program()
}

struct Parser<I> {
    tokens: I,
    current: Token,
    nesting: usize,
}

/// An expression and the height of its tree.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, height: 0 }
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    fn new(mut tokens: I) -> Result<Self, CoreError> {
        let current = pull(&mut tokens, Position::start())?;
        Ok(Parser {
            tokens,
            current,
            nesting: 0,
        })
    }

    /// Move past the current token and return it.
    fn advance(&mut self) -> Result<Token, CoreError> {
        let next = if self.current.is_eof() {
            self.current.clone()
        } else {
            pull(&mut self.tokens, self.current.position)?
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at_punct(&self, punct: Punctuation) -> bool {
        self.current.kind == TokenKind::Punctuation(punct)
    }

    fn expect_punct(&mut self, punct: Punctuation, expected: &str) -> Result<Token, CoreError> {
        if self.at_punct(punct) {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<Token, CoreError> {
        if self.current.kind == TokenKind::Identifier {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Error for the current token not matching `expected`.
    fn unexpected(&self, expected: &str) -> CoreError {
        let position = self.current.position;
        let err = if self.current.is_eof() {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                position,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.describe(),
                position,
            }
        };
        err.into()
    }

    fn skip_separators(&mut self) -> Result<(), CoreError> {
        while self.at_punct(Punctuation::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    fn parse_program(&mut self) -> Result<Program, CoreError> {
        let mut statements = Vec::new();
        self.skip_separators()?;
        while !self.current.is_eof() {
            statements.push(self.parse_statement()?);
            self.skip_separators()?;
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, CoreError> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Let) => self.parse_declaration(),
            TokenKind::Keyword(Keyword::Print) => self.parse_print(),
            _ => Err(self.unexpected("`let` or `print`")),
        }
    }

    fn parse_declaration(&mut self) -> Result<Stmt, CoreError> {
        let keyword = self.advance()?;
        let name = self.expect_identifier("variable name")?;

        let declared_type = if self.at_punct(Punctuation::Colon) {
            self.advance()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        let expected = if declared_type.is_some() {
            "`=`"
        } else {
            "`:` or `=`"
        };
        self.expect_punct(Punctuation::Equal, expected)?;
        let initializer = self.parse_expression()?;

        Ok(Stmt {
            kind: StmtKind::VariableDeclaration {
                name: name.lexeme,
                name_position: name.position,
                declared_type,
                initializer,
            },
            position: keyword.position,
        })
    }

    fn parse_type(&mut self) -> Result<Type, CoreError> {
        let token = self.expect_identifier("type name")?;
        Type::from_name(&token.lexeme).ok_or_else(|| {
            ParseError::UnknownType {
                name: token.lexeme,
                position: token.position,
            }
            .into()
        })
    }

    fn parse_print(&mut self) -> Result<Stmt, CoreError> {
        let keyword = self.advance()?;
        let expr = self.parse_expression()?;
        Ok(Stmt {
            kind: StmtKind::Print(expr),
            position: keyword.position,
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, CoreError> {
        Ok(self.parse_additive()?.expr)
    }

    fn parse_additive(&mut self) -> Result<Node, CoreError> {
        let mut left = self.parse_term()?;
        while let Some(op) = additive_op(&self.current) {
            let position = self.advance()?.position;
            let right = self.parse_term()?;
            left = binary(op, left, right, position)?;
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Node, CoreError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = multiplicative_op(&self.current) {
            let position = self.advance()?.position;
            let right = self.parse_unary()?;
            left = binary(op, left, right, position)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, CoreError> {
        let Some(op) = unary_op(&self.current) else {
            return self.parse_primary();
        };
        let position = self.advance()?.position;
        let operand = self.nested(position, Self::parse_unary)?;
        let height = grow(operand.height, position)?;
        Ok(Node {
            expr: Expr::unary(op, operand.expr, position),
            height,
        })
    }

    fn parse_primary(&mut self) -> Result<Node, CoreError> {
        match self.current.kind {
            TokenKind::IntLiteral => {
                let token = self.advance()?;
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::IntegerOutOfRange {
                        lexeme: token.lexeme.clone(),
                        position: token.position,
                    }
                })?;
                Ok(Node::leaf(Expr::literal(Literal::Int(value), token.position)))
            }
            TokenKind::StringLiteral => {
                let token = self.advance()?;
                let quoted = token
                    .lexeme
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'));
                // only hand-built token streams can get here without quotes
                let Some(body) = quoted else {
                    return Err(ParseError::UnexpectedToken {
                        expected: "quoted string literal".to_string(),
                        found: token.describe(),
                        position: token.position,
                    }
                    .into());
                };
                let value = lexer::unescape(body);
                Ok(Node::leaf(Expr::literal(Literal::Str(value), token.position)))
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                Ok(Node::leaf(Expr::identifier(token.lexeme, token.position)))
            }
            TokenKind::Punctuation(Punctuation::LParen) => {
                let position = self.advance()?.position;
                let inner = self.nested(position, Self::parse_additive)?;
                self.expect_punct(Punctuation::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested(
        &mut self,
        position: Position,
        parse: fn(&mut Self) -> Result<Node, CoreError>,
    ) -> Result<Node, CoreError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                position,
            }
            .into());
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }
}

fn binary(op: BinaryOp, left: Node, right: Node, position: Position) -> Result<Node, CoreError> {
    let height = grow(left.height.max(right.height), position)?;
    Ok(Node {
        expr: Expr::binary(op, left.expr, right.expr, position),
        height,
    })
}

/// Height of a node one level above a subtree of height `below`.
fn grow(below: usize, position: Position) -> Result<usize, CoreError> {
    if below >= MAX_EXPRESSION_HEIGHT {
        return Err(ParseError::NestingTooDeep {
            limit: MAX_EXPRESSION_HEIGHT,
            position,
        }
        .into());
    }
    Ok(below + 1)
}

fn pull<I>(tokens: &mut I, last: Position) -> Result<Token, CoreError>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    match tokens.next() {
        Some(Ok(token)) => Ok(token),
        Some(Err(err)) => Err(err.into()),
        None => Ok(Token::eof(last)),
    }
}

fn additive_op(token: &Token) -> Option<BinaryOp> {
    match token.kind {
        TokenKind::Operator(Operator::Plus) => Some(BinaryOp::Add),
        TokenKind::Operator(Operator::Minus) => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(token: &Token) -> Option<BinaryOp> {
    match token.kind {
        TokenKind::Operator(Operator::Star) => Some(BinaryOp::Mul),
        TokenKind::Operator(Operator::Slash) => Some(BinaryOp::Div),
        _ => None,
    }
}

fn unary_op(token: &Token) -> Option<UnaryOp> {
    match token.kind {
        TokenKind::Operator(Operator::Plus) => Some(UnaryOp::Plus),
        TokenKind::Operator(Operator::Minus) => Some(UnaryOp::Minus),
        _ => None,
    }
}
