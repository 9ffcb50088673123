//! Abstract syntax tree produced by the parser.
//!
//! The tree is owned: each node is referenced by exactly one parent and
//! the whole `Program` is moved into the code generator.

use std::fmt;

use crate::span::Position;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    /// Position of the leading keyword.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `let name (: type)? = initializer`
    VariableDeclaration {
        name: String,
        name_position: Position,
        declared_type: Option<Type>,
        initializer: Expr,
    },
    /// `print expr`
    Print(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Position of the literal or identifier; for operator nodes, the operator.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    Int(i64),
}

impl Literal {
    /// Literals carry their type with them.
    pub fn ty(&self) -> Type {
        match self {
            Literal::Str(_) => Type::Str,
            Literal::Int(_) => Type::Int,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix `+` or `-` on an int operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

impl Expr {
    pub fn literal(value: Literal, position: Position) -> Self {
        Expr {
            kind: ExprKind::Literal(value),
            position,
        }
    }

    pub fn identifier(name: impl Into<String>, position: Position) -> Self {
        Expr {
            kind: ExprKind::Identifier(name.into()),
            position,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr, position: Position) -> Self {
        Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            position,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, position: Position) -> Self {
        Expr {
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            position,
        }
    }
}
