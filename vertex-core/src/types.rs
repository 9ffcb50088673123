//! Type system for the Vertex language.
//!
//! The set of types is closed: every value is either a `string` or an
//! `int`. Types are attached to declarations through annotations and
//! recovered from expressions by structural inspection during code
//! generation.

use std::fmt;

/// Represents the types of values and expressions in Vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Str,
    Int,
}

impl Type {
    /// All types that may appear in an annotation, in source spelling order.
    pub const ALL: [Type; 2] = [Type::Str, Type::Int];

    /// Resolve an annotation name such as `int`.
    pub fn from_name(name: &str) -> Option<Type> {
        Type::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// The spelling used in source annotations.
    pub fn name(self) -> &'static str {
        match self {
            Type::Str => "string",
            Type::Int => "int",
        }
    }

    /// Returns true if arithmetic operators accept this type.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
