use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::try_match;

pub const OBJECT: &str = "Object";
pub const STRING: &str = "String";

/// The static type of an expression.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedTy {
    Int,
    Boolean,
    Void,

    /// The type of `null`: a subtype of every class and array type.
    Null,

    Class(String),
    Array(Box<ResolvedTy>),

    /// Assigned to an expression whose type could not be determined.
    /// Conforms to anything in either direction so that errors do not cascade.
    Untyped,
}

impl ResolvedTy {
    pub fn object() -> Self {
        Self::Class(OBJECT.to_owned())
    }

    pub fn string() -> Self {
        Self::Class(STRING.to_owned())
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    pub fn array_of(elem: ResolvedTy) -> Self {
        Self::Array(Box::new(elem))
    }

    pub fn elem_ty(&self) -> Option<&ResolvedTy> {
        try_match!(self, Self::Array(elem) => &**elem)
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Self::Untyped)
    }

    /// Whether arguments of this type must match a parameter exactly instead of conforming to it.
    pub fn requires_exact_match(&self) -> bool {
        match self {
            Self::Int | Self::Boolean => true,
            Self::Class(name) => name == STRING,
            _ => false,
        }
    }
}

impl Display for ResolvedTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Boolean => f.write_str("boolean"),
            Self::Void => f.write_str("void"),
            Self::Null => f.write_str("null"),
            Self::Class(name) => f.write_str(name),
            Self::Array(elem) => write!(f, "{}[]", elem),
            Self::Untyped => f.write_str("{unknown}"),
        }
    }
}

/// A type name as written in a declaration, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TyNameKind<'a> {
    Int,
    Boolean,
    Void,
    Named(&'a str),
    Array(&'a str),
}

impl<'a> TyNameKind<'a> {
    pub fn parse(ty_name: &'a str) -> Self {
        if let Some(elem) = ty_name.strip_suffix("[]") {
            return Self::Array(elem.trim_end());
        }

        match ty_name {
            "int" => Self::Int,
            "boolean" => Self::Boolean,
            "void" => Self::Void,
            _ => Self::Named(ty_name),
        }
    }
}

pub trait HasTy {
    fn ty(&self) -> Option<&ResolvedTy>;

    /// Returns the assigned type, treating a missing annotation as `Untyped`.
    fn res_ty(&self) -> ResolvedTy {
        self.ty().cloned().unwrap_or(ResolvedTy::Untyped)
    }
}
