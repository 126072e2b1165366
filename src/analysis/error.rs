use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use itertools::Itertools;

use crate::ast::ty::ResolvedTy;
use crate::ast::{BinOpKind, UnOpKind};
use crate::position::{HasSpan, Span};

use super::class_table::DefinitionLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Class,
    Field,
    Method,
    Parameter,
    Local,
}

impl Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Field => "field",
            Self::Method => "method",
            Self::Parameter => "parameter",
            Self::Local => "local variable",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedTypes {
    pub span: Span,
    pub expected_ty: ResolvedTy,
    pub actual_ty: ResolvedTy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMismatch {
    pub span: Span,
    pub method: String,
    pub index: usize,
    pub expected_ty: ResolvedTy,
    pub actual_ty: ResolvedTy,
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    BuiltinRedefined {
        class: String,
        span: Span,
    },

    MultipleClassDefinition {
        class: String,
        span: Span,
        previous: DefinitionLocation,
    },

    MissingSuperclass {
        class: String,
        parent: String,
        span: Span,
    },

    FinalSuperclass {
        class: String,
        parent: String,
        span: Span,
    },

    InheritanceCycle {
        class: String,
        cycle: Vec<String>,
        span: Span,
    },

    ReservedName {
        kind: NameKind,
        name: String,
        span: Span,
    },

    MultipleDefinition {
        kind: NameKind,
        name: String,
        span: Span,
        previous: DefinitionLocation,
    },

    InvalidOverride {
        class: String,
        method: String,
        overridden_class: String,
        span: Span,
    },

    UnrecognizedTy {
        ty_name: String,
        span: Span,
    },

    IllegalVoid {
        kind: NameKind,
        name: String,
        span: Span,
    },

    MismatchedTypes(Box<MismatchedTypes>),

    InvalidOperands {
        op: BinOpKind,
        lhs_ty: ResolvedTy,
        rhs_ty: ResolvedTy,
        span: Span,
    },

    InvalidOperand {
        op: UnOpKind,
        ty: ResolvedTy,
        span: Span,
    },

    UnrecognizedName {
        name: String,
        span: Span,
    },

    NotAssignable {
        name: String,
        span: Span,
    },

    NoSuchField {
        ty: ResolvedTy,
        name: String,
        span: Span,
    },

    NotAnArray {
        name: String,
        ty: ResolvedTy,
        span: Span,
    },

    UnknownMethod {
        class: String,
        method: String,
        span: Span,
    },

    InvalidReceiver {
        ty: ResolvedTy,
        method: String,
        span: Span,
    },

    InvalidNumberOfArguments {
        method: String,
        expected_count: usize,
        supplied_count: usize,
        span: Span,
    },

    ArgumentMismatch(Box<ArgumentMismatch>),

    IllegalCast {
        from: ResolvedTy,
        to: ResolvedTy,
        span: Span,
    },

    IllegalInstanceof {
        expr_ty: ResolvedTy,
        ty: ResolvedTy,
        span: Span,
    },

    BreakOutsideLoop {
        span: Span,
    },

    MissingReturnValue {
        expected_ty: ResolvedTy,
        span: Span,
    },

    UnexpectedReturnValue {
        span: Span,
    },
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltinRedefined { class, .. } => {
                write!(f, "redefinition of the built-in class `{}`", class)
            }

            Self::MultipleClassDefinition { class, .. } => {
                write!(f, "detected multiple definition: class `{}` is already defined", class)
            }

            Self::MissingSuperclass { class, parent, .. } => {
                write!(f, "missing superclass: class `{}` extends `{}`, which does not exist", class, parent)
            }

            Self::FinalSuperclass { class, parent, .. } => {
                write!(
                    f,
                    "illegal superclass: class `{}` extends `{}`, which is final and cannot have subclasses",
                    class, parent
                )
            }

            Self::InheritanceCycle { class, cycle, .. } => {
                write!(
                    f,
                    "inheritance cycle: class `{}` is part of a cycle ({} -> {})",
                    class,
                    cycle.iter().join(" -> "),
                    class,
                )
            }

            Self::ReservedName { kind, name, .. } => {
                write!(f, "`{}` is a reserved name and cannot be used as a {} name", name, kind)
            }

            Self::MultipleDefinition { kind, name, .. } => {
                write!(f, "detected multiple definition: {} `{}` is already defined in this scope", kind, name)
            }

            Self::InvalidOverride {
                class,
                method,
                overridden_class,
                ..
            } => {
                write!(
                    f,
                    "invalid override: `{}.{}` does not match the signature of `{}.{}`",
                    class, method, overridden_class, method
                )
            }

            Self::UnrecognizedTy { ty_name, .. } => {
                write!(f, "the type name `{}` is not recognized", ty_name)
            }

            Self::IllegalVoid { kind, name, .. } => {
                write!(f, "the {} `{}` cannot have the type `void`", kind, name)
            }

            Self::MismatchedTypes(err) => {
                write!(
                    f,
                    "incompatible types: expected `{}`, found `{}`",
                    err.expected_ty, err.actual_ty
                )
            }

            Self::InvalidOperands { op, lhs_ty, rhs_ty, .. } => {
                write!(
                    f,
                    "incompatible types: the operator `{}` cannot be applied to `{}` and `{}`",
                    op, lhs_ty, rhs_ty
                )
            }

            Self::InvalidOperand { op, ty, .. } => {
                write!(f, "incompatible types: the operator `{}` cannot be applied to `{}`", op, ty)
            }

            Self::UnrecognizedName { name, .. } => write!(f, "unrecognized name `{}`", name),

            Self::NotAssignable { name, .. } => write!(f, "`{}` cannot be assigned to", name),

            Self::NoSuchField { ty, name, .. } => {
                write!(f, "the type `{}` does not have a field named `{}`", ty, name)
            }

            Self::NotAnArray { name, ty, .. } => {
                write!(f, "`{}` has the type `{}`, which is not an array type", name, ty)
            }

            Self::UnknownMethod { class, method, .. } => {
                write!(f, "method not found: class `{}` does not have a method named `{}`", class, method)
            }

            Self::InvalidReceiver { ty, method, .. } => {
                write!(f, "cannot call the method `{}` on a value of the type `{}`", method, ty)
            }

            Self::InvalidNumberOfArguments {
                method,
                expected_count,
                supplied_count,
                ..
            } => {
                write!(
                    f,
                    "the method `{}` takes {} argument{} but {} argument{} {} supplied",
                    method,
                    expected_count,
                    if *expected_count != 1usize { "s" } else { "" },
                    supplied_count,
                    if *supplied_count != 1usize { "s" } else { "" },
                    if *supplied_count != 1usize {
                        "were"
                    } else {
                        "was"
                    },
                )
            }

            Self::ArgumentMismatch(err) => {
                write!(
                    f,
                    "incompatible types: argument #{} of `{}` must {} `{}`, found `{}`",
                    err.index + 1,
                    err.method,
                    if err.exact { "be exactly" } else { "conform to" },
                    err.expected_ty,
                    err.actual_ty,
                )
            }

            Self::IllegalCast { from, to, .. } => {
                write!(f, "illegal cast from `{}` to `{}`: the types are unrelated", from, to)
            }

            Self::IllegalInstanceof { expr_ty, ty, .. } => {
                write!(
                    f,
                    "illegal instanceof: `{}` is not a subtype of the expression type `{}`",
                    ty, expr_ty
                )
            }

            Self::BreakOutsideLoop { .. } => write!(f, "`break` used outside of a loop"),

            Self::MissingReturnValue { expected_ty, .. } => {
                write!(f, "missing return value: the method must return `{}`", expected_ty)
            }

            Self::UnexpectedReturnValue { .. } => {
                write!(f, "a `void` method cannot return a value")
            }
        }
    }
}

impl Error for SemanticError {}

impl HasSpan for SemanticError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(match self {
            Self::BuiltinRedefined { span, .. }
            | Self::MultipleClassDefinition { span, .. }
            | Self::MissingSuperclass { span, .. }
            | Self::FinalSuperclass { span, .. }
            | Self::InheritanceCycle { span, .. }
            | Self::ReservedName { span, .. }
            | Self::MultipleDefinition { span, .. }
            | Self::InvalidOverride { span, .. }
            | Self::UnrecognizedTy { span, .. }
            | Self::IllegalVoid { span, .. }
            | Self::InvalidOperands { span, .. }
            | Self::InvalidOperand { span, .. }
            | Self::UnrecognizedName { span, .. }
            | Self::NotAssignable { span, .. }
            | Self::NoSuchField { span, .. }
            | Self::NotAnArray { span, .. }
            | Self::UnknownMethod { span, .. }
            | Self::InvalidReceiver { span, .. }
            | Self::InvalidNumberOfArguments { span, .. }
            | Self::IllegalCast { span, .. }
            | Self::IllegalInstanceof { span, .. }
            | Self::BreakOutsideLoop { span }
            | Self::MissingReturnValue { span, .. }
            | Self::UnexpectedReturnValue { span } => span,

            Self::MismatchedTypes(err) => &err.span,
            Self::ArgumentMismatch(err) => &err.span,
        })
    }
}
