use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use tracing::debug;

use crate::errors::{DiagnosticMessage, Diagnostics};
use crate::position::{HasSpan, Span};

use super::class_table::{ClassTable, DefinitionLocation};

pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoEntryPointError {
    NoMainClass,

    NoMainMethod {
        class_location: DefinitionLocation,
    },

    InvalidMainSignature {
        method_location: DefinitionLocation,
        return_ty: String,
        param_count: usize,
    },
}

impl NoEntryPointError {
    fn location_span(&self) -> Option<&Span> {
        match self {
            Self::NoMainClass => None,
            Self::NoMainMethod { class_location } => class_location.span(),
            Self::InvalidMainSignature {
                method_location, ..
            } => method_location.span(),
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Self::NoMainClass => None,
            Self::NoMainMethod { class_location } => class_location.file(),
            Self::InvalidMainSignature {
                method_location, ..
            } => method_location.file(),
        }
    }
}

impl Display for NoEntryPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMainClass => write!(f, "no `{}` class found", MAIN_CLASS),

            Self::NoMainMethod { .. } => {
                write!(f, "the `{}` class must define a method named `{}`", MAIN_CLASS, MAIN_METHOD)
            }

            Self::InvalidMainSignature {
                return_ty,
                param_count,
                ..
            } => {
                write!(
                    f,
                    "the method `{}.{}` has an invalid signature: it must return `void` and take no parameters \
                     (found a return type of `{}` and {} parameter{})",
                    MAIN_CLASS,
                    MAIN_METHOD,
                    return_ty,
                    param_count,
                    if *param_count == 1 { "" } else { "s" },
                )
            }
        }
    }
}

impl Error for NoEntryPointError {}

impl HasSpan for NoEntryPointError {
    fn span(&self) -> Cow<'_, Span> {
        match self.location_span() {
            Some(span) => Cow::Borrowed(span),
            None => Cow::Owned(Span::default()),
        }
    }
}

impl From<NoEntryPointError> for DiagnosticMessage {
    fn from(err: NoEntryPointError) -> DiagnosticMessage {
        let message = DiagnosticMessage::new(err.to_string());

        match err.location_span() {
            Some(span) => message.with_span(span.clone()),
            None => message,
        }
    }
}

fn find_entry_point(table: &ClassTable) -> Result<(), NoEntryPointError> {
    let Some(class) = table.id_of(MAIN_CLASS) else {
        return Err(NoEntryPointError::NoMainClass);
    };

    let Some((_, method)) = table.lookup_method(class, MAIN_METHOD) else {
        return Err(NoEntryPointError::NoMainMethod {
            class_location: table
                .get(class)
                .map(|desc| desc.location().clone())
                .unwrap_or(DefinitionLocation::Builtin),
        });
    };

    if method.return_ty != "void" || !method.params.is_empty() {
        return Err(NoEntryPointError::InvalidMainSignature {
            method_location: method.location.clone(),
            return_ty: method.return_ty.clone(),
            param_count: method.params.len(),
        });
    }

    Ok(())
}

/// Checks that the program defines `Main.main` taking no parameters and returning `void`.
///
/// A missing `Main` class is fatal: nothing can be generated without it.
pub fn check_entry_point(diagnostics: &mut Diagnostics<'_>, table: &ClassTable) -> bool {
    let Err(err) = find_entry_point(table) else {
        debug!("found the entry point");

        return true;
    };

    let file = err.file().map(str::to_owned);

    let builder = match err {
        NoEntryPointError::NoMainClass => diagnostics.fatal(),
        _ => diagnostics.error(),
    };

    builder
        .with_file(file.as_deref())
        .with_message(err.clone())
        .with_source(Box::new(err))
        .emit();

    false
}
