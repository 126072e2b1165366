use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::io;

use crate::position::{HasSpan, Span};

#[derive(Debug)]
pub enum CodegenError {
    Io(io::Error),

    /// A class the runtime relies on is absent from the class table.
    MissingClass {
        name: String,
    },

    Cancelled,
}

impl Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not write the output: {}", err),

            Self::MissingClass { name } => {
                write!(f, "the class `{}` is required for code generation but was not found", name)
            }

            Self::Cancelled => write!(f, "code generation was cancelled"),
        }
    }
}

impl Error for CodegenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl HasSpan for CodegenError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Owned(Span::default())
    }
}

impl From<io::Error> for CodegenError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
