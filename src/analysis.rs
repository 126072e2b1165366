mod binder;
pub mod builtins;
pub mod class_table;
pub mod error;
mod hierarchy;
pub mod scope;
mod typeck;
mod validate;

use std::error::Error;
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument};

use crate::ast::Program;
use crate::errors::Diagnostics;

pub use binder::MemberBinder;
pub use class_table::{ClassDescriptor, ClassId, ClassTable, DefinitionLocation};
pub use error::SemanticError;
pub use hierarchy::ClassHierarchyBuilder;
pub use typeck::TypeChecker;
pub use validate::{check_entry_point, NoEntryPointError, MAIN_CLASS, MAIN_METHOD};

/// Returned when the analysis was interrupted through its cancellation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the analysis was cancelled")
    }
}

impl Error for Cancelled {}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub class_table: ClassTable,
}

/// Runs every analysis phase over a program: builds the hierarchy, binds members, type-checks
/// the bodies and validates the entry point.
///
/// Errors are reported through the diagnostics; the class table is returned regardless, repaired
/// wherever an error was found.
pub struct SemanticAnalyzer<'dia, 'emt, 'c> {
    diagnostics: &'dia mut Diagnostics<'emt>,
    cancel: Option<&'c AtomicBool>,
}

impl<'dia, 'emt, 'c> SemanticAnalyzer<'dia, 'emt, 'c> {
    pub fn new(diagnostics: &'dia mut Diagnostics<'emt>) -> Self {
        Self {
            diagnostics,
            cancel: None,
        }
    }

    pub fn with_cancellation(self, flag: &'c AtomicBool) -> Self {
        Self {
            cancel: Some(flag),
            ..self
        }
    }

    fn check_cancelled(&self) -> Result<(), Cancelled> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Cancelled),
            _ => Ok(()),
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn analyze(mut self, program: &mut Program) -> Result<AnalysisResult, Cancelled> {
        self.check_cancelled()?;
        let mut class_table =
            ClassHierarchyBuilder::new(&mut *self.diagnostics, &program.classes).build();

        self.check_cancelled()?;
        MemberBinder::new(&mut *self.diagnostics, &program.classes).bind(&mut class_table);

        self.check_cancelled()?;
        let checker = TypeChecker::new(&mut *self.diagnostics, &class_table);
        let checker = match self.cancel {
            Some(flag) => checker.with_cancellation(flag),
            None => checker,
        };
        checker.check(program)?;

        self.check_cancelled()?;
        check_entry_point(&mut *self.diagnostics, &class_table);

        debug!(
            class_count = class_table.len(),
            error_count = self.diagnostics.error_count(),
            "finished the semantic analysis"
        );

        Ok(AnalysisResult { class_table })
    }
}
