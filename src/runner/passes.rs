use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use bantam::analysis::{AnalysisResult, ClassTable, SemanticAnalyzer};
use bantam::ast::dump::{dump_ast, load_ast, AstDumpFormat};
use bantam::ast::Program;
use bantam::codegen::CodeGenerator;
use bantam::errors::{DiagnosticKind, DiagnosticMessage};
use bantam::position::{Position, Span};
use tracing::{debug, info};

use super::config::{AnalysisOutputFormat, OutputKind};
use super::{PassOutput, RunnerCtx};

fn ron_error_span(err: &ron::error::SpannedError) -> Span {
    let position = Position {
        byte: 0,
        line: err.position.line,
        col: err.position.col,
    };

    Span {
        start: position,
        end: position,
    }
}

pub fn load_files(ctx: &mut RunnerCtx<'_>) -> PassOutput<Vec<Program>> {
    let mut programs = Vec::with_capacity(ctx.config.paths.len());

    for path in &ctx.config.paths {
        let file = path.display().to_string();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,

            Err(e) => {
                ctx.diagnostics
                    .error()
                    .with_message(format!("could not load file {}", file))
                    .with_source(Box::new(e))
                    .emit();

                continue;
            }
        };

        match load_ast(&text) {
            Ok(mut program) => {
                for class in &mut program.classes {
                    class.file.get_or_insert_with(|| file.clone());
                }

                debug!(%file, class_count = program.classes.len(), "loaded a program tree");
                programs.push(program);
            }

            Err(e) => {
                let message = DiagnosticMessage::new(format!("malformed program tree: {}", e.code))
                    .with_span(ron_error_span(&e));

                ctx.diagnostics
                    .error()
                    .with_kind(DiagnosticKind::Syntax)
                    .with_file(Some(&file))
                    .with_message(message)
                    .with_source(Box::new(e))
                    .emit();
            }
        }
    }

    ctx.stop_if_errors(programs)
}

pub fn merge_programs(_ctx: &mut RunnerCtx<'_>, programs: Vec<Program>) -> PassOutput<Program> {
    PassOutput::continue_with_output(Program {
        classes: programs
            .into_iter()
            .flat_map(|Program { classes, .. }| classes)
            .collect(),
        span: Default::default(),
    })
}

pub fn analyze(
    ctx: &mut RunnerCtx<'_>,
    program: &mut Program,
) -> PassOutput<Option<ClassTable>> {
    match SemanticAnalyzer::new(&mut ctx.diagnostics).analyze(program) {
        Ok(AnalysisResult { class_table }) => ctx.stop_if_errors(Some(class_table)),

        Err(e) => {
            ctx.diagnostics
                .fatal()
                .with_message(e.to_string())
                .with_source(Box::new(e))
                .emit();

            PassOutput::stop_with_output(None)
        }
    }
}

pub fn dump_if_asked(
    ctx: &mut RunnerCtx<'_>,
    program: &Program,
    class_table: &ClassTable,
) -> PassOutput<()> {
    let OutputKind::Analysis(format) = ctx.config.output else {
        return PassOutput::r#continue();
    };

    let stdout = io::stdout().lock();

    let result = match format {
        AnalysisOutputFormat::Debug => dump_ast(AstDumpFormat::Debug, program, stdout),
        AnalysisOutputFormat::Ron => dump_ast(AstDumpFormat::Ron, program, stdout),
        AnalysisOutputFormat::Hierarchy => class_table.write_tree(stdout),
    };

    if let Err(e) = result {
        ctx.diagnostics
            .error()
            .with_message("could not dump the analysis results to stdout".to_owned())
            .with_source(Box::new(e))
            .emit();
    }

    PassOutput::stop()
}

pub fn codegen(
    ctx: &mut RunnerCtx<'_>,
    program: &Program,
    class_table: &ClassTable,
) -> PassOutput<String> {
    match CodeGenerator::new(class_table, program)
        .with_gc(ctx.config.gc)
        .render()
    {
        Ok(asm) => PassOutput::continue_with_output(asm),

        Err(e) => {
            ctx.diagnostics
                .fatal()
                .with_kind(DiagnosticKind::Codegen)
                .with_span_and_error(e)
                .emit();

            PassOutput::stop_with_output(String::new())
        }
    }
}

fn write_file(path: &Path, asm: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(asm.as_bytes())?;
    file.flush()
}

pub fn write_output(ctx: &mut RunnerCtx<'_>, asm: &str) -> PassOutput<()> {
    let result = match &ctx.config.output_path {
        Some(path) => write_file(path, asm).map_err(|e| {
            // a partially written file is not a valid program
            let _ = fs::remove_file(path);

            e
        }),

        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(asm.as_bytes()).and_then(|_| stdout.flush())
        }
    };

    match result {
        Ok(()) => {
            if let Some(path) = &ctx.config.output_path {
                info!(path = %path.display(), "wrote the assembly");
            }

            PassOutput::r#continue()
        }

        Err(e) => {
            ctx.diagnostics
                .fatal()
                .with_kind(DiagnosticKind::Codegen)
                .with_message("could not write the assembly".to_owned())
                .with_source(Box::new(e))
                .emit();

            PassOutput::stop()
        }
    }
}
