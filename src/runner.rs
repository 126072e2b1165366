use std::process::ExitCode;

use bantam::errors::Diagnostics;

use self::config::{parse_args_or_exit, BantamConfig};
use self::errors::print_diagnostic;

pub mod config;
mod errors;
mod passes;

pub enum CompilationControl {
    Continue,
    Stop,
}

pub struct PassOutput<O> {
    pub output: O,
    pub compilation_control: CompilationControl,
}

impl<O> PassOutput<O> {
    pub fn stop_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Stop,
        }
    }

    pub fn continue_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Continue,
        }
    }
}

impl PassOutput<()> {
    pub fn stop() -> Self {
        Self::stop_with_output(())
    }

    pub fn r#continue() -> Self {
        Self::continue_with_output(())
    }
}

pub struct RunnerCtx<'emt> {
    pub config: BantamConfig,
    pub diagnostics: Diagnostics<'emt>,
}

impl RunnerCtx<'_> {
    pub fn stop_if_errors<O>(&self, output: O) -> PassOutput<O> {
        PassOutput {
            output,
            compilation_control: if self.diagnostics.has_errors() {
                CompilationControl::Stop
            } else {
                CompilationControl::Continue
            },
        }
    }

    fn exit_code(&self) -> ExitCode {
        if self.diagnostics.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

macro_rules! return_if_stopped {
    ($ctx:expr, $e:expr) => {
        match $e {
            PassOutput {
                compilation_control: CompilationControl::Stop,
                ..
            } => return $ctx.exit_code(),

            PassOutput { output, .. } => output,
        }
    };
}

fn run(mut ctx: RunnerCtx<'_>) -> ExitCode {
    let programs = return_if_stopped!(ctx, passes::load_files(&mut ctx));
    let mut program = return_if_stopped!(ctx, passes::merge_programs(&mut ctx, programs));

    // semantic analysis
    let class_table = return_if_stopped!(ctx, passes::analyze(&mut ctx, &mut program));
    let Some(class_table) = class_table else {
        return ExitCode::FAILURE;
    };
    return_if_stopped!(ctx, passes::dump_if_asked(&mut ctx, &program, &class_table));

    // code generation
    let asm = return_if_stopped!(ctx, passes::codegen(&mut ctx, &program, &class_table));
    return_if_stopped!(ctx, passes::write_output(&mut ctx, &asm));

    ctx.exit_code()
}

pub fn prepare_and_run() -> ExitCode {
    let config = parse_args_or_exit();
    let mut diagnostics = Diagnostics::new();
    diagnostics.set_emitter(Box::new(print_diagnostic));

    let ctx = RunnerCtx {
        config,
        diagnostics,
    };

    run(ctx)
}
