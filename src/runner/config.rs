use std::path::PathBuf;

use clap::{arg, command, value_parser, ValueEnum};

#[derive(Debug, Clone)]
pub struct BantamConfig {
    pub paths: Vec<PathBuf>,
    pub output: OutputKind,
    pub output_path: Option<PathBuf>,
    pub gc: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompilationStage {
    Analysis,
    Codegen,
}

impl Default for CompilationStage {
    fn default() -> Self {
        Self::Codegen
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Debug,
    Ron,
    Hierarchy,
    Asm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisOutputFormat {
    Debug,
    Ron,
    Hierarchy,
}

impl TryFrom<OutputFormat> for AnalysisOutputFormat {
    type Error = &'static str;

    fn try_from(format: OutputFormat) -> Result<AnalysisOutputFormat, Self::Error> {
        match format {
            OutputFormat::Debug => Ok(Self::Debug),
            OutputFormat::Ron => Ok(Self::Ron),
            OutputFormat::Hierarchy => Ok(Self::Hierarchy),
            OutputFormat::Asm => Err("this format cannot be used for the current compilation stage"),
        }
    }
}

impl Default for AnalysisOutputFormat {
    fn default() -> Self {
        Self::Hierarchy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodegenOutputFormat {
    Asm,
}

impl TryFrom<OutputFormat> for CodegenOutputFormat {
    type Error = &'static str;

    fn try_from(format: OutputFormat) -> Result<CodegenOutputFormat, Self::Error> {
        match format {
            OutputFormat::Asm => Ok(Self::Asm),
            _ => Err("this format cannot be used for the current compilation stage"),
        }
    }
}

impl Default for CodegenOutputFormat {
    fn default() -> Self {
        Self::Asm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Analysis(AnalysisOutputFormat),
    Codegen(CodegenOutputFormat),
}

pub fn parse_args_or_exit() -> BantamConfig {
    use clap::Command;

    fn command() -> Command {
        command!()
            .arg(
                arg!(files: <FILE> ... "program trees to compile, in the RON format")
                    .value_parser(value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                arg!(-s --stage <STAGE> "the compilation stage to perform")
                    .value_parser(value_parser!(CompilationStage))
                    .required(false),
            )
            .arg(
                arg!(-f --format <FORMAT> "the output format")
                    .value_parser(value_parser!(OutputFormat)),
            )
            .arg(
                arg!(-o --output <PATH> "where to write the assembly (stdout by default)")
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(arg!(--gc "enable the garbage collector in the generated program"))
    }

    fn parse_args() -> Result<BantamConfig, clap::Error> {
        use clap::error::ErrorKind;

        let mut command = command();
        let matches = command.get_matches_mut();

        let paths = matches
            .get_many::<PathBuf>("files")
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let stage = matches.get_one::<CompilationStage>("stage").copied();
        let format = matches.get_one::<OutputFormat>("format").copied();
        let output_path = matches.get_one::<PathBuf>("output").cloned();
        let gc = matches.get_flag("gc");

        let stage = match (stage, format) {
            (Some(stage), _) => stage,
            (None, Some(OutputFormat::Debug | OutputFormat::Ron | OutputFormat::Hierarchy)) => {
                CompilationStage::Analysis
            }
            (None, _) => Default::default(),
        };

        let output = match stage {
            CompilationStage::Analysis => {
                let format = match format {
                    Some(format) => format.try_into(),
                    None => Ok(Default::default()),
                };

                OutputKind::Analysis(
                    format.map_err(|msg| command.error(ErrorKind::ValueValidation, msg))?,
                )
            }

            CompilationStage::Codegen => {
                let format = match format {
                    Some(format) => format.try_into(),
                    None => Ok(Default::default()),
                };

                OutputKind::Codegen(
                    format.map_err(|msg| command.error(ErrorKind::ValueValidation, msg))?,
                )
            }
        };

        if output_path.is_some() && !matches!(output, OutputKind::Codegen(_)) {
            return Err(command.error(
                ErrorKind::ArgumentConflict,
                "--output can only be used with the codegen stage",
            ));
        }

        Ok(BantamConfig {
            paths,
            output,
            output_path,
            gc,
        })
    }

    match parse_args() {
        Ok(cfg) => cfg,

        Err(e) => {
            e.format(&mut command()).exit();
        }
    }
}
