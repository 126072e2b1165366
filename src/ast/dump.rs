use std::io::{self, Write};

use ron::ser::PrettyConfig;

use super::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstDumpFormat {
    Debug,
    Ron,
}

pub fn dump_ast(format: AstDumpFormat, program: &Program, mut out: impl Write) -> io::Result<()> {
    match format {
        AstDumpFormat::Debug => writeln!(out, "{:#?}", program),

        AstDumpFormat::Ron => {
            let config = PrettyConfig::new().struct_names(true);
            let dump = ron::ser::to_string_pretty(program, config)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            writeln!(out, "{}", dump)
        }
    }
}

/// Parses a program tree from its RON representation.
pub fn load_ast(text: &str) -> Result<Program, ron::error::SpannedError> {
    ron::from_str(text)
}
