use owo_colors::{OwoColorize, Stream};

use bantam::errors::{Diagnostic, DiagnosticMessage, Level};
use bantam::position::Span;

fn format_level(level: Level) -> String {
    match level {
        Level::Fatal => format!(
            "{}",
            "FATAL".if_supports_color(Stream::Stderr, |text| text.red())
        ),

        Level::Error => format!(
            "{}",
            "ERROR".if_supports_color(Stream::Stderr, |text| text.bright_red())
        ),

        Level::Warn => format!(
            "{}",
            "WARN ".if_supports_color(Stream::Stderr, |text| text.yellow())
        ),

        Level::Info => format!(
            "{}",
            "INFO ".if_supports_color(Stream::Stderr, |text| text.bright_cyan())
        ),
    }
}

fn format_location(file: Option<&str>, span: Option<&Span>) -> String {
    match (file, span) {
        (None, None) => "".to_owned(),
        (Some(file), None) => format!("{} ", file),
        (None, Some(span)) => format!("{} ", span.start),
        (Some(file), Some(span)) => format!("{}:{} ", file, span.start),
    }
}

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let Diagnostic {
        level,
        file,
        message: DiagnosticMessage { span, message },
        ..
    } = diagnostic;

    let level = format_level(*level);
    let location = format_location(file.as_deref(), span.as_ref());
    eprintln!("{} {}{}", level, location, message);
}
