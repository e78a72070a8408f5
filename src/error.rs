use crate::codegen::CompileError;
use crate::interpreter::RunError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::io;
use thiserror::Error;

/// Any failure of the pipeline, tagged with the stage that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Failed lexing because: {0}")]
    Lex(#[from] LexError),
    #[error("Failed parsing because: {0}")]
    Parse(#[from] ParseError),
    #[error("Failed running because: {0}")]
    Run(#[from] RunError),
    #[error("Failed compiling because: {0}")]
    Compile(#[from] CompileError),
}

impl Error {
    /// Character offset the error points at, if it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.position),
            Error::Parse(e) => e.position(),
            Error::Run(e) => e.position(),
            Error::Compile(e) => e.position(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Error::Lex(_) => "Lex error",
            Error::Parse(_) => "Parse error",
            Error::Run(_) => "Run error",
            Error::Compile(_) => "Compile error",
        }
    }

    fn detail(&self) -> String {
        match self {
            Error::Lex(e) => e.to_string(),
            Error::Parse(e) => e.to_string(),
            Error::Run(e) => e.to_string(),
            Error::Compile(e) => e.to_string(),
        }
    }
}

fn build_report<'a>(
    source: &str,
    filename: &'a str,
    error: &Error,
    color: bool,
) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
    let length = source.chars().count();
    // Running out of tokens is reported on the last character of the source.
    let offset = match error {
        Error::Parse(ParseError::UnexpectedEnd { .. }) => length.checked_sub(1),
        _ => error.position(),
    }
    .filter(|offset| *offset < length);

    let mut report = Report::build(ReportKind::Error, filename, offset.unwrap_or(0))
        .with_config(Config::default().with_color(color))
        .with_message(error.title());

    match offset {
        Some(offset) => {
            report = report.with_label(
                Label::new((filename, offset..offset + 1))
                    .with_message(error.detail())
                    .with_color(Color::Red),
            );
        }
        None => report = report.with_note(error.detail()),
    }
    report.finish()
}

/// Display an error with ariadne formatting on stderr
pub fn display_error(source: &str, filename: &str, error: &Error) -> io::Result<()> {
    build_report(source, filename, error, true).eprint((filename, Source::from(source)))
}

/// Render an error without colors, for logs and tests
pub fn render_error(source: &str, filename: &str, error: &Error) -> String {
    let mut buffer = Vec::new();
    let written = build_report(source, filename, error, false)
        .write((filename, Source::from(source)), &mut buffer);
    match written {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(_) => error.to_string(),
    }
}
