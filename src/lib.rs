//! Toolchain for a small imperative language: a tokenizer, a parser, a
//! tree-walking interpreter and an assembly generator that share one AST.
//!
//! ```text
//! source --lexer--> tokens --parser--> AST --interpreter--> result + output
//!                                          \--codegen-----> assembly
//! ```

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod limits;
pub mod parser;

pub use error::Error;
pub use interpreter::Execution;
pub use limits::Limits;

/// Tokenizes and parses `source`.
pub fn parse_source(source: &str, limits: &Limits) -> Result<ast::Program, Error> {
    let tokens = lexer::tokenize(source)?;
    Ok(parser::parse_with_limits(tokens, limits)?)
}

/// Runs `entry` of `source` with the default limits.
pub fn interpret(source: &str, entry: &str) -> Result<Execution, Error> {
    interpret_with_limits(source, entry, &Limits::default())
}

pub fn interpret_with_limits(
    source: &str,
    entry: &str,
    limits: &Limits,
) -> Result<Execution, Error> {
    let program = parse_source(source, limits)?;
    Ok(interpreter::run_with_limits(&program, entry, limits)?)
}

/// Generates assembly for `source`, starting at `entry`.
pub fn compile(source: &str, entry: &str) -> Result<String, Error> {
    compile_with_limits(source, entry, &Limits::default())
}

pub fn compile_with_limits(source: &str, entry: &str, limits: &Limits) -> Result<String, Error> {
    let program = parse_source(source, limits)?;
    Ok(codegen::generate(&program, entry)?)
}
