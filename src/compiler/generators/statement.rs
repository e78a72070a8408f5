//! Statement Compilation Module
//!
//! Helpers called from [`Compiler`] for each statement of a function body.
//! Labels for conditionals and loops are derived from the keyword's source
//! position.

use crate::ast::{Expr, Stmt};
use crate::codegen::{CompileError, Compiler};
use crate::compiler::generators::expression::compile_expression;
use crate::compiler::runtime;

pub fn compile_statement(compiler: &mut Compiler<'_>, stmt: &Stmt) -> Result<(), CompileError> {
    match stmt {
        Stmt::Assign {
            name,
            value,
            position,
        } => compile_assign(compiler, name, value, *position),
        Stmt::Print { values, .. } => compile_print(compiler, values),
        Stmt::ConditionalLoop {
            condition,
            body,
            is_loop,
            position,
        } => compile_conditional_loop(compiler, condition, body, *is_loop, *position),
    }
}

/// Compiles an assignment statement: name = value
pub fn compile_assign(
    compiler: &mut Compiler<'_>,
    name: &str,
    value: &Expr,
    position: usize,
) -> Result<(), CompileError> {
    compile_expression(compiler, value)?;
    let symbol = compiler.declare(name, position)?;
    compiler.emit(format!("LDR R2, ={}", symbol));
    compiler.emit("STR R0, [R2]");
    Ok(())
}

/// Compiles a print statement: print(value1, value2, ...)
pub fn compile_print(compiler: &mut Compiler<'_>, values: &[Expr]) -> Result<(), CompileError> {
    for value in values {
        compile_expression(compiler, value)?;
        compiler.emit(format!("BL {}", runtime::PUT_CHAR));
    }
    Ok(())
}

/// Compiles `if(condition) body` or, with `is_loop`, `while(condition) body`.
pub fn compile_conditional_loop(
    compiler: &mut Compiler<'_>,
    condition: &Expr,
    body: &[Stmt],
    is_loop: bool,
    position: usize,
) -> Result<(), CompileError> {
    let label = format!("_ifwhile{}", position);

    compiler.label(&format!("{}_condition", label));
    compile_expression(compiler, condition)?;
    compiler.emit("CMP R0, #0");
    compiler.emit(format!("BEQ {}_end", label));

    for stmt in body {
        compile_statement(compiler, stmt)?;
    }

    if is_loop {
        compiler.emit(format!("B {}_condition", label));
    }
    compiler.label(&format!("{}_end", label));
    Ok(())
}
