//! Expression Compilation Module
//!
//! Each expression leaves its value in `R0`. `R1` holds the left operand of a
//! binary operation and `R2` is scratch for symbol addresses.

use crate::ast::{literal_value, BinOp, Expr};
use crate::codegen::{CompileError, Compiler};
use crate::compiler::runtime;

pub fn compile_expression(compiler: &mut Compiler<'_>, expr: &Expr) -> Result<(), CompileError> {
    match expr {
        Expr::IntegerLiteral { digits, position } => {
            let value = literal_value::<u8>(digits).ok_or_else(|| {
                CompileError::ImmediateOutOfRange {
                    value: digits.clone(),
                    position: *position,
                }
            })?;
            compiler.emit(format!("MOV R0, #{}", value));
        }
        Expr::Variable { name, position } => {
            let symbol = compiler.qualify(name);
            if !compiler.is_declared(&symbol) {
                return Err(CompileError::UndefinedVariable {
                    name: name.clone(),
                    function: compiler.current.to_string(),
                    position: *position,
                });
            }
            compiler.emit(format!("LDR R2, ={}", symbol));
            compiler.emit("LDR R0, [R2]");
        }
        Expr::FunctionCall {
            name,
            arguments,
            position,
        } => compile_call(compiler, name, arguments, *position)?,
        Expr::BinaryOp {
            op,
            left,
            right,
            position,
        } => compile_binary(compiler, *op, left, right, *position)?,
    }
    Ok(())
}

/// Stores each argument into the callee's parameter words, then branches.
///
/// Arguments that themselves call functions could overwrite parameter words
/// already filled in (`f(1, f(2, 3))`), so in that case all arguments are
/// evaluated onto the stack first and stored afterwards.
fn compile_call(
    compiler: &mut Compiler<'_>,
    name: &str,
    arguments: &[Expr],
    position: usize,
) -> Result<(), CompileError> {
    let callee = compiler
        .functions
        .get(name)
        .copied()
        .ok_or_else(|| CompileError::UndefinedFunction {
            name: name.to_string(),
            position,
        })?;
    if callee.params.len() != arguments.len() {
        return Err(CompileError::ArgumentCount {
            name: name.to_string(),
            expected: callee.params.len(),
            found: arguments.len(),
            position,
        });
    }

    if arguments.iter().any(Expr::contains_call) {
        for arg in arguments {
            compile_expression(compiler, arg)?;
            compiler.emit("PUSH { R0 }");
        }
        for param in callee.params.iter().rev() {
            compiler.emit("POP { R0 }");
            store_parameter(compiler, name, param);
        }
    } else {
        for (arg, param) in arguments.iter().zip(&callee.params) {
            compile_expression(compiler, arg)?;
            store_parameter(compiler, name, param);
        }
    }
    compiler.emit(format!("BL {}", name));
    Ok(())
}

fn store_parameter(compiler: &mut Compiler<'_>, function: &str, param: &str) {
    compiler.emit(format!("LDR R2, ={}_{}", function, param));
    compiler.emit("STR R0, [R2]");
}

fn compile_binary(
    compiler: &mut Compiler<'_>,
    op: BinOp,
    left: &Expr,
    right: &Expr,
    position: usize,
) -> Result<(), CompileError> {
    if op == BinOp::Divide {
        if let Expr::IntegerLiteral { digits, .. } = right {
            if literal_value::<u8>(digits) == Some(0) {
                return Err(CompileError::DivisionByZero { position });
            }
        }
    }

    compile_expression(compiler, left)?;
    compiler.emit("PUSH { R0 }");
    compile_expression(compiler, right)?;
    compiler.emit("POP { R1 }");

    match op {
        BinOp::Add => compiler.emit("ADD R0, R1, R0"),
        BinOp::Subtract => compiler.emit("SUB R0, R1, R0"),
        BinOp::Multiply => compiler.emit("MUL R0, R1, R0"),
        BinOp::Divide => {
            compiler.uses_division = true;
            compiler.emit(format!("BL {}", runtime::FLOOR_DIV));
        }
        BinOp::Equals => compile_comparison(compiler, "BEQ", position),
        BinOp::NotEquals => compile_comparison(compiler, "BNE", position),
        BinOp::Greater => compile_comparison(compiler, "BGT", position),
        BinOp::Lesser => compile_comparison(compiler, "BLT", position),
    }
    Ok(())
}

/// Turns the flags of `CMP R1, R0` into 1 or 0 in `R0`.
fn compile_comparison(compiler: &mut Compiler<'_>, branch: &str, position: usize) {
    // Positions are unique per operator, which keeps the labels unique.
    let label = format!("_cmp{}", position);
    compiler.emit("CMP R1, R0");
    compiler.emit(format!("{} {}_true", branch, label));
    compiler.emit("MOV R0, #0");
    compiler.emit(format!("B {}_end", label));
    compiler.label(&format!("{}_true", label));
    compiler.emit("MOV R0, #1");
    compiler.label(&format!("{}_end", label));
}
