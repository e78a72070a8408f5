//! Tree-walking interpreter.
//!
//! Every call gets its own [`Frame`]; nothing is shared between invocations,
//! so recursion behaves as expected. Host recursion is bounded by
//! [`Limits::max_call_depth`].

use crate::ast::{literal_value, BinOp, Expr, FunctionDef, Program, Stmt, RETURN_VARIABLE};
use crate::limits::Limits;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, ToPrimitive};
use std::collections::HashMap;
use thiserror::Error;

/// The language's only value type.
pub type Int = i64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Wanted to start at `{0}` but the function does not exist")]
    EntryNotFound(String),
    #[error("The entry function `{name}` can't be given arguments but expects {count}")]
    EntryHasParameters { name: String, count: usize },
    #[error("Variable `{name}` is read at position {position} but has no value in `{function}`")]
    UndefinedVariable {
        name: String,
        function: String,
        position: usize,
    },
    #[error("Function `{name}` called at position {position} is not defined")]
    UndefinedFunction { name: String, position: usize },
    #[error("Function `{name}` expects {expected} argument(s) but got {found} at position {position}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        position: usize,
    },
    #[error("Function `{function}` does not return a value: `sos` is never assigned")]
    MissingReturn { function: String, position: usize },
    #[error("Division by zero at position {position}")]
    DivisionByZero { position: usize },
    #[error("Integer overflow at position {position}")]
    Overflow { position: usize },
    #[error("Value {value} printed at position {position} is not a valid character")]
    InvalidCharacter { value: Int, position: usize },
    #[error("Call depth exceeds the limit of {limit} when calling `{function}` at position {position}")]
    DepthExceeded {
        limit: usize,
        function: String,
        position: usize,
    },
    #[error("Loops ran for more than {limit} iterations")]
    IterationLimit { limit: u64 },
}

impl RunError {
    pub fn position(&self) -> Option<usize> {
        match self {
            RunError::UndefinedVariable { position, .. }
            | RunError::UndefinedFunction { position, .. }
            | RunError::ArgumentCount { position, .. }
            | RunError::MissingReturn { position, .. }
            | RunError::DivisionByZero { position }
            | RunError::Overflow { position }
            | RunError::InvalidCharacter { position, .. }
            | RunError::DepthExceeded { position, .. } => Some(*position),
            RunError::EntryNotFound(_)
            | RunError::EntryHasParameters { .. }
            | RunError::IterationLimit { .. } => None,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Value of `sos` in the entry function.
    pub result: Int,
    /// Characters printed, in program order.
    pub output: String,
}

/// Runs `entry` with the default [`Limits`].
pub fn run(program: &Program, entry: &str) -> Result<Execution, RunError> {
    run_with_limits(program, entry, &Limits::default())
}

pub fn run_with_limits(
    program: &Program,
    entry: &str,
    limits: &Limits,
) -> Result<Execution, RunError> {
    let mut interpreter = Interpreter::new(program, *limits);
    let function = interpreter
        .functions
        .get(entry)
        .copied()
        .ok_or_else(|| RunError::EntryNotFound(entry.to_string()))?;
    if !function.params.is_empty() {
        return Err(RunError::EntryHasParameters {
            name: entry.to_string(),
            count: function.params.len(),
        });
    }

    let result = interpreter.call(function, Vec::new(), function.position)?;
    Ok(Execution {
        result,
        output: interpreter.output,
    })
}

/// Variables local to one function invocation.
struct Frame<'p> {
    function: &'p str,
    variables: HashMap<String, Int>,
}

struct Interpreter<'p> {
    functions: HashMap<&'p str, &'p FunctionDef>,
    limits: Limits,
    depth: usize,
    iterations: u64,
    output: String,
}

impl<'p> Interpreter<'p> {
    fn new(program: &'p Program, limits: Limits) -> Self {
        Self {
            functions: program.iter().map(|f| (f.name.as_str(), f)).collect(),
            limits,
            depth: 0,
            iterations: 0,
            output: String::new(),
        }
    }

    fn call(
        &mut self,
        function: &'p FunctionDef,
        arguments: Vec<Int>,
        position: usize,
    ) -> Result<Int, RunError> {
        if self.depth >= self.limits.max_call_depth {
            return Err(RunError::DepthExceeded {
                limit: self.limits.max_call_depth,
                function: function.name.clone(),
                position,
            });
        }

        let mut frame = Frame {
            function: &function.name,
            variables: function.params.iter().cloned().zip(arguments).collect(),
        };

        self.depth += 1;
        self.execute_block(&function.body, &mut frame)?;
        self.depth -= 1;

        frame
            .variables
            .get(RETURN_VARIABLE)
            .copied()
            .ok_or_else(|| RunError::MissingReturn {
                function: function.name.clone(),
                position: function.position,
            })
    }

    fn execute_block(&mut self, stmts: &'p [Stmt], frame: &mut Frame<'p>) -> Result<(), RunError> {
        for stmt in stmts {
            self.execute(stmt, frame)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &'p Stmt, frame: &mut Frame<'p>) -> Result<(), RunError> {
        match stmt {
            Stmt::Assign { name, value, .. } => {
                let value = self.evaluate(value, frame)?;
                frame.variables.insert(name.clone(), value);
            }
            Stmt::Print { values, .. } => {
                for expr in values {
                    let value = self.evaluate(expr, frame)?;
                    let character = value
                        .to_u32()
                        .and_then(char::from_u32)
                        .ok_or(RunError::InvalidCharacter {
                            value,
                            position: expr.position(),
                        })?;
                    self.output.push(character);
                }
            }
            Stmt::ConditionalLoop {
                condition,
                body,
                is_loop,
                ..
            } => {
                while self.evaluate(condition, frame)? != 0 {
                    if !*is_loop {
                        self.execute_block(body, frame)?;
                        break;
                    }
                    self.count_iteration()?;
                    self.execute_block(body, frame)?;
                }
            }
        }
        Ok(())
    }

    fn count_iteration(&mut self) -> Result<(), RunError> {
        self.iterations += 1;
        match self.limits.max_loop_iterations {
            Some(limit) if self.iterations > limit => Err(RunError::IterationLimit { limit }),
            _ => Ok(()),
        }
    }

    fn evaluate(&mut self, expr: &'p Expr, frame: &Frame<'p>) -> Result<Int, RunError> {
        match expr {
            Expr::IntegerLiteral { digits, position } => {
                literal_value::<Int>(digits).ok_or(RunError::Overflow {
                    position: *position,
                })
            }
            Expr::Variable { name, position } => {
                frame
                    .variables
                    .get(name)
                    .copied()
                    .ok_or_else(|| RunError::UndefinedVariable {
                        name: name.clone(),
                        function: frame.function.to_string(),
                        position: *position,
                    })
            }
            Expr::FunctionCall {
                name,
                arguments,
                position,
            } => {
                let values = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg, frame))
                    .collect::<Result<Vec<_>, _>>()?;
                let function = self.functions.get(name.as_str()).copied().ok_or_else(|| {
                    RunError::UndefinedFunction {
                        name: name.clone(),
                        position: *position,
                    }
                })?;
                if function.params.len() != values.len() {
                    return Err(RunError::ArgumentCount {
                        name: name.clone(),
                        expected: function.params.len(),
                        found: values.len(),
                        position: *position,
                    });
                }
                self.call(function, values, *position)
            }
            Expr::BinaryOp {
                op,
                left,
                right,
                position,
            } => {
                let left = self.evaluate(left, frame)?;
                let right = self.evaluate(right, frame)?;
                apply(*op, left, right, *position)
            }
        }
    }
}

fn apply(op: BinOp, left: Int, right: Int, position: usize) -> Result<Int, RunError> {
    let overflow = RunError::Overflow { position };
    match op {
        BinOp::Add => CheckedAdd::checked_add(&left, &right).ok_or(overflow),
        BinOp::Subtract => CheckedSub::checked_sub(&left, &right).ok_or(overflow),
        BinOp::Multiply => CheckedMul::checked_mul(&left, &right).ok_or(overflow),
        BinOp::Divide => {
            if right == 0 {
                return Err(RunError::DivisionByZero { position });
            }
            floor_div(left, right).ok_or(overflow)
        }
        BinOp::Equals => Ok(Int::from(left == right)),
        BinOp::NotEquals => Ok(Int::from(left != right)),
        BinOp::Greater => Ok(Int::from(left > right)),
        BinOp::Lesser => Ok(Int::from(left < right)),
    }
}

/// Division rounding towards negative infinity. `None` on overflow or a zero
/// divisor.
fn floor_div(left: Int, right: Int) -> Option<Int> {
    let quotient = left.checked_div(right)?;
    if left % right != 0 && (left < 0) != (right < 0) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_div_rounds_down() {
        assert_eq!(floor_div(7, 2), Some(3));
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(-7, -2), Some(3));
        assert_eq!(floor_div(-6, 3), Some(-2));
        assert_eq!(floor_div(Int::MIN, -1), None);
    }

    #[test]
    fn test_comparisons_are_zero_or_one() {
        assert_eq!(apply(BinOp::Greater, 5, 3, 0), Ok(1));
        assert_eq!(apply(BinOp::Lesser, 5, 3, 0), Ok(0));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            apply(BinOp::Add, Int::MAX, 1, 4),
            Err(RunError::Overflow { position: 4 })
        );
    }
}
