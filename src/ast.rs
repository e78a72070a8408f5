use num_traits::Num;
use std::fmt;

/// Name of the variable whose value at function exit is the return value.
pub const RETURN_VARIABLE: &str = "sos";

/// Entry function used when the caller does not name one.
pub const DEFAULT_ENTRY: &str = "main";

/// The set of supported binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,       // +
    Subtract,  // -
    Multiply,  // ++
    Divide,    // -- (floor)
    Equals,    // ==
    NotEquals, // !=
    Greater,   // :=
    Lesser,    // =:
}

/// Binding strength of an operator; higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Comparison,
    Additive,
    Multiplicative,
}

impl BinOp {
    pub fn precedence(self) -> Precedence {
        match self {
            BinOp::Equals | BinOp::NotEquals | BinOp::Greater | BinOp::Lesser => {
                Precedence::Comparison
            }
            BinOp::Add | BinOp::Subtract => Precedence::Additive,
            BinOp::Multiply | BinOp::Divide => Precedence::Multiplicative,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "++",
            BinOp::Divide => "--",
            BinOp::Equals => "==",
            BinOp::NotEquals => "!=",
            BinOp::Greater => ":=",
            BinOp::Lesser => "=:",
        }
    }
}

/// Value-producing nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal, kept as its digit text so that range checks are
    /// left to whoever consumes it.
    IntegerLiteral { digits: String, position: usize },
    /// A read of a frame-local variable.
    Variable { name: String, position: usize },
    /// A call to a user-defined function.
    FunctionCall {
        name: String,
        arguments: Vec<Expr>,
        position: usize,
    },
    /// A binary operation, positioned at its operator.
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        position: usize,
    },
}

impl Expr {
    pub fn position(&self) -> usize {
        match self {
            Expr::IntegerLiteral { position, .. }
            | Expr::Variable { position, .. }
            | Expr::FunctionCall { position, .. }
            | Expr::BinaryOp { position, .. } => *position,
        }
    }

    pub fn contains_call(&self) -> bool {
        match self {
            Expr::IntegerLiteral { .. } | Expr::Variable { .. } => false,
            Expr::FunctionCall { .. } => true,
            Expr::BinaryOp { left, right, .. } => left.contains_call() || right.contains_call(),
        }
    }

    fn collect_calls<'a>(&'a self, calls: &mut Vec<(&'a str, usize)>) {
        match self {
            Expr::IntegerLiteral { .. } | Expr::Variable { .. } => {}
            Expr::FunctionCall {
                name,
                arguments,
                position,
            } => {
                calls.push((name.as_str(), *position));
                for arg in arguments {
                    arg.collect_calls(calls);
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                left.collect_calls(calls);
                right.collect_calls(calls);
            }
        }
    }
}

/// Statements that can appear in a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        name: String,
        value: Expr,
        position: usize,
    },
    Print { values: Vec<Expr>, position: usize },
    /// `if` when `is_loop` is false, `while` otherwise.
    ConditionalLoop {
        condition: Expr,
        body: Vec<Stmt>,
        is_loop: bool,
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub position: usize,
}

impl FunctionDef {
    /// Every call made by the body as `(callee, position)`, in source order.
    pub fn calls(&self) -> Vec<(&str, usize)> {
        fn walk<'a>(stmts: &'a [Stmt], calls: &mut Vec<(&'a str, usize)>) {
            for stmt in stmts {
                match stmt {
                    Stmt::Assign { value, .. } => value.collect_calls(calls),
                    Stmt::Print { values, .. } => {
                        for value in values {
                            value.collect_calls(calls);
                        }
                    }
                    Stmt::ConditionalLoop {
                        condition, body, ..
                    } => {
                        condition.collect_calls(calls);
                        walk(body, calls);
                    }
                }
            }
        }
        let mut calls = Vec::new();
        walk(&self.body, &mut calls);
        calls
    }
}

pub type Program = Vec<FunctionDef>;

/// Converts literal digit text into `T`, or `None` if it does not fit.
pub fn literal_value<T: Num>(digits: &str) -> Option<T> {
    T::from_str_radix(digits, 10).ok()
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntegerLiteral { digits, .. } => write!(f, "{}", digits),
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::FunctionCall {
                name, arguments, ..
            } => {
                write!(f, "{}(", name)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expr::BinaryOp {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.symbol(), right),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { name, value, .. } => write!(f, "{} = {}", name, value),
            Stmt::Print { values, .. } => {
                write!(f, "print(")?;
                write_list(f, values)?;
                write!(f, ")")
            }
            Stmt::ConditionalLoop {
                condition,
                body,
                is_loop,
                ..
            } => {
                let keyword = if *is_loop { "while" } else { "if" };
                write!(f, "{}({}) {{ ", keyword, condition)?;
                for stmt in body {
                    write!(f, "{}; ", stmt)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}(", self.name)?;
        write_list(f, &self.params)?;
        write!(f, ") {{ ")?;
        for stmt in &self.body {
            write!(f, "{}; ", stmt)?;
        }
        write!(f, "}}")
    }
}
