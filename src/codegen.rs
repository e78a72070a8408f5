//! Assembly generation for a two-register accumulator machine.
//!
//! Every value is computed into `R0`; binary operations park their left
//! operand on the stack and pop it into `R1`. Variables are not stack
//! allocated: each one is a static word named `<function>_<variable>` in the
//! data section, so recursive calls are rejected up front.

use crate::ast::{FunctionDef, Program, RETURN_VARIABLE};
use crate::compiler::generators::statement::compile_statement;
use crate::compiler::runtime;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Wanted to start at `{0}` but the function does not exist")]
    EntryNotFound(String),
    #[error("The entry function `{name}` can't be given arguments but expects {count}")]
    EntryHasParameters { name: String, count: usize },
    #[error("Value {value} at position {position} can't be loaded as an immediate (0-255)")]
    ImmediateOutOfRange { value: String, position: usize },
    #[error("Variable `{name}` is read at position {position} before it is assigned in `{function}`")]
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
    #[error("Division by a literal zero at position {position}")]
    DivisionByZero { position: usize },
    #[error("Function `{function}` is called recursively at position {position}, which static variables can't support")]
    RecursiveCall { function: String, position: usize },
    #[error("Symbol `{symbol}` for {second} at position {position} is already used by {first}")]
    SymbolClash {
        symbol: String,
        first: String,
        second: String,
        position: usize,
    },
}

impl CompileError {
    pub fn position(&self) -> Option<usize> {
        match self {
            CompileError::ImmediateOutOfRange { position, .. }
            | CompileError::UndefinedVariable { position, .. }
            | CompileError::UndefinedFunction { position, .. }
            | CompileError::ArgumentCount { position, .. }
            | CompileError::MissingReturn { position, .. }
            | CompileError::DivisionByZero { position }
            | CompileError::RecursiveCall { position, .. }
            | CompileError::SymbolClash { position, .. } => Some(*position),
            CompileError::EntryNotFound(_) | CompileError::EntryHasParameters { .. } => None,
        }
    }
}

/// Generates the assembly document for `program`, starting at `entry`.
pub fn generate(program: &Program, entry: &str) -> Result<String, CompileError> {
    Compiler::new(program).compile_program(entry)
}

pub struct Compiler<'p> {
    program: &'p Program,
    pub(crate) functions: HashMap<&'p str, &'p FunctionDef>,
    /// Function whose body is being generated.
    pub(crate) current: &'p str,
    /// Symbols declared so far in the current function.
    pub(crate) locals: Vec<String>,
    /// Owner description of every symbol emitted so far.
    symbols: HashMap<String, String>,
    data: Vec<String>,
    text: Vec<String>,
    pub(crate) uses_division: bool,
}

impl<'p> Compiler<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            functions: program.iter().map(|f| (f.name.as_str(), f)).collect(),
            current: "",
            locals: Vec::new(),
            symbols: HashMap::new(),
            data: Vec::new(),
            text: Vec::new(),
            uses_division: false,
        }
    }

    pub fn compile_program(mut self, entry: &str) -> Result<String, CompileError> {
        let function = self
            .functions
            .get(entry)
            .ok_or_else(|| CompileError::EntryNotFound(entry.to_string()))?;
        if !function.params.is_empty() {
            return Err(CompileError::EntryHasParameters {
                name: entry.to_string(),
                count: function.params.len(),
            });
        }

        self.check_recursion()?;

        for symbol in runtime::RESERVED_SYMBOLS {
            self.claim(symbol, "the runtime".to_string(), 0)?;
        }
        for function in self.program {
            self.claim(
                &function.name,
                format!("function `{}`", function.name),
                function.position,
            )?;
        }

        for function in self.program {
            self.compile_function(function)?;
        }

        Ok(self.finish(entry))
    }

    fn compile_function(&mut self, function: &'p FunctionDef) -> Result<(), CompileError> {
        self.current = &function.name;
        self.locals.clear();
        for param in &function.params {
            self.declare(param, function.position)?;
        }

        self.label(&function.name);
        self.emit("PUSH { R1, LR }");

        for stmt in &function.body {
            compile_statement(self, stmt)?;
        }

        let result = self.qualify(RETURN_VARIABLE);
        if !self.locals.contains(&result) {
            return Err(CompileError::MissingReturn {
                function: function.name.clone(),
                position: function.position,
            });
        }
        self.emit(format!("LDR R2, ={}", result));
        self.emit("LDR R0, [R2]");
        self.emit("POP { R1, PC }");
        self.text.push(String::new());

        self.data.extend(self.locals.iter().map(|s| format!("{}: .word 0", s)));
        Ok(())
    }

    fn finish(self, entry: &str) -> String {
        let mut lines: Vec<String> = runtime::PREAMBLE.iter().map(|l| l.to_string()).collect();

        lines.push(String::new());
        lines.push(".data".to_string());
        lines.extend(self.data);

        lines.push(String::new());
        lines.push(".text".to_string());
        lines.extend(self.text);

        if self.uses_division {
            lines.extend(runtime::FLOOR_DIVISION.iter().map(|l| l.to_string()));
            lines.push(String::new());
        }
        lines.extend(runtime::trampoline(entry));

        let mut asm = lines.join("\n");
        asm.push('\n');
        asm
    }

    /// Rejects any cycle in the call graph, direct or through other functions.
    fn check_recursion(&self) -> Result<(), CompileError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        fn visit<'p>(
            compiler: &Compiler<'p>,
            function: &'p FunctionDef,
            marks: &mut HashMap<&'p str, Mark>,
        ) -> Result<(), CompileError> {
            marks.insert(&function.name, Mark::Active);
            for (callee, position) in function.calls() {
                let Some(target) = compiler.functions.get(callee).copied() else {
                    continue;
                };
                match marks.get(callee) {
                    Some(Mark::Active) => {
                        return Err(CompileError::RecursiveCall {
                            function: callee.to_string(),
                            position,
                        })
                    }
                    Some(Mark::Done) => {}
                    None => visit(compiler, target, marks)?,
                }
            }
            marks.insert(&function.name, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for function in self.program {
            if !marks.contains_key(function.name.as_str()) {
                visit(self, function, &mut marks)?;
            }
        }
        Ok(())
    }

    pub(crate) fn emit(&mut self, instruction: impl AsRef<str>) {
        self.text.push(format!("\t{}", instruction.as_ref()));
    }

    pub(crate) fn label(&mut self, name: &str) {
        self.text.push(format!("{}:", name));
    }

    /// Static symbol of `variable` in the current function.
    pub(crate) fn qualify(&self, variable: &str) -> String {
        format!("{}_{}", self.current, variable)
    }

    pub(crate) fn is_declared(&self, symbol: &str) -> bool {
        self.locals.iter().any(|s| s == symbol)
    }

    /// Declares `variable` in the current function and returns its symbol.
    pub(crate) fn declare(&mut self, variable: &str, position: usize) -> Result<String, CompileError> {
        let symbol = self.qualify(variable);
        if !self.is_declared(&symbol) {
            let owner = format!("variable `{}` of `{}`", variable, self.current);
            self.claim(&symbol, owner, position)?;
            self.locals.push(symbol.clone());
        }
        Ok(symbol)
    }

    fn claim(&mut self, symbol: &str, owner: String, position: usize) -> Result<(), CompileError> {
        if let Some(first) = self.symbols.get(symbol) {
            return Err(CompileError::SymbolClash {
                symbol: symbol.to_string(),
                first: first.clone(),
                second: owner,
                position,
            });
        }
        self.symbols.insert(symbol.to_string(), owner);
        Ok(())
    }
}
