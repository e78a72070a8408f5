//! Resource limits shared by the parser and the interpreter.
//!
//! Both stages recurse on the host stack, so every recursion is counted
//! against one of these limits and reported as an error instead of
//! overflowing the stack.

/// Limits applied while parsing and running a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest chain of active function calls the interpreter allows.
    pub max_call_depth: usize,
    /// Deepest nesting of blocks, call arguments and operator chains the
    /// parser allows.
    pub max_nesting: usize,
    /// Total loop passes allowed in one run; `None` means unbounded.
    pub max_loop_iterations: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_nesting: 128,
            max_loop_iterations: None,
        }
    }
}

impl Limits {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_nesting(mut self, nesting: usize) -> Self {
        self.max_nesting = nesting;
        self
    }

    pub fn with_max_loop_iterations(mut self, iterations: u64) -> Self {
        self.max_loop_iterations = Some(iterations);
        self
    }
}
