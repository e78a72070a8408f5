//! Runtime and Fixed Assembly
//!
//! The generated program is linked against a small runtime shim that provides
//! `uart_put_char` (prints the character in `R0`) and calls `__main`. Everything
//! else the program needs is emitted from here.

/// Routine that prints `R0` as a character.
pub const PUT_CHAR: &str = "uart_put_char";

/// Helper computing `R1` floor-divided by `R0` into `R0`.
pub const FLOOR_DIV: &str = "__floordiv";

/// Label the runtime shim calls into.
pub const ENTRY: &str = "__main";

/// Labels the generated code may not reuse for functions or variables.
pub const RESERVED_SYMBOLS: &[&str] = &[PUT_CHAR, FLOOR_DIV, ENTRY];

pub const PREAMBLE: &[&str] = &[".cpu cortex-m0", ".align 4", ".global __main"];

/// Signed floor division of `R1` by `R0`, result in `R0`. Clobbers `R1` and `R2`.
/// Divides by repeated subtraction on the magnitudes, then fixes up the sign
/// and rounds towards negative infinity. A zero divisor halts.
pub const FLOOR_DIVISION: &[&str] = &[
    "__floordiv:",
    "\tPUSH { R4, LR }",
    "\tCMP R0, #0",
    "\tBEQ __floordiv_halt",
    "\tMOV R4, R1",
    "\tEOR R4, R0",
    "\tCMP R1, #0",
    "\tBGE __floordiv_dividend",
    "\tNEG R1, R1",
    "__floordiv_dividend:",
    "\tCMP R0, #0",
    "\tBGE __floordiv_divisor",
    "\tNEG R0, R0",
    "__floordiv_divisor:",
    "\tMOV R2, #0",
    "__floordiv_loop:",
    "\tCMP R1, R0",
    "\tBLT __floordiv_sign",
    "\tSUB R1, R1, R0",
    "\tADD R2, R2, #1",
    "\tB __floordiv_loop",
    "__floordiv_sign:",
    "\tCMP R4, #0",
    "\tBGE __floordiv_done",
    "\tNEG R2, R2",
    "\tCMP R1, #0",
    "\tBEQ __floordiv_done",
    "\tSUB R2, R2, #1",
    "__floordiv_done:",
    "\tMOV R0, R2",
    "\tPOP { R4, PC }",
    "__floordiv_halt:",
    "\tB __floordiv_halt",
];

/// Entry point called by the runtime shim; returns the entry function's result
/// in `R0`.
pub fn trampoline(entry: &str) -> Vec<String> {
    vec![
        format!("{}:", ENTRY),
        "\tPUSH { LR }".to_string(),
        format!("\tBL {}", entry),
        "\tPOP { PC }".to_string(),
    ]
}
