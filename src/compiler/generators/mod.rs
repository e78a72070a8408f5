//! Code Generators Module
//!
//! Code generation split by node kind:
//! - `expression`: literals, variable reads, calls and binary operations
//! - `statement`: assignments, prints and conditionals/loops

pub mod expression;
pub mod statement;
