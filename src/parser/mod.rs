//! Source code parser for the teaching C++ subset
//!
//! This module transforms source text into an Abstract Syntax Tree:
//! - [`lexer`]: tokenization (source text → tokens)
//! - [`parse`]: the recursive descent parser (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported subset
//!
//! - Types: `int`, `float`, `double`, `char`, `string`, `bool`, `void`,
//!   typedef aliases, `const`, 1D/2D fixed-size arrays
//! - Statements: declarations, assignments (plain and compound), `if`/`else
//!   if`/`else`, `while`, `for`, `switch`, `break`, `continue`, `return`,
//!   `cout`/`cin` stream I/O, call statements, `x++`/`--x`
//! - No preprocessor (directives are skipped and validated separately), no
//!   pointers, classes, templates, or multi-file programs
//!
//! # Parser implementation
//!
//! Hand-written recursive descent with precedence climbing for binary
//! operators; statement and expression parsing extend the [`parse::Parser`]
//! through `impl` blocks in their own files.

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;

pub use ast::{AstNode, Program, SourceLocation};
pub use parse::{Parser, SyntaxError};
