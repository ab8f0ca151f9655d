//! # Introduction
//!
//! Flowscope parses a pedagogical C++ subset, runs a battery of semantic and
//! safety checks over the AST, and turns the program into a positioned
//! control-flow graph for visualization. It is the analysis engine behind an
//! educational code-understanding tool; editors, dashboards, and narrative
//! layers consume the plain data it produces.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Parser → AST → { Analyzer → diagnostics
//!                         ; Graph builder → CFG → Layout → positions }
//! ```
//!
//! 1. [`parser`] — tokenizes the source and builds an AST; all-or-nothing,
//!    grammar failures carry the offending line.
//! 2. [`analysis`] — a fatal structural pre-check over the raw source, then
//!    a depth-first semantic pass: scoped symbol resolution, type checks,
//!    initialization and const tracking, break/continue/return placement,
//!    constant-propagation-based bounds and zero-divisor checks.
//! 3. [`graph`] — a statement-level control-flow graph with labeled branch
//!    edges, and a deterministic layered layout for drawing it.
//!
//! ## Supported subset
//!
//! Types: `int`, `float`, `double`, `char`, `string`, `bool`, `void`,
//! typedefs, `const`, 1D/2D arrays. Control flow: `if`/`else if`/`else`,
//! `while`, `for`, `switch`, `break`, `continue`, `return`. I/O: `cout`,
//! `cin`. No pointers, classes, templates, or multi-file programs.
//!
//! Every stage is a pure, synchronous function over in-memory data; each
//! call builds fresh state, so one engine instance can serve unrelated
//! inputs back to back.

pub mod analysis;
pub mod graph;
pub mod parser;

pub use analysis::{Category, Diagnostic, Severity};
pub use graph::layout::NodePosition;
pub use graph::{FlowEdge, FlowGraph, FlowNode};
pub use parser::{AstNode, Program, SyntaxError};

/// Parse source text into an AST. No partial AST on failure.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let mut parser = parser::Parser::new(source)?;
    parser.parse_program()
}

/// Run the structural pre-check and the semantic pass.
pub fn analyze(program: &Program, source: &str) -> Vec<Diagnostic> {
    analysis::analyze(program, source)
}

/// Build the statement-level control-flow graph of a parsed program.
pub fn build_graph(program: &Program) -> FlowGraph {
    graph::builder::build_graph(program)
}

/// Compute 2D positions for a control-flow graph.
pub fn layout(graph: &FlowGraph) -> Vec<NodePosition> {
    crate::graph::layout::layout(graph)
}
