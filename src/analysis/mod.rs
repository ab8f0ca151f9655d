//! Static semantic analysis
//!
//! Two tiers. The structural pre-check ([`precheck`]) runs over the raw
//! source and is fatal: its first finding is returned alone and the AST is
//! never walked. Everything else ([`analyzer`]) is recoverable: the walker
//! keeps going and accumulates the complete diagnostic list, errors first,
//! then warnings, each group in emission order.
//!
//! Analysis is a pure function of its inputs: a fresh [`symbols::SymbolTable`]
//! and constant map are built per call, so one engine can serve unrelated
//! inputs back to back.

pub mod analyzer;
pub mod consts;
pub mod diagnostics;
pub mod precheck;
pub mod symbols;

pub use analyzer::Analyzer;
pub use diagnostics::{Category, Diagnostic, Severity};
pub use symbols::{Symbol, SymbolTable, ValueType};

use crate::parser::ast::Program;
use log::debug;

/// Analyze a parsed program against its raw source text.
///
/// Returns the ordered diagnostic list; deterministic for a given
/// `(program, source)` pair.
pub fn analyze(program: &Program, source: &str) -> Vec<Diagnostic> {
    if let Some(fatal) = precheck::run_precheck(source) {
        debug!("pre-check failed: {}", fatal.message);
        return vec![fatal];
    }

    Analyzer::new().run(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_precheck_failure_is_single_and_fatal() {
        // Unbalanced braces: the walker never runs, one diagnostic comes back
        let source = "int main() { int x = 1;";
        let mut parser = Parser::new(source).unwrap();
        // The parser would reject this too, so analyze a minimal stand-in AST
        let program = parser.parse_program().unwrap_or_default();

        let diags = analyze(&program, source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].category, Category::Structure);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let source = r#"
            #include <iostream>
            using namespace std;
            int main() {
                int a;
                int y = 0;
                cout << 10 / y << endl;
                return 0;
            }
        "#;
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(analyze(&program, source), analyze(&program, source));
    }
}
