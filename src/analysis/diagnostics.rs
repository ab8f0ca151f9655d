//! Diagnostic types produced by the semantic analyzer
//!
//! Diagnostics are plain data for external consumers (editors, dashboards),
//! so they serialize. Semantic diagnostics accumulate in order; only the
//! structural pre-check ever stops an analysis run.

use serde::Serialize;
use std::fmt;

/// How severe a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What rule family a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Fatal structural pre-check findings (braces, entry point, headers)
    Structure,
    /// Foreign-language syntax caught by the pre-check
    Syntax,
    /// Type mismatches and condition type rules
    Type,
    /// Undeclared or duplicate names
    Scope,
    /// Writes to const variables
    Const,
    /// Statically provable out-of-range array indices
    Bounds,
    /// Division or modulo by a known zero
    MathSafety,
    /// Use-before-initialization findings
    DataFlow,
    /// break/continue/return placement and unreachable code
    ControlFlow,
    /// Self-recursive calls
    Recursion,
    /// Declared-but-never-used variables
    Unused,
    /// Float-to-int narrowing
    Precision,
    /// Walker faults downgraded to a diagnostic
    Internal,
}

/// One analyzer finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    /// 1-based source line, when one can be attributed
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn error(category: Category, line: Option<usize>, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            category,
            line,
        }
    }

    pub fn warning(category: Category, line: Option<usize>, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            category,
            line,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.line {
            Some(line) => write!(f, "{} (line {}): {}", tag, line, self.message),
            None => write!(f, "{}: {}", tag, self.message),
        }
    }
}

/// Ordered accumulator: errors and warnings are collected separately while
/// walking and concatenated (errors first) into the final list.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, category: Category, line: Option<usize>, message: impl Into<String>) {
        self.errors.push(Diagnostic::error(category, line, message));
    }

    pub fn warning(&mut self, category: Category, line: Option<usize>, message: impl Into<String>) {
        self.warnings
            .push(Diagnostic::warning(category, line, message));
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Consume the sink, errors before warnings, each group in emission order
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        let mut all = self.errors;
        all.extend(self.warnings);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_sort_before_warnings() {
        let mut sink = DiagnosticSink::new();
        sink.warning(Category::Unused, Some(3), "unused variable 'x'");
        sink.error(Category::Bounds, Some(5), "index out of bounds");

        let all = sink.into_diagnostics();
        assert_eq!(all.len(), 2);
        assert!(all[0].is_error());
        assert_eq!(all[1].severity, Severity::Warning);
    }

    #[test]
    fn test_display_includes_line() {
        let d = Diagnostic::error(Category::MathSafety, Some(7), "division by zero");
        assert_eq!(d.to_string(), "error (line 7): division by zero");
    }
}
