//! Structural pre-check: the fatal diagnostic tier
//!
//! A handful of cheap scans over the raw source that run before the AST
//! walk. Any hit is fatal: analysis halts and returns exactly that one
//! diagnostic, because the program is too malformed for the semantic pass to
//! say anything useful about it.
//!
//! Checks, in order:
//! 1. unbalanced braces
//! 2. foreign (non-C++) syntax: `def`, `print(`, `elif`, colon-style blocks
//! 3. library symbols used without the matching `#include`
//! 4. missing `int main()` entry point
//! 5. std symbols used unqualified without `using namespace std;`
//!
//! Comments and string literal contents are blanked out first so nothing in
//! them can trip a check.

use crate::analysis::diagnostics::{Category, Diagnostic};

/// Symbols that require a header, one row per header family
const LIBRARY_CHECKS: &[(&str, &[&str])] = &[
    ("iostream", &["cout", "cin", "endl", "cerr", "clog"]),
    (
        "cmath",
        &[
            "sqrt", "pow", "fabs", "ceil", "floor", "round", "sin", "cos", "tan", "log", "exp",
        ],
    ),
    ("string", &["getline", "to_string", "stoi", "stod", "stof"]),
    (
        "algorithm",
        &["sort", "reverse", "binary_search", "max_element", "min_element"],
    ),
    ("cstdlib", &["rand", "srand"]),
    ("iomanip", &["setprecision", "setw", "fixed"]),
];

/// Run every structural check; the first failure is returned alone.
pub fn run_precheck(source: &str) -> Option<Diagnostic> {
    let cleaned = strip_comments_and_strings(source);

    check_braces(&cleaned)
        .or_else(|| check_foreign_syntax(&cleaned))
        .or_else(|| check_library_includes(source, &cleaned))
        .or_else(|| check_entry_point(&cleaned))
        .or_else(|| check_namespace(source, &cleaned))
}

/// Blank out comments and string/char literal contents, preserving newlines
/// so byte offsets still map to the right line.
fn strip_comments_and_strings(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                out.push(' ');
                i += 1;
            }
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            out.push_str("  ");
            i += 2;
            while i < chars.len() {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    out.push_str("  ");
                    i += 2;
                    break;
                }
                out.push(if chars[i] == '\n' { '\n' } else { ' ' });
                i += 1;
            }
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            out.push(' ');
            i += 1;
            while i < chars.len() && chars[i] != quote {
                if chars[i] == '\\' {
                    out.push(' ');
                    i += 1;
                    if i >= chars.len() {
                        break;
                    }
                }
                out.push(if chars[i] == '\n' { '\n' } else { ' ' });
                i += 1;
            }
            if i < chars.len() {
                out.push(' ');
                i += 1;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// 1-based line of a byte position
fn line_of(text: &str, pos: usize) -> usize {
    text[..pos.min(text.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Position of `word` with identifier boundaries on both sides
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(rel) = haystack[start..].find(word) {
        let pos = start + rel;
        let end = pos + word.len();
        let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if before_ok && after_ok {
            return Some(pos);
        }
        start = pos + word.len();
    }
    None
}

fn check_braces(cleaned: &str) -> Option<Diagnostic> {
    let mut open_lines: Vec<usize> = Vec::new();
    let mut line = 1;

    for c in cleaned.chars() {
        match c {
            '\n' => line += 1,
            '{' => open_lines.push(line),
            '}' => {
                if open_lines.pop().is_none() {
                    return Some(Diagnostic::error(
                        Category::Structure,
                        Some(line),
                        "Unbalanced braces: unexpected '}'",
                    ));
                }
            }
            _ => {}
        }
    }

    open_lines.first().map(|&line| {
        Diagnostic::error(
            Category::Structure,
            Some(line),
            "Unbalanced braces: '{' is never closed",
        )
    })
}

fn check_foreign_syntax(cleaned: &str) -> Option<Diagnostic> {
    if let Some(pos) = find_word(cleaned, "def") {
        return Some(Diagnostic::error(
            Category::Syntax,
            Some(line_of(cleaned, pos)),
            "'def' is not C++. Declare functions with a return type, e.g. 'int name(...)'",
        ));
    }

    if let Some(pos) = find_word(cleaned, "print") {
        let rest = cleaned[pos + "print".len()..].trim_start();
        if rest.starts_with('(') {
            return Some(Diagnostic::error(
                Category::Syntax,
                Some(line_of(cleaned, pos)),
                "'print()' is not C++. Use 'cout <<' for output",
            ));
        }
    }

    if let Some(pos) = find_word(cleaned, "elif") {
        return Some(Diagnostic::error(
            Category::Syntax,
            Some(line_of(cleaned, pos)),
            "'elif' is not C++. Use 'else if'",
        ));
    }

    // Colon-terminated block headers (python style). Case labels also end
    // with ':', so only block-introducing keywords count.
    let mut offset = 0;
    for raw_line in cleaned.split('\n') {
        let trimmed = raw_line.trim();
        if trimmed.ends_with(':') {
            let starts_block = ["if", "else", "elif", "for", "while", "def"]
                .iter()
                .any(|kw| {
                    trimmed.starts_with(kw)
                        && trimmed[kw.len()..]
                            .chars()
                            .next()
                            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
                });
            if starts_block {
                return Some(Diagnostic::error(
                    Category::Syntax,
                    Some(line_of(cleaned, offset)),
                    "Blocks use '{ }' in C++, not ':'",
                ));
            }
        }
        offset += raw_line.len() + 1;
    }

    None
}

/// Headers named by `#include <...>` directives in the raw source
fn included_headers(source: &str) -> Vec<String> {
    let mut headers = Vec::new();
    let mut start = 0;
    while let Some(rel) = source[start..].find("#include") {
        let pos = start + rel + "#include".len();
        let rest = source[pos..].trim_start();
        if let Some(stripped) = rest.strip_prefix('<') {
            if let Some(end) = stripped.find('>') {
                headers.push(stripped[..end].trim().to_string());
            }
        }
        start = pos;
    }
    headers
}

fn check_library_includes(source: &str, cleaned: &str) -> Option<Diagnostic> {
    let headers = included_headers(source);

    for (header, symbols) in LIBRARY_CHECKS {
        for symbol in *symbols {
            if let Some(pos) = find_word(cleaned, symbol) {
                if !headers.iter().any(|h| h == header) {
                    return Some(Diagnostic::error(
                        Category::Structure,
                        Some(line_of(cleaned, pos)),
                        format!(
                            "'{}' requires the missing '#include <{}>' directive",
                            symbol, header
                        ),
                    ));
                }
                break;
            }
        }
    }

    None
}

fn check_entry_point(cleaned: &str) -> Option<Diagnostic> {
    let normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.contains("int main(") || normalized.contains("int main (") {
        return None;
    }
    Some(Diagnostic::error(
        Category::Structure,
        None,
        "Missing 'int main()' entry point",
    ))
}

fn check_namespace(source: &str, cleaned: &str) -> Option<Diagnostic> {
    let uses_std_symbols = ["cout", "cin", "endl"]
        .iter()
        .any(|s| find_word(cleaned, s).is_some());
    if !uses_std_symbols {
        return None;
    }
    if !included_headers(source).iter().any(|h| h == "iostream") {
        return None;
    }
    if source.contains("std::") {
        return None;
    }

    let normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.contains("using namespace std ;") || normalized.contains("using namespace std;")
    {
        return None;
    }

    Some(Diagnostic::error(
        Category::Structure,
        None,
        "Standard library symbols are unqualified: add 'using namespace std;' or write 'std::cout'",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_program_passes() {
        let source = r#"
            #include <iostream>
            using namespace std;
            int main() {
                cout << "hello" << endl;
                return 0;
            }
        "#;
        assert!(run_precheck(source).is_none());
    }

    #[test]
    fn test_unbalanced_braces() {
        let source = "int main() { if (1) { return 0; }";
        let diag = run_precheck(source).unwrap();
        assert_eq!(diag.category, Category::Structure);
        assert!(diag.message.contains("brace"));
    }

    #[test]
    fn test_braces_in_strings_ignored() {
        let source = r#"
            #include <iostream>
            using namespace std;
            int main() { cout << "{{{"; return 0; }
        "#;
        assert!(run_precheck(source).is_none());
    }

    #[test]
    fn test_pythonisms() {
        let diag = run_precheck("def main(): return 0").unwrap();
        assert_eq!(diag.category, Category::Syntax);

        let diag = run_precheck("int main() { print(5); return 0; }").unwrap();
        assert!(diag.message.contains("cout"));
    }

    #[test]
    fn test_missing_include() {
        let source = "int main() { cout << 1; return 0; }";
        let diag = run_precheck(source).unwrap();
        assert!(diag.message.contains("iostream"));
    }

    #[test]
    fn test_missing_main() {
        let source = "#include <iostream>\nint helper() { return 0; }";
        let diag = run_precheck(source).unwrap();
        assert!(diag.message.contains("int main()"));
    }

    #[test]
    fn test_namespace_hint() {
        let source = "#include <iostream>\nint main() { cout << 1; return 0; }";
        let diag = run_precheck(source).unwrap();
        assert!(diag.message.contains("using namespace std"));
    }

    #[test]
    fn test_case_labels_not_flagged_as_python() {
        let source = r#"
            int main() {
                int x = 1;
                switch (x) {
                    case 1:
                        break;
                    default:
                        break;
                }
                return 0;
            }
        "#;
        assert!(run_precheck(source).is_none());
    }
}
