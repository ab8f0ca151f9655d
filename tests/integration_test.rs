// Integration tests for the full parse → analyze → graph → layout pipeline

use flowscope::analysis::{Category, Severity};
use flowscope::graph::EdgeLabel;
use flowscope::parser::ast::AstNode;

/// Collect (depth, rendered-statement) pairs in source order
fn statement_outline(nodes: &[AstNode], depth: usize, out: &mut Vec<(usize, String)>) {
    for node in nodes {
        match node {
            AstNode::Program { body, .. } | AstNode::Main { body, .. } => {
                statement_outline(body, depth, out);
            }
            AstNode::FunctionDefinition { body, .. } => {
                out.push((depth, node.to_string()));
                statement_outline(body, depth + 1, out);
            }
            AstNode::WhileLoop { body, .. } | AstNode::ForLoop { body, .. } => {
                out.push((depth, node.to_string()));
                statement_outline(body, depth + 1, out);
            }
            AstNode::IfStatement {
                body,
                else_ifs,
                alternate,
                ..
            } => {
                out.push((depth, node.to_string()));
                statement_outline(body, depth + 1, out);
                for clause in else_ifs {
                    statement_outline(&clause.body, depth + 1, out);
                }
                if let Some(alternate) = alternate {
                    statement_outline(alternate, depth + 1, out);
                }
            }
            AstNode::SwitchStatement {
                cases,
                default_case,
                ..
            } => {
                out.push((depth, node.to_string()));
                for case in cases {
                    statement_outline(&case.body, depth + 1, out);
                }
                if let Some(default_case) = default_case {
                    statement_outline(&default_case.body, depth + 1, out);
                }
            }
            AstNode::NamespaceDirective { .. } => {}
            other => out.push((depth, other.to_string())),
        }
    }
}

#[test]
fn test_reserialization_preserves_order_and_nesting() {
    let source = r#"
        int main() {
            int x = 10;
            while (x > 0) {
                x = x - 1;
                cout << x;
            }
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");
    let mut outline = Vec::new();
    statement_outline(&program.nodes, 0, &mut outline);

    assert_eq!(
        outline,
        vec![
            (0, "int x = 10".to_string()),
            (0, "while (x > 0)".to_string()),
            (1, "x = x - 1".to_string()),
            (1, "cout << x".to_string()),
            (0, "return 0".to_string()),
        ]
    );
}

#[test]
fn test_parse_is_all_or_nothing() {
    let err = flowscope::parse("int main() {\n  int = 5;\n}").unwrap_err();
    assert_eq!(err.line(), 2);
}

#[test]
fn test_analyze_twice_yields_identical_lists() {
    let source = r#"
        #include <iostream>
        using namespace std;
        int main() {
            int unused_one;
            int unused_two;
            int y = 0;
            cout << 10 / y << endl;
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");
    let first = flowscope::analyze(&program, source);
    let second = flowscope::analyze(&program, source);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_clean_while_program_example() {
    // No diagnostics, and the graph is
    // Start → decl(x) → while-cond → assign → while-cond (repeat),
    // while-cond → exit (false)
    let source = "int main() { int x = 10; while (x > 0) { x = x - 1; } return 0; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);
    assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);

    let graph = flowscope::build_graph(&program);
    let id_of = |label: &str| {
        graph
            .nodes
            .iter()
            .find(|n| n.label == label)
            .unwrap_or_else(|| panic!("no node labeled '{}'", label))
            .id
    };

    let start = id_of("START");
    let decl = id_of("int x = 10");
    let cond = id_of("while (x > 0)");
    let assign = id_of("x = x - 1");

    let has_edge = |s, t| graph.edges.iter().any(|e| e.source == s && e.target == t);
    assert!(has_edge(start, decl));
    assert!(has_edge(decl, cond));
    assert!(has_edge(cond, assign));

    let repeat = graph
        .edges
        .iter()
        .find(|e| e.source == assign && e.target == cond)
        .expect("missing repeat edge");
    assert!(repeat.back_edge);
    assert_eq!(repeat.label, Some(EdgeLabel::Repeat));

    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == cond && e.label == Some(EdgeLabel::False)));
}

#[test]
fn test_division_by_zero_example() {
    let source = "int main() { int y = 0; int z = 10 / y; return z; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);

    let math: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == Category::MathSafety)
        .collect();
    assert_eq!(math.len(), 1, "diagnostics: {:?}", diagnostics);
    assert_eq!(math[0].severity, Severity::Error);
    assert!(math[0].message.contains("Division by zero"));
}

#[test]
fn test_division_unflagged_after_reassignment() {
    let source = "int main() { int y = 0; y = 5; int z = 10 / y; return z; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);
    assert!(diagnostics
        .iter()
        .all(|d| d.category != Category::MathSafety));
}

#[test]
fn test_bounds_example_cites_size_and_range() {
    let source = "int main() { int arr[3]; arr[5] = 1; return arr[0]; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);

    let bounds: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == Category::Bounds)
        .collect();
    assert_eq!(bounds.len(), 1, "diagnostics: {:?}", diagnostics);
    assert!(bounds[0].message.contains("size: 3"));
    assert!(bounds[0].message.contains("valid indices: 0-2"));
}

#[test]
fn test_boundary_indices() {
    // Index N is flagged, index N-1 is not
    let source = "int main() { int arr[4]; arr[4] = 1; arr[3] = 1; return arr[3]; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);

    let bounds: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.category == Category::Bounds)
        .collect();
    assert_eq!(bounds.len(), 1);
    assert!(bounds[0].message.contains("arr[4]"));
}

#[test]
fn test_break_outside_loop_is_single_and_nonfatal() {
    let source = "int main() { break; return 0; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);

    assert_eq!(diagnostics.len(), 1, "diagnostics: {:?}", diagnostics);
    assert_eq!(diagnostics[0].category, Category::ControlFlow);
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_precheck_halts_with_single_diagnostic() {
    // Missing iostream for cout: fatal, exactly one diagnostic
    let source = "int main() { int x = 1; cout << x; return 0; }";

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, Category::Structure);
    assert!(diagnostics[0].message.contains("iostream"));
}

#[test]
fn test_layout_layers_descend_along_forward_edges() {
    let source = r#"
        int main() {
            int x = 0;
            while (x < 5) {
                if (x > 2) {
                    x = x + 2;
                } else {
                    x = x + 1;
                }
            }
            cout << x;
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");
    let graph = flowscope::build_graph(&program);
    let positions = flowscope::layout(&graph);
    assert_eq!(positions.len(), graph.nodes.len());

    let y_of: std::collections::HashMap<_, _> =
        positions.iter().map(|p| (p.id, p.y)).collect();
    for edge in &graph.edges {
        if edge.back_edge {
            continue;
        }
        assert!(
            y_of[&edge.target] > y_of[&edge.source],
            "edge {} -> {} does not descend",
            edge.source,
            edge.target
        );
    }
}

#[test]
fn test_full_pipeline_on_feature_rich_program() {
    let source = r#"
        #include <iostream>
        using namespace std;

        int square(int n) {
            return n * n;
        }

        int main() {
            typedef int score;
            score total = 0;
            int marks[3] = {70, 80, 90};

            for (int i = 0; i < 3; i++) {
                total += marks[i];
            }

            switch (total / 3) {
                case 80:
                    cout << "average is 80" << endl;
                    break;
                default:
                    cout << "average is " << total / 3 << endl;
            }

            if (total > 200) {
                cout << "great" << endl;
            } else if (total > 100) {
                cout << "good" << endl;
            } else {
                cout << "keep going" << endl;
            }

            cout << square(total) << endl;
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");

    let diagnostics = flowscope::analyze(&program, source);
    assert!(
        diagnostics.iter().all(|d| d.severity == Severity::Warning),
        "unexpected errors: {:?}",
        diagnostics
    );

    let graph = flowscope::build_graph(&program);
    // Two functions, two Start/End pairs
    assert_eq!(
        graph.nodes.iter().filter(|n| n.label == "START").count(),
        2
    );
    assert_eq!(graph.nodes.iter().filter(|n| n.label == "END").count(), 2);

    let positions = flowscope::layout(&graph);
    assert_eq!(positions.len(), graph.nodes.len());

    // Rebuilding everything gives identical output
    let graph2 = flowscope::build_graph(&program);
    let positions2 = flowscope::layout(&graph2);
    assert_eq!(positions, positions2);
}

#[test]
fn test_scope_isolation_across_branches() {
    // A declaration inside a branch neither collides with nor leaks into
    // the sibling branch or the enclosing scope
    let source = r#"
        #include <iostream>
        using namespace std;
        int main() {
            int x = 1;
            if (x > 0) {
                int inner = 1;
                cout << inner;
            } else {
                int inner = 2;
                cout << inner;
            }
            int inner = 3;
            cout << inner;
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);
    assert!(
        diagnostics
            .iter()
            .all(|d| d.category != Category::Scope),
        "diagnostics: {:?}",
        diagnostics
    );
}

#[test]
fn test_const_and_typedef_rules() {
    let source = r#"
        #include <iostream>
        using namespace std;
        int main() {
            typedef int km;
            const km limit = 100;
            limit = 50;
            cout << limit;
            return 0;
        }
    "#;

    let program = flowscope::parse(source).expect("parsing failed");
    let diagnostics = flowscope::analyze(&program, source);
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.category == Category::Const)
            .count(),
        1,
        "diagnostics: {:?}",
        diagnostics
    );
}
