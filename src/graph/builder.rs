//! AST → control-flow graph
//!
//! Walks each function body threading a "current predecessor" id through the
//! statement list. Straight-line statements append themselves to the chain;
//! control structures fan out and reconverge:
//!
//! - `if`: condition node, one chain per branch, all reconverging at a
//!   synthetic Merge node; each `else if` hangs off the previous condition's
//!   False edge
//! - `while`/`for`: condition node, body chain, body-end → condition as a
//!   Repeat back-edge, condition → synthetic exit node on False
//! - `switch`: discriminant fans to one node per case (edge labeled with the
//!   rendered case value) and reconverges at an "End Switch" node
//!
//! Every function body gets exactly one synthetic Start and End.

use crate::graph::{EdgeLabel, FlowGraph, NodeId, NodeKind};
use crate::parser::ast::*;

/// Build the control-flow graph for every function body in the program
pub fn build_graph(program: &Program) -> FlowGraph {
    let mut builder = GraphBuilder {
        graph: FlowGraph::new(),
    };
    builder.process_top_level(&program.nodes);
    builder.graph
}

struct GraphBuilder {
    graph: FlowGraph,
}

impl GraphBuilder {
    fn process_top_level(&mut self, nodes: &[AstNode]) {
        for node in nodes {
            match node {
                AstNode::Program { body, .. } => self.process_top_level(body),
                AstNode::Main { body, .. } => self.process_function("main", body),
                AstNode::FunctionDefinition { name, body, .. } => {
                    self.process_function(name, body);
                }
                _ => {}
            }
        }
    }

    fn process_function(&mut self, name: &str, body: &[AstNode]) {
        let begins = if name == "main" {
            "Program execution begins here".to_string()
        } else {
            format!("Function '{}' begins here", name)
        };
        let ends = if name == "main" {
            "Program execution ends here".to_string()
        } else {
            format!("Function '{}' ends here", name)
        };

        let start = self
            .graph
            .add_node("START", NodeKind::Terminal, None, Some(begins));
        let last = self.process_statements(body, start);
        let end = self.graph.add_node("END", NodeKind::Terminal, None, Some(ends));
        self.graph.add_edge(last, end);
    }

    fn process_statements(&mut self, statements: &[AstNode], previous: NodeId) -> NodeId {
        let mut current = previous;
        for statement in statements {
            current = self.process_statement(statement, current);
        }
        current
    }

    /// Append one statement to the chain; returns the new predecessor
    fn process_statement(&mut self, stmt: &AstNode, previous: NodeId) -> NodeId {
        match stmt {
            AstNode::VariableDeclaration { name, init, .. } => {
                let narrative = match init {
                    Some(init) => format!("Declare variable {} and set it to {}", name, init),
                    None => format!("Declare variable {}", name),
                };
                self.chain(stmt, previous, NodeKind::Data, narrative)
            }

            AstNode::TypedefDeclaration {
                base_type, new_name, ..
            } => {
                let narrative = format!("Create type alias {} for {}", new_name, base_type);
                self.chain(stmt, previous, NodeKind::Data, narrative)
            }

            AstNode::Assignment { target, value, .. } => {
                let narrative = format!("Set {} to {}", target, value);
                self.chain(stmt, previous, NodeKind::Action, narrative)
            }

            AstNode::UpdateExpression { .. } => {
                let narrative = format!("Update: {}", stmt);
                self.chain(stmt, previous, NodeKind::Action, narrative)
            }

            AstNode::ExpressionStatement { .. } => {
                let narrative = format!("Execute: {}", stmt);
                self.chain(stmt, previous, NodeKind::Action, narrative)
            }

            AstNode::OutputStatement { .. } => {
                let narrative = format!("Output to the console: {}", stmt);
                self.chain(stmt, previous, NodeKind::Io, narrative)
            }

            AstNode::InputStatement { targets, .. } => {
                let narrative = format!("Read input into {}", targets.join(", "));
                self.chain(stmt, previous, NodeKind::Io, narrative)
            }

            AstNode::ReturnStatement { .. } => {
                let narrative = format!("{} from the function", stmt);
                self.chain(stmt, previous, NodeKind::Control, narrative)
            }

            AstNode::BreakStatement { .. } => self.chain(
                stmt,
                previous,
                NodeKind::Control,
                "Exit the current loop or switch".to_string(),
            ),

            AstNode::ContinueStatement { .. } => self.chain(
                stmt,
                previous,
                NodeKind::Control,
                "Skip to the next iteration".to_string(),
            ),

            AstNode::WhileLoop {
                condition, body, ..
            } => self.process_loop(stmt, condition, body, previous, "Exit Loop"),

            AstNode::ForLoop {
                condition, body, ..
            } => {
                let cond: &AstNode = match condition {
                    Some(c) => c,
                    // A bare `for (;;)` still gets a condition node
                    None => stmt,
                };
                self.process_loop(stmt, cond, body, previous, "Loop End")
            }

            AstNode::IfStatement {
                condition,
                body,
                else_ifs,
                alternate,
                ..
            } => self.process_if(stmt, condition, body, else_ifs, alternate.as_deref(), previous),

            AstNode::SwitchStatement {
                discriminant,
                cases,
                default_case,
                ..
            } => self.process_switch(stmt, discriminant, cases, default_case.as_ref(), previous),

            // Top-level structure and bare expressions do not form chain
            // nodes of their own
            AstNode::Program { .. }
            | AstNode::NamespaceDirective { .. }
            | AstNode::Main { .. }
            | AstNode::FunctionDefinition { .. }
            | AstNode::BinaryExpression { .. }
            | AstNode::UnaryExpression { .. }
            | AstNode::ArrayAccess { .. }
            | AstNode::ArrayAccess2D { .. }
            | AstNode::CallExpression { .. }
            | AstNode::Literal { .. }
            | AstNode::Identifier { .. }
            | AstNode::ArrayInitializer { .. } => previous,
        }
    }

    /// Add a straight-line node and link it behind the predecessor
    fn chain(
        &mut self,
        stmt: &AstNode,
        previous: NodeId,
        kind: NodeKind,
        narrative: String,
    ) -> NodeId {
        let id = self
            .graph
            .add_node(stmt.to_string(), kind, Some(stmt.line()), Some(narrative));
        self.graph.add_edge(previous, id);
        id
    }

    fn process_loop(
        &mut self,
        stmt: &AstNode,
        condition: &AstNode,
        body: &[AstNode],
        previous: NodeId,
        exit_label: &str,
    ) -> NodeId {
        let cond = self.graph.add_node(
            stmt.to_string(),
            NodeKind::Control,
            Some(stmt.line()),
            Some(format!("Loop while {} is true", condition)),
        );
        self.graph.add_edge(previous, cond);

        let body_last = self.process_statements(body, cond);
        self.graph.add_back_edge(body_last, cond);

        let exit = self.graph.add_node(
            exit_label,
            NodeKind::Control,
            None,
            Some(format!("Condition {} is false, exit the loop", condition)),
        );
        self.graph.add_labeled_edge(cond, exit, EdgeLabel::False);

        exit
    }

    fn process_if(
        &mut self,
        stmt: &AstNode,
        condition: &AstNode,
        body: &[AstNode],
        else_ifs: &[ElseIfClause],
        alternate: Option<&[AstNode]>,
        previous: NodeId,
    ) -> NodeId {
        let cond = self.graph.add_node(
            stmt.to_string(),
            NodeKind::Control,
            Some(stmt.line()),
            Some(format!("Check whether {} holds", condition)),
        );
        self.graph.add_edge(previous, cond);

        let merge = self.graph.add_node(
            "Merge",
            NodeKind::Control,
            None,
            Some("All branches converge here".to_string()),
        );

        let true_last = self.process_statements(body, cond);
        self.graph
            .add_labeled_edge(true_last, merge, EdgeLabel::True);

        // Each else-if condition hangs off the previous condition's False edge
        let mut prev_cond = cond;
        for clause in else_ifs {
            let clause_cond = self.graph.add_node(
                format!("else if ({})", clause.condition),
                NodeKind::Control,
                Some(clause.location.line),
                Some(format!("Otherwise, check whether {} holds", clause.condition)),
            );
            self.graph
                .add_labeled_edge(prev_cond, clause_cond, EdgeLabel::False);

            let clause_last = self.process_statements(&clause.body, clause_cond);
            self.graph
                .add_labeled_edge(clause_last, merge, EdgeLabel::True);

            prev_cond = clause_cond;
        }

        match alternate {
            Some(alternate) => {
                let else_node = self.graph.add_node(
                    "else",
                    NodeKind::Control,
                    None,
                    Some("All conditions were false, run the else block".to_string()),
                );
                self.graph
                    .add_labeled_edge(prev_cond, else_node, EdgeLabel::False);

                let else_last = self.process_statements(alternate, else_node);
                self.graph.add_edge(else_last, merge);
            }
            None => {
                self.graph
                    .add_labeled_edge(prev_cond, merge, EdgeLabel::False);
            }
        }

        merge
    }

    fn process_switch(
        &mut self,
        stmt: &AstNode,
        discriminant: &AstNode,
        cases: &[SwitchCase],
        default_case: Option<&DefaultCase>,
        previous: NodeId,
    ) -> NodeId {
        let switch = self.graph.add_node(
            stmt.to_string(),
            NodeKind::Control,
            Some(stmt.line()),
            Some(format!("Match the value of {} against the cases", discriminant)),
        );
        self.graph.add_edge(previous, switch);

        let merge = self.graph.add_node(
            "End Switch",
            NodeKind::Control,
            None,
            Some("The switch statement ends here".to_string()),
        );

        for case in cases {
            let value = case.value.to_string();
            let case_node = self.graph.add_node(
                format!("case {}", value),
                NodeKind::Control,
                Some(case.location.line),
                Some(format!("Runs when the value equals {}", value)),
            );
            self.graph
                .add_labeled_edge(switch, case_node, EdgeLabel::Case(value));

            let case_last = self.process_statements(&case.body, case_node);
            self.graph.add_edge(case_last, merge);
        }

        if let Some(default_case) = default_case {
            let default_node = self.graph.add_node(
                "default",
                NodeKind::Control,
                Some(default_case.location.line),
                Some("Runs when no case matched".to_string()),
            );
            self.graph
                .add_labeled_edge(switch, default_node, EdgeLabel::Default);

            let default_last = self.process_statements(&default_case.body, default_node);
            self.graph.add_edge(default_last, merge);
        }

        // A degenerate switch with no arms still flows through
        if cases.is_empty() && default_case.is_none() {
            self.graph.add_edge(switch, merge);
        }

        merge
    }
}
