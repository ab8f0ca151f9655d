//! Control-flow graph construction and layout
//!
//! - [`builder`]: AST → directed graph of statement-level nodes
//! - [`layout`]: layered (Sugiyama-style) 2D layout of that graph
//!
//! The graph types are plain serializable data: external visualizers consume
//! them as-is, and nothing here knows how a node will be drawn.

pub mod builder;
pub mod layout;

use serde::{Serialize, Serializer};
use std::fmt;

/// Graph node identifier, unique within one [`FlowGraph`]
pub type NodeId = usize;

/// What a node represents, for styling by the visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Conditions, merges, jumps
    Control,
    /// Assignments, updates, calls
    Action,
    /// Declarations and typedefs
    Data,
    /// cout / cin
    Io,
    /// Synthetic Start and End markers
    Terminal,
}

/// Edge annotation: branch direction, loop repeat, or matched case value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeLabel {
    True,
    False,
    Repeat,
    Case(String),
    Default,
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::True => write!(f, "True"),
            EdgeLabel::False => write!(f, "False"),
            EdgeLabel::Repeat => write!(f, "Repeat"),
            EdgeLabel::Case(value) => write!(f, "{}", value),
            EdgeLabel::Default => write!(f, "default"),
        }
    }
}

impl Serialize for EdgeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// One statement-level node of the control-flow graph
#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    /// 1-based source line, absent on synthetic nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Plain-language description for the visualizer's tooltips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, Serialize)]
pub struct FlowEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<EdgeLabel>,
    /// Loop-closing edges, excluded from layering
    pub back_edge: bool,
}

/// The whole control-flow graph of a program
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; ids are handed out sequentially so rebuilding the same
    /// program yields the same graph.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        kind: NodeKind,
        line: Option<usize>,
        narrative: Option<String>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(FlowNode {
            id,
            label: label.into(),
            kind,
            line,
            narrative,
        });
        id
    }

    /// Append an unlabeled forward edge
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) {
        self.edges.push(FlowEdge {
            source,
            target,
            label: None,
            back_edge: false,
        });
    }

    /// Append a labeled forward edge
    pub fn add_labeled_edge(&mut self, source: NodeId, target: NodeId, label: EdgeLabel) {
        self.edges.push(FlowEdge {
            source,
            target,
            label: Some(label),
            back_edge: false,
        });
    }

    /// Append a loop-closing edge (labeled Repeat, excluded from layering)
    pub fn add_back_edge(&mut self, source: NodeId, target: NodeId) {
        self.edges.push(FlowEdge {
            source,
            target,
            label: Some(EdgeLabel::Repeat),
            back_edge: true,
        });
    }

    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", NodeKind::Action, None, None);
        let b = graph.add_node("b", NodeKind::Action, None, None);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(graph.node(b).unwrap().label, "b");
    }

    #[test]
    fn test_edge_label_serialization() {
        let label = EdgeLabel::Case("2".to_string());
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"2\"");
        assert_eq!(
            serde_json::to_string(&EdgeLabel::Repeat).unwrap(),
            "\"Repeat\""
        );
    }
}
