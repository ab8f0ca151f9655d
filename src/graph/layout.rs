//! Layered ("Sugiyama-style") layout for the control-flow graph
//!
//! Three phases, all deterministic for a given graph:
//!
//! 1. **Layering** — Kahn-style sweep over the graph with back-edges
//!    excluded; each node lands on layer `1 + max(layer of predecessors)`
//!    (longest-path layering), so every forward edge points strictly
//!    downward.
//! 2. **Crossing reduction** — alternating downward/upward sweeps, each layer
//!    reordered by the median position of its neighbors in the adjacent
//!    layer; capped at a fixed iteration count with early exit once a full
//!    pass changes nothing.
//! 3. **Coordinates** — fixed node box and gutters, nodes evenly spaced
//!    within a layer, every layer centered on x = 0.
//!
//! Back-edges are rendered by the consumer but take no part in layering or
//! crossing reduction; a longest path over a cycle is not well defined.

use crate::graph::{FlowGraph, NodeId};
use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

const NODE_WIDTH: f64 = 200.0;
const HORIZONTAL_SPACING: f64 = 100.0;
const VERTICAL_SPACING: f64 = 120.0;
/// Crossing-reduction sweeps are capped so layout always terminates
const MAX_SWEEPS: usize = 10;

/// Final 2D position of one graph node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Compute positions for every node of the graph
pub fn layout(graph: &FlowGraph) -> Vec<NodePosition> {
    if graph.nodes.is_empty() {
        return Vec::new();
    }

    let mut layers = assign_layers(graph);
    reduce_crossings(graph, &mut layers);
    assign_coordinates(&layers)
}

/// Longest-path layering via a Kahn-style sweep, back-edges excluded
fn assign_layers(graph: &FlowGraph) -> Vec<Vec<NodeId>> {
    let mut in_degree: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut successors: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    for node in &graph.nodes {
        in_degree.insert(node.id, 0);
        successors.insert(node.id, Vec::new());
    }
    for edge in &graph.edges {
        if edge.back_edge {
            continue;
        }
        if let Some(succ) = successors.get_mut(&edge.source) {
            succ.push(edge.target);
        }
        if let Some(deg) = in_degree.get_mut(&edge.target) {
            *deg += 1;
        }
    }

    let mut layer_of: FxHashMap<NodeId, usize> = FxHashMap::default();
    // Seed with roots in node order so the sweep is deterministic
    let mut queue: std::collections::VecDeque<NodeId> = graph
        .nodes
        .iter()
        .filter(|n| in_degree[&n.id] == 0)
        .map(|n| n.id)
        .collect();
    for &id in &queue {
        layer_of.insert(id, 0);
    }

    while let Some(id) = queue.pop_front() {
        let layer = layer_of[&id];
        for &succ in &successors[&id] {
            let entry = layer_of.entry(succ).or_insert(0);
            *entry = (*entry).max(layer + 1);
            let deg = in_degree.get_mut(&succ).expect("unknown edge target");
            *deg -= 1;
            if *deg == 0 {
                queue.push_back(succ);
            }
        }
    }

    // Group by layer, preserving node order within each layer
    let max_layer = layer_of.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<NodeId>> = vec![Vec::new(); max_layer + 1];
    for node in &graph.nodes {
        let layer = layer_of.get(&node.id).copied().unwrap_or(0);
        layers[layer].push(node.id);
    }

    debug!("layering: {} nodes over {} layers", graph.nodes.len(), layers.len());
    layers
}

/// Median-based crossing reduction with alternating sweep directions
fn reduce_crossings(graph: &FlowGraph, layers: &mut Vec<Vec<NodeId>>) {
    let mut successors: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    let mut predecessors: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    for node in &graph.nodes {
        successors.insert(node.id, Vec::new());
        predecessors.insert(node.id, Vec::new());
    }
    for edge in &graph.edges {
        if edge.back_edge {
            continue;
        }
        if let Some(succ) = successors.get_mut(&edge.source) {
            succ.push(edge.target);
        }
        if let Some(pred) = predecessors.get_mut(&edge.target) {
            pred.push(edge.source);
        }
    }

    let mut position: FxHashMap<NodeId, usize> = FxHashMap::default();
    for layer in layers.iter() {
        for (pos, &id) in layer.iter().enumerate() {
            position.insert(id, pos);
        }
    }

    for sweep in 0..MAX_SWEEPS {
        let mut changed = false;

        for i in 1..layers.len() {
            changed |= reorder_layer(&mut layers[i], &successors, &mut position);
        }
        for i in (0..layers.len().saturating_sub(1)).rev() {
            changed |= reorder_layer(&mut layers[i], &predecessors, &mut position);
        }

        if !changed {
            debug!("crossing reduction settled after {} sweeps", sweep + 1);
            break;
        }
    }
}

/// Reorder one layer by the median position of each node's neighbors.
/// Returns true when the order changed.
fn reorder_layer(
    layer: &mut Vec<NodeId>,
    neighbors: &FxHashMap<NodeId, Vec<NodeId>>,
    position: &mut FxHashMap<NodeId, usize>,
) -> bool {
    let mut keys: FxHashMap<NodeId, usize> = FxHashMap::default();
    for &id in layer.iter() {
        let mut adjacent: Vec<usize> = neighbors[&id]
            .iter()
            .filter_map(|n| position.get(n).copied())
            .collect();
        if adjacent.is_empty() {
            keys.insert(id, position.get(&id).copied().unwrap_or(0));
        } else {
            adjacent.sort_unstable();
            keys.insert(id, adjacent[adjacent.len() / 2]);
        }
    }

    let mut sorted = layer.clone();
    // Stable sort: ties keep their current relative order
    sorted.sort_by_key(|id| keys[id]);

    let changed = sorted != *layer;
    *layer = sorted;
    for (pos, &id) in layer.iter().enumerate() {
        position.insert(id, pos);
    }
    changed
}

/// Even horizontal spacing within each layer, centered, fixed layer height
fn assign_coordinates(layers: &[Vec<NodeId>]) -> Vec<NodePosition> {
    let mut positions = Vec::new();

    for (layer_index, layer) in layers.iter().enumerate() {
        let y = layer_index as f64 * VERTICAL_SPACING;
        let layer_width = layer.len() as f64 * (NODE_WIDTH + HORIZONTAL_SPACING);
        let start_x = -layer_width / 2.0;

        for (pos, &id) in layer.iter().enumerate() {
            let x = start_x + pos as f64 * (NODE_WIDTH + HORIZONTAL_SPACING);
            positions.push(NodePosition { id, x, y });
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build_graph;
    use crate::parser::Parser;

    fn graph_for(source: &str) -> FlowGraph {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        build_graph(&program)
    }

    fn layer_map(graph: &FlowGraph) -> FxHashMap<NodeId, usize> {
        let mut map = FxHashMap::default();
        for (layer, ids) in assign_layers(graph).into_iter().enumerate() {
            for id in ids {
                map.insert(id, layer);
            }
        }
        map
    }

    #[test]
    fn test_forward_edges_point_strictly_down() {
        let graph = graph_for(
            "int main() { int x = 0; while (x < 5) { if (x > 2) { x = x + 2; } else { x = x + 1; } } cout << x; }",
        );
        let layers = layer_map(&graph);

        for edge in &graph.edges {
            if edge.back_edge {
                continue;
            }
            assert!(
                layers[&edge.target] > layers[&edge.source],
                "edge {} -> {} does not descend (layers {} -> {})",
                edge.source,
                edge.target,
                layers[&edge.source],
                layers[&edge.target]
            );
        }
    }

    #[test]
    fn test_longest_path_layering() {
        // Start(0) → a(1) → b(2); Start → b would still put b on layer 2
        let mut graph = FlowGraph::new();
        let start = graph.add_node("s", crate::graph::NodeKind::Terminal, None, None);
        let a = graph.add_node("a", crate::graph::NodeKind::Action, None, None);
        let b = graph.add_node("b", crate::graph::NodeKind::Action, None, None);
        graph.add_edge(start, a);
        graph.add_edge(start, b);
        graph.add_edge(a, b);

        let layers = layer_map(&graph);
        assert_eq!(layers[&start], 0);
        assert_eq!(layers[&a], 1);
        assert_eq!(layers[&b], 2);
    }

    #[test]
    fn test_layers_are_vertically_spaced_and_centered() {
        let graph = graph_for("int main() { int x = 1; cout << x; }");
        let positions = layout(&graph);

        // Start, decl, cout, End stack on consecutive layers
        assert_eq!(positions.len(), 4);
        for (i, pos) in positions.iter().enumerate() {
            assert_eq!(pos.y, i as f64 * VERTICAL_SPACING);
        }

        // A single-node layer is centered at the same x as every other
        let first_x = positions[0].x;
        assert!(positions.iter().all(|p| p.x == first_x));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let source = "int main() { int x = 1; if (x) { x = 2; } else { x = 3; } switch (x) { case 2: x = 4; break; default: x = 5; } cout << x; }";
        let a = layout(&graph_for(source));
        let b = layout(&graph_for(source));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_node_gets_a_position() {
        let graph = graph_for(
            "int main() { int x = 0; for (int i = 0; i < 3; i++) { x = x + i; } cout << x; }",
        );
        let positions = layout(&graph);
        assert_eq!(positions.len(), graph.nodes.len());

        let mut ids: Vec<_> = positions.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), graph.nodes.len());
    }

    #[test]
    fn test_empty_graph() {
        let graph = FlowGraph::new();
        assert!(layout(&graph).is_empty());
    }

    #[test]
    fn test_crossing_reduction_terminates_on_wide_graph() {
        // A switch with many arms exercises the sweep loop
        let graph = graph_for(
            "int main() { int x = 1; switch (x) { case 1: x = 1; break; case 2: x = 2; break; case 3: x = 3; break; case 4: x = 4; break; default: x = 0; } cout << x; }",
        );
        let positions = layout(&graph);
        assert_eq!(positions.len(), graph.nodes.len());
    }
}
