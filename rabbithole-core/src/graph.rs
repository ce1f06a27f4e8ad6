use crate::result::SearchResult;
use petgraph::Undirected;
use petgraph::graph::{Graph, NodeIndex as PetNodeIndex};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Canvas size of the center node.
pub const CENTER_NODE_SIZE: f64 = 20.0;
/// Canvas size of each satellite node.
pub const SATELLITE_NODE_SIZE: f64 = 15.0;
/// Radius of the circle satellites are placed on.
pub const SATELLITE_RADIUS: f64 = 2.0;

const CENTER_LABEL_MAX: usize = 30;
const SATELLITE_LABEL_MAX: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Center,
    Satellite,
}

/// Layout attributes for a rendered node.
#[derive(Debug, Clone)]
pub struct NodeAttrs {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub role: NodeRole,
}

/// Layout attributes for a rendered edge.
#[derive(Debug, Clone)]
pub struct EdgeAttrs {
    /// Line width derived from the similarity score: floor of 1, scaled 2x.
    pub width: f64,
}

/// The node/edge visualization of a selected result and its similar results.
///
/// On every change of (selected result, similarity set) the whole graph is
/// cleared and rebuilt from scratch; there is no incremental diffing.
#[derive(Debug, Default)]
pub struct GraphView {
    graph: Graph<NodeAttrs, EdgeAttrs, Undirected>,
}

impl GraphView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the graph: the selected result at the origin, each similar
    /// result on a circle of fixed radius, angularly spaced by index.
    ///
    /// Satellites duplicating an already-placed id (including the center's)
    /// are skipped, as are duplicate edges.
    pub fn rebuild(&mut self, selected: &SearchResult, similar: &[SearchResult]) {
        self.graph.clear();

        let mut placed: HashMap<String, PetNodeIndex> = HashMap::new();

        let center = self.graph.add_node(NodeAttrs {
            id: selected.id.clone(),
            label: truncate_label(&selected.title, CENTER_LABEL_MAX),
            x: 0.0,
            y: 0.0,
            size: CENTER_NODE_SIZE,
            role: NodeRole::Center,
        });
        placed.insert(selected.id.clone(), center);

        for (index, result) in similar.iter().enumerate() {
            if placed.contains_key(&result.id) {
                continue;
            }

            let angle = (index as f64 * 2.0 * PI) / similar.len() as f64;
            let node = self.graph.add_node(NodeAttrs {
                id: result.id.clone(),
                label: truncate_label(&result.title, SATELLITE_LABEL_MAX),
                x: angle.cos() * SATELLITE_RADIUS,
                y: angle.sin() * SATELLITE_RADIUS,
                size: SATELLITE_NODE_SIZE,
                role: NodeRole::Satellite,
            });
            placed.insert(result.id.clone(), node);

            if self.graph.find_edge(center, node).is_none() {
                self.graph.add_edge(
                    center,
                    node,
                    EdgeAttrs {
                        width: edge_width(result.score),
                    },
                );
            }
        }
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeAttrs> {
        self.graph.node_weights()
    }

    pub fn center(&self) -> Option<&NodeAttrs> {
        self.graph
            .node_weights()
            .find(|n| n.role == NodeRole::Center)
    }

    /// Iterate edges as (source node, target node, edge attributes).
    pub fn edges(&self) -> impl Iterator<Item = (&NodeAttrs, &NodeAttrs, &EdgeAttrs)> {
        self.graph.edge_indices().filter_map(|edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            Some((&self.graph[a], &self.graph[b], &self.graph[edge]))
        })
    }

    /// Resolve a position to the nearest node id within `tolerance`.
    ///
    /// This is the one event the view exposes: a click on a node, forwarded
    /// to the host by identifier.
    pub fn hit_test(&self, x: f64, y: f64, tolerance: f64) -> Option<&str> {
        let mut best: Option<(&NodeAttrs, f64)> = None;
        for node in self.graph.node_weights() {
            let dist = ((node.x - x).powi(2) + (node.y - y).powi(2)).sqrt();
            if dist <= tolerance
                && best.map(|(_, d)| dist < d).unwrap_or(true)
            {
                best = Some((node, dist));
            }
        }
        best.map(|(node, _)| node.id.as_str())
    }
}

fn truncate_label(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let truncated: String = title.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}

/// Edge thickness is a monotonic function of the similarity score.
fn edge_width(score: f64) -> f64 {
    (score * 2.0).max(1.0)
}
