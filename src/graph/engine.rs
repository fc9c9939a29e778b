//! The chart graph: canonical node and edge collections.
//!
//! Nodes and edges are kept as ordered vectors (the shape the canvas and the
//! JSON export consume) with an id index for lookups. Statistics are derived
//! from a petgraph view built on demand.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::layout::{compute_positions, LayoutSettings};
use super::types::*;
use crate::error::{ChartError, Result};

/// The node/edge pair owned by a single session.
#[derive(Debug, Clone, Default)]
pub struct ChartGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Index: node id -> position in `nodes`.
    node_index: HashMap<String, usize>,
}

impl PartialEq for ChartGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl ChartGraph {
    /// Create a new empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the view-mode chart for an ordered organization list.
    ///
    /// One node per placeable organization (id = organization id) and one
    /// `{parentId}-{id}` edge per organization that names a parent on the
    /// chart. Anything that cannot be placed is skipped with a warning.
    pub fn transform(organizations: &[Organization], settings: &LayoutSettings) -> Self {
        let positions = compute_positions(organizations, settings);
        let mut graph = ChartGraph::new();

        for org in organizations {
            let Some(&position) = positions.get(&org.id) else {
                let err = ChartError::Unplaceable {
                    id: org.id.clone(),
                    level: org.hierarchy_level,
                };
                warn!(error = %err, "skipping organization");
                continue;
            };
            if graph.contains(&org.id) {
                let err = ChartError::DuplicateNodeId(org.id.clone());
                warn!(error = %err, "skipping organization");
                continue;
            }
            graph.add_node(Node::for_organization(org.id.clone(), org, position));
        }

        for org in organizations {
            let Some(parent_id) = org.parent_id.as_deref() else {
                continue;
            };
            if !graph.contains(&org.id) {
                continue;
            }
            if !graph.contains(parent_id) {
                let err = ChartError::MissingParent {
                    parent: parent_id.to_string(),
                    child: org.id.clone(),
                };
                warn!(error = %err, "skipping reporting line");
                continue;
            }
            let edge_id = format!("{}-{}", parent_id, org.id);
            // Mutual parent links collapse into a single edge.
            if let Err(e) = graph.add_edge(Edge::directed(edge_id, parent_id, &org.id)) {
                warn!(error = %e, "skipping reporting line");
            }
        }

        info!(
            organizations = organizations.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "chart transformed"
        );
        graph
    }

    /// Replace the whole chart. This is the only way nodes and edges go away.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.reindex();
    }

    /// Build a chart from raw parts, enforcing the graph invariants.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ChartError::InvalidGraph(format!(
                    "node id '{}' appears more than once",
                    node.id
                )));
            }
        }
        for edge in &edges {
            for end in [&edge.source, &edge.target] {
                if !seen.contains(end.as_str()) {
                    return Err(ChartError::InvalidGraph(format!(
                        "edge '{}' references missing node '{}'",
                        edge.id, end
                    )));
                }
            }
        }
        let mut graph = ChartGraph::new();
        graph.replace(nodes, edges);
        Ok(graph)
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Append a node. The caller is responsible for id uniqueness.
    pub fn add_node(&mut self, node: Node) {
        debug!(node = %node.id, position = %node.position, "adding node");
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Replace the position of `node_id`. Returns false if there is no such node.
    pub fn update_position(&mut self, node_id: &str, position: Position) -> bool {
        match self.node_index.get(node_id) {
            Some(&i) => {
                self.nodes[i].position = position;
                true
            }
            None => false,
        }
    }

    /// Bulk position overwrite. Returns the ids of nodes absent from `positions`,
    /// in node order.
    pub fn set_positions(&mut self, positions: &HashMap<String, Position>) -> Vec<String> {
        let mut unmatched = Vec::new();
        for node in &mut self.nodes {
            match positions.get(&node.id) {
                Some(&p) => node.position = p,
                None => unmatched.push(node.id.clone()),
            }
        }
        unmatched
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Check a connection candidate against the graph invariants.
    pub fn validate_connection(&self, candidate: &Connection) -> Result<()> {
        for end in [&candidate.source, &candidate.target] {
            if !self.contains(end) {
                return Err(ChartError::UnknownNode(end.clone()));
            }
        }
        if candidate.source == candidate.target {
            return Err(ChartError::SelfConnection(candidate.source.clone()));
        }
        if self.has_connection(candidate) {
            return Err(ChartError::DuplicateConnection {
                source_id: candidate.source.clone(),
                target_id: candidate.target.clone(),
            });
        }
        Ok(())
    }

    /// Append an edge after validation; a rejected edge leaves the chart as it was.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.validate_connection(&edge.connection())?;
        debug!(edge = %edge.id, source = %edge.source, target = %edge.target, "adding edge");
        self.edges.push(edge);
        Ok(())
    }

    /// True when an equivalent connection (either direction) already exists.
    pub fn has_connection(&self, candidate: &Connection) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.connection().duplicates(candidate))
    }

    // ─── Query Operations ───────────────────────────────────────

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─── Stats ──────────────────────────────────────────────────

    /// Get chart statistics.
    pub fn stats(&self) -> GraphStats {
        let (graph, indexes) = self.to_petgraph();

        let mut levels: BTreeMap<u32, usize> = BTreeMap::new();
        for node in &self.nodes {
            *levels.entry(node.data.hierarchy_level).or_default() += 1;
        }

        let roots: Vec<NodeIndex> = indexes
            .iter()
            .copied()
            .filter(|&idx| {
                graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();

        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            nodes_per_level: levels,
            root_count: roots.len(),
            max_depth: max_depth(&graph, &roots),
            has_cycle: is_cyclic_directed(&graph),
        }
    }

    /// Directed petgraph view (node weight = node id).
    fn to_petgraph(&self) -> (DiGraph<&str, ()>, Vec<NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indexes: Vec<NodeIndex> = self
            .nodes
            .iter()
            .map(|n| graph.add_node(n.id.as_str()))
            .collect();
        for edge in &self.edges {
            if let (Some(&s), Some(&t)) = (
                self.node_index.get(&edge.source),
                self.node_index.get(&edge.target),
            ) {
                graph.add_edge(indexes[s], indexes[t], ());
            }
        }
        (graph, indexes)
    }

    fn reindex(&mut self) {
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }
}

/// Longest BFS distance (in edges) from any root.
fn max_depth(graph: &DiGraph<&str, ()>, roots: &[NodeIndex]) -> usize {
    let mut deepest = 0;
    for &root in roots {
        let mut depth: HashMap<NodeIndex, usize> = HashMap::from([(root, 0)]);
        let mut bfs = Bfs::new(graph, root);
        while let Some(idx) = bfs.next(graph) {
            let d = depth.get(&idx).copied().unwrap_or(0);
            deepest = deepest.max(d);
            for child in graph.neighbors_directed(idx, Direction::Outgoing) {
                depth.entry(child).or_insert(d + 1);
            }
        }
    }
    deepest
}

/// Statistics about the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_per_level: BTreeMap<u32, usize>,
    /// Nodes with no incoming edge.
    pub root_count: usize,
    /// Longest chain of reporting lines from a root, in edges.
    pub max_depth: usize,
    pub has_cycle: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Organization> {
        vec![
            Organization::new("A", "Acme", "company", 1),
            Organization::new("B", "Finance", "department", 2).with_parent("A"),
            Organization::new("C", "Security", "department", 2).with_parent("A"),
        ]
    }

    fn node(id: &str, level: u32) -> Node {
        Node::for_organization(
            id.to_string(),
            &Organization::new(id, id, "unit", level),
            Position::default(),
        )
    }

    #[test]
    fn test_empty_graph() {
        let graph = ChartGraph::new();
        assert!(graph.is_empty());
        let stats = graph.stats();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.max_depth, 0);
        assert!(!stats.has_cycle);
    }

    #[test]
    fn test_transform_example() {
        let graph = ChartGraph::transform(&sample(), &LayoutSettings::default());

        assert_eq!(graph.nodes().len(), 3);
        let pairs: Vec<(&str, &str)> = graph
            .edges()
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C")]);
        assert_eq!(graph.edges()[0].id, "A-B");

        let a = graph.node("A").unwrap().position;
        let b = graph.node("B").unwrap().position;
        let c = graph.node("C").unwrap().position;
        assert_eq!(b.y, c.y);
        assert_eq!(b.x - a.x, a.x - c.x);
        assert_eq!(graph.node("B").unwrap().data.label, "Finance");
    }

    #[test]
    fn test_transform_one_edge_per_parented_org() {
        let orgs: Vec<Organization> = (0..10)
            .map(|i| {
                let org = Organization::new(&format!("o{}", i), "x", "unit", 1 + i / 3);
                if i >= 3 {
                    org.with_parent(&format!("o{}", i / 3 - 1))
                } else {
                    org
                }
            })
            .collect();
        let graph = ChartGraph::transform(&orgs, &LayoutSettings::default());
        assert_eq!(graph.nodes().len(), orgs.len());
        let parented: Vec<_> = orgs.iter().filter(|o| o.parent_id.is_some()).collect();
        assert_eq!(graph.edges().len(), parented.len());
        for org in parented {
            let edge = graph.edges().iter().find(|e| e.target == org.id).unwrap();
            assert_eq!(Some(&edge.source), org.parent_id.as_ref());
        }
    }

    #[test]
    fn test_transform_skips_unplaceable_and_its_edges() {
        let mut orgs = sample();
        orgs.push(Organization::new("D", "Ghost", "team", 0).with_parent("A"));
        orgs.push(Organization::new("E", "Child of ghost", "team", 3).with_parent("D"));

        let graph = ChartGraph::transform(&orgs, &LayoutSettings::default());

        assert!(graph.node("D").is_none());
        assert!(graph.node("E").is_some());
        assert!(graph
            .edges()
            .iter()
            .all(|e| e.source != "D" && e.target != "D"));
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_transform_skips_repeated_ids() {
        let mut orgs = sample();
        orgs.push(Organization::new("B", "Finance again", "department", 2));
        let graph = ChartGraph::transform(&orgs, &LayoutSettings::default());
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.node("B").unwrap().data.label, "Finance");
    }

    #[test]
    fn test_update_position() {
        let mut graph = ChartGraph::transform(&sample(), &LayoutSettings::default());
        let before = graph.node("B").unwrap().clone();

        assert!(graph.update_position("B", Position::new(40.0, 60.0)));
        let after = graph.node("B").unwrap();
        assert_eq!(after.position, Position::new(40.0, 60.0));
        assert_eq!(after.data, before.data);

        let snapshot = graph.clone();
        assert!(!graph.update_position("missing", Position::new(1.0, 1.0)));
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_add_edge_rejects_duplicates_both_directions() {
        let mut graph = ChartGraph::new();
        graph.add_node(node("a", 1));
        graph.add_node(node("b", 2));

        let mut first = Edge::directed("e1".to_string(), "a", "b");
        first.source_handle = Some("out".to_string());
        first.target_handle = Some("in".to_string());
        graph.add_edge(first).unwrap();

        let mut reverse = Edge::directed("e2".to_string(), "b", "a");
        reverse.source_handle = Some("in".to_string());
        reverse.target_handle = Some("out".to_string());
        let err = graph.add_edge(reverse).unwrap_err();
        assert!(matches!(err, ChartError::DuplicateConnection { .. }));
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].id, "e1");
    }

    #[test]
    fn test_add_edge_rejects_unknown_and_self() {
        let mut graph = ChartGraph::new();
        graph.add_node(node("a", 1));

        let err = graph
            .add_edge(Edge::directed("x".to_string(), "a", "nope"))
            .unwrap_err();
        assert!(matches!(err, ChartError::UnknownNode(id) if id == "nope"));

        let err = graph
            .add_edge(Edge::directed("y".to_string(), "a", "a"))
            .unwrap_err();
        assert!(matches!(err, ChartError::SelfConnection(_)));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_from_parts_validates() {
        let err = ChartGraph::from_parts(
            vec![node("a", 1)],
            vec![Edge::directed("a-b".to_string(), "a", "b")],
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::InvalidGraph(_)));

        let err = ChartGraph::from_parts(vec![node("a", 1), node("a", 2)], vec![]).unwrap_err();
        assert!(matches!(err, ChartError::InvalidGraph(_)));

        let graph = ChartGraph::from_parts(vec![node("a", 1), node("b", 2)], vec![]).unwrap();
        assert!(graph.contains("b"));
    }

    #[test]
    fn test_replace_resets_index() {
        let mut graph = ChartGraph::transform(&sample(), &LayoutSettings::default());
        graph.replace(vec![node("z", 1)], vec![]);
        assert!(graph.node("A").is_none());
        assert!(graph.node("z").is_some());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut orgs = sample();
        orgs.push(Organization::new("D", "SOC", "team", 3).with_parent("C"));
        orgs.push(Organization::new("X", "Supplier", "supplier", 1));
        let graph = ChartGraph::transform(&orgs, &LayoutSettings::default());

        let stats = graph.stats();
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.root_count, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.nodes_per_level.get(&2), Some(&2));
        assert!(!stats.has_cycle);
    }

    #[test]
    fn test_stats_detects_cycle() {
        let mut graph = ChartGraph::new();
        graph.add_node(node("a", 1));
        graph.add_node(node("b", 2));
        graph.add_node(node("c", 3));
        graph.add_edge(Edge::directed("1".to_string(), "a", "b")).unwrap();
        graph.add_edge(Edge::directed("2".to_string(), "b", "c")).unwrap();
        graph.add_edge(Edge::directed("3".to_string(), "c", "a")).unwrap();
        let stats = graph.stats();
        assert!(stats.has_cycle);
        assert_eq!(stats.root_count, 0);
    }
}
