//! Per-game knowledge graph.
//!
//! A directed multigraph keyed by entity name. Nodes keep the order in which
//! they first appeared in the source file, and each node's successors keep
//! the order in which the first edge to them was added. Both orders feed
//! directly into background text, so they are part of the contract.

pub mod graphml;
mod traversal;

pub use traversal::TraversedEdge;

use std::collections::HashMap;

use crate::error::{KgError, Result};

/// Attributes attached to a graph node.
///
/// Nodes that only appear as edge endpoints carry no attributes at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Category, e.g. "character" or "location".
    pub kind: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl NodeAttributes {
    /// Attributes with both fields set.
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            description: Some(description.into()),
        }
    }
}

/// Outgoing adjacency entry: one distinct successor and every edge label
/// pointing at it, in insertion order.
#[derive(Debug, Clone)]
struct Adjacent {
    target: usize,
    labels: Vec<String>,
}

/// A game's entity-relation graph.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    attributes: Vec<NodeAttributes>,
    successors: Vec<Vec<Adjacent>>,
    edge_count: usize,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or fill in attributes of an existing one.
    ///
    /// Attributes already present are overwritten only by `Some` values.
    pub fn add_node(&mut self, name: &str, attributes: NodeAttributes) {
        let idx = self.ensure_node(name);
        let slot = &mut self.attributes[idx];
        if attributes.kind.is_some() {
            slot.kind = attributes.kind;
        }
        if attributes.description.is_some() {
            slot.description = attributes.description;
        }
    }

    /// Add a labelled edge, creating attribute-less endpoints as needed.
    pub fn add_edge(&mut self, source: &str, target: &str, label: impl Into<String>) {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);
        let label = label.into();
        let adjacency = &mut self.successors[from];
        match adjacency.iter_mut().find(|adj| adj.target == to) {
            Some(adj) => adj.labels.push(label),
            None => adjacency.push(Adjacent {
                target: to,
                labels: vec![label],
            }),
        }
        self.edge_count += 1;
    }

    fn ensure_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.attributes.push(NodeAttributes::default());
        self.successors.push(Vec::new());
        idx
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the graph has a node with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node names in stored order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Attributes of a node, if the node exists.
    #[must_use]
    pub fn attributes(&self, name: &str) -> Option<&NodeAttributes> {
        self.index.get(name).map(|&idx| &self.attributes[idx])
    }

    /// The node's `type`, failing loudly when it is absent.
    ///
    /// # Errors
    /// Returns [`KgError::TraversalInconsistency`] if the node or its
    /// `type` attribute is missing.
    pub fn node_type(&self, name: &str) -> Result<&str> {
        self.attributes(name)
            .and_then(|a| a.kind.as_deref())
            .ok_or_else(|| KgError::TraversalInconsistency {
                node: name.to_string(),
                attribute: "type",
            })
    }

    /// The node's `description`, failing loudly when it is absent.
    ///
    /// # Errors
    /// Returns [`KgError::TraversalInconsistency`] if the node or its
    /// `description` attribute is missing.
    pub fn node_description(&self, name: &str) -> Result<&str> {
        self.attributes(name)
            .and_then(|a| a.description.as_deref())
            .ok_or_else(|| KgError::TraversalInconsistency {
                node: name.to_string(),
                attribute: "description",
            })
    }

    /// Distinct successors of a node in adjacency order.
    pub fn successors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.index
            .get(name)
            .map(|&idx| self.successors[idx].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|adj| self.names[adj.target].as_str())
    }

    /// Number of outgoing edges, counting parallel edges separately.
    #[must_use]
    pub fn out_degree(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map_or(0, |&idx| self.successors[idx].iter().map(|adj| adj.labels.len()).sum())
    }

    /// Label of the first edge from `source` to `target`.
    #[must_use]
    pub fn edge_label(&self, source: &str, target: &str) -> Option<&str> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        self.successors[from]
            .iter()
            .find(|adj| adj.target == to)
            .and_then(|adj| adj.labels.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> KnowledgeGraph {
        let mut g = KnowledgeGraph::new();
        g.add_node("Delilah", NodeAttributes::new("character", "the leader of the Brigmore Witches"));
        g.add_node("Brigmore Manor", NodeAttributes::new("location", "a lair for the city's outlaws"));
        g.add_edge("Delilah", "Brigmore Manor", "present in");
        g.add_edge("Delilah", "Brigmore Manor", "connected to");
        g.add_edge("Delilah", "Corvo", "connected to");
        g
    }

    #[test]
    fn nodes_keep_insertion_order() {
        let g = sample_graph();
        let names: Vec<&str> = g.nodes().collect();
        assert_eq!(names, vec!["Delilah", "Brigmore Manor", "Corvo"]);
    }

    #[test]
    fn parallel_edges_share_one_successor() {
        let g = sample_graph();
        let succ: Vec<&str> = g.successors("Delilah").collect();
        assert_eq!(succ, vec!["Brigmore Manor", "Corvo"]);
        assert_eq!(g.out_degree("Delilah"), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_label("Delilah", "Brigmore Manor"), Some("present in"));
    }

    #[test]
    fn edge_only_nodes_have_no_attributes() {
        let g = sample_graph();
        assert!(g.contains("Corvo"));
        assert!(matches!(
            g.node_type("Corvo"),
            Err(KgError::TraversalInconsistency { attribute: "type", .. })
        ));
        assert!(g.node_description("Corvo").is_err());
    }

    #[test]
    fn add_node_fills_missing_attributes() {
        let mut g = sample_graph();
        g.add_node("Corvo", NodeAttributes::new("character", "the Royal Protector"));
        assert_eq!(g.node_type("Corvo").expect("type"), "character");
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn unknown_node_has_no_successors() {
        let g = sample_graph();
        assert_eq!(g.successors("Dunwall").count(), 0);
        assert_eq!(g.out_degree("Dunwall"), 0);
    }
}
