//! Architecture graph
//!
//! Pure Rust implementation using petgraph. The graph is read-only input
//! owned by the caller: components (nodes) and directed data-flow
//! relationships (edges), as produced by an upstream architecture analysis
//! step. It may be empty — every consumer degrades to neutral behavior.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// A named architectural element.
///
/// `component_type` is an open string, not an enum — sources invent new
/// types and unknown ones simply weight as 1.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub description: String,
}

/// A directed edge between two component names.
///
/// Multiple relationships between the same pair are permitted — they are
/// distinct data flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data_flow: String,
}

/// Components and their directed relationships for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchitectureGraph {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ArchitectureGraph {
    pub fn new(components: Vec<Component>, relationships: Vec<Relationship>) -> Self {
        Self {
            components,
            relationships,
        }
    }

    /// An absent graph and an empty graph are the same valid input.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.relationships.is_empty()
    }

    /// Look up a component by exact name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Adjacency index over an [`ArchitectureGraph`].
///
/// Built once per scoring pass. Nodes exist for every declared component
/// plus any relationship endpoint the components list forgot to declare;
/// parallel edges are kept (petgraph multigraph) but neighbor counts are
/// over distinct components.
pub struct GraphIndex<'a> {
    graph: DiGraph<&'a str, &'a str>,
    nodes: FxHashMap<&'a str, NodeIndex>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(arch: &'a ArchitectureGraph) -> Self {
        let mut index = Self {
            graph: DiGraph::new(),
            nodes: FxHashMap::default(),
        };
        for component in &arch.components {
            index.intern(component.name.as_str());
        }
        for rel in &arch.relationships {
            let source = index.intern(rel.source.as_str());
            let target = index.intern(rel.target.as_str());
            index.graph.add_edge(source, target, rel.data_flow.as_str());
        }
        index
    }

    fn intern(&mut self, name: &'a str) -> NodeIndex {
        match self.nodes.get(name) {
            Some(&node) => node,
            None => {
                let node = self.graph.add_node(name);
                self.nodes.insert(name, node);
                node
            }
        }
    }

    /// Count of distinct components directly connected to `name`, in either
    /// direction. Self-loops and parallel edges count once; unknown names
    /// count zero.
    pub fn connection_count(&self, name: &str) -> usize {
        let Some(&node) = self.nodes.get(name) else {
            return 0;
        };
        let neighbors: FxHashSet<NodeIndex> = self
            .graph
            .neighbors_undirected(node)
            .filter(|&n| n != node)
            .collect();
        neighbors.len()
    }
}
