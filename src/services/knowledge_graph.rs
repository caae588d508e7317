//! Condition / ingredient / product knowledge graph
//!
//! Explicit typed adjacency: every node id maps to its kind and its neighbor
//! list. Edges are undirected and neighbors keep the order in which edges were
//! declared, so traversals are deterministic.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::db::ProductStore;
use crate::models::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Condition,
    Ingredient,
    Product,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    neighbors: Vec<String>,
}

/// On-disk graph artifact
#[derive(Debug, Deserialize)]
struct GraphArtifact {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
}

/// Read-only knowledge graph, shared across requests
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: HashMap<String, Node>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, keeping the existing kind and neighbors if already present
    pub fn add_node(&mut self, id: impl Into<String>, kind: NodeKind) {
        self.nodes.entry(id.into()).or_insert(Node {
            kind,
            neighbors: Vec::new(),
        });
    }

    /// Adds an undirected edge between two declared nodes
    ///
    /// Repeated edges are ignored. Returns `false` if either endpoint is unknown.
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        if !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return false;
        }

        for (from, to) in [(a, b), (b, a)] {
            if let Some(node) = self.nodes.get_mut(from) {
                if !node.neighbors.iter().any(|n| n == to) {
                    node.neighbors.push(to.to_string());
                }
            }
        }
        true
    }

    /// Loads the JSON artifact:
    /// `{"nodes": [{"id": .., "type": ..}], "edges": [[a, b], ..]}`
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let artifact: GraphArtifact =
            serde_json::from_str(json).context("Failed to parse knowledge graph")?;

        let mut graph = Self::new();
        for record in artifact.nodes {
            graph.add_node(record.id, record.kind);
        }
        for (a, b) in &artifact.edges {
            if !graph.add_edge(a, b) {
                anyhow::bail!("Knowledge graph edge references unknown node: {} - {}", a, b);
            }
        }
        Ok(graph)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge graph: {}", path.display()))?;
        let graph = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            nodes = graph.node_count(),
            "Loaded knowledge graph"
        );
        Ok(graph)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    /// Neighbors of `id` in edge order; empty for unknown nodes
    pub fn neighbors(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ingredients linked to `condition`
    ///
    /// All neighbors are returned without a kind filter, each once, in edge
    /// order. Unknown conditions yield an empty list.
    pub fn ingredients_for(&self, condition: &str) -> Vec<String> {
        self.neighbors(condition).to_vec()
    }

    /// Candidate products for `condition`, two hops away through its ingredients
    ///
    /// Each product is resolved to its ingredient list through `store`; names
    /// missing from the store keep an empty list. A product linked through
    /// several ingredients appears once per ingredient.
    pub fn products_and_ingredients_for(
        &self,
        condition: &str,
        store: &ProductStore,
    ) -> Vec<Product> {
        let mut products = Vec::new();

        for ingredient in self.neighbors(condition) {
            for candidate in self.neighbors(ingredient) {
                if self.kind(candidate) != Some(NodeKind::Product) {
                    continue;
                }

                let ingredients = store
                    .ingredients(candidate)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default();
                products.push(Product::new(candidate.clone(), ingredients));
            }
        }

        tracing::debug!(
            condition = %condition,
            candidates = products.len(),
            "Collected graph candidates"
        );
        products
    }
}
