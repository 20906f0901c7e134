use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Graph of which provinces share a boundary.
///
/// Untraversable provinces are left out entirely: they are never keys and
/// never appear in another province's neighbor set. Ordered maps keep
/// iteration deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    adjacencies: BTreeMap<String, BTreeSet<String>>,
}

impl AdjacencyGraph {
    /// Create a new empty adjacency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a province together with its resolved neighbor set.
    pub(crate) fn insert_neighbors(&mut self, id: &str, neighbors: BTreeSet<String>) {
        self.adjacencies.insert(id.to_string(), neighbors);
    }

    /// All neighbors of a province, empty for ids the graph does not track.
    pub fn neighbors(&self, id: &str) -> BTreeSet<String> {
        self.adjacencies.get(id).cloned().unwrap_or_default()
    }

    /// Check if two provinces share a boundary.
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.adjacencies.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacencies.contains_key(id)
    }

    /// Total number of provinces in the graph.
    pub fn province_count(&self) -> usize {
        self.adjacencies.len()
    }

    /// Whether any neighbor set anywhere references this id.
    pub fn is_referenced(&self, id: &str) -> bool {
        self.adjacencies.values().any(|set| set.contains(id))
    }
}
