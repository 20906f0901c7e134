use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// A trait for graphs that can be searched.
///
/// `Node`: The type of node identifiers (e.g., a province id).
pub trait Graph<Node> {
    /// Return the neighbors of a node, in the order they should be expanded.
    ///
    /// Breadth-first search visits neighbors in exactly this order, so the
    /// implementor's ordering is what makes repeated searches reproducible.
    fn neighbors(&self, node: &Node) -> Vec<Node>;
}

/// A generic breadth-first pathfinder for unweighted graphs.
pub struct Bfs;

impl Bfs {
    /// Find a path from `start` to `goal`, inclusive of both endpoints.
    ///
    /// Returns `None` when the two nodes are not connected. The search ends
    /// as soon as `goal` turns up among a dequeued node's neighbors; with a
    /// fixed neighbor order the same query always yields the same path.
    pub fn find_path<Node, G>(graph: &G, start: Node, goal: Node) -> Option<Vec<Node>>
    where
        Node: Clone + Eq + Hash,
        G: Graph<Node>,
    {
        if start == goal {
            return Some(vec![start]);
        }

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut came_from: HashMap<Node, Node> = HashMap::new();

        visited.insert(start.clone());
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in graph.neighbors(&current) {
                if visited.contains(&neighbor) {
                    continue;
                }
                came_from.insert(neighbor.clone(), current.clone());

                if neighbor == goal {
                    // Reconstruct path
                    let mut path = vec![neighbor.clone()];
                    let mut curr = neighbor;
                    while let Some(prev) = came_from.get(&curr) {
                        path.push(prev.clone());
                        curr = prev.clone();
                    }
                    path.reverse();
                    return Some(path);
                }

                visited.insert(neighbor.clone());
                queue.push_back(neighbor);
            }
        }

        None
    }
}
