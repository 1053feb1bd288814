//! Tiny deterministic contact networks for tests.

use epicast_core::{ContactNetwork, NetworkError};

/// Adjacency-list network fixture with a handful of canned topologies.
#[derive(Debug, Clone)]
pub struct FixtureNetwork {
    name: String,
    adjacency: Vec<Vec<usize>>,
    edges: usize,
}

impl FixtureNetwork {
    /// Builds a fixture from explicit adjacency lists.
    #[must_use]
    pub fn from_adjacency(name: impl Into<String>, adjacency: Vec<Vec<usize>>) -> Self {
        let edges = adjacency.iter().map(Vec::len).sum();
        Self {
            name: name.into(),
            adjacency,
            edges,
        }
    }

    /// Undirected ring 0-1-…-(n-1)-0; every node has two neighbours.
    #[must_use]
    pub fn ring(nodes: usize) -> Self {
        assert!(nodes >= 3, "a ring needs at least 3 nodes");
        let adjacency = (0..nodes)
            .map(|node| vec![(node + nodes - 1) % nodes, (node + 1) % nodes])
            .collect();
        Self::from_adjacency("ring", adjacency)
    }

    /// Undirected star: node 0 linked with each of `leaves` leaf nodes.
    #[must_use]
    pub fn star(leaves: usize) -> Self {
        let mut adjacency = vec![(1..=leaves).collect::<Vec<_>>()];
        adjacency.extend((1..=leaves).map(|_| vec![0]));
        Self::from_adjacency("star", adjacency)
    }

    /// Undirected path 0-1-…-(n-1).
    #[must_use]
    pub fn path(nodes: usize) -> Self {
        assert!(nodes >= 2, "a path needs at least 2 nodes");
        let adjacency = (0..nodes)
            .map(|node| {
                let mut neighbours = Vec::new();
                if node > 0 {
                    neighbours.push(node - 1);
                }
                if node + 1 < nodes {
                    neighbours.push(node + 1);
                }
                neighbours
            })
            .collect();
        Self::from_adjacency("path", adjacency)
    }

    /// A single node with no edges.
    #[must_use]
    pub fn isolated() -> Self {
        Self::from_adjacency("isolated", vec![Vec::new()])
    }
}

impl ContactNetwork for FixtureNetwork {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn edge_count(&self) -> usize {
        self.edges
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError> {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .ok_or(NetworkError::OutOfBounds { node })
    }
}
