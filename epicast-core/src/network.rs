//! Contact-network abstraction consumed by the cascade engine.

use crate::error::NetworkError;

/// Abstraction over an immutable contact graph with per-node adjacency.
///
/// Implementations are loaded once before any trial runs and shared read-only
/// across all concurrent trials, so no interior synchronization is required.
///
/// # Examples
/// ```
/// use epicast_core::{ContactNetwork, NetworkError};
///
/// struct Pair;
///
/// impl ContactNetwork for Pair {
///     fn node_count(&self) -> usize { 2 }
///     fn edge_count(&self) -> usize { 1 }
///     fn name(&self) -> &str { "pair" }
///     fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError> {
///         match node {
///             0 => Ok(&[1]),
///             1 => Ok(&[]),
///             _ => Err(NetworkError::OutOfBounds { node }),
///         }
///     }
/// }
///
/// let network = Pair;
/// assert_eq!(network.degree(0)?, 1);
/// assert_eq!(network.degree(1)?, 0);
/// # Ok::<(), NetworkError>(())
/// ```
pub trait ContactNetwork {
    /// Returns the number of nodes in the network.
    fn node_count(&self) -> usize;

    /// Returns the number of arcs in the network.
    fn edge_count(&self) -> usize;

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the neighbour list of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::OutOfBounds`] when `node` is not in
    /// `[0, node_count)`.
    fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError>;

    /// Returns the out-degree of `node`.
    ///
    /// The default implementation measures the neighbour list.
    ///
    /// # Errors
    /// Returns any [`NetworkError`] surfaced by [`Self::neighbours`].
    fn degree(&self, node: usize) -> Result<usize, NetworkError> {
        self.neighbours(node).map(<[usize]>::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line;

    impl ContactNetwork for Line {
        fn node_count(&self) -> usize {
            3
        }
        fn edge_count(&self) -> usize {
            2
        }
        fn name(&self) -> &str {
            "line"
        }
        fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError> {
            match node {
                0 => Ok(&[1]),
                1 => Ok(&[2]),
                2 => Ok(&[]),
                _ => Err(NetworkError::OutOfBounds { node }),
            }
        }
    }

    #[test]
    fn degree_measures_neighbour_list() {
        let network = Line;
        assert_eq!(network.degree(0).expect("in bounds"), 1);
        assert_eq!(network.degree(2).expect("in bounds"), 0);
    }

    #[test]
    fn degree_propagates_out_of_bounds() {
        let err = Line.degree(9).expect_err("node 9 does not exist");
        assert!(matches!(err, NetworkError::OutOfBounds { node: 9 }));
    }
}
