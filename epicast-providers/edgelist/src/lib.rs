//! Edge-list provider loading contact networks into CSR adjacency form.
//!
//! The text format is a header line `n m` (node count, arc count) followed by
//! `m` records `u v`, one per line. Records can be loaded as directed arcs or
//! expanded into both directions for undirected contact data.

use std::io::{self, BufRead};

use epicast_core::{ContactNetwork, NetworkError};
use thiserror::Error;

/// How arc records are interpreted when building adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Each record `u v` contributes the single arc `u -> v`.
    Directed,
    /// Each record `u v` contributes both `u -> v` and `v -> u`.
    Undirected,
}

/// Errors raised while loading an edge list.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// Reading the input failed.
    #[error("failed to read edge list: {source}")]
    Io {
        /// Underlying operating-system error.
        #[source]
        source: io::Error,
    },
    /// The input ended before the `n m` header line.
    #[error("edge list is missing its `n m` header line")]
    MissingHeader,
    /// The header line did not parse as two counts.
    #[error("malformed edge-list header `{line}`; expected `n m`")]
    MalformedHeader {
        /// Raw header line as read.
        line: String,
    },
    /// An arc record did not parse as two node ids.
    #[error("malformed arc record on line {line_number}: `{line}`")]
    MalformedArc {
        /// 1-based line number of the offending record.
        line_number: usize,
        /// Raw record line as read.
        line: String,
    },
    /// The input ended before the announced number of arc records.
    #[error("edge list announces {expected} arcs but only {got} records follow")]
    ArcCountMismatch {
        /// Arc count announced by the header.
        expected: usize,
        /// Number of records actually present.
        got: usize,
    },
    /// An arc endpoint fell outside `[0, n)`.
    #[error("arc endpoint {node} on line {line_number} exceeds the {nodes}-node network")]
    EndpointOutOfRange {
        /// 1-based line number of the offending record.
        line_number: usize,
        /// Offending node id.
        node: usize,
        /// Node count announced by the header.
        nodes: usize,
    },
}

impl From<io::Error> for EdgeListError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

/// Immutable contact network in compressed sparse row form.
///
/// Loaded once before any trial runs; shared read-only thereafter.
///
/// # Examples
/// ```
/// use epicast_core::ContactNetwork;
/// use epicast_providers_edgelist::{AdjacencyNetwork, Orientation};
///
/// let input = "3 2\n0 1\n1 2\n";
/// let network =
///     AdjacencyNetwork::try_from_reader("demo", input.as_bytes(), Orientation::Directed)?;
/// assert_eq!(network.node_count(), 3);
/// assert_eq!(network.edge_count(), 2);
/// assert_eq!(network.neighbours(1)?, &[2]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct AdjacencyNetwork {
    name: String,
    offsets: Vec<usize>,
    targets: Vec<usize>,
}

impl AdjacencyNetwork {
    /// Builds a network from explicit arc pairs.
    ///
    /// # Errors
    /// Returns [`EdgeListError::EndpointOutOfRange`] when an endpoint is not
    /// in `[0, node_count)`; the reported line number counts arcs from 1.
    pub fn from_arcs(
        name: impl Into<String>,
        node_count: usize,
        arcs: &[(usize, usize)],
        orientation: Orientation,
    ) -> Result<Self, EdgeListError> {
        for (index, &(source, target)) in arcs.iter().enumerate() {
            for node in [source, target] {
                if node >= node_count {
                    return Err(EdgeListError::EndpointOutOfRange {
                        line_number: index + 1,
                        node,
                        nodes: node_count,
                    });
                }
            }
        }

        let mut degrees = vec![0usize; node_count];
        let stored: Vec<(usize, usize)> = match orientation {
            Orientation::Directed => arcs.to_vec(),
            Orientation::Undirected => arcs
                .iter()
                .flat_map(|&(source, target)| [(source, target), (target, source)])
                .collect(),
        };
        for &(source, _) in &stored {
            degrees[source] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut total = 0;
        offsets.push(0);
        for &degree in &degrees {
            total += degree;
            offsets.push(total);
        }

        let mut cursors = offsets.clone();
        let mut targets = vec![0usize; total];
        for &(source, target) in &stored {
            targets[cursors[source]] = target;
            cursors[source] += 1;
        }

        Ok(Self {
            name: name.into(),
            offsets,
            targets,
        })
    }

    /// Loads a network from the `n m` text format.
    ///
    /// Exactly `m` arc records are consumed; blank lines are skipped and
    /// anything after the final record is ignored.
    ///
    /// # Errors
    /// Returns [`EdgeListError`] when the input cannot be read or does not
    /// follow the format.
    pub fn try_from_reader(
        name: impl Into<String>,
        reader: impl BufRead,
        orientation: Orientation,
    ) -> Result<Self, EdgeListError> {
        let mut lines = reader.lines().enumerate();

        let (node_count, arc_count) = loop {
            let Some((_, line)) = lines.next() else {
                return Err(EdgeListError::MissingHeader);
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            break parse_header(&line)?;
        };

        let mut arcs = Vec::with_capacity(arc_count);
        while arcs.len() < arc_count {
            let Some((index, line)) = lines.next() else {
                return Err(EdgeListError::ArcCountMismatch {
                    expected: arc_count,
                    got: arcs.len(),
                });
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            arcs.push(parse_arc(index + 1, &line)?);
        }

        Self::from_arcs(name, node_count, &arcs, orientation)
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), EdgeListError> {
    let mut tokens = line.split_whitespace();
    let (Some(nodes), Some(arcs), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(EdgeListError::MalformedHeader {
            line: line.to_owned(),
        });
    };
    match (nodes.parse(), arcs.parse()) {
        (Ok(nodes), Ok(arcs)) => Ok((nodes, arcs)),
        _ => Err(EdgeListError::MalformedHeader {
            line: line.to_owned(),
        }),
    }
}

fn parse_arc(line_number: usize, line: &str) -> Result<(usize, usize), EdgeListError> {
    let mut tokens = line.split_whitespace();
    let (Some(source), Some(target), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(EdgeListError::MalformedArc {
            line_number,
            line: line.to_owned(),
        });
    };
    match (source.parse(), target.parse()) {
        (Ok(source), Ok(target)) => Ok((source, target)),
        _ => Err(EdgeListError::MalformedArc {
            line_number,
            line: line.to_owned(),
        }),
    }
}

impl ContactNetwork for AdjacencyNetwork {
    fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn edge_count(&self) -> usize {
        self.targets.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError> {
        let start = *self
            .offsets
            .get(node)
            .ok_or(NetworkError::OutOfBounds { node })?;
        let end = *self
            .offsets
            .get(node + 1)
            .ok_or(NetworkError::OutOfBounds { node })?;
        Ok(&self.targets[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn loads_a_directed_edge_list() {
        let input = "4 3\n0 1\n0 2\n2 3\n";
        let network =
            AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
                .expect("input is well formed");
        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 3);
        assert_eq!(network.neighbours(0).expect("in bounds"), &[1, 2]);
        assert_eq!(network.neighbours(1).expect("in bounds"), &[] as &[usize]);
        assert_eq!(network.neighbours(2).expect("in bounds"), &[3]);
    }

    #[test]
    fn undirected_records_contribute_both_arcs() {
        let input = "3 2\n0 1\n1 2\n";
        let network =
            AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Undirected)
                .expect("input is well formed");
        assert_eq!(network.edge_count(), 4);
        assert_eq!(network.neighbours(1).expect("in bounds"), &[0, 2]);
    }

    #[test]
    fn skips_blank_lines_and_ignores_trailing_content() {
        let input = "\n2 1\n\n0 1\nthis is never read\n";
        let network =
            AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
                .expect("only the first arc record is consumed");
        assert_eq!(network.edge_count(), 1);
    }

    #[test]
    fn rejects_empty_input() {
        let err = AdjacencyNetwork::try_from_reader("net", "".as_bytes(), Orientation::Directed)
            .expect_err("no header present");
        assert!(matches!(err, EdgeListError::MissingHeader));
    }

    #[rstest]
    #[case::short("3\n")]
    #[case::long("3 2 1\n")]
    #[case::textual("three two\n")]
    fn rejects_malformed_headers(#[case] input: &str) {
        let err = AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
            .expect_err("header must be `n m`");
        assert!(matches!(err, EdgeListError::MalformedHeader { .. }));
    }

    #[test]
    fn rejects_malformed_arc_records() {
        let input = "2 1\n0 x\n";
        let err = AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
            .expect_err("arc endpoints must be integers");
        assert!(matches!(
            err,
            EdgeListError::MalformedArc { line_number: 2, .. }
        ));
    }

    #[test]
    fn rejects_truncated_arc_lists() {
        let input = "3 2\n0 1\n";
        let err = AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
            .expect_err("one record is missing");
        assert!(matches!(
            err,
            EdgeListError::ArcCountMismatch {
                expected: 2,
                got: 1,
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_endpoints() {
        let input = "2 1\n0 5\n";
        let err = AdjacencyNetwork::try_from_reader("net", input.as_bytes(), Orientation::Directed)
            .expect_err("node 5 exceeds the 2-node network");
        assert!(matches!(
            err,
            EdgeListError::EndpointOutOfRange { node: 5, nodes: 2, .. }
        ));
    }

    #[test]
    fn from_arcs_builds_programmatic_networks() {
        let network = AdjacencyNetwork::from_arcs(
            "ring",
            4,
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
            Orientation::Undirected,
        )
        .expect("arcs are in range");
        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 8);
        assert_eq!(network.neighbours(0).expect("in bounds"), &[1, 3]);
    }
}
