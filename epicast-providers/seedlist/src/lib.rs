//! Parsers for epidemic seed lists and per-epidemic bound lists.
//!
//! Seed-list format: a count line, then one record per epidemic —
//! `id k node_1 … node_k`. In counts-only form the node ids are omitted and
//! the caller draws them randomly. Bound-list format: one `id bound` record
//! per epidemic, in the same order as the seed list.

use std::io::{self, BufRead};

use epicast_core::StopCriterion;
use thiserror::Error;

/// One parsed seed-list record with explicit seed nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    /// Epidemic id.
    pub id: u32,
    /// Initially infected node ids, as listed.
    pub seeds: Vec<usize>,
}

/// One parsed counts-only seed-list record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCount {
    /// Epidemic id.
    pub id: u32,
    /// Number of seed nodes to draw.
    pub count: usize,
}

/// One parsed bound-list record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundRecord {
    /// Epidemic id the bound applies to.
    pub id: u32,
    /// Stop bound value.
    pub bound: u32,
}

/// Errors raised while parsing seed or bound lists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SeedListError {
    /// Reading the input failed.
    #[error("failed to read list: {source}")]
    Io {
        /// Underlying operating-system error.
        #[source]
        source: io::Error,
    },
    /// The input ended before the record-count line.
    #[error("seed list is missing its record-count line")]
    MissingCount,
    /// The record-count line did not parse as a positive integer.
    #[error("malformed record count `{line}`")]
    MalformedCount {
        /// Raw count line as read.
        line: String,
    },
    /// A record did not follow the expected shape.
    #[error("malformed record on line {line_number}: `{line}`")]
    MalformedRecord {
        /// 1-based line number of the offending record.
        line_number: usize,
        /// Raw record line as read.
        line: String,
    },
    /// A record announced `k` seeds but listed a different number.
    #[error("record on line {line_number} announces {expected} seed nodes but lists {got}")]
    SeedCountMismatch {
        /// 1-based line number of the offending record.
        line_number: usize,
        /// Seed count announced by the record.
        expected: usize,
        /// Number of node ids actually listed.
        got: usize,
    },
    /// A record announced zero seed nodes.
    #[error("record on line {line_number} lists no seed nodes for epidemic {id}")]
    EmptySeedSet {
        /// 1-based line number of the offending record.
        line_number: usize,
        /// Epidemic id of the offending record.
        id: u32,
    },
    /// The input ended before the announced number of records.
    #[error("list announces {expected} records but only {got} follow")]
    RecordCountMismatch {
        /// Record count announced by the first line.
        expected: usize,
        /// Number of records actually present.
        got: usize,
    },
    /// A bound record named a different epidemic than the seed list.
    #[error("bound record {index} names epidemic {got} but the seed list has {expected}")]
    BoundIdMismatch {
        /// 0-based record index into both lists.
        index: usize,
        /// Epidemic id at that position in the seed list.
        expected: u32,
        /// Epidemic id named by the bound record.
        got: u32,
    },
    /// The bound list and seed list have different lengths.
    #[error("bound list has {got} records but the seed list has {expected}")]
    BoundCountMismatch {
        /// Number of seed-list records.
        expected: usize,
        /// Number of bound-list records.
        got: usize,
    },
}

impl From<io::Error> for SeedListError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

/// Parses a seed list with explicit node ids.
///
/// # Errors
/// Returns [`SeedListError`] when the input cannot be read or does not
/// follow the format.
///
/// # Examples
/// ```
/// use epicast_providers_seedlist::seeds_from_reader;
///
/// let records = seeds_from_reader("2\n4 2 0 7\n9 1 3\n".as_bytes())?;
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].id, 4);
/// assert_eq!(records[0].seeds, vec![0, 7]);
/// # Ok::<(), epicast_providers_seedlist::SeedListError>(())
/// ```
pub fn seeds_from_reader(reader: impl BufRead) -> Result<Vec<SeedRecord>, SeedListError> {
    parse_records(reader, |line_number, id, count, tokens| {
        let seeds = tokens
            .iter()
            .map(|token| token.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed(line_number, id, count, tokens))?;
        if seeds.len() != count {
            return Err(SeedListError::SeedCountMismatch {
                line_number,
                expected: count,
                got: seeds.len(),
            });
        }
        Ok(SeedRecord { id, seeds })
    })
}

/// Parses a counts-only seed list, for randomly drawn seed nodes.
///
/// # Errors
/// Returns [`SeedListError`] when the input cannot be read or does not
/// follow the format.
pub fn seed_counts_from_reader(reader: impl BufRead) -> Result<Vec<SeedCount>, SeedListError> {
    parse_records(reader, |line_number, id, count, tokens| {
        if !tokens.is_empty() {
            return Err(malformed(line_number, id, count, tokens));
        }
        Ok(SeedCount { id, count })
    })
}

/// Parses a bound list of `id bound` records.
///
/// # Errors
/// Returns [`SeedListError`] when the input cannot be read or a record does
/// not parse as two integers.
pub fn bounds_from_reader(reader: impl BufRead) -> Result<Vec<BoundRecord>, SeedListError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let parsed = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(id), Some(bound), None) => match (id.parse(), bound.parse()) {
                (Ok(id), Ok(bound)) => Some(BoundRecord { id, bound }),
                _ => None,
            },
            _ => None,
        };
        let record = parsed.ok_or_else(|| SeedListError::MalformedRecord {
            line_number: index + 1,
            line: line.clone(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Resolves one stop criterion per epidemic from a bound list.
///
/// Bound records are matched positionally against `ids` and must name the
/// same epidemic at every position; `make` lifts each bound value into the
/// globally chosen criterion.
///
/// # Errors
/// Returns [`SeedListError::BoundCountMismatch`] when the lists differ in
/// length and [`SeedListError::BoundIdMismatch`] on the first id divergence.
///
/// # Examples
/// ```
/// use epicast_core::StopCriterion;
/// use epicast_providers_seedlist::{BoundRecord, apply_bounds};
///
/// let stops = apply_bounds(
///     &[4, 9],
///     &[BoundRecord { id: 4, bound: 10 }, BoundRecord { id: 9, bound: 3 }],
///     StopCriterion::MaxInfected,
/// )?;
/// assert_eq!(stops, vec![StopCriterion::MaxInfected(10), StopCriterion::MaxInfected(3)]);
/// # Ok::<(), epicast_providers_seedlist::SeedListError>(())
/// ```
pub fn apply_bounds<F>(
    ids: &[u32],
    bounds: &[BoundRecord],
    make: F,
) -> Result<Vec<StopCriterion>, SeedListError>
where
    F: Fn(u32) -> StopCriterion,
{
    if ids.len() != bounds.len() {
        return Err(SeedListError::BoundCountMismatch {
            expected: ids.len(),
            got: bounds.len(),
        });
    }
    ids.iter()
        .zip(bounds)
        .enumerate()
        .map(|(index, (&expected, record))| {
            if record.id != expected {
                return Err(SeedListError::BoundIdMismatch {
                    index,
                    expected,
                    got: record.id,
                });
            }
            Ok(make(record.bound))
        })
        .collect()
}

fn malformed(line_number: usize, id: u32, count: usize, tokens: &[&str]) -> SeedListError {
    SeedListError::MalformedRecord {
        line_number,
        line: format!("{id} {count} {}", tokens.join(" ")),
    }
}

/// Shared record-walking loop for the two seed-list forms.
fn parse_records<T, F>(reader: impl BufRead, parse: F) -> Result<Vec<T>, SeedListError>
where
    F: Fn(usize, u32, usize, &[&str]) -> Result<T, SeedListError>,
{
    let mut lines = reader.lines().enumerate();

    let expected = loop {
        let Some((_, line)) = lines.next() else {
            return Err(SeedListError::MissingCount);
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        break line
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&count| count > 0)
            .ok_or(SeedListError::MalformedCount { line })?;
    };

    let mut records = Vec::with_capacity(expected);
    while records.len() < expected {
        let Some((index, line)) = lines.next() else {
            return Err(SeedListError::RecordCountMismatch {
                expected,
                got: records.len(),
            });
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (Some(id), Some(count)) = (
            tokens.first().and_then(|token| token.parse::<u32>().ok()),
            tokens.get(1).and_then(|token| token.parse::<usize>().ok()),
        ) else {
            return Err(SeedListError::MalformedRecord {
                line_number,
                line: line.clone(),
            });
        };
        if count == 0 {
            return Err(SeedListError::EmptySeedSet { line_number, id });
        }
        records.push(parse(line_number, id, count, &tokens[2..])?);
    }
    Ok(records)
}
