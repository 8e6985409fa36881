use rayon::prelude::*;

use crate::libs::lift::error::LiftError;
use crate::libs::lift::index::{ChainIndex, SourceChains};
use crate::libs::lift::model::{Chain, Strand};

/// Batches below this size are projected serially.
pub const PARALLEL_BATCH_MIN: usize = 100;

/// One projected piece of a query interval.
///
/// Target coordinates are half-open, forward numbering,
/// `target_start < target_end` regardless of strand; `target_strand`
/// flags inversion for callers that need reverse-complement semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedInterval {
    pub target_name: String,
    pub target_start: u64,
    pub target_end: u64,
    pub target_strand: Strand,
    /// The chain this piece came from
    pub chain_id: u64,
    /// The sub-range of the query covered by this piece
    pub source_covered_start: u64,
    pub source_covered_end: u64,
    /// True when the originating chain covers only part of the query
    pub is_partial: bool,
}

impl ProjectedInterval {
    pub fn len(&self) -> u64 {
        self.target_end - self.target_start
    }

    pub fn is_empty(&self) -> bool {
        self.target_end == self.target_start
    }
}

impl Chain {
    /// Project `[start, end)` through this chain.
    ///
    /// Every overlapping block contributes the intersection of the query
    /// with its source range, mapped to the target at the block's constant
    /// offset; on the reverse strand the mapping mirrors, so the interval
    /// `[s, e)` inside a block lands at
    /// `[target_end - (e - source_start), target_end - (s - source_start))`.
    ///
    /// Intersections from different blocks stay separate pieces unless the
    /// blocks are seamless, i.e. adjacent on both the source and the
    /// target side with zero-length gaps. Collapsing across a real gap
    /// would fabricate aligned bases that do not exist, so only seamless
    /// runs coalesce. Pieces come out in ascending source order.
    ///
    /// Bounds policy lives on [`ChainIndex::project`]; a query outside the
    /// chain simply yields no pieces here, with `is_partial` reflecting
    /// whatever was covered.
    pub fn project(&self, start: u64, end: u64) -> Vec<ProjectedInterval> {
        let hits = self.blocks_overlapping(start, end);
        if hits.is_empty() {
            return Vec::new();
        }
        let meta = self.meta();

        // Seamless runs over the hit slice: (first block, covered range)
        let mut runs: Vec<(usize, u64, u64)> = Vec::new();
        let mut first = 0usize;
        let mut cov_start = start.max(hits[0].source_start);
        let mut cov_end = end.min(hits[0].source_end);

        for i in 1..hits.len() {
            let prev = &hits[i - 1];
            let curr = &hits[i];
            let seamless = prev.source_end == curr.source_start
                && match meta.target_strand {
                    Strand::Forward => prev.target_end == curr.target_start,
                    Strand::Reverse => curr.target_end == prev.target_start,
                };
            if seamless {
                cov_end = end.min(curr.source_end);
            } else {
                runs.push((first, cov_start, cov_end));
                first = i;
                cov_start = curr.source_start;
                cov_end = end.min(curr.source_end);
            }
        }
        runs.push((first, cov_start, cov_end));

        // Runs never overlap, so the union is a plain sum
        let covered: u64 = runs.iter().map(|(_, s, e)| e - s).sum();
        let is_partial = covered < end - start;

        runs.into_iter()
            .map(|(i, s, e)| {
                let b = &hits[i];
                let len = e - s;
                let (target_start, target_end) = match meta.target_strand {
                    Strand::Forward => {
                        let t0 = b.target_start + (s - b.source_start);
                        (t0, t0 + len)
                    }
                    Strand::Reverse => {
                        let t1 = b.target_end - (s - b.source_start);
                        (t1 - len, t1)
                    }
                };
                ProjectedInterval {
                    target_name: meta.target_name.clone(),
                    target_start,
                    target_end,
                    target_strand: meta.target_strand,
                    chain_id: meta.id,
                    source_covered_start: s,
                    source_covered_end: e,
                    is_partial,
                }
            })
            .collect()
    }
}

impl ChainIndex {
    /// Project a source interval onto the target assembly.
    ///
    /// Pieces from all overlapping chains are concatenated in rank order
    /// (score descending, then chain id) and, within one chain, in
    /// ascending source order. Chains stay distinct; a caller wanting a
    /// single best mapping keeps the pieces of the first chain id seen.
    ///
    /// An unknown source name yields `Ok` with an empty result. For a
    /// known source, `start > end` or `end` beyond the recorded size is
    /// `OutOfBounds`, and an in-bounds zero-length query is empty.
    pub fn project(
        &self,
        source: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<ProjectedInterval>, LiftError> {
        let sc = match self.source(source) {
            Some(sc) => sc,
            None => return Ok(Vec::new()),
        };
        check_bounds(source, start, end, sc.size)?;
        if start == end {
            return Ok(Vec::new());
        }
        Ok(project_into(sc, start, end))
    }

    /// Project many intervals from one source sequence.
    ///
    /// A throughput convenience only: the result is positionally parallel
    /// to `intervals` and identical to mapping [`ChainIndex::project`]
    /// over them. Bounds are validated up front in input order, so the
    /// first offending interval determines the error no matter how the
    /// batch is scheduled; large batches fan out on the rayon pool.
    pub fn project_batch(
        &self,
        source: &str,
        intervals: &[(u64, u64)],
    ) -> Result<Vec<Vec<ProjectedInterval>>, LiftError> {
        let sc = match self.source(source) {
            Some(sc) => sc,
            None => return Ok(vec![Vec::new(); intervals.len()]),
        };
        for &(start, end) in intervals {
            check_bounds(source, start, end, sc.size)?;
        }

        let run = |&(start, end): &(u64, u64)| {
            if start == end {
                Vec::new()
            } else {
                project_into(sc, start, end)
            }
        };
        let results = if intervals.len() >= PARALLEL_BATCH_MIN {
            intervals.par_iter().map(run).collect()
        } else {
            intervals.iter().map(run).collect()
        };
        Ok(results)
    }
}

fn check_bounds(name: &str, start: u64, end: u64, size: u64) -> Result<(), LiftError> {
    if start > end || end > size {
        return Err(LiftError::OutOfBounds {
            name: name.to_string(),
            start,
            end,
            size,
        });
    }
    Ok(())
}

fn project_into(sc: &SourceChains, start: u64, end: u64) -> Vec<ProjectedInterval> {
    let mut out = Vec::new();
    for chain in &sc.chains {
        let (s0, s1) = chain.source_span();
        if s0 < end && start < s1 {
            out.extend(chain.project(start, end));
        }
    }
    out
}
