use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::libs::lift::error::LiftError;
use crate::libs::lift::model::{AlignmentBlock, Chain, ChainMeta};

/// Capability seam for anything that can hand chains to the index builder:
/// the bundled chain-format reader, a converter from another alignment
/// format, or an in-memory fixture in tests.
///
/// Items are unvalidated attribute/block pairs; validation happens during
/// the build, where the malformed-chain policy (strict or tolerant) is
/// applied.
pub trait ChainSource {
    /// The next chain in stream order, or `None` at the end.
    fn next_chain(&mut self) -> Option<anyhow::Result<(ChainMeta, Vec<AlignmentBlock>)>>;
}

impl ChainSource for std::vec::IntoIter<(ChainMeta, Vec<AlignmentBlock>)> {
    fn next_chain(&mut self) -> Option<anyhow::Result<(ChainMeta, Vec<AlignmentBlock>)>> {
        self.next().map(Ok)
    }
}

#[derive(Debug)]
pub(crate) struct SourceChains {
    pub(crate) size: u64,
    /// Rank order: score descending, then id ascending
    pub(crate) chains: Vec<Chain>,
}

/// Immutable lookup structure over a finalized set of chains.
///
/// Built once, then queried; there is no way to mutate an existing index,
/// so a shared reference can serve concurrent queries from many threads.
/// Chains are grouped by source sequence name and kept in rank order
/// (score descending, chain id ascending), which fixes the result order of
/// every downstream projection.
#[derive(Debug)]
pub struct ChainIndex {
    by_source: IndexMap<String, SourceChains>,
}

impl ChainIndex {
    /// Build from already-validated chains.
    ///
    /// The only remaining failure is two chains disagreeing on the size of
    /// the same source sequence, which reports the later chain as
    /// malformed.
    pub fn build(chains: Vec<Chain>) -> Result<ChainIndex, LiftError> {
        let (index, _) = Self::assemble(chains, false)?;
        Ok(index)
    }

    /// Build from a chain producer, failing on the first malformed chain.
    pub fn from_source<S: ChainSource>(mut src: S) -> anyhow::Result<ChainIndex> {
        let mut chains = Vec::new();
        while let Some(item) = src.next_chain() {
            let (meta, blocks) = item?;
            chains.push(Chain::new(meta, blocks)?);
        }
        let (index, _) = Self::assemble(chains, false)?;
        Ok(index)
    }

    /// Build from a chain producer, skipping malformed chains.
    ///
    /// Returns the index together with the number of skipped chains.
    /// Reader errors (unreadable or unparseable input) are still fatal;
    /// tolerance covers structural validation only, whether a producer
    /// reports it or [`Chain::new`] does.
    pub fn from_source_tolerant<S: ChainSource>(mut src: S) -> anyhow::Result<(ChainIndex, usize)> {
        let mut chains = Vec::new();
        let mut skipped = 0;
        while let Some(item) = src.next_chain() {
            match item {
                Ok((meta, blocks)) => match Chain::new(meta, blocks) {
                    Ok(chain) => chains.push(chain),
                    Err(LiftError::MalformedChain { .. }) => skipped += 1,
                    Err(e) => return Err(e.into()),
                },
                Err(e) => {
                    match e.downcast_ref::<LiftError>() {
                        Some(LiftError::MalformedChain { .. }) => skipped += 1,
                        _ => return Err(e),
                    }
                }
            }
        }
        let (index, skipped_sizes) = Self::assemble(chains, true)?;
        Ok((index, skipped + skipped_sizes))
    }

    fn assemble(chains: Vec<Chain>, tolerate: bool) -> Result<(ChainIndex, usize), LiftError> {
        let mut by_source: IndexMap<String, SourceChains> = IndexMap::new();
        let mut skipped = 0;

        for chain in chains {
            let size = chain.meta().source_size;
            match by_source.entry(chain.meta().source_name.clone()) {
                Entry::Occupied(mut e) => {
                    let sc = e.get_mut();
                    if sc.size != size {
                        if tolerate {
                            skipped += 1;
                            continue;
                        }
                        return Err(LiftError::MalformedChain {
                            id: chain.id(),
                            why: format!(
                                "declares size {} for {}, other chains declare {}",
                                size,
                                chain.meta().source_name,
                                sc.size
                            ),
                        });
                    }
                    sc.chains.push(chain);
                }
                Entry::Vacant(e) => {
                    e.insert(SourceChains {
                        size,
                        chains: vec![chain],
                    });
                }
            }
        }

        for sc in by_source.values_mut() {
            // std sort requires a total order
            sc.chains.sort_by(|a, b| {
                b.score()
                    .total_cmp(&a.score())
                    .then_with(|| a.id().cmp(&b.id()))
            });
        }

        Ok((ChainIndex { by_source }, skipped))
    }

    pub(crate) fn source(&self, name: &str) -> Option<&SourceChains> {
        self.by_source.get(name)
    }

    /// Rank-ordered chains whose source span intersects `[start, end)`.
    ///
    /// An unknown source name and a zero-length query both yield an empty
    /// result, not an error.
    pub fn chains_overlapping(&self, source: &str, start: u64, end: u64) -> Vec<&Chain> {
        if start >= end {
            return Vec::new();
        }
        match self.by_source.get(source) {
            Some(sc) => sc
                .chains
                .iter()
                .filter(|c| {
                    let (s0, s1) = c.source_span();
                    s0 < end && start < s1
                })
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.by_source.contains_key(name)
    }

    /// Source sequence names in insertion order.
    pub fn source_names(&self) -> Vec<&str> {
        self.by_source.keys().map(|k| k.as_str()).collect()
    }

    /// The recorded size of a source sequence.
    pub fn source_size(&self, name: &str) -> Option<u64> {
        self.by_source.get(name).map(|sc| sc.size)
    }

    /// Per-source view: `(name, size, rank-ordered chains)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64, &[Chain])> {
        self.by_source
            .iter()
            .map(|(name, sc)| (name.as_str(), sc.size, sc.chains.as_slice()))
    }

    pub fn chain_count(&self) -> usize {
        self.by_source.values().map(|sc| sc.chains.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// All `(chain id, score)` pairs, score descending with id as the
    /// tiebreak, optionally truncated to the top `max`.
    pub fn ranked_chains(&self, max: Option<usize>) -> Vec<(u64, f64)> {
        let mut ranked: Vec<(u64, f64)> = self
            .by_source
            .values()
            .flat_map(|sc| sc.chains.iter().map(|c| (c.id(), c.score())))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = max {
            ranked.truncate(max);
        }
        ranked
    }
}
