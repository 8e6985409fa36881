use std::num::NonZeroUsize;

use lru::LruCache;

use crate::libs::lift::{ChainIndex, LiftError, ProjectedInterval};

/// A memoizing wrapper over [`ChainIndex::project`].
///
/// The index holds no derived state, so callers replaying the same
/// queries (annotation tracks revisit the same intervals constantly) can
/// put this in front of it. Results are kept in a bounded LRU keyed by
/// the query triple; failed queries are not cached.
pub struct ProjectionCache<'a> {
    index: &'a ChainIndex,
    cache: LruCache<(String, u64, u64), Vec<ProjectedInterval>>,
    hits: u64,
    misses: u64,
}

impl<'a> ProjectionCache<'a> {
    pub fn new(index: &'a ChainIndex, capacity: NonZeroUsize) -> Self {
        Self {
            index,
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn project(
        &mut self,
        source: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<ProjectedInterval>, LiftError> {
        let key = (source.to_string(), start, end);
        if let Some(cached) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(cached.clone());
        }
        let pieces = self.index.project(source, start, end)?;
        self.misses += 1;
        self.cache.put(key, pieces.clone());
        Ok(pieces)
    }

    /// `(hits, misses)` since construction.
    pub fn counters(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
