use crate::libs::lift::error::LiftError;

/// Orientation of the target side of a chain.
///
/// The source side of a chain is always forward; only the target side may
/// be inverted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_char(c: char) -> Option<Strand> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// One ungapped aligned region of a chain.
///
/// All coordinates are 0-based, half-open. Target coordinates are stored in
/// forward-strand numbering with `target_start < target_end` even for
/// reverse-strand chains; within a reverse-strand block the aligned bases
/// run backward, so position `source_start + k` pairs with position
/// `target_end - 1 - k`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentBlock {
    pub source_start: u64,
    pub source_end: u64,
    pub target_start: u64,
    pub target_end: u64,
}

impl AlignmentBlock {
    pub fn new(source_start: u64, source_end: u64, target_start: u64, target_end: u64) -> Self {
        Self {
            source_start,
            source_end,
            target_start,
            target_end,
        }
    }

    /// Aligned length of the block.
    pub fn len(&self) -> u64 {
        self.source_end - self.source_start
    }

    pub fn is_empty(&self) -> bool {
        self.source_end == self.source_start
    }
}

/// Chain-level attributes, as handed over by a parser or converter.
#[derive(Debug, Clone, Default)]
pub struct ChainMeta {
    pub source_name: String,
    pub source_size: u64,
    pub target_name: String,
    pub target_size: u64,
    pub target_strand: Strand,
    /// Alignment score; used only as an ordering hint
    pub score: f64,
    pub id: u64,
}

/// A validated pairwise alignment chain.
///
/// Construction checks every structural invariant, so a `Chain` value in
/// hand is always well-formed and downstream code never re-validates:
///
/// * a finite score;
/// * at least one block, every block non-empty with equal source and
///   target lengths;
/// * blocks strictly increasing and non-overlapping on the source side
///   (a zero-length gap, i.e. `source_end == next.source_start`, is
///   allowed);
/// * on the target side, non-overlapping and strictly increasing when the
///   target strand is forward, strictly decreasing when reverse;
/// * all coordinates within the declared sequence sizes.
#[derive(Debug, Clone)]
pub struct Chain {
    meta: ChainMeta,
    blocks: Vec<AlignmentBlock>,
}

impl Chain {
    pub fn new(meta: ChainMeta, blocks: Vec<AlignmentBlock>) -> Result<Chain, LiftError> {
        let id = meta.id;
        let malformed = |why: String| LiftError::MalformedChain { id, why };

        if !meta.score.is_finite() {
            return Err(malformed(format!("score {} is not finite", meta.score)));
        }

        if blocks.is_empty() {
            return Err(malformed("no alignment blocks".to_string()));
        }

        for (i, b) in blocks.iter().enumerate() {
            if b.source_start >= b.source_end {
                return Err(malformed(format!(
                    "block {} is empty on the source side ({}..{})",
                    i, b.source_start, b.source_end
                )));
            }
            if b.target_start >= b.target_end {
                return Err(malformed(format!(
                    "block {} is empty on the target side ({}..{})",
                    i, b.target_start, b.target_end
                )));
            }
            if b.source_end - b.source_start != b.target_end - b.target_start {
                return Err(malformed(format!(
                    "block {} has unequal source and target lengths ({} vs {})",
                    i,
                    b.source_end - b.source_start,
                    b.target_end - b.target_start
                )));
            }
            if b.target_end > meta.target_size {
                return Err(malformed(format!(
                    "block {} ends at {} beyond the target size {}",
                    i, b.target_end, meta.target_size
                )));
            }
        }

        if blocks[blocks.len() - 1].source_end > meta.source_size {
            return Err(malformed(format!(
                "last block ends at {} beyond the source size {}",
                blocks[blocks.len() - 1].source_end,
                meta.source_size
            )));
        }

        for i in 1..blocks.len() {
            let prev = &blocks[i - 1];
            let curr = &blocks[i];
            if curr.source_start < prev.source_end {
                return Err(malformed(format!(
                    "block {} overlaps or reorders block {} on the source side",
                    i,
                    i - 1
                )));
            }
            let target_ok = match meta.target_strand {
                Strand::Forward => curr.target_start >= prev.target_end,
                Strand::Reverse => curr.target_end <= prev.target_start,
            };
            if !target_ok {
                return Err(malformed(format!(
                    "block {} overlaps or reorders block {} on the target side (strand {})",
                    i,
                    i - 1,
                    meta.target_strand
                )));
            }
        }

        Ok(Chain { meta, blocks })
    }

    pub fn meta(&self) -> &ChainMeta {
        &self.meta
    }

    pub fn blocks(&self) -> &[AlignmentBlock] {
        &self.blocks
    }

    pub fn id(&self) -> u64 {
        self.meta.id
    }

    pub fn score(&self) -> f64 {
        self.meta.score
    }

    /// The source range spanned by the chain: first block start to last
    /// block end, half-open.
    pub fn source_span(&self) -> (u64, u64) {
        (
            self.blocks[0].source_start,
            self.blocks[self.blocks.len() - 1].source_end,
        )
    }

    /// Total aligned bases (sum of block lengths).
    pub fn aligned_len(&self) -> u64 {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    /// All blocks whose source range intersects `[start, end)`.
    ///
    /// Binary search to the first block with `source_end > start`, then
    /// extend while `source_start < end`. Blocks are sorted and
    /// non-overlapping on the source side, so the hits form a contiguous
    /// slice and lookup is `O(log n)` plus the slice length.
    pub fn blocks_overlapping(&self, start: u64, end: u64) -> &[AlignmentBlock] {
        if start >= end {
            return &[];
        }
        let lo = self.blocks.partition_point(|b| b.source_end <= start);
        let hi = self.blocks.partition_point(|b| b.source_start < end);
        &self.blocks[lo..hi]
    }
}
