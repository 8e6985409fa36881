//! Coordinate liftover: projecting intervals between assemblies through
//! alignment chains.
//!
//! A chain is a pairwise alignment made of ungapped blocks; projecting an
//! interval means intersecting it with those blocks and carrying each
//! intersection to the other assembly at the block's constant offset, in
//! the manner of the UCSC `liftOver` tool.
//!
//! # Core Components
//!
//! * [`model`] - Validated chain data (`Chain`, `AlignmentBlock`, `Strand`).
//! * [`index`] - Build-once lookup by source sequence (`ChainIndex`).
//! * [`project`] - The projection engine and result assembly.
//! * [`error`] - The two failure kinds (`MalformedChain`, `OutOfBounds`).
//!
//! # Semantics
//!
//! 1. **Coordinates**: 0-based, half-open everywhere. Reverse-strand
//!    targets keep forward numbering; the strand flag tells callers the
//!    aligned orientation.
//! 2. **Lookup**: chains are grouped per source sequence in a fixed rank
//!    order (score descending, id ascending); blocks are found by binary
//!    search.
//! 3. **Splitting**: alignment gaps split results. Block intersections
//!    coalesce only across seamless (zero-gap) junctions, so a projected
//!    piece never claims bases no block aligned.
//! 4. **Assembly**: pieces concatenate per chain in rank order, chains
//!    never merge, and partial coverage is flagged per chain.
//!
//! ```
//! use lop::{AlignmentBlock, Chain, ChainIndex, ChainMeta, Strand};
//!
//! let meta = ChainMeta {
//!     source_name: "chr1".to_string(),
//!     source_size: 1000,
//!     target_name: "chr7".to_string(),
//!     target_size: 800,
//!     target_strand: Strand::Forward,
//!     score: 4900.0,
//!     id: 1,
//! };
//! let blocks = vec![
//!     AlignmentBlock::new(100, 150, 300, 350),
//!     AlignmentBlock::new(180, 220, 380, 420),
//! ];
//! let chain = Chain::new(meta, blocks).unwrap();
//! let index = ChainIndex::build(vec![chain]).unwrap();
//!
//! // The query spans the alignment gap, so it splits into two pieces
//! let pieces = index.project("chr1", 120, 200).unwrap();
//! assert_eq!(pieces.len(), 2);
//! assert_eq!((pieces[0].target_start, pieces[0].target_end), (320, 350));
//! assert_eq!((pieces[1].target_start, pieces[1].target_end), (380, 400));
//! assert!(pieces[0].is_partial);
//! ```

pub mod error;
pub mod index;
pub mod model;
pub mod project;

pub use error::LiftError;
pub use index::{ChainIndex, ChainSource};
pub use model::{AlignmentBlock, Chain, ChainMeta, Strand};
pub use project::{ProjectedInterval, PARALLEL_BATCH_MIN};
