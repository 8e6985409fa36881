//! `lop` - Lift Over Projections of genomic intervals through alignment
//! chains.
//!
//! The library side builds a [`ChainIndex`] from UCSC chain files (or any
//! other [`ChainSource`]) and projects 0-based half-open intervals from a
//! source assembly onto a target assembly; see [`libs::lift`] for the
//! semantics.

pub mod libs;

pub use crate::libs::cache::ProjectionCache;
pub use crate::libs::lift::{
    AlignmentBlock, Chain, ChainIndex, ChainMeta, ChainSource, LiftError, ProjectedInterval,
    Strand,
};
