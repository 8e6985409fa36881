use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LiftError {
    /// A chain violates a structural invariant (build time)
    MalformedChain {
        /// The id of the offending chain
        id: u64,
        /// The violated invariant
        why: String,
    },
    /// A query interval falls outside the recorded source sequence (query time)
    OutOfBounds {
        /// The source sequence name
        name: String,
        start: u64,
        end: u64,
        /// The recorded size of the source sequence
        size: u64,
    },
}

impl fmt::Display for LiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftError::MalformedChain { id, why } => {
                write!(f, "Malformed chain {}: {}", id, why)
            }
            LiftError::OutOfBounds {
                name,
                start,
                end,
                size,
            } => {
                write!(
                    f,
                    "Interval {}:{}-{} out of bounds for a sequence of size {}",
                    name, start, end, size
                )
            }
        }
    }
}

impl std::error::Error for LiftError {}
