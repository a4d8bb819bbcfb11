//! Error types.
//!
//! An [`AstroBwtError`] is a precondition violation and must never be
//! ignored. [`Rejected`] is the ordinary "try another candidate" answer of
//! the bounded pipeline and is deliberately not an error type.

use core::fmt;
use thiserror::Error;

/// Crate result type alias
pub type Result<T> = core::result::Result<T, AstroBwtError>;

/// Precondition violations at the public boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstroBwtError {
    /// The text is too long for 21-bit position packing.
    #[error("text of {len} bytes reaches the {max}-byte addressing ceiling")]
    InputTooLarge { len: usize, max: usize },

    /// A caller-supplied working buffer cannot hold the transform.
    #[error("{buffer} buffer holds {actual} entries, {required} required")]
    BufferTooSmall {
        buffer: &'static str,
        required: usize,
        actual: usize,
    },

    /// Configuration that can never produce a digest.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The derived stage-2 length exceeded the caller's limit; stage 2 was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rejected {
    /// Stage-2 length the candidate would have needed.
    pub stage2_length: usize,
    /// Limit that was in force.
    pub max_stage2_length: usize,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stage-2 length {} exceeds limit {}",
            self.stage2_length, self.max_stage2_length
        )
    }
}
