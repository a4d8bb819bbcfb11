//! AstroBWT: CPU-bound proof of work
//! =================================
//! A **32‑byte proof‑of‑work digest** built from two rounds of
//! keystream expansion, an approximate Burrows‑Wheeler transform and SHA3‑256.
//! Every variant in this crate produces bit‑for‑bit identical digests; the
//! variants only differ in where their memory comes from and whether they may
//! give up early.
//!
//! ## Construction
//! * `key₁ = SHA3‑256(input)`
//! * stage 1: Salsa20 keystream of `STAGE1_LENGTH` bytes under `key₁`,
//!   index‑sorted, hashed into `key₂`
//! * stage 2: `STAGE1_LENGTH + (LE32(key₂) & 0xFFFFF)` keystream bytes under
//!   `key₂`, index‑sorted, hashed into the digest
//!
//! The data‑dependent stage‑2 length defeats lookup tables, and the index
//! sort (see [`sort`]) keeps the work latency‑bound on the CPU.
//!
//! ## Entry points
//! | Function | Memory | Early reject |
//! |---|---|---|
//! | [`compute_pow`] | thread‑local [`Arena`] | no |
//! | [`compute_pow_with_arena`] | caller's [`Arena`] | no |
//! | [`compute_pow_bounded`] | caller's [`Arena`] | yes |
//! | [`compute_pow_reference`] | fresh allocations, suffix array | no |
//! | [`ArenaPool::hash`] | pooled [`Arena`] | per [`PowConfig`] |
//!
//! Feature‑gated **Rayon batch API** (`parallel`) hashes many candidates on
//! the global thread pool, one arena per worker thread.

pub mod arena;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod reference;
pub mod sort;
pub mod stream;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use sha3::{Digest, Sha3_256};

pub use arena::{with_thread_arena, Arena};
pub use config::PowConfig;
pub use error::{AstroBwtError, Rejected, Result};
pub use pool::{ArenaPool, PooledArena};
pub use sort::Bwt;

// ---------------------------------------------------------------------------
// Constants & parameters (consensus: changing any of these changes the hash)
// ---------------------------------------------------------------------------

/// Stage‑1 text length. A prime.
pub const STAGE1_LENGTH: usize = 147_253;
/// Mask applied to the little‑endian word that extends stage 2.
pub const STAGE2_MASK: u32 = 0xF_FFFF;
/// Longest possible stage‑2 text.
pub const MAX_STAGE2_LENGTH: usize = STAGE1_LENGTH + STAGE2_MASK as usize;
/// Width of the position field in a packed sort entry.
pub const POSITION_BITS: u32 = 21;
/// Texts must be strictly shorter than this.
pub const MAX_DATA: usize = 1 << POSITION_BITS;
/// Counting‑sort digit width (1024 buckets per pass).
pub const COUNTING_SORT_BITS: u32 = 10;
/// Byte offset of the insertion‑sort tie‑break window.
pub const COMPARE_OFFSET: usize = 5;
/// Zero bytes required after every text; covers the furthest window read.
pub const TAIL_PADDING: usize = 16;

const _: () = assert!(MAX_STAGE2_LENGTH < MAX_DATA);
const _: () = assert!(TAIL_PADDING >= COMPARE_OFFSET + 8);

// ---------------------------------------------------------------------------
// Public hashing API
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Compute the **AstroBWT** digest of `input` on this thread's arena.
///
/// The first call on a thread allocates the arena (see
/// [`Arena::footprint`]); later calls allocate nothing.
pub fn compute_pow(input: &[u8]) -> [u8; 32] {
    with_thread_arena(|arena| pipeline::compute(input, arena))
}

/// Compute the digest of `input` using `arena` for every buffer.
pub fn compute_pow_with_arena(input: &[u8], arena: &mut Arena) -> [u8; 32] {
    pipeline::compute(input, arena)
}

/// Compute the digest unless stage 2 would exceed `max_stage2_length`.
///
/// Rejection costs one stage‑1 evaluation and is an expected outcome for
/// throughput‑bounded miners: move on to the next candidate.
pub fn compute_pow_bounded(
    input: &[u8],
    max_stage2_length: usize,
    arena: &mut Arena,
) -> core::result::Result<[u8; 32], Rejected> {
    pipeline::compute_bounded(input, max_stage2_length, arena)
}

/// Compute the digest with the suffix‑array oracle. Slow; for cross‑checks.
pub fn compute_pow_reference(input: &[u8]) -> [u8; 32] {
    pipeline::compute(input, &mut reference::ReferenceBackend)
}

/// Hash many independent inputs in **parallel** using Rayon (feature `parallel`).
#[cfg(feature = "parallel")]
pub fn compute_pow_batch(inputs: &[&[u8]]) -> Vec<[u8; 32]> {
    tracing::trace!(count = inputs.len(), "hashing batch");
    inputs.par_iter().map(|input| compute_pow(input)).collect()
}

/// Parallel [`compute_pow_bounded`] over thread‑local arenas (feature `parallel`).
#[cfg(feature = "parallel")]
pub fn compute_pow_batch_bounded(
    inputs: &[&[u8]],
    max_stage2_length: usize,
) -> Vec<core::result::Result<[u8; 32], Rejected>> {
    tracing::trace!(count = inputs.len(), max_stage2_length, "hashing bounded batch");
    inputs
        .par_iter()
        .map(|input| {
            with_thread_arena(|arena| pipeline::compute_bounded(input, max_stage2_length, arena))
        })
        .collect()
}

// -----------------------------------------------------------------------
//  TESTS
// -----------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(MAX_STAGE2_LENGTH, 1_195_828);
        assert_eq!(MAX_DATA, 2_097_152);
        // STAGE1_LENGTH is prime
        let n = STAGE1_LENGTH;
        assert!((2..).take_while(|d| d * d <= n).all(|d| n % d != 0));
    }

    #[test]
    fn test_sha3_empty() {
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_basic_hash() {
        let digest1 = compute_pow(b"");
        let digest2 = compute_pow(b"abc");
        assert_ne!(digest1, digest2, "Hash('') should differ from Hash('abc')");
        assert_eq!(digest2, compute_pow(b"abc"));
    }

    #[test]
    fn test_entry_points_agree() {
        let input = b"The quick brown fox jumps over the lazy dog";
        let mut arena = Arena::new();
        let digest = compute_pow(input);
        assert_eq!(compute_pow_with_arena(input, &mut arena), digest);
        assert_eq!(
            compute_pow_bounded(input, MAX_STAGE2_LENGTH, &mut arena),
            Ok(digest)
        );
        assert_eq!(compute_pow_reference(input), digest);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_batch_preserves_order() {
        let inputs: Vec<Vec<u8>> = (0u8..6).map(|i| vec![i; 40]).collect();
        let refs: Vec<&[u8]> = inputs.iter().map(Vec::as_slice).collect();
        let batch = compute_pow_batch(&refs);
        for (input, digest) in refs.iter().zip(&batch) {
            assert_eq!(*digest, compute_pow(input));
        }

        let bounded = compute_pow_batch_bounded(&refs, MAX_STAGE2_LENGTH);
        assert!(bounded.iter().zip(&batch).all(|(b, d)| b.as_ref() == Ok(d)));
    }
}

// ---------------------------------------------------------------------------
//                             End of file
// ---------------------------------------------------------------------------
