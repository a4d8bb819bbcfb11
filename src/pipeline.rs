//! Stage pipeline: SHA3 -> expand -> permute -> SHA3, twice.
//!
//! The orchestration is written once. A [`StageBackend`] decides where the
//! buffers live and which permutation builds the transform; the arena and
//! the suffix-array oracle are the two backends shipped with the crate.

use crate::error::Rejected;
use crate::{sha3_256, STAGE1_LENGTH, STAGE2_MASK};

/// Which of the two stages a backend is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fixed `STAGE1_LENGTH` text.
    One,
    /// Data-dependent text length.
    Two,
}

/// One expand/permute/hash round.
pub trait StageBackend {
    /// Expands `key` into `len` keystream bytes, applies the permutation
    /// transform and returns the SHA3-256 of its `len + 1` output bytes.
    fn stage_digest(&mut self, stage: Stage, key: &[u8; 32], len: usize) -> [u8; 32];
}

/// Stage-2 text length selected by the stage-1 digest.
#[inline]
pub fn stage2_length(key: &[u8; 32]) -> usize {
    let word = u32::from_le_bytes([key[0], key[1], key[2], key[3]]);
    STAGE1_LENGTH + (word & STAGE2_MASK) as usize
}

/// Runs stage 1 only and reports the stage-2 length `input` would need.
pub fn derive_stage2_length<B: StageBackend>(input: &[u8], backend: &mut B) -> usize {
    stage2_length(&stage_one(input, backend))
}

#[inline]
fn stage_one<B: StageBackend>(input: &[u8], backend: &mut B) -> [u8; 32] {
    let key = sha3_256(input);
    backend.stage_digest(Stage::One, &key, STAGE1_LENGTH)
}

/// Full proof-of-work digest of `input`.
pub fn compute<B: StageBackend>(input: &[u8], backend: &mut B) -> [u8; 32] {
    let key = stage_one(input, backend);
    backend.stage_digest(Stage::Two, &key, stage2_length(&key))
}

/// Like [`compute`], but skips stage 2 when it would exceed `max_stage2_length`.
pub fn compute_bounded<B: StageBackend>(
    input: &[u8],
    max_stage2_length: usize,
    backend: &mut B,
) -> Result<[u8; 32], Rejected> {
    let key = stage_one(input, backend);
    let len = stage2_length(&key);
    if len > max_stage2_length {
        return Err(Rejected {
            stage2_length: len,
            max_stage2_length,
        });
    }
    Ok(backend.stage_digest(Stage::Two, &key, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_STAGE2_LENGTH;

    /// Records the calls it receives.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Stage, [u8; 32], usize)>,
    }

    impl StageBackend for Recorder {
        fn stage_digest(&mut self, stage: Stage, key: &[u8; 32], len: usize) -> [u8; 32] {
            self.calls.push((stage, *key, len));
            // low 20 bits = 0x12345 for stage 1
            let mut out = [0xAB; 32];
            out[..4].copy_from_slice(&0xFFF1_2345u32.to_le_bytes());
            out
        }
    }

    #[test]
    fn test_stage2_length_bounds() {
        assert_eq!(stage2_length(&[0u8; 32]), STAGE1_LENGTH);
        assert_eq!(stage2_length(&[0xFFu8; 32]), MAX_STAGE2_LENGTH);

        let mut key = [0u8; 32];
        key[0] = 1;
        key[2] = 0x10; // bit 20, masked away
        assert_eq!(stage2_length(&key), STAGE1_LENGTH + 1);
    }

    #[test]
    fn test_stage_sequence() {
        let mut backend = Recorder::default();
        compute(b"header", &mut backend);

        assert_eq!(backend.calls.len(), 2);
        assert_eq!(backend.calls[0].0, Stage::One);
        assert_eq!(backend.calls[0].1, sha3_256(b"header"));
        assert_eq!(backend.calls[0].2, STAGE1_LENGTH);
        assert_eq!(backend.calls[1].0, Stage::Two);
        assert_eq!(backend.calls[1].2, STAGE1_LENGTH + 0x12345);
    }

    #[test]
    fn test_bounded_skips_stage_two() {
        let mut backend = Recorder::default();
        let limit = STAGE1_LENGTH + 0x12344;
        let rejected = compute_bounded(b"header", limit, &mut backend).unwrap_err();
        assert_eq!(rejected.stage2_length, STAGE1_LENGTH + 0x12345);
        assert_eq!(rejected.max_stage2_length, limit);
        assert_eq!(backend.calls.len(), 1);

        let mut backend = Recorder::default();
        assert!(compute_bounded(b"header", limit + 1, &mut backend).is_ok());
        assert_eq!(backend.calls.len(), 2);
    }

    #[test]
    fn test_derive_stage2_length() {
        let mut backend = Recorder::default();
        assert_eq!(
            derive_stage2_length(b"x", &mut backend),
            STAGE1_LENGTH + 0x12345
        );
        assert_eq!(backend.calls.len(), 1);
    }
}
