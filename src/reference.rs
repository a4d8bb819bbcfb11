//! Reference permutation builder (suffix-array oracle).
//!
//! Computes the same transform as [`crate::sort`] with a true suffix sort, so
//! the two can be checked against each other. Allocates freely and is far
//! slower; nothing on the mining path calls it.

use crate::error::{AstroBwtError, Result};
use crate::pipeline::{Stage, StageBackend};
use crate::sort::Bwt;
use crate::{stream, MAX_DATA};

/// Suffix array of `text` plus its empty suffix.
///
/// Returns the `text.len() + 1` starting positions in lexicographic order,
/// the end of the text ranking below every byte value. Prefix doubling, so
/// `O(n log^2 n)` worst case.
pub fn suffix_array(text: &[u8]) -> Vec<usize> {
    let n = text.len() + 1;
    let mut sa: Vec<usize> = (0..n).collect();
    // rank 0 is reserved for the empty suffix
    let mut rank: Vec<usize> = text
        .iter()
        .map(|&b| b as usize + 1)
        .chain(core::iter::once(0))
        .collect();
    let mut next = vec![0usize; n];

    let mut k = 1;
    loop {
        let key = |i: usize| (rank[i], if i + k < n { rank[i + k] + 1 } else { 0 });
        sa.sort_unstable_by_key(|&i| key(i));

        next[sa[0]] = 0;
        for w in 1..n {
            let step = usize::from(key(sa[w - 1]) < key(sa[w]));
            next[sa[w]] = next[sa[w - 1]] + step;
        }
        core::mem::swap(&mut rank, &mut next);

        if rank[sa[n - 1]] == n - 1 {
            break;
        }
        k *= 2;
    }
    sa
}

/// Suffix-array transform of `text`, same layout as [`crate::sort::transform`].
pub fn transform(text: &[u8]) -> Result<Bwt> {
    if text.len() >= MAX_DATA {
        return Err(AstroBwtError::InputTooLarge {
            len: text.len(),
            max: MAX_DATA,
        });
    }

    Ok(build(text))
}

fn build(text: &[u8]) -> Bwt {
    let sa = suffix_array(text);
    let mut sentinel = 0;
    let output = sa
        .iter()
        .enumerate()
        .map(|(slot, &p)| {
            if p == 0 {
                sentinel = slot;
                0
            } else {
                text[p - 1]
            }
        })
        .collect();
    Bwt { output, sentinel }
}

/// Allocating pipeline backend built on [`transform`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceBackend;

impl StageBackend for ReferenceBackend {
    fn stage_digest(&mut self, _stage: Stage, key: &[u8; 32], len: usize) -> [u8; 32] {
        let mut text = vec![0u8; len];
        stream::expand(key, &stream::ZERO_NONCE, &mut text);
        crate::sha3_256(&build(&text).output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_array_banana() {
        // "", a, ana, anana, banana, na, nana
        assert_eq!(suffix_array(b"banana"), vec![6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_suffix_array_runs() {
        // shorter runs rank first once the text ends
        assert_eq!(suffix_array(b"aaaa"), vec![4, 3, 2, 1, 0]);
        assert_eq!(suffix_array(b"\0\0"), vec![2, 1, 0]);
        assert_eq!(suffix_array(b""), vec![0]);
    }

    #[test]
    fn test_reference_vectors() {
        let bwt = transform(b"abracadabra").unwrap();
        assert_eq!(bwt.output, b"ard\0rcaaaabb".to_vec());
        assert_eq!(bwt.sentinel, 3);
    }

    #[test]
    fn test_long_repeats_differ_from_index_sort() {
        // Beyond the 13-byte window the index sort keeps position order; the
        // oracle does not. Documents where the two are allowed to part ways.
        let text = [b'x'; 40];
        let exact = transform(&text).unwrap();
        let approx = crate::sort::transform(&text).unwrap();
        assert_eq!(exact.output.len(), approx.output.len());
        assert_ne!(exact.sentinel, approx.sentinel);
    }
}
