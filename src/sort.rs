//! Index sort: the approximate BWT at the heart of AstroBWT
//! ========================================================
//! Stands in for a suffix array. Every position of the text is packed with a
//! 43-bit prefix of the bytes starting there, bucketed by two interleaved
//! 10-bit counting sorts, and finished with a stable insertion sort that
//! breaks ties on an 8-byte window five bytes further in. The effective
//! comparison prefix is therefore 13 bytes; longer common prefixes keep their
//! original position order.
//!
//! The result is a *fixed* approximation, not a canonical suffix sort. Its
//! bit-for-bit reproducibility is what consensus depends on, so none of the
//! steps below may be "improved".
//!
//! Buffer convention (shared by every entry point):
//!
//! ```text
//!   buf = [ 0 ][ text: len bytes ][ >= TAIL_PADDING zero bytes ]
//!            ^ pad byte, becomes the sentinel in the output
//! ```

use crate::error::{AstroBwtError, Result};
use crate::{COMPARE_OFFSET, COUNTING_SORT_BITS, MAX_DATA, POSITION_BITS, TAIL_PADDING};

// ---------------------------------------------------------------------------
// Packing & tiny helpers
// ---------------------------------------------------------------------------

const COUNTING_SORT_SIZE: usize = 1 << COUNTING_SORT_BITS;
const POSITION_MASK: u64 = (1 << POSITION_BITS) - 1;

/// Output of a permutation transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bwt {
    /// `text.len() + 1` permuted bytes.
    pub output: Vec<u8>,
    /// Output slot holding the pad byte.
    pub sentinel: usize,
}

/// Big-endian u64 starting at `at`.
#[inline(always)]
fn be64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_be_bytes(word)
}

/// Bucket for the first (low-digit) counting pass: key bits 44..54.
#[inline(always)]
fn low_bucket(key: u64) -> usize {
    ((key >> (64 - COUNTING_SORT_BITS * 2)) as usize) & (COUNTING_SORT_SIZE - 1)
}

/// Bucket for the second (high-digit) counting pass: key bits 54..64.
#[inline(always)]
fn high_bucket(key: u64) -> usize {
    (key >> (64 - COUNTING_SORT_BITS)) as usize
}

#[inline(always)]
fn position(packed: u64) -> usize {
    (packed & POSITION_MASK) as usize
}

/// Strict ordering of two packed entries.
#[inline(always)]
fn smaller(text: &[u8], a: u64, b: u64) -> bool {
    let (value_a, value_b) = (a >> POSITION_BITS, b >> POSITION_BITS);
    if value_a != value_b {
        return value_a < value_b;
    }
    be64(text, position(a) + COMPARE_OFFSET) < be64(text, position(b) + COMPARE_OFFSET)
}

// ---------------------------------------------------------------------------
// Core routine - **hot path**
// ---------------------------------------------------------------------------

/// Permutes `buf[1..=len]` into `out[..=len]` and returns the sentinel slot.
///
/// `indices` and `tmp` need `len + 1` entries, `buf` needs
/// `len + 1 + TAIL_PADDING` bytes with the pad and tail zeroed. Only the
/// first `len + 1` entries of `indices`, `tmp` and `out` are written.
///
/// # Panics
///
/// Panics when `len >= MAX_DATA`: positions would no longer fit the packing
/// and a silently wrong digest is worse than an abort.
pub(crate) fn permute(
    buf: &[u8],
    len: usize,
    indices: &mut [u64],
    tmp: &mut [u64],
    out: &mut [u8],
) -> usize {
    assert!(len < MAX_DATA, "text of {len} bytes exceeds the position ceiling");
    debug_assert_eq!(buf[0], 0);
    debug_assert!(buf[len + 1..len + 1 + TAIL_PADDING].iter().all(|&b| b == 0));

    let n = len + 1;
    let text = &buf[1..];
    let indices = &mut indices[..n];
    let tmp = &mut tmp[..n];

    // -- 1. Histograms, three keys per iteration -------------------------
    let mut counters = [[0u32; COUNTING_SORT_SIZE]; 2];
    let mut i = 0;
    while i + 3 <= n {
        let k0 = be64(text, i);
        let k1 = be64(text, i + 1);
        let k2 = be64(text, i + 2);
        counters[0][low_bucket(k0)] += 1;
        counters[1][high_bucket(k0)] += 1;
        counters[0][low_bucket(k1)] += 1;
        counters[1][high_bucket(k1)] += 1;
        counters[0][low_bucket(k2)] += 1;
        counters[1][high_bucket(k2)] += 1;
        i += 3;
    }
    while i < n {
        let k = be64(text, i);
        counters[0][low_bucket(k)] += 1;
        counters[1][high_bucket(k)] += 1;
        i += 1;
    }

    // -- 2. Prefix sums -> last free slot of every bucket ---------------
    // Empty leading buckets wrap below zero; they are never dereferenced.
    let mut prev = [counters[0][0], counters[1][0]];
    counters[0][0] = prev[0].wrapping_sub(1);
    counters[1][0] = prev[1].wrapping_sub(1);
    for b in 1..COUNTING_SORT_SIZE {
        let cur = [
            counters[0][b].wrapping_add(prev[0]),
            counters[1][b].wrapping_add(prev[1]),
        ];
        counters[0][b] = cur[0].wrapping_sub(1);
        counters[1][b] = cur[1].wrapping_sub(1);
        prev = cur;
    }

    // -- 3. Low digit: pack key + position into `tmp` -------------------
    for i in (0..n).rev() {
        let k = be64(text, i);
        let bucket = low_bucket(k);
        let slot = counters[0][bucket];
        counters[0][bucket] = slot.wrapping_sub(1);
        tmp[slot as usize] = (k & !POSITION_MASK) | i as u64;
    }

    // -- 4. High digit: stable re-bucket into `indices` -----------------
    for &packed in tmp.iter().rev() {
        let bucket = high_bucket(packed);
        let slot = counters[1][bucket];
        counters[1][bucket] = slot.wrapping_sub(1);
        indices[slot as usize] = packed;
    }

    // -- 5. Stable insertion sort over the nearly sorted entries --------
    for i in 1..n {
        let t = indices[i];
        let mut j = i;
        while j > 0 && smaller(text, t, indices[j - 1]) {
            indices[j] = indices[j - 1];
            j -= 1;
        }
        indices[j] = t;
    }

    // -- 6. Materialise, four slots per iteration -----------------------
    let out = &mut out[..n];
    let mut slots = out.chunks_exact_mut(4);
    let mut sources = indices.chunks_exact(4);
    for (o, s) in (&mut slots).zip(&mut sources) {
        o[0] = buf[position(s[0])];
        o[1] = buf[position(s[1])];
        o[2] = buf[position(s[2])];
        o[3] = buf[position(s[3])];
    }
    for (o, &s) in slots.into_remainder().iter_mut().zip(sources.remainder()) {
        *o = buf[position(s)];
    }
    let sentinel = indices
        .iter()
        .position(|&packed| position(packed) == 0)
        .unwrap_or(0);

    // -- 7. Trailing-zero correction ------------------------------------
    // A text ending in 0x00 ties with the empty suffix and lands one slot too
    // early. This patch repairs the common case only and is part of the
    // consensus definition as-is.
    if n > 3 && text[n - 2] == 0 {
        let backup = out[0];
        out[0] = 0;
        for i in 1..n {
            if out[i] != 0 {
                out[i - 1] = backup;
                break;
            }
        }
    }

    sentinel
}

// ---------------------------------------------------------------------------
// Checked entry points
// ---------------------------------------------------------------------------

fn check_len(len: usize) -> Result<()> {
    if len >= MAX_DATA {
        return Err(AstroBwtError::InputTooLarge { len, max: MAX_DATA });
    }
    Ok(())
}

fn check_capacity(buffer: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(AstroBwtError::BufferTooSmall {
            buffer,
            required,
            actual,
        });
    }
    Ok(())
}

/// Runs the index sort over caller-owned buffers.
///
/// `buf` follows the module's buffer convention for a text of `len` bytes.
/// The pad byte and the tail are zeroed here, so callers may reuse a dirty
/// buffer. Returns the sentinel slot; `out[..=len]` holds the transform.
pub fn sort_into(
    buf: &mut [u8],
    len: usize,
    indices: &mut [u64],
    tmp: &mut [u64],
    out: &mut [u8],
) -> Result<usize> {
    check_len(len)?;
    check_capacity("text", len + 1 + TAIL_PADDING, buf.len())?;
    check_capacity("indices", len + 1, indices.len())?;
    check_capacity("tmp indices", len + 1, tmp.len())?;
    check_capacity("output", len + 1, out.len())?;

    buf[0] = 0;
    buf[len + 1..len + 1 + TAIL_PADDING].fill(0);
    Ok(permute(buf, len, indices, tmp, out))
}

/// Allocating convenience wrapper: the index-sort transform of `text`.
pub fn transform(text: &[u8]) -> Result<Bwt> {
    check_len(text.len())?;
    let n = text.len() + 1;

    let mut buf = vec![0u8; n + TAIL_PADDING];
    buf[1..n].copy_from_slice(text);
    let mut indices = vec![0u64; n];
    let mut tmp = vec![0u64; n];
    let mut output = vec![0u8; n];
    let sentinel = permute(&buf, text.len(), &mut indices, &mut tmp, &mut output);
    Ok(Bwt { output, sentinel })
}
