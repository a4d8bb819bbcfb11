//! Scratch arena: every buffer one PoW evaluation touches.
//!
//! Allocated and zeroed once, then overwritten in place by each hash. Per
//! stage only the keystream text and its zero tail are rewritten; the
//! histograms live on the stack of the sorter and start from zero on every
//! call.

use core::cell::RefCell;
use core::fmt;

use tracing::debug;

use crate::pipeline::{Stage, StageBackend};
use crate::{sha3_256, sort, stream, MAX_STAGE2_LENGTH, STAGE1_LENGTH, TAIL_PADDING};

/// Round buffer capacities up to a cache line.
const ALIGN: usize = 64;

#[inline]
const fn round_up(len: usize) -> usize {
    (len + ALIGN - 1) / ALIGN * ALIGN
}

const STAGE1_CAPACITY: usize = round_up(STAGE1_LENGTH + 1 + TAIL_PADDING);
const STAGE2_CAPACITY: usize = round_up(MAX_STAGE2_LENGTH + 1 + TAIL_PADDING);
const INDEX_CAPACITY: usize = round_up(MAX_STAGE2_LENGTH + 1);

/// Working memory for one worker.
///
/// Never shared: a hash needs `&mut Arena` for its whole duration.
pub struct Arena {
    stage1: Box<[u8]>,
    stage1_result: Box<[u8]>,
    stage2: Box<[u8]>,
    stage2_result: Box<[u8]>,
    indices: Box<[u64]>,
    tmp_indices: Box<[u64]>,
}

impl Arena {
    /// Allocates an arena sized for the largest possible stage 2.
    pub fn new() -> Self {
        let arena = Self {
            stage1: vec![0u8; STAGE1_CAPACITY].into_boxed_slice(),
            stage1_result: vec![0u8; round_up(STAGE1_LENGTH + 1)].into_boxed_slice(),
            stage2: vec![0u8; STAGE2_CAPACITY].into_boxed_slice(),
            stage2_result: vec![0u8; INDEX_CAPACITY].into_boxed_slice(),
            indices: vec![0u64; INDEX_CAPACITY].into_boxed_slice(),
            tmp_indices: vec![0u64; INDEX_CAPACITY].into_boxed_slice(),
        };
        debug!(bytes = Self::footprint(), "allocated AstroBWT arena");
        arena
    }

    /// Heap bytes held by one arena.
    pub const fn footprint() -> usize {
        STAGE1_CAPACITY
            + round_up(STAGE1_LENGTH + 1)
            + STAGE2_CAPACITY
            + INDEX_CAPACITY
            + 2 * INDEX_CAPACITY * core::mem::size_of::<u64>()
    }

    /// Largest stage-2 text this arena accepts.
    pub const fn max_stage2_length(&self) -> usize {
        MAX_STAGE2_LENGTH
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("footprint", &Self::footprint())
            .finish_non_exhaustive()
    }
}

impl StageBackend for Arena {
    fn stage_digest(&mut self, stage: Stage, key: &[u8; 32], len: usize) -> [u8; 32] {
        let (buf, out) = match stage {
            Stage::One => (&mut self.stage1, &mut self.stage1_result),
            Stage::Two => (&mut self.stage2, &mut self.stage2_result),
        };
        assert!(
            len + 1 + TAIL_PADDING <= buf.len(),
            "stage of {len} bytes overflows the arena"
        );

        // buf[0] is never written and stays the zero pad byte
        stream::expand(key, &stream::ZERO_NONCE, &mut buf[1..=len]);
        // a longer previous stage left keystream where this one needs zeros
        buf[len + 1..len + 1 + TAIL_PADDING].fill(0);

        sort::permute(&buf[..], len, &mut self.indices, &mut self.tmp_indices, &mut out[..]);
        sha3_256(&out[..=len])
    }
}

thread_local! {
    static THREAD_ARENA: RefCell<Option<Arena>> = const { RefCell::new(None) };
}

/// Runs `f` with this thread's arena, allocating it on first use.
///
/// # Panics
///
/// Panics if called again from inside `f`.
pub fn with_thread_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    THREAD_ARENA.with(|cell| {
        let mut slot = cell.borrow_mut();
        f(slot.get_or_insert_with(Arena::new))
    })
}
