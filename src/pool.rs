//! Checkout pool of arenas for worker pools that outlive their threads.
//!
//! Per-thread arenas ([`with_thread_arena`](crate::with_thread_arena)) need no
//! locking and are the default. The pool is for callers that want arena
//! memory bounded and reused across short-lived workers: check an arena out
//! before a burst, it returns itself on drop.

use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use parking_lot::Mutex;
use tracing::debug;

use crate::arena::Arena;
use crate::config::PowConfig;
use crate::error::{Rejected, Result};
use crate::pipeline;

/// Shared stock of arenas plus the limit every pooled hash runs under.
pub struct ArenaPool {
    idle: Mutex<Vec<Arena>>,
    config: PowConfig,
}

impl ArenaPool {
    /// Validates `config` and allocates its `prealloc_arenas` up front.
    pub fn new(config: PowConfig) -> Result<Self> {
        config.validate()?;
        let idle = (0..config.prealloc_arenas).map(|_| Arena::new()).collect();
        debug!(
            prealloc = config.prealloc_arenas,
            max_stage2_length = config.max_stage2_length,
            bounded = config.is_bounded(),
            "created arena pool"
        );
        Ok(Self {
            idle: Mutex::new(idle),
            config,
        })
    }

    /// Settings the pool was created with.
    pub fn config(&self) -> &PowConfig {
        &self.config
    }

    /// Arenas currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Takes an idle arena, or allocates one when none is left.
    pub fn checkout(&self) -> PooledArena<'_> {
        let arena = self.idle.lock().pop().unwrap_or_else(|| {
            debug!("arena pool empty, allocating");
            Arena::new()
        });
        PooledArena {
            pool: self,
            arena: ManuallyDrop::new(arena),
        }
    }

    /// Bounded digest of `input` under the pool's `max_stage2_length`.
    pub fn hash(&self, input: &[u8]) -> core::result::Result<[u8; 32], Rejected> {
        let mut arena = self.checkout();
        pipeline::compute_bounded(input, self.config.max_stage2_length, &mut *arena)
    }
}

/// An arena on loan from an [`ArenaPool`].
pub struct PooledArena<'a> {
    pool: &'a ArenaPool,
    arena: ManuallyDrop<Arena>,
}

impl Deref for PooledArena<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        &self.arena
    }
}

impl DerefMut for PooledArena<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl Drop for PooledArena<'_> {
    fn drop(&mut self) {
        // SAFETY: `arena` is never touched again after this take.
        let arena = unsafe { ManuallyDrop::take(&mut self.arena) };
        self.pool.idle.lock().push(arena);
    }
}
