//! Miner-side configuration.

use crate::error::{AstroBwtError, Result};
use crate::{MAX_STAGE2_LENGTH, STAGE1_LENGTH};

/// Settings for an [`ArenaPool`](crate::ArenaPool).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PowConfig {
    /// Candidates whose stage 2 would be longer are rejected early.
    /// The default never rejects.
    pub max_stage2_length: usize,
    /// Arenas allocated up front; the pool grows past this on demand.
    pub prealloc_arenas: usize,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            max_stage2_length: MAX_STAGE2_LENGTH,
            prealloc_arenas: 0,
        }
    }
}

impl PowConfig {
    /// Config that rejects stage-2 lengths above `max_stage2_length`.
    pub fn bounded(max_stage2_length: usize) -> Self {
        Self {
            max_stage2_length,
            ..Default::default()
        }
    }

    /// Whether any candidate can ever be rejected.
    pub fn is_bounded(&self) -> bool {
        self.max_stage2_length < MAX_STAGE2_LENGTH
    }

    /// Rejects limits no candidate could ever meet.
    pub fn validate(&self) -> Result<()> {
        if self.max_stage2_length < STAGE1_LENGTH {
            return Err(AstroBwtError::InvalidConfig(format!(
                "max_stage2_length {} is below the minimum stage-2 length {}",
                self.max_stage2_length, STAGE1_LENGTH
            )));
        }
        Ok(())
    }
}
