// In: src/part_pipeline/assigner.rs

//! Round-robin (striping) assignment of parts to worker ranks.
//!
//! Part index `c` belongs to rank `c % workers`. Every rank derives its own
//! share from the same `(parts, workers)` pair, so no coordination is needed
//! and the shares are disjoint and complete by construction.

use crate::error::{PartzipError, Result};

/// Whether `rank` must produce the part at 0-based `part_index`.
pub fn owns(rank: u32, workers: u32, part_index: u32) -> bool {
    workers != 0 && part_index % workers == rank
}

/// Rejects a worker identity that cannot take part in the run.
pub fn check_identity(rank: u32, workers: u32) -> Result<()> {
    if workers == 0 {
        return Err(PartzipError::InvalidConfiguration(
            "worker count must be at least 1".to_string(),
        ));
    }
    if rank >= workers {
        return Err(PartzipError::InvalidConfiguration(format!(
            "rank {} is out of range for {} workers",
            rank, workers
        )));
    }
    Ok(())
}

/// The ascending part indices owned by `rank`. Empty when `rank >= parts`.
pub fn owned_parts(rank: u32, workers: u32, parts: u32) -> Vec<u32> {
    if workers == 0 || rank >= parts {
        return Vec::new();
    }
    (rank..parts).step_by(workers as usize).collect()
}
