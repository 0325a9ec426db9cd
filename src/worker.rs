// In: src/worker.rs

//! Resolves which rank this process is and how many ranks the pool has.
//!
//! Workers are ordinary OS processes started by an external launcher. The
//! launcher tells each process its identity either through explicit flags or
//! through the environment variables common MPI launchers export.

use serde::Serialize;

use crate::error::{PartzipError, Result};
use crate::part_pipeline::assigner;

/// Environment variable pairs checked in order, `(rank, size)`.
pub const ENV_SOURCES: &[(&str, &str)] = &[
    ("PARTZIP_RANK", "PARTZIP_WORKERS"),
    ("OMPI_COMM_WORLD_RANK", "OMPI_COMM_WORLD_SIZE"),
    ("PMI_RANK", "PMI_SIZE"),
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerIdentity {
    pub rank: u32,
    pub workers: u32,
}

impl Default for WorkerIdentity {
    fn default() -> Self {
        Self {
            rank: 0,
            workers: 1,
        }
    }
}

impl WorkerIdentity {
    pub fn new(rank: u32, workers: u32) -> Result<Self> {
        assigner::check_identity(rank, workers)?;
        Ok(Self { rank, workers })
    }

    /// Resolves the identity from explicit values first, then from the
    /// process environment, then falls back to a single worker.
    pub fn resolve(rank: Option<u32>, workers: Option<u32>) -> Result<Self> {
        Self::resolve_with(rank, workers, |key| std::env::var(key).ok())
    }

    /// Same as `resolve`, reading variables through `lookup`.
    pub fn resolve_with(
        rank: Option<u32>,
        workers: Option<u32>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let from_env = ENV_SOURCES.iter().find_map(|&(rank_key, size_key)| {
            match (lookup(rank_key), lookup(size_key)) {
                (Some(r), Some(s)) => Some((rank_key, r, size_key, s)),
                _ => None,
            }
        });

        let (env_rank, env_workers) = match from_env {
            Some((rank_key, r, size_key, s)) => {
                (Some(parse_var(rank_key, &r)?), Some(parse_var(size_key, &s)?))
            }
            None => (None, None),
        };

        let identity = Self::new(
            rank.or(env_rank).unwrap_or(0),
            workers.or(env_workers).unwrap_or(1),
        )?;
        log::debug!("worker identity: rank {} of {}", identity.rank, identity.workers);
        Ok(identity)
    }
}

fn parse_var(key: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| {
        PartzipError::InvalidConfiguration(format!(
            "environment variable {}={:?} is not a non-negative integer",
            key, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_single_worker() {
        let id = WorkerIdentity::resolve_with(None, None, env(&[])).unwrap();
        assert_eq!(id, WorkerIdentity::default());
    }

    #[test]
    fn test_reads_mpi_environment() {
        let id = WorkerIdentity::resolve_with(
            None,
            None,
            env(&[("OMPI_COMM_WORLD_RANK", "2"), ("OMPI_COMM_WORLD_SIZE", "4")]),
        )
        .unwrap();
        assert_eq!(id, WorkerIdentity { rank: 2, workers: 4 });
    }

    #[test]
    fn test_own_variables_win_over_launcher() {
        let id = WorkerIdentity::resolve_with(
            None,
            None,
            env(&[
                ("PMI_RANK", "5"),
                ("PMI_SIZE", "8"),
                ("PARTZIP_RANK", "1"),
                ("PARTZIP_WORKERS", "3"),
            ]),
        )
        .unwrap();
        assert_eq!(id, WorkerIdentity { rank: 1, workers: 3 });
    }

    #[test]
    fn test_explicit_values_override_environment() {
        let id = WorkerIdentity::resolve_with(
            Some(0),
            None,
            env(&[("PMI_RANK", "5"), ("PMI_SIZE", "8")]),
        )
        .unwrap();
        assert_eq!(id, WorkerIdentity { rank: 0, workers: 8 });
    }

    #[test]
    fn test_rejects_malformed_or_inconsistent_identity() {
        assert!(WorkerIdentity::resolve_with(
            None,
            None,
            env(&[("PMI_RANK", "x"), ("PMI_SIZE", "2")])
        )
        .is_err());
        assert!(WorkerIdentity::resolve_with(Some(4), Some(4), env(&[])).is_err());
        assert!(WorkerIdentity::resolve_with(None, Some(0), env(&[])).is_err());
    }
}
