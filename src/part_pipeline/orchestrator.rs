// In: src/part_pipeline/orchestrator.rs

//! The per-worker run loop.
//!
//! Every worker runs the same code with its own rank: compute the plan from
//! the size measured at startup, walk the parts in ascending order, and
//! compress the ones this rank owns, one at a time. A failed part is recorded
//! and the loop moves on; the caller decides the exit status from the report.

use serde::Serialize;

use crate::config::PreparedJob;
use crate::error::{PartzipError, Result, EXIT_OK, EXIT_PART_FAILURE};
use crate::part_pipeline::assigner;
use crate::part_pipeline::executor::{self, PartReport};
use crate::part_pipeline::planner;

//==================================================================================
// 1. Reports
//==================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PartFailure {
    pub number: u32,
    pub error: String,
}

/// What one rank did during a run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub rank: u32,
    pub workers: u32,
    pub completed: Vec<PartReport>,
    pub failed: Vec<PartFailure>,
}

impl WorkerReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn bytes_read(&self) -> u64 {
        self.completed.iter().map(|p| p.bytes_read).sum()
    }

    pub fn bytes_written(&self) -> u64 {
        self.completed.iter().map(|p| p.bytes_written).sum()
    }
}

/// Folds any number of worker reports into a process exit status.
pub fn exit_status<'a>(reports: impl IntoIterator<Item = &'a WorkerReport>) -> i32 {
    if reports.into_iter().all(WorkerReport::is_success) {
        EXIT_OK
    } else {
        EXIT_PART_FAILURE
    }
}

//==================================================================================
// 2. Public Orchestration API
//==================================================================================

/// Runs the share of `prepared` owned by `rank` out of `workers`.
pub fn run_worker(prepared: &PreparedJob, rank: u32, workers: u32) -> Result<WorkerReport> {
    assigner::check_identity(rank, workers)?;
    let job = &prepared.job;
    let plan = planner::plan(prepared.input_size, job.parts)?;

    let mut report = WorkerReport {
        rank,
        workers,
        ..WorkerReport::default()
    };

    if rank >= job.parts {
        log::info!(
            "rank {}/{}: no parts to compress ({} parts total)",
            rank,
            workers,
            job.parts
        );
        return Ok(report);
    }

    for range in plan.ranges() {
        if !assigner::owns(rank, workers, range.index) {
            continue;
        }
        log::info!(
            "rank {}/{}: compressing part {} (offset {}, {} bytes)",
            rank,
            workers,
            range.number,
            range.offset,
            range.length
        );
        match executor::compress_part(&range, job) {
            Ok(part) => {
                log::info!(
                    "rank {}/{}: part {} done, {} -> {} bytes",
                    rank,
                    workers,
                    part.number,
                    part.bytes_read,
                    part.bytes_written
                );
                report.completed.push(part);
            }
            Err(e) => {
                let e = PartzipError::PartFailed {
                    part: range.number,
                    source: Box::new(e),
                };
                log::warn!("rank {}/{}: {}", rank, workers, e);
                report.failed.push(PartFailure {
                    number: range.number,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Runs every rank of a `workers`-sized pool inside this process, one OS
/// thread per rank. Each rank still processes its own parts sequentially.
/// Reports come back in rank order; a rank whose thread panicked gets a report
/// listing all of its parts as failed, and the other ranks' reports are kept.
pub fn run_local_pool(prepared: &PreparedJob, workers: u32) -> Result<Vec<WorkerReport>> {
    assigner::check_identity(0, workers)?;
    let parts = prepared.job.parts;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|rank| (rank, scope.spawn(move || run_worker(prepared, rank, workers))))
            .collect();
        handles
            .into_iter()
            .map(|(rank, handle)| settle_rank(rank, workers, parts, handle.join()))
            .collect()
    })
}

/// Turns a joined rank thread into that rank's report.
fn settle_rank(
    rank: u32,
    workers: u32,
    parts: u32,
    joined: std::thread::Result<Result<WorkerReport>>,
) -> Result<WorkerReport> {
    match joined {
        Ok(outcome) => outcome,
        Err(_) => {
            let e = PartzipError::WorkerPanicked { rank };
            log::warn!("{}", e);
            // Nothing the rank wrote can be trusted, so every owned part counts as failed.
            let failed = assigner::owned_parts(rank, workers, parts)
                .into_iter()
                .map(|index| PartFailure {
                    number: index + 1,
                    error: e.to_string(),
                })
                .collect();
            Ok(WorkerReport {
                rank,
                workers,
                completed: Vec::new(),
                failed,
            })
        }
    }
}
