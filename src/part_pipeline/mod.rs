// In: src/part_pipeline/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Part Pipeline
// ====================================================================================
//
//   1. [planner]      (file_size, parts)            -> PartitionPlan
//   2. [assigner]     (rank, workers, part_index)   -> owned or not
//   3. [orchestrator] for each owned PartRange, ascending, sequentially
//         |
//         `-> [executor] PartReader -> StreamingCompressor -> PartWriter
//
// Every rank evaluates 1-3 independently from the same inputs. Nothing is
// exchanged between ranks at run time.
// ====================================================================================

pub mod assigner;
pub mod executor;
pub mod io;
pub mod orchestrator;
pub mod planner;

pub use executor::{compress_part, PartReport};
pub use orchestrator::{exit_status, run_local_pool, run_worker, PartFailure, WorkerReport};
pub use planner::{plan, PartRange, PartitionPlan};
