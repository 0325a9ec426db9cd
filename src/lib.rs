//! This file is the root of the `partzip` Rust crate.
//!
//! partzip splits one input file into a fixed number of contiguous byte ranges
//! and compresses every range into its own output file. Work is striped across
//! a pool of independent worker ranks that never talk to each other: each rank
//! derives the same plan from the same inputs and handles only its own parts.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod kernels;
pub mod part_pipeline;
pub mod traits;
pub mod worker;

pub use config::{CodecKind, CompressionJob, PreparedJob};
pub use error::{PartzipError, Result};
pub use part_pipeline::{run_local_pool, run_worker, WorkerReport};
pub use traits::StreamingCompressor;
pub use worker::WorkerIdentity;
