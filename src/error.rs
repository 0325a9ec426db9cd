// In: src/error.rs

//! This module defines the single, unified error type for the entire partzip library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Process exit status for usage mistakes and invalid job settings.
pub const EXIT_USAGE: i32 = 10;
/// Process exit status when the input file cannot be read at startup.
pub const EXIT_INPUT_UNAVAILABLE: i32 = 11;
/// Process exit status when at least one owned part failed during the run.
pub const EXIT_PART_FAILURE: i32 = 12;

#[derive(Error, Debug)]
pub enum PartzipError {
    // =========================================================================
    // === Startup Errors (fatal before any part is touched)
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Input file {} is unavailable: {reason}", .path.display())]
    InputUnavailable { path: PathBuf, reason: String },

    // =========================================================================
    // === Run-Time Errors (scoped to a single part)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (open, seek, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The compressor backend rejected its input or reached an invalid state.
    #[error("Compression failed: {0}")]
    Compression(String),

    /// A rank of the in-process pool panicked; none of its parts can be trusted.
    #[error("Worker thread for rank {rank} panicked")]
    WorkerPanicked { rank: u32 },

    #[error("Part {part} failed: {source}")]
    PartFailed {
        part: u32,
        #[source]
        source: Box<PartzipError>,
    },

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error from the Serde JSON library, typically while loading a job file
    /// or printing a worker report.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PartzipError {
    /// Maps the error category onto a distinct process exit status so scripts
    /// can tell usage mistakes apart from environment problems.
    pub fn exit_code(&self) -> i32 {
        match self {
            PartzipError::InvalidConfiguration(_) | PartzipError::SerdeJson(_) => EXIT_USAGE,
            PartzipError::InputUnavailable { .. } => EXIT_INPUT_UNAVAILABLE,
            PartzipError::Io(_)
            | PartzipError::Compression(_)
            | PartzipError::WorkerPanicked { .. }
            | PartzipError::PartFailed { .. } => EXIT_PART_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, PartzipError>;
