// In: src/config.rs

//! The single source of truth for a partzip run configuration.
//!
//! A `CompressionJob` is created once at the application boundary (from CLI
//! flags, optionally layered on top of a JSON job file) and is read-only for
//! the rest of the run. Changing the part count or chunk size means starting a
//! new run: every worker derives its share of the work from these values, so
//! they must agree across all ranks.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PartzipError, Result};

//==================================================================================
// I. Codec Selection
//==================================================================================

/// The streaming compressor backend used for every part of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// **Default:** zlib-wrapped deflate. Fast, levels 0-9.
    #[default]
    Deflate,
    /// Block-sorting bzip2. Higher ratio, slower, levels 1-9.
    Bzip2,
    /// Zstandard. Levels 1-22.
    Zstd,
}

impl CodecKind {
    /// The level used when the caller does not pick one.
    pub fn default_level(self) -> u32 {
        match self {
            CodecKind::Deflate => 6,
            CodecKind::Bzip2 => 9,
            CodecKind::Zstd => 3,
        }
    }

    /// Inclusive range of accepted levels.
    pub fn level_range(self) -> (u32, u32) {
        match self {
            CodecKind::Deflate => (0, 9),
            CodecKind::Bzip2 => (1, 9),
            CodecKind::Zstd => (1, 22),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Deflate => "deflate",
            CodecKind::Bzip2 => "bzip2",
            CodecKind::Zstd => "zstd",
        }
    }

    /// Resolves a codec from the name the program was invoked as
    /// (`super_zlib`, `partzip-bz2`, ...). Returns `None` for unknown names.
    pub fn from_program_name(program: &str) -> Option<Self> {
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program);
        match stem {
            "super_zlib" | "partzip-zlib" | "partzip-deflate" => Some(CodecKind::Deflate),
            "super_bz2" | "partzip-bz2" | "partzip-bzip2" => Some(CodecKind::Bzip2),
            "partzip-zstd" => Some(CodecKind::Zstd),
            _ => None,
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = PartzipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "deflate" | "zlib" => Ok(CodecKind::Deflate),
            "bzip2" | "bz2" => Ok(CodecKind::Bzip2),
            "zstd" => Ok(CodecKind::Zstd),
            other => Err(PartzipError::InvalidConfiguration(format!(
                "unknown codec '{}' (expected deflate, bzip2 or zstd)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//==================================================================================
// II. The Job
//==================================================================================

/// The immutable configuration of one run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CompressionJob {
    /// The file to split and compress. Job files usually leave this to the
    /// command line.
    #[serde(default)]
    pub input: PathBuf,

    /// Directory receiving one output file per part, named `1`..`parts`.
    #[serde(default)]
    pub output_dir: PathBuf,

    /// **The number of parts.** Must be at least 1.
    #[serde(default = "default_parts")]
    pub parts: u32,

    /// Bytes read from the input per compressor call. Bounds per-worker memory.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub codec: CodecKind,

    /// Backend-specific compression level. `None` means the codec's default.
    #[serde(default)]
    pub level: Option<u32>,
}

/// Provides the default part count for serde and the CLI.
pub fn default_parts() -> u32 {
    2
}

/// Provides the default read size for serde and the CLI.
pub fn default_chunk_size() -> usize {
    4096
}

impl CompressionJob {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            parts: default_parts(),
            chunk_size: default_chunk_size(),
            codec: CodecKind::default(),
            level: None,
        }
    }

    pub fn with_parts(mut self, parts: u32) -> Self {
        self.parts = parts;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Loads a job description from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PartzipError::InvalidConfiguration(format!(
                "cannot read job file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The level actually handed to the backend.
    pub fn effective_level(&self) -> u32 {
        self.level.unwrap_or_else(|| self.codec.default_level())
    }

    /// Checks every setting that does not require touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.parts == 0 {
            return Err(PartzipError::InvalidConfiguration(
                "part count must be at least 1".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(PartzipError::InvalidConfiguration(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        let level = self.effective_level();
        let (min, max) = self.codec.level_range();
        if level < min || level > max {
            return Err(PartzipError::InvalidConfiguration(format!(
                "level {} is outside the {} range {}..={}",
                level, self.codec, min, max
            )));
        }
        Ok(())
    }

    /// Validates the job and measures the input once. The measured size is
    /// used for the whole run even if the file changes afterwards.
    pub fn prepare(self) -> Result<PreparedJob> {
        self.validate()?;
        let input_size = measure_input(&self.input)?;
        Ok(PreparedJob {
            job: self,
            input_size,
        })
    }
}

/// A validated job bound to the input size observed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedJob {
    pub job: CompressionJob,
    pub input_size: u64,
}

fn measure_input(path: &Path) -> Result<u64> {
    let unavailable = |reason: String| PartzipError::InputUnavailable {
        path: path.to_path_buf(),
        reason,
    };
    let meta = fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unavailable("not a regular file".to_string()));
    }
    // Opening proves readability before any worker commits to the plan.
    fs::File::open(path).map_err(|e| unavailable(e.to_string()))?;
    Ok(meta.len())
}
