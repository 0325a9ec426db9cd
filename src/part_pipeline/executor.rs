// In: src/part_pipeline/executor.rs

//! Drives a single part end to end: bounded reads from the input range,
//! incremental compression, and writes to the part's own output file.
//!
//! Memory per part is one `chunk_size` buffer plus the backend's internal
//! state, independent of how large the part is.

use std::path::Path;

use serde::Serialize;

use crate::config::{CodecKind, CompressionJob};
use crate::error::Result;
use crate::kernels;
use crate::part_pipeline::io::{PartReader, PartWriter};
use crate::part_pipeline::planner::PartRange;

/// Outcome of one successfully compressed part.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PartReport {
    pub number: u32,
    pub offset: u64,
    pub length: u64,
    /// Bytes actually consumed. Less than `length` only if the input shrank
    /// after the plan was computed.
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Compresses one part of `job` into `<output_dir>/<range.number>`.
pub fn compress_part(range: &PartRange, job: &CompressionJob) -> Result<PartReport> {
    compress_range(
        &job.input,
        &job.output_dir,
        range,
        job.chunk_size,
        job.codec,
        job.effective_level(),
    )
}

fn compress_range(
    input: &Path,
    output_dir: &Path,
    range: &PartRange,
    chunk_size: usize,
    codec: CodecKind,
    level: u32,
) -> Result<PartReport> {
    // Truncate first: a part that fails from here on never keeps an older run's output.
    let mut writer = PartWriter::create(output_dir, range.number)?;
    let mut reader = PartReader::open(input, range)?;
    let mut compressor = kernels::make_compressor(codec, level)?;

    let mut buf = vec![0u8; chunk_size];
    let mut remaining = range.length;
    let mut consumed: u64 = 0;

    while remaining > 0 {
        // Clamp every read to what is left of this part, including the last one.
        let want = usize::try_from(remaining).map_or(chunk_size, |r| r.min(chunk_size));
        let got = reader.read_chunk(&mut buf[..want])?;
        if got < want {
            // A short read means the file ended early; what we have is the part.
            log::warn!(
                "part {}: input ended after {} of {} bytes",
                range.number,
                consumed + got as u64,
                range.length
            );
            remaining = got as u64;
        }
        if got == 0 {
            break;
        }
        writer.write(&compressor.compress(&buf[..got])?)?;
        consumed += got as u64;
        remaining -= got as u64;
    }

    writer.write(&compressor.flush()?)?;
    log::debug!(
        "part {}: flushed {} into {}",
        range.number,
        codec,
        writer.path().display()
    );
    let bytes_written = writer.finish()?;

    Ok(PartReport {
        number: range.number,
        offset: range.offset,
        length: range.length,
        bytes_read: consumed,
        bytes_written,
    })
}
