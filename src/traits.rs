//! This module defines the shared capability every compression backend exposes.

use crate::error::Result;

/// A stateful compressor that consumes raw bytes chunk by chunk.
///
/// Implementations may buffer internally, so the bytes returned by `compress`
/// can lag behind the input. `flush` must be called exactly once, after the
/// last chunk, to emit the trailing output that completes the stream. A stream
/// that saw no input still produces a valid (empty-payload) stream on flush.
pub trait StreamingCompressor {
    /// Feeds one chunk and returns whatever compressed bytes are ready.
    fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Finalizes the stream and returns the remaining compressed bytes.
    /// Any call after the first one is an error.
    fn flush(&mut self) -> Result<Vec<u8>>;
}
