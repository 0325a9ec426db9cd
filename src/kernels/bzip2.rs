//! Streaming block-sorting backend built on the `bzip2` crate.
//!
//! bzip2 buffers a whole block (100k-900k depending on level) before emitting
//! anything, so `compress` usually returns an empty vector and most of the
//! output arrives on `flush`.

use std::io::Write;

use bzip2::write::BzEncoder;
use bzip2::Compression;

use crate::error::{PartzipError, Result};
use crate::traits::StreamingCompressor;

pub struct Bzip2Stream {
    encoder: Option<BzEncoder<Vec<u8>>>,
}

impl Bzip2Stream {
    /// `level` must already be within 1..=9.
    pub fn new(level: u32) -> Self {
        Self {
            encoder: Some(BzEncoder::new(Vec::new(), Compression::new(level))),
        }
    }
}

impl StreamingCompressor for Bzip2Stream {
    fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| PartzipError::Compression("bzip2: stream already finished".into()))?;
        encoder
            .write_all(input)
            .map_err(|e| PartzipError::Compression(format!("bzip2: {}", e)))?;
        Ok(std::mem::take(encoder.get_mut()))
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| PartzipError::Compression("bzip2: stream already finished".into()))?;
        encoder
            .finish()
            .map_err(|e| PartzipError::Compression(format!("bzip2: {}", e)))
    }
}
