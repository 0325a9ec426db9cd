//! This module contains the streaming Zstandard backend.
//!
//! It is a safe, panic-free wrapper around the `zstd` crate's write-side
//! encoder. Compressed bytes accumulate in an in-memory sink which is drained
//! after every chunk, so at most one chunk's worth of output is held at a time.

use std::io::Write;
use zstd::stream::write::Encoder;

use crate::error::{PartzipError, Result};
use crate::traits::StreamingCompressor;

//==================================================================================
// 1. Core Logic
//==================================================================================

pub struct ZstdStream {
    encoder: Option<Encoder<'static, Vec<u8>>>,
}

impl ZstdStream {
    pub fn new(level: u32) -> Result<Self> {
        let encoder = Encoder::new(Vec::new(), level as i32)
            .map_err(|e| PartzipError::Compression(format!("zstd: {}", e)))?;
        Ok(Self {
            encoder: Some(encoder),
        })
    }
}

impl StreamingCompressor for ZstdStream {
    fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| PartzipError::Compression("zstd: stream already finished".into()))?;
        encoder
            .write_all(input)
            .map_err(|e| PartzipError::Compression(format!("zstd: {}", e)))?;
        Ok(std::mem::take(encoder.get_mut()))
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| PartzipError::Compression("zstd: stream already finished".into()))?;
        // `finish` is essential to write the frame epilogue.
        encoder
            .finish()
            .map_err(|e| PartzipError::Compression(format!("zstd: {}", e)))
    }
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
