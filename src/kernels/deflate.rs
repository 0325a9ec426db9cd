//! Streaming deflate backend (zlib container) built on `flate2`.
//!
//! Output is byte-compatible with any zlib inflater: each part file is one
//! complete zlib stream.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{PartzipError, Result};
use crate::traits::StreamingCompressor;

pub struct DeflateStream {
    encoder: Option<ZlibEncoder<Vec<u8>>>,
}

impl DeflateStream {
    /// `level` must already be within 0..=9.
    pub fn new(level: u32) -> Self {
        Self {
            encoder: Some(ZlibEncoder::new(Vec::new(), Compression::new(level))),
        }
    }
}

impl StreamingCompressor for DeflateStream {
    fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| PartzipError::Compression("deflate: stream already finished".into()))?;
        encoder
            .write_all(input)
            .map_err(|e| PartzipError::Compression(format!("deflate: {}", e)))?;
        // Draining the sink only removes bytes the encoder has already emitted.
        Ok(std::mem::take(encoder.get_mut()))
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| PartzipError::Compression("deflate: stream already finished".into()))?;
        encoder
            .finish()
            .map_err(|e| PartzipError::Compression(format!("deflate: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_deflate_chunked_output_is_one_zlib_stream() {
        let original: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let mut stream = DeflateStream::new(6);
        let mut compressed = Vec::new();
        for chunk in original.chunks(4096) {
            compressed.extend(stream.compress(chunk).unwrap());
        }
        compressed.extend(stream.flush().unwrap());

        assert_eq!(compressed[0], 0x78, "zlib header expected");
        assert_eq!(inflate(&compressed), original);
    }

    #[test]
    fn test_deflate_level_zero_stores() {
        let original = vec![9u8; 1000];
        let mut stream = DeflateStream::new(0);
        let mut compressed = stream.compress(&original).unwrap();
        compressed.extend(stream.flush().unwrap());
        assert!(compressed.len() > original.len());
        assert_eq!(inflate(&compressed), original);
    }

    #[test]
    fn test_deflate_empty_stream() {
        let mut stream = DeflateStream::new(6);
        let compressed = stream.flush().unwrap();
        assert!(inflate(&compressed).is_empty());
    }
}
