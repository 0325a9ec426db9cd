//! This module is the public API and factory for the streaming compressor
//! backends.
//!
//! Every backend implements `StreamingCompressor` and nothing else: the part
//! executor only ever calls `compress` and `flush`, so adding a codec touches
//! this module and `CodecKind`, never the partitioning or assignment logic.

use crate::config::CodecKind;
use crate::error::{PartzipError, Result};
use crate::traits::StreamingCompressor;

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Deflate family (zlib container).
pub mod deflate;

/// Block-sorting.
pub mod bzip2;

/// Zstandard.
pub mod zstd;

//==================================================================================
// 2. Public API
//==================================================================================

/// Builds a fresh compressor for one part.
pub fn make_compressor(codec: CodecKind, level: u32) -> Result<Box<dyn StreamingCompressor>> {
    let (min, max) = codec.level_range();
    if level < min || level > max {
        return Err(PartzipError::InvalidConfiguration(format!(
            "level {} is outside the {} range {}..={}",
            level, codec, min, max
        )));
    }
    let compressor: Box<dyn StreamingCompressor> = match codec {
        CodecKind::Deflate => Box::new(deflate::DeflateStream::new(level)),
        CodecKind::Bzip2 => Box::new(bzip2::Bzip2Stream::new(level)),
        CodecKind::Zstd => Box::new(zstd::ZstdStream::new(level)?),
    };
    Ok(compressor)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_rejects_out_of_range_levels() {
        assert!(make_compressor(CodecKind::Deflate, 10).is_err());
        assert!(make_compressor(CodecKind::Bzip2, 0).is_err());
        assert!(make_compressor(CodecKind::Zstd, 23).is_err());
        assert!(make_compressor(CodecKind::Deflate, 0).is_ok());
    }

    #[test]
    fn test_every_backend_finishes_an_empty_stream() {
        for codec in [CodecKind::Deflate, CodecKind::Bzip2, CodecKind::Zstd] {
            let mut compressor = make_compressor(codec, codec.default_level()).unwrap();
            let trailer = compressor.flush().unwrap();
            assert!(!trailer.is_empty(), "{} produced no trailer", codec);
            assert!(compressor.flush().is_err(), "{} flushed twice", codec);
        }
    }
}
