// In: src/part_pipeline/io.rs

//! Scoped file access for one part.
//!
//! `PartReader` can only see the bytes of its own range, and `PartWriter` owns
//! exactly one output file. Both close their handle when dropped, so a part
//! that fails halfway never leaks a descriptor into the next part.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Take, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::part_pipeline::planner::PartRange;

//==================================================================================
// 1. Input
//==================================================================================

/// Read-only view of one byte range of the input file.
pub struct PartReader {
    inner: Take<File>,
}

impl PartReader {
    pub fn open(path: &Path, range: &PartRange) -> Result<Self> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(range.offset))?;
        Ok(Self {
            inner: file.take(range.length),
        })
    }

    /// Bytes of the range not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.inner.limit()
    }

    /// Fills `buf` as far as the range and the file allow. Returns fewer bytes
    /// than `buf.len()` only at the end of the range or the end of the file.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

//==================================================================================
// 2. Output
//==================================================================================

/// The path of the output file for a 1-based part number.
pub fn part_path(output_dir: &Path, number: u32) -> PathBuf {
    output_dir.join(number.to_string())
}

/// Exclusive writer for one part's output file.
pub struct PartWriter {
    path: PathBuf,
    inner: BufWriter<File>,
    written: u64,
}

impl PartWriter {
    /// Creates the output directory if needed, then creates or truncates the
    /// part file. Reruns never append to a previous run's output.
    pub fn create(output_dir: &Path, number: u32) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        let path = part_path(output_dir, number);
        let file = File::create(&path)?;
        Ok(Self {
            path,
            inner: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered bytes and returns the total written to the file.
    pub fn finish(mut self) -> Result<u64> {
        self.inner.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(offset: u64, length: u64) -> PartRange {
        PartRange {
            index: 0,
            number: 1,
            offset,
            length,
        }
    }

    #[test]
    fn test_reader_is_bounded_to_its_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        fs::write(&path, (0u8..100).collect::<Vec<_>>()).unwrap();

        let mut reader = PartReader::open(&path, &range(10, 5)).unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], &[10, 11, 12, 13, 14]);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_reader_stops_at_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        fs::write(&path, vec![1u8; 20]).unwrap();

        // The range claims more bytes than the file holds.
        let mut reader = PartReader::open(&path, &range(15, 50)).unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 5);
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_writer_creates_directory_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        let mut writer = PartWriter::create(&out, 3).unwrap();
        writer.write(b"first run, long content").unwrap();
        assert_eq!(writer.finish().unwrap(), 23);

        let mut writer = PartWriter::create(&out, 3).unwrap();
        assert_eq!(writer.path(), out.join("3").as_path());
        writer.write(b"second").unwrap();
        writer.write(b"").unwrap();
        assert_eq!(writer.finish().unwrap(), 6);

        assert_eq!(fs::read(out.join("3")).unwrap(), b"second");
    }
}
