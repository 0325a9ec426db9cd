// In: src/part_pipeline/planner.rs

//! The partition planner for partzip.
//!
//! Splits `file_size` bytes into `parts` contiguous ranges. Every part except
//! the last has exactly `file_size / parts` bytes; the last one absorbs the
//! remainder. No attempt is made to balance parts by size: full coverage with
//! no byte left unassigned is the only contract.

use serde::Serialize;

use crate::error::{PartzipError, Result};

/// One contiguous byte range of the input.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 0-based part index, used for worker assignment.
    pub index: u32,
    /// 1-based part number, used as the output file name.
    pub number: u32,
    pub offset: u64,
    pub length: u64,
}

impl PartRange {
    /// First byte past the range.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// The byte layout of a run, derived from the size measured at startup.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    pub file_size: u64,
    pub parts: u32,
    /// `file_size / parts`, truncated.
    pub size_of_part: u64,
}

/// Builds the plan. Fails only when `parts` is zero.
pub fn plan(file_size: u64, parts: u32) -> Result<PartitionPlan> {
    if parts == 0 {
        return Err(PartzipError::InvalidConfiguration(
            "part count must be at least 1".to_string(),
        ));
    }
    let plan = PartitionPlan {
        file_size,
        parts,
        size_of_part: file_size / u64::from(parts),
    };
    log::debug!(
        "planned {} parts of {} bytes over {} bytes (last part {} bytes)",
        parts,
        plan.size_of_part,
        file_size,
        plan.last_length()
    );
    Ok(plan)
}

impl PartitionPlan {
    fn check_index(&self, index: u32) -> Result<()> {
        if index >= self.parts {
            return Err(PartzipError::InvalidConfiguration(format!(
                "part index {} is out of range for {} parts",
                index, self.parts
            )));
        }
        Ok(())
    }

    fn last_length(&self) -> u64 {
        self.file_size - self.size_of_part * u64::from(self.parts - 1)
    }

    /// `index` must be below `parts`.
    fn range_unchecked(&self, index: u32) -> PartRange {
        let length = if index == self.parts - 1 {
            self.last_length()
        } else {
            self.size_of_part
        };
        PartRange {
            index,
            number: index + 1,
            offset: self.size_of_part * u64::from(index),
            length,
        }
    }

    pub fn offset(&self, index: u32) -> Result<u64> {
        Ok(self.range(index)?.offset)
    }

    pub fn length(&self, index: u32) -> Result<u64> {
        Ok(self.range(index)?.length)
    }

    pub fn range(&self, index: u32) -> Result<PartRange> {
        self.check_index(index)?;
        Ok(self.range_unchecked(index))
    }

    /// All ranges in ascending order.
    pub fn ranges(&self) -> impl ExactSizeIterator<Item = PartRange> + '_ {
        (0..self.parts).map(move |index| self.range_unchecked(index))
    }
}
