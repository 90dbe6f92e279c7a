//! File ids, record addresses and per-file address ranges

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{AddressError, AddressResult};

/// Number of addresses reserved for each file (2^32)
pub const ROWS_PER_FILE: u64 = 1 << 32;

const ROW_MASK: u64 = ROWS_PER_FILE - 1;

/// Integer id of a tracked file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u32);

impl FileId {
    /// Validates a caller-supplied id. Negative ids and ids wider than 32 bits
    /// are rejected.
    pub fn new(id: i64) -> AddressResult<Self> {
        u32::try_from(id)
            .map(FileId)
            .map_err(|_| AddressError::file_id_out_of_range(id))
    }

    /// Returns the raw id
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for FileId {
    fn from(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique, row-ordered record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordAddress(u64);

impl RecordAddress {
    /// Encodes a (file id, row number) pair.
    ///
    /// Fails if the file id is negative or wider than 32 bits, or if the row
    /// number is outside `1..=2^32-1`.
    pub fn encode(file_id: i64, row_number: i64) -> AddressResult<Self> {
        let file_id = FileId::new(file_id)?;
        Self::for_row(file_id, row_number)
    }

    /// Encodes a row of an already validated file id
    pub fn for_row(file_id: FileId, row_number: i64) -> AddressResult<Self> {
        if row_number < 1 || row_number > ROW_MASK as i64 {
            return Err(AddressError::row_out_of_range(row_number));
        }
        Ok(RecordAddress(((file_id.get() as u64) << 32) | row_number as u64))
    }

    /// Wraps a raw stored address
    pub fn from_raw(raw: u64) -> Self {
        RecordAddress(raw)
    }

    /// Returns the raw 64-bit value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Row number (low 32 bits). Display only; queries use ranges.
    pub fn row_number(&self) -> u32 {
        (self.0 & ROW_MASK) as u32
    }

    /// Owning file id (high 32 bits)
    pub fn file_id(&self) -> FileId {
        FileId((self.0 >> 32) as u32)
    }

    /// Inclusive address bounds covering every possible row of a file
    pub fn range_for(file_id: FileId) -> AddressResult<AddressRange> {
        AddressRange::for_file(file_id)
    }
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive `[min, max]` address bounds.
///
/// A range whose `min` exceeds `max` is empty and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub min: u64,
    pub max: u64,
}

impl AddressRange {
    /// `[(file_id << 32) + 1, (file_id << 32) + 2^32]`, i.e. exactly 2^32
    /// addresses starting at row 1.
    pub fn for_file(file_id: FileId) -> AddressResult<Self> {
        let base = ((file_id.get() as u64) << 32) + 1;
        let max = base
            .checked_add(ROW_MASK)
            .ok_or_else(|| AddressError::range_overflow(file_id.get()))?;
        Ok(Self { min: base, max })
    }

    /// Moves the lower bound up by `offset` addresses.
    ///
    /// Saturates instead of wrapping; an offset past the end yields an
    /// empty range.
    pub fn offset_start(&self, offset: u64) -> Self {
        Self {
            min: self.min.saturating_add(offset),
            max: self.max,
        }
    }

    /// Number of addresses covered
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.max - self.min + 1
        }
    }

    /// True when the range covers no address
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// True when `address` falls inside the bounds
    pub fn contains(&self, address: RecordAddress) -> bool {
        address.get() >= self.min && address.get() <= self.max
    }
}
