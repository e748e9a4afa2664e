//! Image buffer assembly
//!
//! [`ImageBuffer`] wraps the caller's memory image and applies validated
//! records to it. The capacity is the length of the borrowed slice, so every
//! write is bounded both by the explicit range check and by slice indexing.

use crate::error::{Error, Result};

use super::record::{Record, RecordType};

/// What the loader should do after a record was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading records
    Continue,
    /// The end-of-file record was seen
    EndOfFile,
}

/// Destination memory image for a load
#[derive(Debug)]
pub struct ImageBuffer<'a> {
    data: &'a mut [u8],
    high_water_mark: usize,
}

impl<'a> ImageBuffer<'a> {
    /// Wrap a caller-owned buffer; its length is the image capacity
    ///
    /// Existing contents are never read. Bytes not covered by a data record
    /// keep whatever value they had.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            high_water_mark: 0,
        }
    }

    /// Capacity of the image in bytes (exclusive upper bound for writes)
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// One past the highest address written so far
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// The loaded part of the image, `[0, high_water_mark)`
    pub fn used(&self) -> &[u8] {
        &self.data[..self.high_water_mark]
    }

    /// Apply a validated record to the image
    ///
    /// Data records are copied to their offset. A record whose end address
    /// reaches the capacity is rejected before anything is written.
    pub fn apply(&mut self, record: &Record) -> Result<Outcome> {
        match record.kind() {
            Some(RecordType::Data) => {
                self.write(record)?;
                Ok(Outcome::Continue)
            }
            Some(RecordType::EndOfFile) => Ok(Outcome::EndOfFile),
            Some(_) => Err(Error::UnsupportedRecordType(record.record_type)),
            None => Err(Error::InvalidRecordType(record.record_type)),
        }
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        let start = record.address as usize;
        let end = start + record.data.len();

        // Strict: the last usable address is capacity - 1
        if end >= self.capacity() {
            return Err(Error::AddressOutOfRange {
                address: record.address,
                end,
                capacity: self.capacity(),
            });
        }

        self.data[start..end].copy_from_slice(&record.data);
        if end > self.high_water_mark {
            self.high_water_mark = end;
        }

        log::trace!(
            "Wrote {} bytes at 0x{:04X} (high water mark 0x{:04X})",
            record.data.len(),
            start,
            self.high_water_mark
        );
        Ok(())
    }
}
