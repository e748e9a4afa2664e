//! Error types for hexflash-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate. Errors produced while loading an image are wrapped
//! in [`LineError`] so the caller learns where in the input they were
//! detected.

use core::fmt;

/// Why a line could not be parsed into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// Line is shorter than the smallest possible record
    TooShort,
    /// Line does not begin with `:`
    BadStartCode,
    /// Size, address or type field is not hexadecimal
    BadHeader,
    /// Line length does not match the declared data size
    LengthMismatch,
    /// A data byte is not hexadecimal
    BadData,
    /// The checksum field is not hexadecimal
    BadChecksumDigits,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Record syntax
    /// Line fails the syntactic shape rules of a record
    MalformedLine(Malformed),
    /// Declared checksum does not cancel the computed sum
    ChecksumMismatch {
        /// Checksum found on the line
        declared: u8,
        /// Checksum that would have made the record valid
        expected: u8,
    },

    // Record semantics
    /// Data record would write at or past the end of the image buffer
    AddressOutOfRange {
        /// First address written by the record
        address: u16,
        /// One past the last address written by the record
        end: usize,
        /// Capacity of the image buffer
        capacity: usize,
    },
    /// Extended addressing record (types 2-5); only 8-bit files are supported
    UnsupportedRecordType(u8),
    /// Record type outside the Intel HEX type space
    InvalidRecordType(u8),

    // Record stream
    /// Input ended before an end-of-file record was seen
    UnexpectedEndOfInput,
    /// Input continues after the end-of-file record
    TrailingData,

    // Target errors
    /// Image does not fit into the target's memory
    ImageTooLarge {
        /// Size of the image in bytes
        size: usize,
        /// Capacity of the target in bytes
        capacity: usize,
    },
    /// The target rejected or failed the transfer
    TransferFailed,
    /// The target has no known transfer protocol
    TransferUnsupported,
    /// The target could not switch between application and ISP mode
    ModeSwitchFailed,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "too short"),
            Self::BadStartCode => write!(f, "bad start code"),
            Self::BadHeader => write!(f, "bad header"),
            Self::LengthMismatch => write!(f, "length/size mismatch"),
            Self::BadData => write!(f, "bad data"),
            Self::BadChecksumDigits => write!(f, "bad checksum digits"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine(reason) => write!(f, "malformed record: {}", reason),
            Self::ChecksumMismatch { declared, expected } => write!(
                f,
                "checksum mismatch: record declares 0x{:02X}, expected 0x{:02X}",
                declared, expected
            ),
            Self::AddressOutOfRange {
                address,
                end,
                capacity,
            } => write!(
                f,
                "data at 0x{:04X}..0x{:04X} does not fit in {} byte image",
                address, end, capacity
            ),
            Self::UnsupportedRecordType(t) => write!(
                f,
                "record type {:02X} needs extended addressing, only 8-bit Intel HEX is supported",
                t
            ),
            Self::InvalidRecordType(t) => write!(f, "invalid record type {:02X}", t),
            Self::UnexpectedEndOfInput => {
                write!(f, "unexpected end of input, no end-of-file record")
            }
            Self::TrailingData => write!(f, "data after end-of-file record"),
            Self::ImageTooLarge { size, capacity } => write!(
                f,
                "image of {} bytes exceeds target capacity of {} bytes",
                size, capacity
            ),
            Self::TransferFailed => write!(f, "firmware transfer failed"),
            Self::TransferUnsupported => {
                write!(f, "firmware transfer is not supported by this target")
            }
            Self::ModeSwitchFailed => write!(f, "device mode switch failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// An [`Error`] annotated with the 1-based input line where it was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    /// What went wrong
    pub error: Error,
}

impl LineError {
    /// Attach a line number to an error
    pub const fn new(line: usize, error: Error) -> Self {
        Self { line, error }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.error, self.line)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
