//! Intel HEX record parsing and checksum validation
//!
//! A record line looks like `:LLAAAATT<data>CC` where every field is
//! written as hexadecimal digit pairs:
//!
//! | Field | Chars | Meaning                               |
//! |-------|-------|---------------------------------------|
//! | `:`   | 1     | start code                            |
//! | `LL`  | 2     | number of data bytes                  |
//! | `AAAA`| 4     | 16-bit load offset (big endian)       |
//! | `TT`  | 2     | record type                           |
//! | data  | 2*LL  | data bytes                            |
//! | `CC`  | 2     | two's complement of the sum of bytes  |

use heapless::Vec;

use crate::error::{Error, Malformed, Result};

/// Record start code
pub const START_CODE: u8 = b':';

/// Maximum number of data bytes a record can carry
pub const MAX_DATA_LEN: usize = 255;

/// Length of a record line without data: start code, header and checksum
pub const MIN_LINE_LEN: usize = 11;

/// Length of the longest record line, without its line ending
pub const MAX_LINE_LEN: usize = MIN_LINE_LEN + 2 * MAX_DATA_LEN;

/// Offset of the first data character in a record line
const DATA_OFFSET: usize = 9;

/// Record types defined by the Intel HEX family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    /// Data bytes at a 16-bit offset
    Data = 0x00,
    /// End of file
    EndOfFile = 0x01,
    /// Segment base address (16-bit files)
    ExtendedSegmentAddress = 0x02,
    /// CS:IP start address (16-bit files)
    StartSegmentAddress = 0x03,
    /// Upper 16 address bits (32-bit files)
    ExtendedLinearAddress = 0x04,
    /// EIP start address (32-bit files)
    StartLinearAddress = 0x05,
}

impl RecordType {
    /// Map a raw type byte onto a known record type
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            0x02 => Some(Self::ExtendedSegmentAddress),
            0x03 => Some(Self::StartSegmentAddress),
            0x04 => Some(Self::ExtendedLinearAddress),
            0x05 => Some(Self::StartLinearAddress),
            _ => None,
        }
    }

    /// Whether this type needs addressing beyond the 8-bit subset
    pub fn is_extended(self) -> bool {
        !matches!(self, Self::Data | Self::EndOfFile)
    }
}

/// One parsed record line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Destination offset of the first data byte
    pub address: u16,
    /// Raw record type byte, not yet checked against the known types
    pub record_type: u8,
    /// Data bytes, `size` of them
    pub data: Vec<u8, MAX_DATA_LEN>,
    /// Declared checksum byte
    pub checksum: u8,
}

impl Record {
    /// Parse one line of input into a record
    ///
    /// Trailing `\n` and `\r` characters are stripped before any check.
    /// Only the shape of the line is checked here, the checksum is verified
    /// separately by [`Record::validate`].
    pub fn parse(line: &[u8]) -> Result<Self> {
        let line = strip_line_ending(line);

        if line.len() < MIN_LINE_LEN {
            return Err(Error::MalformedLine(Malformed::TooShort));
        }
        if line[0] != START_CODE {
            return Err(Error::MalformedLine(Malformed::BadStartCode));
        }

        let header = (
            hex_byte(&line[1..3]),
            hex_byte(&line[3..5]),
            hex_byte(&line[5..7]),
            hex_byte(&line[7..9]),
        );
        let (size, addr_hi, addr_lo, record_type) = match header {
            (Some(size), Some(hi), Some(lo), Some(ty)) => (size as usize, hi, lo, ty),
            _ => return Err(Error::MalformedLine(Malformed::BadHeader)),
        };

        if line.len() != MIN_LINE_LEN + 2 * size {
            return Err(Error::MalformedLine(Malformed::LengthMismatch));
        }

        let mut data = Vec::new();
        for pair in line[DATA_OFFSET..DATA_OFFSET + 2 * size].chunks_exact(2) {
            let byte = hex_byte(pair).ok_or(Error::MalformedLine(Malformed::BadData))?;
            data.push(byte).map_err(|_| Error::MalformedLine(Malformed::BadData))?;
        }

        let checksum_at = DATA_OFFSET + 2 * size;
        let checksum = hex_byte(&line[checksum_at..checksum_at + 2])
            .ok_or(Error::MalformedLine(Malformed::BadChecksumDigits))?;

        Ok(Self {
            address: u16::from_be_bytes([addr_hi, addr_lo]),
            record_type,
            data,
            checksum,
        })
    }

    /// Number of data bytes
    pub fn size(&self) -> u8 {
        // data capacity is 255
        self.data.len() as u8
    }

    /// Known record type, if the type byte is in the Intel HEX type space
    pub fn kind(&self) -> Option<RecordType> {
        RecordType::from_u8(self.record_type)
    }

    /// Wrapping sum of every byte in the record except the checksum
    pub fn sum(&self) -> u8 {
        let [addr_hi, addr_lo] = self.address.to_be_bytes();
        self.data.iter().fold(
            self.size()
                .wrapping_add(addr_hi)
                .wrapping_add(addr_lo)
                .wrapping_add(self.record_type),
            |acc, &b| acc.wrapping_add(b),
        )
    }

    /// Checksum byte that makes the record valid
    pub fn expected_checksum(&self) -> u8 {
        self.sum().wrapping_neg()
    }

    /// Verify that the declared checksum cancels the sum of the record
    pub fn validate(&self) -> Result<()> {
        if self.sum().wrapping_add(self.checksum) == 0 {
            Ok(())
        } else {
            Err(Error::ChecksumMismatch {
                declared: self.checksum,
                expected: self.expected_checksum(),
            })
        }
    }
}

fn strip_line_ending(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode exactly two hex digits
fn hex_byte(pair: &[u8]) -> Option<u8> {
    match pair {
        [hi, lo] => Some((hex_nibble(*hi)? << 4) | hex_nibble(*lo)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(line: &str) -> Malformed {
        match Record::parse(line.as_bytes()) {
            Err(Error::MalformedLine(reason)) => reason,
            other => panic!("expected malformed line for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_parse_data_record() {
        let record = Record::parse(b":04010000DEADBEEFC3").unwrap();
        assert_eq!(record.size(), 4);
        assert_eq!(record.address, 0x0100);
        assert_eq!(record.kind(), Some(RecordType::Data));
        assert_eq!(&record.data[..], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(record.checksum, 0xC3);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_parse_end_of_file() {
        let record = Record::parse(b":00000001FF").unwrap();
        assert_eq!(record.size(), 0);
        assert_eq!(record.kind(), Some(RecordType::EndOfFile));
        assert!(record.data.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_strips_line_endings() {
        assert!(Record::parse(b":00000001FF\n").is_ok());
        assert!(Record::parse(b":00000001FF\r\n").is_ok());
        assert!(Record::parse(b":00000001FF\r\r\n\n").is_ok());
    }

    #[test]
    fn test_lowercase_hex() {
        let record = Record::parse(b":02abcd00beefd9").unwrap();
        assert_eq!(record.address, 0xABCD);
        assert_eq!(&record.data[..], &[0xBE, 0xEF]);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(parse_err(""), Malformed::TooShort);
        assert_eq!(parse_err("\r\n"), Malformed::TooShort);
        assert_eq!(parse_err(":00000001F"), Malformed::TooShort);
    }

    #[test]
    fn test_bad_start_code() {
        assert_eq!(parse_err(";00000001FF"), Malformed::BadStartCode);
        assert_eq!(parse_err(" :00000001FF"), Malformed::BadStartCode);
    }

    #[test]
    fn test_bad_header() {
        assert_eq!(parse_err(":0G000001FF"), Malformed::BadHeader);
        assert_eq!(parse_err(":00X00001FF"), Malformed::BadHeader);
        assert_eq!(parse_err(":000000+1FF"), Malformed::BadHeader);
    }

    #[test]
    fn test_length_mismatch() {
        // Declares one data byte but carries none
        assert_eq!(parse_err(":01000000FF"), Malformed::LengthMismatch);
        // Extra trailing characters
        assert_eq!(parse_err(":00000001FF00"), Malformed::LengthMismatch);
        assert_eq!(parse_err(":00000001FF "), Malformed::LengthMismatch);
    }

    #[test]
    fn test_bad_data() {
        assert_eq!(parse_err(":02000000ZZ00FE"), Malformed::BadData);
        assert_eq!(parse_err(":0200000000+1FD"), Malformed::BadData);
    }

    #[test]
    fn test_bad_checksum_digits() {
        assert_eq!(parse_err(":00000001FG"), Malformed::BadChecksumDigits);
        assert_eq!(parse_err(":0100000000-1"), Malformed::BadChecksumDigits);
    }

    #[test]
    fn test_checksum_mismatch_reports_expected() {
        let record = Record::parse(b":01000000FF01").unwrap();
        assert_eq!(
            record.validate(),
            Err(Error::ChecksumMismatch {
                declared: 0x01,
                expected: 0x00,
            })
        );
    }

    #[test]
    fn test_empty_record_checksum_is_twos_complement() {
        let cases = [(0x0000u16, 0x00u8), (0x1234, 0x01), (0xFFFF, 0x07), (0x8001, 0xFF)];
        for (addr, ty) in cases {
            let [hi, lo] = addr.to_be_bytes();
            let complement = hi.wrapping_add(lo).wrapping_add(ty).wrapping_neg();
            for checksum in 0..=u8::MAX {
                let record = Record {
                    address: addr,
                    record_type: ty,
                    data: Vec::new(),
                    checksum,
                };
                assert_eq!(record.validate().is_ok(), checksum == complement);
            }
        }
    }

    #[test]
    fn test_single_bit_flip_rejected() {
        let good = Record::parse(b":10010000214601360121470136007EFE09D2190140").unwrap();
        assert!(good.validate().is_ok());
        for i in 0..good.data.len() {
            for bit in 0..8 {
                let mut bad = good.clone();
                bad.data[i] ^= 1 << bit;
                assert!(bad.validate().is_err());
            }
        }
    }

    #[test]
    fn test_max_size_record() {
        let mut line = std::string::String::from(":FF000000");
        let mut sum = 0xFFu8;
        for i in 0..255u32 {
            line.push_str(&std::format!("{:02X}", i as u8));
            sum = sum.wrapping_add(i as u8);
        }
        line.push_str(&std::format!("{:02X}", sum.wrapping_neg()));
        let record = Record::parse(line.as_bytes()).unwrap();
        assert_eq!(record.size(), 255);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_record_type_classification() {
        assert!(!RecordType::Data.is_extended());
        assert!(!RecordType::EndOfFile.is_extended());
        for t in 2..=5 {
            assert!(RecordType::from_u8(t).unwrap().is_extended());
        }
        assert_eq!(RecordType::from_u8(6), None);
    }
}
