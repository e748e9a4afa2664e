//! Loading images from `std::io` sources

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::vec::Vec;

use thiserror::Error;

use crate::error::{Error, LineError, Malformed};

use super::loader::Loader;
use super::record::MAX_LINE_LEN;

/// Longest line accepted from a reader: a full record and `\r\n`
const MAX_READ_LEN: usize = MAX_LINE_LEN + 2;

/// Error from loading an image out of a reader
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input was read but rejected
    #[error("{0}")]
    Record(#[from] LineError),

    /// Reading the input failed
    #[error("error reading input (line {line}): {source}")]
    IoFailure {
        /// Line that was being read
        line: usize,
        /// Underlying read error
        #[source]
        source: io::Error,
    },

    /// The input file could not be opened
    #[error("cannot open input: {source}")]
    Open {
        /// Underlying open error
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// 1-based line where the error was detected, `None` if no line was read
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Record(e) => Some(e.line),
            LoadError::IoFailure { line, .. } => Some(*line),
            LoadError::Open { .. } => None,
        }
    }

    /// The core error, or `None` for I/O failures
    pub fn kind(&self) -> Option<Error> {
        match self {
            LoadError::Record(e) => Some(e.error),
            LoadError::IoFailure { .. } | LoadError::Open { .. } => None,
        }
    }
}

/// Load an Intel HEX image from a buffered reader into `buffer`
///
/// Returns the used length of the image. Lines end in `\n` or `\r\n`.
/// A line longer than any record is rejected after reading just past the
/// longest record, the rest of it is never buffered.
pub fn load<R: BufRead>(mut reader: R, buffer: &mut [u8]) -> Result<usize, LoadError> {
    let mut loader = Loader::new(buffer);
    let mut line = Vec::with_capacity(MAX_READ_LEN + 1);

    loop {
        line.clear();
        let read = reader
            .by_ref()
            .take(MAX_READ_LEN as u64 + 1)
            .read_until(b'\n', &mut line)
            .map_err(|source| LoadError::IoFailure {
                line: loader.line_number() + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        if read > MAX_READ_LEN && !line.ends_with(b"\n") {
            let too_long = Error::MalformedLine(Malformed::LengthMismatch);
            return Err(loader.reject_line(too_long).into());
        }
        loader.feed_line(&line)?;
    }

    Ok(loader.finish()?)
}

/// Load an Intel HEX file into `buffer`
pub fn load_file(path: impl AsRef<Path>, buffer: &mut [u8]) -> Result<usize, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open { source })?;
    load(BufReader::new(file), buffer)
}

/// An image loaded into an owned, zero-filled buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    buffer: Vec<u8>,
    len: usize,
}

impl FirmwareImage {
    /// Load from a reader into a fresh buffer of `capacity` bytes
    pub fn from_reader<R: BufRead>(reader: R, capacity: usize) -> Result<Self, LoadError> {
        let mut buffer = std::vec![0u8; capacity];
        let len = load(reader, &mut buffer)?;
        Ok(Self { buffer, len })
    }

    /// Load a file into a fresh buffer of `capacity` bytes
    pub fn from_file(path: impl AsRef<Path>, capacity: usize) -> Result<Self, LoadError> {
        let mut buffer = std::vec![0u8; capacity];
        let len = load_file(path, &mut buffer)?;
        Ok(Self { buffer, len })
    }

    /// The loaded bytes, `[0, len)`
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Used length of the image
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no data record was loaded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity the image was loaded with
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::string::{String, ToString};

    /// Reader that yields some bytes and then fails
    struct FailingReader {
        data: Cursor<&'static [u8]>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "cable pulled"))
            } else {
                Ok(n)
            }
        }
    }

    #[test]
    fn test_load_from_cursor() {
        let input = Cursor::new(":04000000DEADBEEFC4\r\n:00000001FF\r\n");
        let mut buf = [0u8; 16384];
        assert_eq!(load(input, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_record_errors_carry_line() {
        let input = Cursor::new(":00000001FF\n:0100000001FE\n");
        let mut buf = [0u8; 64];
        let err = load(input, &mut buf).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.kind(), Some(Error::TrailingData));
        assert_eq!(err.to_string(), "data after end-of-file record (line 2)");
    }

    #[test]
    fn test_io_failure() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(&b":0100000001FE\n"[..]),
        });
        let mut buf = [0u8; 64];
        let err = load(reader, &mut buf).unwrap_err();
        match &err {
            LoadError::IoFailure { line, source } => {
                assert_eq!(*line, 2);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected I/O error, got {:?}", other),
        }
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_missing_file() {
        let mut buf = [0u8; 16];
        let err = load_file("/nonexistent/firmware.hex", &mut buf).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert_eq!(err.line(), None);
        assert!(err.to_string().starts_with("cannot open input"));
    }

    /// Reader that yields a start code and then `A` forever
    struct EndlessLine {
        consumed: usize,
    }

    impl Read for EndlessLine {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b'A');
            if self.consumed == 0 {
                if let Some(first) = buf.first_mut() {
                    *first = b':';
                }
            }
            self.consumed += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn test_overlong_line_is_rejected_unbuffered() {
        let mut reader = BufReader::new(EndlessLine { consumed: 0 });
        let mut buf = [0u8; 64];
        let err = load(&mut reader, &mut buf).unwrap_err();

        assert_eq!(err.line(), Some(1));
        assert_eq!(
            err.kind(),
            Some(Error::MalformedLine(Malformed::LengthMismatch))
        );
        // One BufReader fill at most, not the whole stream
        assert!(reader.get_ref().consumed <= 8 * 1024);
    }

    #[test]
    fn test_overlong_line_after_end_of_file() {
        let mut text = String::from(":00000001FF\n");
        text.push_str(&"0".repeat(2000));
        let mut buf = [0u8; 64];
        let err = load(Cursor::new(text), &mut buf).unwrap_err();
        assert_eq!(err.kind(), Some(Error::TrailingData));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_longest_record_with_crlf() {
        // 255 data bytes of zero at 0x0000: sum 0xFF, checksum 0x01
        let mut text = String::from(":FF000000");
        text.push_str(&"00".repeat(255));
        text.push_str("01\r\n:00000001FF\r\n");
        assert_eq!(text.find('\r'), Some(MAX_LINE_LEN));

        let mut buf = [0xAAu8; 1024];
        assert_eq!(load(Cursor::new(text), &mut buf).unwrap(), 255);
        assert!(buf[..255].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_firmware_image() {
        let text = ":0300300002337A1E\n:00000001FF\n";
        let image = FirmwareImage::from_reader(Cursor::new(text), 16384).unwrap();
        assert_eq!(image.len(), 0x33);
        assert_eq!(image.capacity(), 16384);
        assert!(image.data()[..0x30].iter().all(|&b| b == 0));
        assert_eq!(&image.data()[0x30..], &[0x02, 0x33, 0x7A]);
    }

    #[test]
    fn test_firmware_image_rejects_malformed() {
        let err = FirmwareImage::from_reader(Cursor::new("00000001FF\n"), 16).unwrap_err();
        assert_eq!(
            err.kind(),
            Some(Error::MalformedLine(Malformed::TooShort))
        );
    }
}
