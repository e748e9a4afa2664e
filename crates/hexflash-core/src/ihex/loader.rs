//! Record stream state machine
//!
//! [`Loader`] drives lines through parsing, checksum validation and image
//! assembly. It performs no I/O itself: the caller feeds lines with
//! [`Loader::feed_line`] and reports the end of input with
//! [`Loader::finish`].
//!
//! ```text
//!            data record
//!           ┌──────────┐
//!           ▼          │
//!       ┌─────────┐────┘  EOF record   ┌────────────┐  end of input  ┌──────┐
//!  ───► │ Reading │ ────────────────► │ Terminated │ ─────────────► │ Done │
//!       └─────────┘                   └────────────┘                └──────┘
//!            │ error / end of input         │ any line
//!            ▼                              ▼
//!       ┌─────────────────────────────────────┐
//!       │               Failed                │
//!       └─────────────────────────────────────┘
//! ```

use crate::error::{Error, LineError};

use super::image::{ImageBuffer, Outcome};
use super::record::Record;

/// State of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Accepting records, no end-of-file record seen yet
    Reading,
    /// End-of-file record seen, only end of input is acceptable
    Terminated,
    /// A line was rejected; the load is over
    Failed(LineError),
    /// End of input reached after the end-of-file record
    Done,
}

/// Intel HEX loader over a caller-owned image buffer
#[derive(Debug)]
pub struct Loader<'a> {
    image: ImageBuffer<'a>,
    line_number: usize,
    state: LoadState,
}

impl<'a> Loader<'a> {
    /// Start a load into `buffer`; its length is the image capacity
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            image: ImageBuffer::new(buffer),
            line_number: 0,
            state: LoadState::Reading,
        }
    }

    /// Current state
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Number of lines fed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The image being assembled
    pub fn image(&self) -> &ImageBuffer<'a> {
        &self.image
    }

    /// Whether the end-of-file record has been seen
    ///
    /// Once set this never clears.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, LoadState::Terminated | LoadState::Done)
    }

    /// Feed the next input line
    ///
    /// The first error is sticky: after a failure every further call
    /// returns it again without looking at the line.
    pub fn feed_line(&mut self, line: &[u8]) -> Result<(), LineError> {
        match self.state {
            LoadState::Failed(err) => return Err(err),
            LoadState::Reading => {}
            LoadState::Terminated | LoadState::Done => {
                self.line_number += 1;
                return Err(self.fail(Error::TrailingData));
            }
        }

        self.line_number += 1;
        match self.process(line) {
            Ok(Outcome::Continue) => Ok(()),
            Ok(Outcome::EndOfFile) => {
                log::trace!("End-of-file record at line {}", self.line_number);
                self.state = LoadState::Terminated;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Reject the next input line without parsing it
    ///
    /// For lines the caller could not take in whole, such as one longer than
    /// any record. The line counts like any other: a failed load keeps its
    /// first error and a terminated one reports trailing data.
    pub fn reject_line(&mut self, error: Error) -> LineError {
        match self.state {
            LoadState::Failed(err) => err,
            LoadState::Reading => {
                self.line_number += 1;
                self.fail(error)
            }
            LoadState::Terminated | LoadState::Done => {
                self.line_number += 1;
                self.fail(Error::TrailingData)
            }
        }
    }

    /// Report the end of input and return the used length of the image
    pub fn finish(&mut self) -> Result<usize, LineError> {
        match self.state {
            LoadState::Failed(err) => Err(err),
            LoadState::Reading => {
                Err(self.fail_at(self.line_number + 1, Error::UnexpectedEndOfInput))
            }
            LoadState::Terminated | LoadState::Done => {
                self.state = LoadState::Done;
                log::debug!(
                    "Loaded {} bytes from {} lines",
                    self.image.high_water_mark(),
                    self.line_number
                );
                Ok(self.image.high_water_mark())
            }
        }
    }

    fn process(&mut self, line: &[u8]) -> Result<Outcome, Error> {
        let record = Record::parse(line)?;
        record.validate()?;
        self.image.apply(&record)
    }

    fn fail(&mut self, error: Error) -> LineError {
        self.fail_at(self.line_number, error)
    }

    fn fail_at(&mut self, line: usize, error: Error) -> LineError {
        let err = LineError::new(line, error);
        self.state = LoadState::Failed(err);
        err
    }
}

/// Load an image from in-memory text
///
/// Lines are split on `\n`; a trailing `\r` is stripped by the record parser.
/// A final newline does not start another line.
pub fn load_str(text: &str, buffer: &mut [u8]) -> Result<usize, LineError> {
    load_bytes(text.as_bytes(), buffer)
}

/// Load an image from in-memory bytes, see [`load_str`]
pub fn load_bytes(text: &[u8], buffer: &mut [u8]) -> Result<usize, LineError> {
    let mut loader = Loader::new(buffer);
    let body = text.strip_suffix(b"\n").unwrap_or(text);
    if !text.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            loader.feed_line(line)?;
        }
    }
    loader.finish()
}
