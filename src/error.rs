// Error taxonomy shared by every codec.
//
// All failures are fatal: codecs never recover locally, they hand the
// first error straight back to the caller. Positions are byte offsets
// into the input stream of the failing session.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors produced while encoding, decoding or stripping a stream.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading from the input or writing to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input contains a byte sequence that is not a character in the
    /// selected encoding.
    #[error("illegal character encoding encountered at byte {position}")]
    IllegalSequence { position: u64 },

    /// The input ends in the middle of a multi-byte character.
    #[error("incomplete multibyte character at end of input (byte {position})")]
    TruncatedSequence { position: u64 },

    /// The intermediate representation being decoded is malformed.
    #[error("input format syntax error at byte {position}: {kind}")]
    Format { position: u64, kind: FormatError },

    /// The ASCII-dump scratch buffer could not be allocated.
    #[error("memory allocation error: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// The session options were rejected before any I/O happened.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Byte offset of the failure in the input stream, when one is known.
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::IllegalSequence { position }
            | Self::TruncatedSequence { position }
            | Self::Format { position, .. } => Some(*position),
            Self::Io(_) | Self::OutOfMemory(_) | Self::Config(_) => None,
        }
    }

    pub(crate) fn format(position: u64, kind: FormatError) -> Self {
        Self::Format { position, kind }
    }
}

/// Syntax errors found while decoding an intermediate representation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A text-mode line starts with neither the word nor the newline marker.
    #[error("unrecognized line opener {0:?}")]
    UnknownLineOpener(char),

    /// A newline-run line contains something other than repeat marks.
    #[error("unexpected {0:?} in newline run")]
    InvalidRepeatMark(char),

    /// A hex dump contains a character that is not a hex digit.
    #[error("expected hexadecimal digit, found {0:?}")]
    ExpectedHexDigit(char),

    /// A hex byte was cut after its first digit.
    #[error("incomplete hexadecimal byte")]
    IncompleteHexByte,

    /// A bit dump contains a character that is not `0` or `1`.
    #[error("expected bit digit, found {0:?}")]
    ExpectedBit(char),

    /// A value follows a ghost placeholder, so the ghost stands where a
    /// real value was required.
    #[error("value after ghost placeholder")]
    ValueAfterGhost,

    /// A bit dump ends with fewer than 8 bits of a byte.
    #[error("incomplete binary octet (8 bit byte) at end of input")]
    IncompleteOctet,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_reported_for_stream_errors() {
        assert_eq!(Error::IllegalSequence { position: 7 }.position(), Some(7));
        assert_eq!(
            Error::format(3, FormatError::IncompleteOctet).position(),
            Some(3)
        );
        assert_eq!(Error::Config("x".into()).position(), None);
    }

    #[test]
    fn display_includes_kind_and_position() {
        let e = Error::format(12, FormatError::UnknownLineOpener('x'));
        assert_eq!(
            e.to_string(),
            "input format syntax error at byte 12: unrecognized line opener 'x'"
        );
    }
}
